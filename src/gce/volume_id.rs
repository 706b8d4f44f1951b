//! Volume identifiers that carry their zone.
//!
//! A volume ID has the form `<zone>--<suffix>`. Encoding the zone lets every
//! later operation find the disk without asking the backend where it lives.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::storage::StorageError;

/// Token separating the zone from the unique suffix.
pub const VOLUME_ID_SEPARATOR: &str = "--";

/// A decoded volume identifier.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct VolumeId {
    zone: String,
    suffix: String,
}

impl VolumeId {
    /// Builds an identifier from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Validation`] when the zone contains the
    /// separator or characters outside `[a-z0-9-]`.
    pub fn new(zone: impl Into<String>, suffix: impl Into<String>) -> Result<Self, StorageError> {
        let zone_name = zone.into();
        if zone_name.contains(VOLUME_ID_SEPARATOR) || !is_resource_name(&zone_name) {
            return Err(StorageError::Validation(format!(
                "zone {zone_name:?} is not a valid volume name prefix"
            )));
        }
        Ok(Self {
            zone: zone_name,
            suffix: suffix.into(),
        })
    }

    /// Names a new volume in `zone` with a fresh random suffix.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Validation`] when the zone is not a valid
    /// name prefix.
    pub fn generate(zone: &str) -> Result<Self, StorageError> {
        Self::new(zone, Uuid::new_v4().to_string())
    }

    /// Decodes an identifier, splitting on the first separator.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MalformedVolumeId`] when the separator is
    /// absent, or when either part is empty or holds characters outside
    /// `[a-z0-9-]`.
    pub fn parse(value: &str) -> Result<Self, StorageError> {
        let malformed = || StorageError::MalformedVolumeId {
            volume_id: value.to_owned(),
        };
        let (zone, suffix) = value.split_once(VOLUME_ID_SEPARATOR).ok_or_else(malformed)?;
        if !is_resource_name(zone) || !is_resource_name(suffix) {
            return Err(malformed());
        }
        Ok(Self {
            zone: zone.to_owned(),
            suffix: suffix.to_owned(),
        })
    }

    /// Zone holding the volume.
    #[must_use]
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Unique part of the identifier.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

/// GCE resource names use lowercase letters, digits and hyphens.
fn is_resource_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-')
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{VOLUME_ID_SEPARATOR}{}", self.zone, self.suffix)
    }
}

impl FromStr for VolumeId {
    type Err = StorageError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("us-east1-a", "u1")]
    #[case("europe-west4-c", "0b5c0c57-9a53-4b8e-a0c9-6a7cf0a3d1d2")]
    #[case("zone", "suffix--with--separators")]
    fn parse_recovers_zone_and_suffix(#[case] zone: &str, #[case] suffix: &str) {
        let encoded = format!("{zone}--{suffix}");
        let decoded = VolumeId::parse(&encoded).unwrap_or_else(|err| panic!("decode: {err}"));
        assert_eq!(decoded.zone(), zone);
        assert_eq!(decoded.suffix(), suffix);
        assert_eq!(decoded.to_string(), encoded);
    }

    #[rstest]
    #[case("not-a-valid-id")]
    #[case("")]
    #[case("us-east1-a-u1")]
    #[case("--leading")]
    #[case("us-east1-a--")]
    #[case("us-east1-a--x/../../instances/web-1")]
    #[case("us-east1-a--x%2Fweb-1")]
    #[case("us-east1-a/../global--vol")]
    #[case("US-EAST1-A--vol")]
    #[case("us-east1-a--vol?force=true")]
    fn parse_rejects_malformed_ids(#[case] value: &str) {
        let err = VolumeId::parse(value).expect_err("malformed id");
        assert_eq!(
            err,
            StorageError::MalformedVolumeId {
                volume_id: value.to_owned()
            }
        );
    }

    #[test]
    fn generate_prefixes_zone() {
        let id = VolumeId::generate("us-east1-a").unwrap_or_else(|err| panic!("generate: {err}"));
        assert!(id.to_string().starts_with("us-east1-a--"));
        assert!(Uuid::parse_str(id.suffix()).is_ok());
    }

    #[test]
    fn generate_yields_distinct_suffixes() {
        let first = VolumeId::generate("z").unwrap_or_else(|err| panic!("generate: {err}"));
        let second = VolumeId::generate("z").unwrap_or_else(|err| panic!("generate: {err}"));
        assert_ne!(first, second);
    }

    #[test]
    fn zones_containing_separator_are_rejected() {
        assert!(matches!(
            VolumeId::new("bad--zone", "x"),
            Err(StorageError::Validation(_))
        ));
    }

    #[rstest]
    #[case("")]
    #[case("zones/us-east1-a")]
    #[case("us east1")]
    fn zones_outside_name_charset_are_rejected(#[case] zone: &str) {
        assert!(matches!(
            VolumeId::generate(zone),
            Err(StorageError::Validation(_))
        ));
    }
}
