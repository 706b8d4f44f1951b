//! Size conversions between the orchestrator (MiB) and GCE (GiB).

const MIB_PER_GIB: u64 = 1024;

/// Converts mebibytes to gibibytes, rounding up to the next whole GiB.
#[must_use]
pub const fn mib_to_gib(mib: u64) -> u64 {
    mib.div_ceil(MIB_PER_GIB)
}

/// Reports a GiB size whose MiB value does not fit in a `u64`.
pub(crate) fn size_overflow(gib: u64) -> String {
    format!("disk size {gib} GiB overflows when converted to MiB")
}

/// Converts gibibytes to mebibytes, or `None` when the result does not fit
/// in a `u64`.
#[must_use]
pub const fn gib_to_mib(gib: u64) -> Option<u64> {
    gib.checked_mul(MIB_PER_GIB)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(1023, 1)]
    #[case(1024, 1)]
    #[case(1025, 2)]
    #[case(2048, 2)]
    #[case(10 * 1024 + 1, 11)]
    fn mib_to_gib_rounds_up(#[case] mib: u64, #[case] gib: u64) {
        assert_eq!(mib_to_gib(mib), gib);
    }

    #[test]
    fn mib_to_gib_handles_largest_value() {
        assert_eq!(mib_to_gib(u64::MAX), u64::MAX / 1024 + 1);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(500)]
    #[case(65_536)]
    fn gib_to_mib_is_exact(#[case] gib: u64) {
        assert_eq!(gib_to_mib(gib), Some(gib * 1024));
    }

    #[rstest]
    #[case(u64::MAX / 1024 + 1)]
    #[case(u64::MAX)]
    fn gib_to_mib_reports_overflow(#[case] gib: u64) {
        assert_eq!(gib_to_mib(gib), None);
    }

    #[test]
    fn gib_to_mib_accepts_largest_exact_value() {
        assert_eq!(gib_to_mib(u64::MAX / 1024), Some(u64::MAX / 1024 * 1024));
    }

    #[test]
    fn round_trip_never_shrinks() {
        for mib in (0..5 * 1024).step_by(7).chain([1024, 2048, 3072]) {
            let round_tripped =
                gib_to_mib(mib_to_gib(mib)).unwrap_or_else(|| panic!("{mib} overflowed"));
            assert!(round_tripped >= mib, "{mib} shrank to {round_tripped}");
            assert_eq!(round_tripped == mib, mib % 1024 == 0, "drift for {mib}");
        }
    }
}
