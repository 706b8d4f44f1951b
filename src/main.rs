//! Binary entry point for the `gce-storage` CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;

use gce_storage::{
    ComputeConnector, DISK_TYPE_ATTRIBUTE, EnvironConfig, GceStorageProvider, Logger,
    PROVIDER_TYPE, Provider, ProviderConfig, StorageError, VolumeAttachmentParams, VolumeParams,
    VolumeSource, stderr_dispatch,
};

mod cli;

use cli::{AttachCommand, Cli, Command, CreateCommand, DetachCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    Storage(#[from] StorageError),
}

/// Outcome of one item of a batch call.
#[derive(Debug, Eq, PartialEq)]
enum Outcome {
    Done(String),
    Failed(String),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        return;
    };

    let exit_code = match run(command).await {
        Ok(outcomes) => report(&outcomes, io::stdout(), io::stderr()),
        Err(err) => {
            writeln!(io::stderr(), "{err}").ok();
            1
        }
    };

    process::exit(exit_code);
}

async fn run(command: Command) -> Result<Vec<Outcome>, CliError> {
    let environ =
        EnvironConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    let provider =
        GceStorageProvider::with_connector(ComputeConnector, Logger::new(stderr_dispatch()));
    let pool = ProviderConfig {
        name: String::from(PROVIDER_TYPE),
        provider: String::from(PROVIDER_TYPE),
        ..ProviderConfig::default()
    };
    let source = provider.volume_source(&environ, &pool)?;
    execute(command, &source).await
}

async fn execute<S: VolumeSource>(command: Command, source: &S) -> Result<Vec<Outcome>, CliError> {
    match command {
        Command::List => Ok(source
            .list_volumes()
            .await?
            .into_iter()
            .map(Outcome::Done)
            .collect()),
        Command::Describe(args) => Ok(source
            .describe_volumes(&args.volume_ids)
            .await?
            .into_iter()
            .map(|info| Outcome::Done(format!("{} {} MiB", info.volume_id, info.size_mib)))
            .collect()),
        Command::Create(args) => create(source, args).await,
        Command::Destroy(args) => {
            let results = source.destroy_volumes(&args.volume_ids).await?;
            Ok(args
                .volume_ids
                .iter()
                .zip(results)
                .map(|(id, result)| match result {
                    Ok(()) => Outcome::Done(format!("{id} destroyed")),
                    Err(err) => Outcome::Failed(format!("{id}: {err}")),
                })
                .collect())
        }
        Command::Attach(args) => attach(source, args).await,
        Command::Detach(args) => detach(source, args).await,
    }
}

async fn create<S: VolumeSource>(
    source: &S,
    args: CreateCommand,
) -> Result<Vec<Outcome>, CliError> {
    let machine = args.machine.unwrap_or_else(|| args.instance.clone());
    let base = VolumeParams::new(&args.tag, args.size_mib).attach_to(machine, &args.instance);
    let params = match args.disk_type {
        Some(disk_type) => base.attribute(DISK_TYPE_ATTRIBUTE, disk_type),
        None => base,
    };

    let results = source.create_volumes(std::slice::from_ref(&params)).await?;
    Ok(results
        .into_iter()
        .map(|result| match result {
            Ok(created) => {
                let info = &created.volume.info;
                Outcome::Done(match &created.attachment {
                    Some(attachment) => format!(
                        "{} {} MiB attached to {} as {}",
                        info.volume_id, info.size_mib, args.instance, attachment.info.device_name
                    ),
                    None => format!(
                        "{} {} MiB not attached; retry with attach",
                        info.volume_id, info.size_mib
                    ),
                })
            }
            Err(err) => Outcome::Failed(format!("{}: {err}", params.tag)),
        })
        .collect())
}

async fn attach<S: VolumeSource>(
    source: &S,
    args: AttachCommand,
) -> Result<Vec<Outcome>, CliError> {
    let params = VolumeAttachmentParams {
        volume_tag: args.volume_id.clone(),
        machine_tag: args.instance.clone(),
        instance_id: args.instance,
        volume_id: args.volume_id,
        read_only: args.read_only,
    };
    let results = source.attach_volumes(std::slice::from_ref(&params)).await?;
    Ok(results
        .into_iter()
        .map(|result| match result {
            Ok(attachment) => Outcome::Done(format!(
                "{} attached to {} as {}{}",
                params.volume_id,
                params.instance_id,
                attachment.info.device_name,
                if attachment.info.read_only {
                    " (read-only)"
                } else {
                    ""
                }
            )),
            Err(err) => Outcome::Failed(format!("{}: {err}", params.volume_id)),
        })
        .collect())
}

async fn detach<S: VolumeSource>(
    source: &S,
    args: DetachCommand,
) -> Result<Vec<Outcome>, CliError> {
    let params = VolumeAttachmentParams {
        volume_tag: args.volume_id.clone(),
        machine_tag: args.instance.clone(),
        instance_id: args.instance,
        volume_id: args.volume_id,
        read_only: false,
    };
    let results = source.detach_volumes(std::slice::from_ref(&params)).await?;
    Ok(results
        .into_iter()
        .map(|result| match result {
            Ok(()) => Outcome::Done(format!(
                "{} detached from {}",
                params.volume_id, params.instance_id
            )),
            Err(err) => Outcome::Failed(format!("{}: {err}", params.volume_id)),
        })
        .collect())
}

/// Writes successes to `out` and failures to `err`, returning the exit code.
fn report(outcomes: &[Outcome], mut out: impl Write, mut err: impl Write) -> i32 {
    let mut exit_code = 0;
    for outcome in outcomes {
        match outcome {
            Outcome::Done(line) => {
                writeln!(out, "{line}").ok();
            }
            Outcome::Failed(line) => {
                writeln!(err, "{line}").ok();
                exit_code = 1;
            }
        }
    }
    exit_code
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::cli::VolumeIdsCommand;
    use gce_storage::gce::InstanceStatus;
    use gce_storage::test_support::{FailurePoint, FakeConnection};
    use gce_storage::{EnvironIdentity, GceVolumeSource};

    fn source(connection: &FakeConnection) -> GceVolumeSource<FakeConnection> {
        GceVolumeSource::new(
            connection.clone(),
            EnvironIdentity::new("test-env", "uuid", "us-east1"),
            Logger::disabled(),
        )
    }

    fn connection() -> FakeConnection {
        let connection = FakeConnection::new();
        connection.add_zone("us-east1-b");
        connection.add_instance("i-1", "us-east1-b", InstanceStatus::Running);
        connection
    }

    async fn execute_ok(command: Command, connection: &FakeConnection) -> Vec<Outcome> {
        execute(command, &source(connection))
            .await
            .unwrap_or_else(|err| panic!("execute: {err}"))
    }

    #[tokio::test]
    async fn list_prints_one_id_per_line() {
        let connection = connection();
        connection.add_disk("us-east1-b", "us-east1-b--a", 1);
        connection.add_disk("us-east1-b", "us-east1-b--b", 1);

        let outcomes = execute_ok(Command::List, &connection).await;

        assert_eq!(
            outcomes,
            vec![
                Outcome::Done(String::from("us-east1-b--a")),
                Outcome::Done(String::from("us-east1-b--b")),
            ]
        );
    }

    #[tokio::test]
    async fn create_reports_attachment() {
        let connection = connection();
        let outcomes = execute_ok(
            Command::Create(CreateCommand {
                size_mib: 1500,
                instance: String::from("i-1"),
                tag: String::from("volume-0"),
                machine: None,
                disk_type: Some(String::from("pd-ssd")),
            }),
            &connection,
        )
        .await;

        let [Outcome::Done(line)] = outcomes.as_slice() else {
            panic!("expected one success, got {outcomes:?}");
        };
        assert!(line.starts_with("us-east1-b--"), "line: {line}");
        assert!(
            line.ends_with("2048 MiB attached to i-1 as persistent-disk-1"),
            "line: {line}"
        );
    }

    #[tokio::test]
    async fn create_without_attachment_asks_for_retry() {
        let connection = connection();
        connection.fail(FailurePoint::AttachDisk);
        let outcomes = execute_ok(
            Command::Create(CreateCommand {
                size_mib: 1024,
                instance: String::from("i-1"),
                tag: String::from("volume-0"),
                machine: Some(String::from("machine-0")),
                disk_type: None,
            }),
            &connection,
        )
        .await;

        let [Outcome::Done(line)] = outcomes.as_slice() else {
            panic!("expected one success, got {outcomes:?}");
        };
        assert!(line.ends_with("not attached; retry with attach"), "line: {line}");
    }

    #[tokio::test]
    async fn destroy_reports_each_volume() {
        let connection = connection();
        connection.add_disk("us-east1-b", "us-east1-b--a", 1);

        let outcomes = execute_ok(
            Command::Destroy(VolumeIdsCommand {
                volume_ids: vec![String::from("us-east1-b--a"), String::from("bogus")],
            }),
            &connection,
        )
        .await;

        let [first, second] = outcomes.as_slice() else {
            panic!("expected two outcomes, got {outcomes:?}");
        };
        assert_eq!(first, &Outcome::Done(String::from("us-east1-b--a destroyed")));
        assert!(
            matches!(second, Outcome::Failed(line) if line.starts_with("bogus: invalid volume id")),
            "outcome: {second:?}"
        );
    }

    #[tokio::test]
    async fn attach_and_detach_round_trip() {
        let connection = connection();
        connection.add_disk("us-east1-b", "us-east1-b--a", 1);

        let attached = execute_ok(
            Command::Attach(AttachCommand {
                volume_id: String::from("us-east1-b--a"),
                instance: String::from("i-1"),
                read_only: true,
            }),
            &connection,
        )
        .await;
        assert_eq!(
            attached,
            vec![Outcome::Done(String::from(
                "us-east1-b--a attached to i-1 as persistent-disk-1 (read-only)"
            ))]
        );

        let detached = execute_ok(
            Command::Detach(DetachCommand {
                volume_id: String::from("us-east1-b--a"),
                instance: String::from("i-1"),
            }),
            &connection,
        )
        .await;
        assert_eq!(
            detached,
            vec![Outcome::Done(String::from("us-east1-b--a detached from i-1"))]
        );
    }

    #[tokio::test]
    async fn describe_failure_fails_the_command() {
        let connection = connection();
        let result = execute(
            Command::Describe(VolumeIdsCommand {
                volume_ids: vec![String::from("bogus")],
            }),
            &source(&connection),
        )
        .await;
        assert!(matches!(result, Err(CliError::Storage(_))), "result: {result:?}");
    }

    #[test]
    fn report_routes_failures_to_stderr() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = report(
            &[
                Outcome::Done(String::from("ok")),
                Outcome::Failed(String::from("bad")),
            ],
            &mut out,
            &mut err,
        );
        assert_eq!(code, 1);
        assert_eq!(String::from_utf8_lossy(&out), "ok\n");
        assert_eq!(String::from_utf8_lossy(&err), "bad\n");
    }

    #[test]
    fn report_succeeds_when_nothing_failed() {
        let mut out = Vec::new();
        let code = report(&[Outcome::Done(String::from("ok"))], &mut out, io::sink());
        assert_eq!(code, 0);
    }
}
