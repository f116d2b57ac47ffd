use crate::{
    command::{build_command, TransferOptions},
    config::{Configuration, Target},
    executor::TransferExecutor,
};
use anyhow::Result;
use log::{debug, info, warn};
use std::{collections::BTreeSet, fmt::Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    FullySynced,
    NotFullySynced,
}

impl Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            SyncOutcome::FullySynced => "all hosts fully synced",
            SyncOutcome::NotFullySynced => "not all hosts were fully synced",
        }
        .fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostResult {
    pub host: String,
    pub exit_code: i32,
}

impl HostResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub results: Vec<HostResult>,
}

impl SyncReport {
    /// Fully synced iff the exit codes collapse to exactly `{0}`.
    pub fn outcome(&self) -> SyncOutcome {
        let codes: BTreeSet<i32> = self.results.iter().map(|r| r.exit_code).collect();
        if codes == BTreeSet::from([0]) {
            SyncOutcome::FullySynced
        } else {
            SyncOutcome::NotFullySynced
        }
    }
}

pub fn run_one(
    executor: &mut dyn TransferExecutor,
    target: &Target,
    options: &TransferOptions,
) -> Result<i32> {
    info!(
        "{}",
        build_command(&target.source, &target.host, &target.remote_path, options)
    );

    let code = executor.execute(&target.source, &target.host, &target.remote_path, options)?;
    if code == 0 {
        info!("synced code to {}", target.host);
    } else {
        warn!("failed to sync code to {} (exit code {code})", target.host);
    }

    Ok(code)
}

pub fn run_batch(
    executor: &mut dyn TransferExecutor,
    targets: &[Target],
    options: &TransferOptions,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();
    for target in targets {
        let exit_code = run_one(executor, target, options)?;
        report.results.push(HostResult {
            host: target.host.to_owned(),
            exit_code,
        });
    }

    let failed = report.results.iter().filter(|r| !r.succeeded()).count();
    debug!("{failed} of {} hosts failed", report.results.len());

    match report.outcome() {
        outcome @ SyncOutcome::FullySynced => info!("{outcome}"),
        outcome @ SyncOutcome::NotFullySynced => warn!("{outcome}"),
    }

    Ok(report)
}

/// Syncs every target of `group`, provided the first target's source exists.
///
/// Returns `None` when nothing was transferred.
pub fn sync_group(
    config: &Configuration,
    group: &str,
    executor: &mut dyn TransferExecutor,
    options: &TransferOptions,
) -> Result<Option<SyncReport>> {
    let targets = config.group(group)?;

    let Some(first) = targets.first() else {
        info!("no targets in group {group:?}");
        return Ok(None);
    };

    if !first.source.exists() {
        info!("source folder {:?} not found", first.source);
        return Ok(None);
    }

    run_batch(executor, targets, options).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        collections::HashMap,
        path::{Path, PathBuf},
    };
    use tempdir::TempDir;

    /// Records every call and answers with a preset exit code per host.
    #[derive(Default)]
    struct FakeExecutor {
        codes: HashMap<String, i32>,
        calls: Vec<(PathBuf, String, String, TransferOptions)>,
    }

    impl FakeExecutor {
        fn with_codes(codes: &[(&str, i32)]) -> Self {
            Self {
                codes: codes.iter().map(|(h, c)| (h.to_string(), *c)).collect(),
                calls: Vec::new(),
            }
        }
    }

    impl TransferExecutor for FakeExecutor {
        fn execute(
            &mut self,
            source: &Path,
            host: &str,
            remote_path: &str,
            options: &TransferOptions,
        ) -> Result<i32> {
            self.calls.push((
                source.to_path_buf(),
                host.to_owned(),
                remote_path.to_owned(),
                options.to_owned(),
            ));
            Ok(self.codes.get(host).copied().unwrap_or(0))
        }
    }

    fn target(source: &Path, host: &str) -> Target {
        Target {
            source: source.to_path_buf(),
            host: host.to_owned(),
            remote_path: "/home/ubuntu".to_owned(),
        }
    }

    fn config_with(group: &str, targets: Vec<Target>) -> Configuration {
        let mut config = Configuration::default();
        config.groups.insert(group.to_owned(), targets);
        config
    }

    #[test]
    fn should_return_executor_exit_code() -> Result<()> {
        let mut executor = FakeExecutor::with_codes(&[("u@bad", 12)]);
        let options = TransferOptions::default();

        assert_eq!(run_one(&mut executor, &target(Path::new("/src"), "u@ok"), &options)?, 0);
        assert_eq!(run_one(&mut executor, &target(Path::new("/src"), "u@bad"), &options)?, 12);
        assert_eq!(executor.calls.len(), 2);

        Ok(())
    }

    #[test]
    fn should_be_fully_synced_when_every_host_succeeds() -> Result<()> {
        let mut executor = FakeExecutor::default();
        let targets = vec![target(Path::new("/src"), "u@a"), target(Path::new("/src"), "u@b")];

        let report = run_batch(&mut executor, &targets, &TransferOptions::default())?;

        assert_eq!(report.outcome(), SyncOutcome::FullySynced);
        assert_eq!(executor.calls.len(), 2);
        assert_eq!(executor.calls[0].1, "u@a");
        assert_eq!(executor.calls[1].1, "u@b");

        Ok(())
    }

    #[test]
    fn should_record_each_host_when_one_fails() -> Result<()> {
        let mut executor = FakeExecutor::with_codes(&[("u@b", 23)]);
        let targets = vec![target(Path::new("/src"), "u@a"), target(Path::new("/src"), "u@b")];

        let report = run_batch(&mut executor, &targets, &TransferOptions::default())?;

        assert_eq!(report.outcome(), SyncOutcome::NotFullySynced);
        assert_eq!(
            report.results,
            vec![
                HostResult {
                    host: "u@a".to_owned(),
                    exit_code: 0
                },
                HostResult {
                    host: "u@b".to_owned(),
                    exit_code: 23
                },
            ]
        );
        assert!(report.results[0].succeeded());
        assert!(!report.results[1].succeeded());

        Ok(())
    }

    #[test]
    fn should_not_be_fully_synced_when_empty() {
        assert_eq!(SyncReport::default().outcome(), SyncOutcome::NotFullySynced);
    }

    #[test]
    fn should_pass_options_through_to_executor() -> Result<()> {
        let mut executor = FakeExecutor::default();
        let options = TransferOptions {
            proxy_command: Some("nc %h %p".to_owned()),
            ..TransferOptions::default()
        };

        run_batch(&mut executor, &[target(Path::new("/src"), "u@a")], &options)?;
        assert_eq!(executor.calls[0].3, options);
        assert_eq!(executor.calls[0].2, "/home/ubuntu");

        Ok(())
    }

    #[test]
    fn should_skip_everything_when_source_is_missing() -> Result<()> {
        let dir = TempDir::new("sync")?;
        let missing = dir.path().join("missing");
        let config = config_with("mark", vec![target(&missing, "u@a"), target(dir.path(), "u@b")]);
        let mut executor = FakeExecutor::default();

        let report = sync_group(&config, "mark", &mut executor, &TransferOptions::default())?;

        assert_eq!(report, None);
        assert!(executor.calls.is_empty());

        Ok(())
    }

    #[test]
    fn should_sync_group_when_source_exists() -> Result<()> {
        let dir = TempDir::new("sync")?;
        let config = config_with("mark", vec![target(dir.path(), "u@a"), target(dir.path(), "u@b")]);
        let mut executor = FakeExecutor::default();

        let report = sync_group(&config, "mark", &mut executor, &TransferOptions::default())?
            .expect("batch should run");

        assert_eq!(report.outcome(), SyncOutcome::FullySynced);
        assert_eq!(executor.calls.len(), 2);
        assert_eq!(executor.calls[0].0, dir.path());

        Ok(())
    }

    #[test]
    fn should_skip_empty_group() -> Result<()> {
        let config = config_with("mark", Vec::new());
        let mut executor = FakeExecutor::default();

        assert_eq!(
            sync_group(&config, "mark", &mut executor, &TransferOptions::default())?,
            None
        );
        assert!(executor.calls.is_empty());

        Ok(())
    }

    #[test]
    fn should_fail_on_unknown_group() {
        let mut executor = FakeExecutor::default();

        let result = sync_group(
            &Configuration::default(),
            "mark",
            &mut executor,
            &TransferOptions::default(),
        );
        assert!(result.is_err());
        assert!(executor.calls.is_empty());
    }
}
