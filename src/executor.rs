use crate::command::{build_command, TransferOptions};
use anyhow::{Context, Result};
use log::trace;
use std::{
    os::unix::process::ExitStatusExt,
    path::Path,
    process::{Command, ExitStatus},
};

/// Runs one transfer and reports the exit code of the transfer tool.
pub trait TransferExecutor {
    fn execute(
        &mut self,
        source: &Path,
        host: &str,
        remote_path: &str,
        options: &TransferOptions,
    ) -> Result<i32>;
}

/// Hands the rsync command line to `sh -c` and waits for it.
pub struct ShellExecutor;

impl TransferExecutor for ShellExecutor {
    fn execute(
        &mut self,
        source: &Path,
        host: &str,
        remote_path: &str,
        options: &TransferOptions,
    ) -> Result<i32> {
        let command = build_command(source, host, remote_path, options);
        run_shell(&command)
    }
}

fn run_shell(command: &str) -> Result<i32> {
    let status = os_shell()
        .arg(command)
        .status()
        .context("spawn shell")?;
    trace!("shell exited with {status}");

    Ok(exit_code(status))
}

fn exit_code(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => -1,
    }
}

fn os_shell() -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c");
    cmd
}
