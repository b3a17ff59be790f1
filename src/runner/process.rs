//! Invocation of the speedtest executable as a child process

use super::{tool_args, ToolRunner};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Runs `speedtest-cli --server <id>` and captures its stdout
#[derive(Debug, Clone)]
pub struct SpeedtestCli {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl SpeedtestCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kill runs that take longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ToolRunner for SpeedtestCli {
    fn program(&self) -> String {
        self.program.display().to_string()
    }

    async fn run(&self, server_id: &str, run: usize) -> Result<String> {
        let child = Command::new(&self.program)
            .args(tool_args(server_id))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::external_tool(format!(
                "Run {}: failed to start {}: {}",
                run,
                self.program.display(),
                e
            )))?;

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| AppError::external_tool(format!(
                    "Run {}: {} did not finish within {}s",
                    run,
                    self.program.display(),
                    limit.as_secs()
                )))?,
            None => child.wait_with_output().await,
        }
        .map_err(|e| AppError::external_tool(format!("Run {}: failed to collect output: {}", run, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let first_line = stderr.lines().map(str::trim).find(|l| !l.is_empty());
            let mut message = format!("Run {}: {} {}", run, self.program.display(), describe_status(&output.status));
            if let Some(line) = first_line {
                message.push_str(&format!(": {}", line));
            }
            return Err(AppError::external_tool(message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn describe_status(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exited with status {}", code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("was killed by signal {}", signal);
        }
    }

    "terminated abnormally".to_string()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::TempDir;

    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("speedtest-cli");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_captures_stdout_and_passes_server() {
        let dir = TempDir::new().unwrap();
        let tool = script(dir.path(), r#"echo "args: $1 $2"; echo "Download: 12.5 Mbit/s""#);

        let output = SpeedtestCli::new(tool).run("4711", 1).await.unwrap();
        assert!(output.contains("args: --server 4711"));
        assert!(output.contains("Download: 12.5 Mbit/s"));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_external_tool_error() {
        let dir = TempDir::new().unwrap();
        let tool = script(dir.path(), "echo 'Cannot retrieve speedtest configuration' >&2; exit 1");

        let err = SpeedtestCli::new(tool).run("1", 2).await.unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, AppError::ExternalTool(_)));
        assert!(message.contains("Run 2"));
        assert!(message.contains("exited with status 1"));
        assert!(message.contains("Cannot retrieve speedtest configuration"));
    }

    #[tokio::test]
    async fn test_missing_program_is_external_tool_error() {
        let err = SpeedtestCli::new("/nonexistent/speedtest-cli").run("1", 1).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalTool(_)));
    }

    #[tokio::test]
    async fn test_timeout_kills_hung_tool() {
        let dir = TempDir::new().unwrap();
        let tool = script(dir.path(), "sleep 30");

        let err = SpeedtestCli::new(tool)
            .with_timeout(Some(Duration::from_secs(1)))
            .run("1", 1)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("did not finish within 1s"));
    }
}
