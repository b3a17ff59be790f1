//! Repeated execution of the speedtest tool
//!
//! This module contains:
//! - executable resolution (`ToolLocator`)
//! - a single-run abstraction over the external tool (`ToolRunner`)
//! - the sequential batch driver (`MeasurementRunner`)

pub mod locator;
pub mod process;

pub use locator::{ToolLocation, ToolLocator, ToolSource};
pub use process::SpeedtestCli;

use crate::{
    error::{AppError, Result},
    logging::RunLogger,
    models::MeasurementSet,
    parser,
};
use async_trait::async_trait;
use std::time::Instant;

/// Arguments passed to the tool for one run
pub fn tool_args(server_id: &str) -> Vec<String> {
    vec!["--server".to_string(), server_id.to_string()]
}

/// One invocation of the external measurement tool
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Program name used in log lines
    fn program(&self) -> String;

    /// Run the tool once against `server_id` and return its captured stdout.
    /// `run` is the 1-based run number and only used in error messages.
    async fn run(&self, server_id: &str, run: usize) -> Result<String>;
}

/// Runs the tool `runs` times, one after another
pub struct MeasurementRunner<'a> {
    tool: &'a dyn ToolRunner,
    logger: &'a RunLogger,
}

impl<'a> MeasurementRunner<'a> {
    pub fn new(tool: &'a dyn ToolRunner, logger: &'a RunLogger) -> Self {
        Self { tool, logger }
    }

    /// Execute every run and parse it as soon as it finishes.
    ///
    /// The first failing run aborts the batch; nothing from earlier runs is kept.
    pub async fn run_all(&self, server_id: &str, runs: u32) -> Result<MeasurementSet> {
        if runs == 0 {
            return Err(AppError::validation("Number of runs must be at least 1"));
        }

        let total = runs as usize;
        let mut set = MeasurementSet::with_capacity(total);

        for run in 1..=total {
            self.logger.log_run_start(run, total, server_id).await;
            self.logger.log_invocation(&self.tool.program(), &tool_args(server_id)).await;

            let started = Instant::now();
            let output = self.tool.run(server_id, run).await?;
            self.logger.log_raw_output(run, &output).await;

            let result = parser::parse_run(&output, run)?;
            self.logger.log_run_result(run, &result, started.elapsed()).await;
            set.push(result);
        }

        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Config, Direction};
    use std::sync::Mutex;

    /// Replays canned outputs in order and records the server ids it saw
    struct ScriptedTool {
        outputs: Vec<Result<String>>,
        calls: Mutex<Vec<(String, usize)>>,
    }

    impl ScriptedTool {
        fn new(outputs: Vec<Result<String>>) -> Self {
            Self { outputs, calls: Mutex::new(Vec::new()) }
        }

        fn calls(&self) -> Vec<(String, usize)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ToolRunner for ScriptedTool {
        fn program(&self) -> String {
            "scripted".to_string()
        }

        async fn run(&self, server_id: &str, run: usize) -> Result<String> {
            self.calls.lock().unwrap().push((server_id.to_string(), run));
            match self.outputs.get(run - 1) {
                Some(Ok(output)) => Ok(output.clone()),
                Some(Err(e)) => Err(AppError::external_tool(e.to_string())),
                None => Err(AppError::internal("no scripted output")),
            }
        }
    }

    fn output(download: f64, upload: f64) -> Result<String> {
        Ok(format!(
            "Retrieving speedtest.net configuration...\n\
             Testing download speed...\n\
             Download: {:.2} Mbit/s\n\
             Testing upload speed...\n\
             Upload: {:.2} Mbit/s\n",
            download, upload
        ))
    }

    fn quiet_logger() -> RunLogger {
        RunLogger::new(&Config::default())
    }

    #[tokio::test]
    async fn test_collects_every_run_in_order() {
        let tool = ScriptedTool::new(vec![output(10.0, 1.0), output(20.0, 2.0), output(30.0, 3.0)]);
        let logger = quiet_logger();

        let set = MeasurementRunner::new(&tool, &logger).run_all("4711", 3).await.unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.values(Direction::Download), &[10.0, 20.0, 30.0]);
        assert_eq!(set.values(Direction::Upload), &[1.0, 2.0, 3.0]);
        assert_eq!(
            tool.calls(),
            vec![("4711".to_string(), 1), ("4711".to_string(), 2), ("4711".to_string(), 3)]
        );
    }

    #[tokio::test]
    async fn test_tool_failure_stops_batch() {
        let tool = ScriptedTool::new(vec![
            output(10.0, 1.0),
            Err(AppError::external_tool("exited with status 1")),
            output(30.0, 3.0),
        ]);
        let logger = quiet_logger();

        let err = MeasurementRunner::new(&tool, &logger).run_all("1", 3).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalTool(_)));
        assert_eq!(tool.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_unparseable_run_stops_batch_immediately() {
        let tool = ScriptedTool::new(vec![
            Ok("Download: 10.00 Mbit/s\n".to_string()),
            output(20.0, 2.0),
        ]);
        let logger = quiet_logger();

        let err = MeasurementRunner::new(&tool, &logger).run_all("1", 2).await.unwrap_err();
        match err {
            AppError::Parse { run, label, .. } => {
                assert_eq!(run, 1);
                assert_eq!(label, "Upload:");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(tool.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_runs_rejected() {
        let tool = ScriptedTool::new(vec![]);
        let logger = quiet_logger();

        let err = MeasurementRunner::new(&tool, &logger).run_all("1", 0).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(tool.calls().is_empty());
    }

    #[test]
    fn test_tool_args() {
        assert_eq!(tool_args("4711"), vec!["--server", "4711"]);
    }
}
