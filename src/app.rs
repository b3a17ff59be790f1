//! Main application orchestration and execution

use crate::{
    config::{display_config_summary, validate_config, ValidationLevel},
    error::{AppError, Result},
    log_debug, log_info,
    logging::{Logger, LoggerFactory},
    models::{Config, Report},
    output::{OutputCoordinator, ReportDestination},
    runner::{MeasurementRunner, SpeedtestCli, ToolLocator, ToolRunner},
    server::{BestServerLookup, ServerSelector, SpeedtestNetLookup},
};
use chrono::Local;

/// Main application struct that coordinates all components
pub struct App {
    config: Config,
    loggers: LoggerFactory,
}

impl App {
    /// Create a new application instance from a validated configuration
    pub fn new(config: Config) -> Self {
        let loggers = LoggerFactory::new(config.clone());
        Self { config, loggers }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run with the real speedtest.net lookup and the installed speedtest-cli
    pub async fn run(&self) -> Result<Report> {
        let logger = self.loggers.create_logger("APP").await;
        log_debug!(logger, "{} v{} session {}", crate::PKG_NAME, crate::VERSION, self.loggers.session_id());

        if self.config.debug {
            log_debug!(logger, "Configuration: {}", display_config_summary(&self.config).replace('\n', ", "));
        }

        let result = async {
            self.preflight(&logger).await?;
            self.run_installed(&logger).await
        }
        .await;
        if let Err(ref e) = result {
            let errors = self.loggers.create_error_logger().await;
            errors.log_error(e, Some("Measurement batch aborted")).await;
        }
        result
    }

    /// Surface configuration warnings; an error-level finding stops before any run
    async fn preflight(&self, logger: &Logger) -> Result<()> {
        for warning in validate_config(&self.config)? {
            match warning.level {
                ValidationLevel::Info => log_info!(logger, "{}", warning.message),
                ValidationLevel::Warning => eprintln!("{}", warning.format(self.config.enable_color)),
                ValidationLevel::Error => return Err(AppError::validation(warning.message)),
            }
        }
        Ok(())
    }

    async fn run_installed(&self, logger: &Logger) -> Result<Report> {
        let lookup = SpeedtestNetLookup::with_config(
            self.config.servers_url.clone(),
            crate::defaults::DEFAULT_CANDIDATE_LIMIT,
            crate::defaults::LOOKUP_TIMEOUT,
            self.config.verbose,
        )?;

        let location = ToolLocator::from_env(self.config.tool_path.clone()).locate()?;
        log_info!(logger, "Using {} ({})", location.path.display(), location.source);
        let tool = SpeedtestCli::new(location.path).with_timeout(self.config.timeout());

        self.run_pipeline(&lookup, &tool).await
    }

    /// Select a server, run every measurement, aggregate and emit the report.
    ///
    /// Nothing is emitted unless every run succeeded.
    pub async fn run_pipeline(
        &self,
        lookup: &dyn BestServerLookup,
        tool: &dyn ToolRunner,
    ) -> Result<Report> {
        let logger = self.loggers.create_logger("APP").await;

        let server = ServerSelector::new(lookup)
            .select(self.config.server.as_deref())
            .await?;
        log_info!(logger, "Measuring against {}", server.describe());

        let run_logger = self.loggers.create_run_logger().await;
        let measurements = MeasurementRunner::new(tool, &run_logger)
            .run_all(&server.id, self.config.runs)
            .await?;

        let report = Report::new(Local::now(), server.id, measurements, self.config.drop_outliers)?;

        let coordinator = OutputCoordinator::from_config(&self.config);
        coordinator.emit(&report)?;
        if let ReportDestination::File(path) = coordinator.destination() {
            log_info!(logger, "Appended results to {}", path.display());
        }

        Ok(report)
    }
}
