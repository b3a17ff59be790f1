//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Config,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    ///
    /// Precedence, lowest first: defaults, `.env`, process environment, CLI.
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        self.load_env_file()?;

        if self.cli.debug {
            for warning in EnvManager::validate_current_env() {
                eprintln!("[CONFIG] {}", warning);
            }
        }

        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Load .env file if it exists
    fn load_env_file(&self) -> Result<()> {
        EnvManager::load_env_file(self.cli.debug)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(ref server) = self.cli.server {
            config.server = Some(server.clone());
        }

        if let Some(runs) = self.cli.runs {
            config.runs = runs;
        }

        if self.cli.drop_outliers {
            config.drop_outliers = true;
        } else if self.cli.no_drop_outliers {
            config.drop_outliers = false;
        }

        if let Some(ref outfile) = self.cli.outfile {
            config.outfile = Some(outfile.clone());
        }

        if let Some(ref tool) = self.cli.tool {
            config.tool_path = Some(tool.clone());
        }

        if let Some(timeout) = self.cli.timeout {
            config.timeout_seconds = Some(timeout);
        }

        if !self.cli.use_colors() {
            config.enable_color = false;
        }

        // CLI-only flags
        config.verbose = self.cli.verbose || self.cli.debug;
        config.debug = self.cli.debug;

        if config.debug {
            eprintln!("[CONFIG] Applied CLI overrides to configuration");
            eprintln!("[CONFIG] {}", display_config_summary(config).replace('\n', ", "));
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!(
        "Server: {}",
        config.server.as_deref().unwrap_or("auto")
    ));
    summary.push(format!("Runs: {}", config.runs));
    summary.push(format!("Drop outliers: {}", config.drop_outliers));
    summary.push(format!(
        "Output: {}",
        config
            .outfile
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string())
    ));
    summary.push(format!(
        "Tool: {}",
        config
            .tool_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "auto".to_string())
    ));
    summary.push(format!(
        "Timeout: {}",
        config
            .timeout_seconds
            .map(|s| format!("{}s", s))
            .unwrap_or_else(|| "none".to_string())
    ));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
