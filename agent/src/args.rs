//! CLI argument parsing, ported from `zensight_bridge_framework::BridgeArgs`.

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for the device farm agent.
#[derive(Parser, Debug, Clone)]
#[command(about = "SNMP device farm agent")]
pub struct AgentArgs {
    /// Path to configuration file.
    #[arg(short, long)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl AgentArgs {
    /// Parse CLI arguments, defaulting `--config` to `default_config` if
    /// not supplied.
    pub fn parse_with_default(default_config: &'static str) -> Self {
        let matches = <Self as clap::CommandFactory>::command()
            .mut_arg("config", |arg| arg.default_value(default_config))
            .get_matches();

        <Self as clap::FromArgMatches>::from_arg_matches(&matches)
            .expect("failed to parse arguments")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_hold_supplied_values() {
        let args = AgentArgs {
            config: PathBuf::from("devsim.json5"),
            log_level: Some("debug".to_string()),
        };
        assert_eq!(args.config, PathBuf::from("devsim.json5"));
        assert_eq!(args.log_level, Some("debug".to_string()));
    }
}
