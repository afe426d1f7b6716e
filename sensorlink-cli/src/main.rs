//! sensorlink CLI - Command-line interface
//!
//! This binary runs the sensorlink sensor service against a line-delimited
//! JSON channel and provides diagnostics for its inputs.

mod commands;
mod error;
mod line_channel;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::gpsd::GpsdArgs;
use commands::run::RunArgs;

#[derive(Parser)]
#[command(name = "sensorlink")]
#[command(version = sensorlink::VERSION)]
#[command(about = "Sensor channel service: driving status, night mode and GPS location", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the sensor channel over stdin/stdout (one JSON message per line)
    Run {
        /// Config file (default: ~/.sensorlink/config.ini)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Debug logging, mirrored to stderr
        #[arg(long)]
        debug: bool,
    },

    /// Print the service discovery entry as JSON
    Features,

    /// Connect to gpsd and print the location events it would produce
    Gpsd {
        /// Config file (default: ~/.sensorlink/config.ini)
        #[arg(long)]
        config: Option<PathBuf>,

        /// gpsd host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// gpsd port (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// How long to watch
        #[arg(long, default_value = "10")]
        seconds: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, debug } => commands::run::run(RunArgs { config, debug }),
        Commands::Features => commands::features::run(),
        Commands::Gpsd {
            config,
            host,
            port,
            seconds,
        } => commands::gpsd::run(GpsdArgs {
            config,
            host,
            port,
            seconds,
        }),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from(["sensorlink", "run", "--config", "/etc/s.ini", "--debug"])
            .unwrap();
        match cli.command {
            Commands::Run { config, debug } => {
                assert_eq!(config, Some(PathBuf::from("/etc/s.ini")));
                assert!(debug);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_gpsd_defaults() {
        let cli = Cli::try_parse_from(["sensorlink", "gpsd", "--port", "3000"]).unwrap();
        match cli.command {
            Commands::Gpsd {
                host,
                port,
                seconds,
                ..
            } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(3000));
                assert_eq!(seconds, 10);
            }
            _ => panic!("expected gpsd"),
        }
    }

    #[test]
    fn test_command_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
