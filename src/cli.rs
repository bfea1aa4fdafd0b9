//! Command-line interface for desktop-toolkit.
//!
//! This module handles CLI argument parsing for the headless demo and the
//! informational subcommands.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use desktop_toolkit_config::{Config, ConfigError};
use desktop_toolkit_events::{Platform, linux, macos, win32};

/// desktop-toolkit - main-thread dispatch and typed native events, headless demo
#[derive(Parser, Debug)]
#[command(name = "desktop-toolkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Event taxonomy to run the demo with (defaults to the host platform)
    #[arg(long, value_enum, value_name = "PLATFORM", global = true)]
    pub platform: Option<PlatformArg>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set debug log level (overrides config and RUST_LOG)
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Number of worker threads submitting work to the main thread
    #[arg(long, value_name = "N", default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
    pub workers: u32,

    /// Work items each worker submits
    #[arg(long, value_name = "N", default_value_t = 100)]
    pub tasks: u32,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the effective configuration as YAML
    PrintConfig,

    /// List the native event tags of a platform
    ListEvents,
}

/// Platform argument for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PlatformArg {
    Macos,
    Linux,
    Win32,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Macos => Platform::Macos,
            PlatformArg::Linux => Platform::Linux,
            PlatformArg::Win32 => Platform::Win32,
        }
    }
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Runtime options passed from CLI to the demo
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub platform: Platform,
    /// Explicit config file, `None` for the default location
    pub config_path: Option<PathBuf>,
    /// Log level from `--log-level`
    pub log_level: Option<log::LevelFilter>,
    pub workers: usize,
    pub tasks: usize,
}

impl From<&Cli> for RuntimeOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            platform: cli
                .platform
                .map(Platform::from)
                .or_else(Platform::current)
                .unwrap_or(Platform::Linux),
            config_path: cli.config.clone(),
            log_level: cli.log_level.map(LogLevelArg::to_level_filter),
            workers: cli.workers as usize,
            tasks: cli.tasks as usize,
        }
    }
}

/// Result of CLI processing
pub enum CliResult {
    /// Continue with the demo run
    Continue(RuntimeOptions),
    /// Exit with the given code (subcommand completed)
    Exit(i32),
}

/// Process CLI arguments and handle subcommands
pub fn process_cli() -> CliResult {
    let cli = Cli::parse();
    let options = RuntimeOptions::from(&cli);

    match cli.command {
        Some(Commands::PrintConfig) => match load_config(options.config_path.as_deref()) {
            Ok(config) => match serde_yaml_ng::to_string(&config) {
                Ok(yaml) => {
                    print!("{yaml}");
                    CliResult::Exit(0)
                }
                Err(e) => {
                    eprintln!("desktop-toolkit: error: {e}");
                    CliResult::Exit(1)
                }
            },
            Err(e) => {
                eprintln!("desktop-toolkit: error: {e}");
                CliResult::Exit(1)
            }
        },
        Some(Commands::ListEvents) => {
            println!("{} native event tags:", options.platform);
            for (tag, name) in event_tag_table(options.platform) {
                println!("{tag:>4}  {name}");
            }
            CliResult::Exit(0)
        }
        None => CliResult::Continue(options),
    }
}

/// Load the config from `path`, or from the default location (created with
/// defaults when missing).
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Native tag number and variant name of every event of `platform`.
pub fn event_tag_table(platform: Platform) -> Vec<(u32, &'static str)> {
    match platform {
        Platform::Macos => macos::EventTag::ALL
            .iter()
            .map(|tag| (u32::from(*tag), tag.name()))
            .collect(),
        Platform::Linux => linux::EventTag::ALL
            .iter()
            .map(|tag| (u32::from(*tag), tag.name()))
            .collect(),
        Platform::Win32 => win32::EventTag::ALL
            .iter()
            .map(|tag| (u32::from(*tag), tag.name()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["desktop-toolkit"]).unwrap();
        let options = RuntimeOptions::from(&cli);
        assert_eq!(options.workers, 4);
        assert_eq!(options.tasks, 100);
        assert_eq!(options.log_level, None);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_explicit_arguments() {
        let cli = Cli::try_parse_from([
            "desktop-toolkit",
            "--platform",
            "win32",
            "--log-level",
            "debug",
            "--workers",
            "2",
            "--tasks",
            "7",
        ])
        .unwrap();
        let options = RuntimeOptions::from(&cli);
        assert_eq!(options.platform, Platform::Win32);
        assert_eq!(options.log_level, Some(log::LevelFilter::Debug));
        assert_eq!((options.workers, options.tasks), (2, 7));
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(Cli::try_parse_from(["desktop-toolkit", "--workers", "0"]).is_err());
    }

    #[test]
    fn test_subcommand_accepts_global_platform() {
        let cli =
            Cli::try_parse_from(["desktop-toolkit", "list-events", "--platform", "macos"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::ListEvents)));
        assert_eq!(cli.platform, Some(PlatformArg::Macos));
    }

    #[test]
    fn test_event_tag_tables_are_dense() {
        for (platform, count) in [
            (Platform::Macos, 18),
            (Platform::Linux, 29),
            (Platform::Win32, 20),
        ] {
            let table = event_tag_table(platform);
            assert_eq!(table.len(), count, "{platform}");
            for (index, (tag, _)) in table.iter().enumerate() {
                assert_eq!(*tag as usize, index);
            }
        }
    }
}
