//! Debug logging for desktop-toolkit.
//!
//! `init_log_bridge` installs a `log::Log` implementation that routes every
//! `log::info!()`, `log::warn!()` etc. to `<temp>/desktop_toolkit_debug.log`.
//! When `RUST_LOG` is set, lines are mirrored to stderr as well.
//!
//! Level precedence: `--log-level` on the command line, then `RUST_LOG`, then
//! the `log_level` config key (applied later through [`apply_config_level`]).

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record};

/// Shared logger state
struct DebugLogger {
    file: Option<File>,
    mirror_stderr: bool,
}

impl DebugLogger {
    fn new(level: LevelFilter, mirror_stderr: bool) -> Self {
        let file = match OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(log_path())
        {
            Ok(f) => Some(f),
            // Logging must never take the application down
            Err(_) => None,
        };

        let mut logger = DebugLogger {
            file,
            mirror_stderr: false,
        };
        logger.write_line(&format!(
            "\n{}\ndesktop-toolkit debug session started at {} (level={})\n{}",
            "=".repeat(80),
            get_timestamp(),
            level,
            "=".repeat(80)
        ));
        logger.mirror_stderr = mirror_stderr;
        logger
    }

    fn write_line(&mut self, line: &str) {
        if let Some(ref mut file) = self.file {
            let _ = writeln!(file, "{}", line);
            let _ = file.flush();
        }
        if self.mirror_stderr {
            eprintln!("{}", line);
        }
    }
}

static LOGGER: OnceLock<Mutex<DebugLogger>> = OnceLock::new();

/// Set once the level came from the CLI or `RUST_LOG`, so config cannot
/// override it.
static LEVEL_PINNED: AtomicBool = AtomicBool::new(false);

struct LogBridge;

static BRIDGE: LogBridge = LogBridge;

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(logger) = LOGGER.get() {
            let line = format!(
                "[{}] [{:<5}] [{}] {}",
                get_timestamp(),
                record.level(),
                record.target(),
                record.args()
            );
            logger.lock().write_line(&line);
        }
    }

    fn flush(&self) {
        if let Some(logger) = LOGGER.get() {
            let mut logger = logger.lock();
            if let Some(ref mut file) = logger.file {
                let _ = file.flush();
            }
        }
    }
}

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Location of the debug log file.
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("desktop_toolkit_debug.log")
}

/// Parse a `RUST_LOG` value. Accepts a bare level (`debug`) or the level of
/// the last `target=level` directive.
pub fn parse_rust_log(value: &str) -> Option<LevelFilter> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    LevelFilter::from_str(value).ok().or_else(|| {
        value
            .rsplit(',')
            .find_map(|directive| directive.rsplit_once('='))
            .and_then(|(_, level)| LevelFilter::from_str(level.trim()).ok())
    })
}

/// Pick the effective startup level. `None` means no level was pinned and the
/// config value decides later.
pub fn resolve_level(cli: Option<LevelFilter>, rust_log: Option<&str>) -> Option<LevelFilter> {
    cli.or_else(|| rust_log.and_then(parse_rust_log))
}

/// Install the log bridge. Safe to call more than once; later calls only
/// adjust the level.
pub fn init_log_bridge(cli_level: Option<LevelFilter>) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let pinned = resolve_level(cli_level, rust_log.as_deref());
    let level = pinned.unwrap_or(LevelFilter::Info);

    LOGGER.get_or_init(|| Mutex::new(DebugLogger::new(level, rust_log.is_some())));
    // Already installed by an earlier call
    let _ = log::set_logger(&BRIDGE);
    log::set_max_level(level);
    LEVEL_PINNED.store(pinned.is_some(), Ordering::SeqCst);
}

/// Apply the level from the config file unless the CLI or `RUST_LOG`
/// already chose one. Returns whether the level changed.
pub fn apply_config_level(level: LevelFilter) -> bool {
    if LEVEL_PINNED.load(Ordering::SeqCst) {
        return false;
    }
    log::set_max_level(level);
    true
}
