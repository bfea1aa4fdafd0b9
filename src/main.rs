use anyhow::Result;
use desktop_toolkit::{cli, debug, sample};

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let options = match cli::process_cli() {
        cli::CliResult::Exit(code) => {
            if code == 0 {
                return Ok(());
            }
            std::process::exit(code);
        }
        cli::CliResult::Continue(options) => options,
    };
    // Routes all log::info!() etc. to the debug log file.
    // CLI --log-level takes precedence, then RUST_LOG, then config (applied below).
    debug::init_log_bridge(options.log_level);

    log::info!("Starting desktop-toolkit demo v{}", desktop_toolkit::VERSION);

    let config = cli::load_config(options.config_path.as_deref())?;
    debug::apply_config_level(config.log_level.to_level_filter());

    log::info!(
        "Running headless {} sample: {} worker(s) x {} task(s)",
        options.platform,
        options.workers,
        options.tasks
    );
    let report = sample::run_sample(options.platform, &config, options.workers, options.tasks)?;
    print!("{report}");

    log::info!("Demo finished in {:?}", report.elapsed);
    Ok(())
}
