#[cfg_attr(not(windows), allow(dead_code))]
mod cli;

use anyhow::Result;
use remote_cmdline::config::{load_config, validate_config, Config, ConfigLoader};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn load(args: &cli::Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::new(path).load()?,
        None => load_config()?,
    };
    args.apply(&mut config);
    validate_config(&config)?;
    Ok(config)
}

fn main() -> Result<()> {
    let args: cli::Args = argh::from_env();
    let config = load(&args)?;

    // Logs go to stderr so stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting remote-cmdline v{}", env!("CARGO_PKG_VERSION"));
    info!("Architecture: {}", std::env::consts::ARCH);

    #[cfg(not(windows))]
    {
        anyhow::bail!("remote-cmdline only supports Windows platform");
    }

    #[cfg(windows)]
    {
        if !windows_run::run(args.pids, &config)? {
            std::process::exit(1);
        }
        Ok(())
    }
}

#[cfg(windows)]
mod windows_run {
    use crate::cli;
    use anyhow::Result;
    use remote_cmdline::config::Config;
    use remote_cmdline::process::ProcessHandle;
    use remote_cmdline::windows::NtApi;
    use remote_cmdline::{extract_batch, BatchReport, CommandLineExtractor, ProcessId};
    use std::time::Duration;
    use tracing::{debug, error};

    /// Extract and print every pid; `Ok(false)` when any extraction failed
    pub fn run(pids: Vec<ProcessId>, config: &Config) -> Result<bool> {
        let timeout = Duration::from_millis(config.extraction.timeout_ms);
        let worker_threads = config.extraction.worker_threads;

        let entries = cli::run_with_deadline(timeout, move || {
            extract_batch(&pids, worker_threads, |pid| {
                let handle = ProcessHandle::open_for_query(pid)?;
                debug!(%handle, "extracting");
                let api = NtApi::system();
                CommandLineExtractor::new(&api).extract_parameters(handle.raw())
            })
        })??;

        let reports: Vec<BatchReport> = entries
            .iter()
            .map(|entry| {
                BatchReport::from_entry(
                    entry,
                    config.extraction.include_image_path,
                    config.output.split_arguments,
                )
            })
            .collect();

        for report in &reports {
            if let Some(message) = &report.error {
                error!(pid = report.pid, "{}", message);
            }
        }

        if config.output.is_json() {
            println!("{}", cli::render_json(&reports)?);
        } else {
            for line in reports.iter().filter_map(cli::render_text) {
                println!("{}", line);
            }
        }

        Ok(reports.iter().all(|report| report.error.is_none()))
    }
}
