//! Command line arguments and output rendering

use anyhow::{bail, Result};
use argh::FromArgs;
use remote_cmdline::config::Config;
use remote_cmdline::{BatchReport, ProcessId};
use std::path::PathBuf;
use std::time::Duration;

#[derive(FromArgs, PartialEq, Debug)]
/// Print the command line of running Windows processes.
pub struct Args {
    /// configuration file, type toml
    #[argh(option, short = 'c')]
    pub config: Option<PathBuf>,

    /// print a JSON array instead of text lines
    #[argh(switch)]
    pub json: bool,

    /// split each command line into arguments
    #[argh(switch)]
    pub argv: bool,

    /// include the image path of each process
    #[argh(switch)]
    pub image_path: bool,

    /// upper bound on the whole batch, in milliseconds
    #[argh(option, short = 't')]
    pub timeout_ms: Option<u64>,

    /// process ids, type uint32
    #[argh(positional)]
    pub pids: Vec<ProcessId>,
}

impl Args {
    /// Override loaded settings with the flags that were given
    pub fn apply(&self, config: &mut Config) {
        if self.json {
            config.output.format = "json".to_string();
        }
        if self.argv {
            config.output.split_arguments = true;
        }
        if self.image_path {
            config.extraction.include_image_path = true;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.extraction.timeout_ms = timeout_ms;
        }
    }
}

/// One tab separated line per successful report; failures render as `None`
pub fn render_text(report: &BatchReport) -> Option<String> {
    let mut fields = vec![report.pid.to_string()];
    if let Some(image_path) = &report.image_path {
        fields.push(image_path.clone());
    }
    match (&report.arguments, &report.command_line) {
        (Some(arguments), _) => fields.extend(arguments.iter().cloned()),
        (None, Some(command_line)) => fields.push(command_line.clone()),
        (None, None) => return None,
    }
    Some(fields.join("\t"))
}

pub fn render_json(reports: &[BatchReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}

/// Run `work` on a blocking thread and give up on it after `limit`.
///
/// A blocking task cannot be cancelled, so on timeout the runtime is shut
/// down without waiting for it and the error is returned right away.
pub fn run_with_deadline<T, F>(limit: Duration, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()?;
    let outcome = runtime.block_on(async {
        tokio::time::timeout(limit, tokio::task::spawn_blocking(work)).await
    });
    runtime.shutdown_background();

    match outcome {
        Ok(joined) => Ok(joined?),
        Err(_) => bail!("extraction timed out after {} ms", limit.as_millis()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(command_line: Option<&str>) -> BatchReport {
        BatchReport {
            pid: 4242,
            image_path: None,
            command_line: command_line.map(str::to_string),
            arguments: None,
            error: command_line.is_none().then(|| "boom".to_string()),
        }
    }

    #[test]
    fn test_parse_flags_and_pids() {
        let args = Args::from_args(&["remote-cmdline"], &["--json", "-t", "250", "10", "20"])
            .unwrap();
        assert!(args.json);
        assert_eq!(args.timeout_ms, Some(250));
        assert_eq!(args.pids, vec![10, 20]);
    }

    #[test]
    fn test_rejects_non_numeric_pid() {
        assert!(Args::from_args(&["remote-cmdline"], &["notepad.exe"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let args =
            Args::from_args(&["remote-cmdline"], &["--argv", "--image-path", "1"]).unwrap();
        let mut config = Config::default();
        args.apply(&mut config);

        assert!(config.output.split_arguments);
        assert!(config.extraction.include_image_path);
        assert!(!config.output.is_json());
        assert_eq!(config.extraction.timeout_ms, 5000);
    }

    #[test]
    fn test_render_text() {
        assert_eq!(
            render_text(&report(Some("sample.exe --flag value"))).as_deref(),
            Some("4242\tsample.exe --flag value")
        );
        assert_eq!(render_text(&report(None)), None);
    }

    #[test]
    fn test_render_text_with_arguments_and_image() {
        let mut report = report(Some("a.exe b"));
        report.image_path = Some(r"C:\a.exe".to_string());
        report.arguments = Some(vec!["a.exe".to_string(), "b".to_string()]);
        assert_eq!(
            render_text(&report).as_deref(),
            Some("4242\tC:\\a.exe\ta.exe\tb")
        );
    }

    #[test]
    fn test_deadline_returns_result() {
        let value = run_with_deadline(Duration::from_secs(5), || 21 * 2).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_deadline_does_not_wait_for_stuck_work() {
        let started = std::time::Instant::now();
        let result = run_with_deadline(Duration::from_millis(100), || {
            std::thread::sleep(Duration::from_secs(3));
        });

        let err = result.unwrap_err();
        assert!(err.to_string().contains("timed out after 100 ms"));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&[report(None)]).unwrap();
        assert!(json.contains("\"error\": \"boom\""));
        assert!(!json.contains("command_line"));
    }
}
