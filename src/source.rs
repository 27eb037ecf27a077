use crate::config::PowertopConfig;
use crate::error::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Line PowerTOP writes to stderr naming the report it produced.
const OUTPUT_MARKER: &str = "PowerTOP outputing using base filename ";

/// Where the HTML report comes from.
#[derive(Debug, Clone)]
pub enum ReportSource {
    /// A report the user already has.
    File(PathBuf),
    /// Run PowerTOP to produce a fresh report.
    Generate(PowertopConfig),
}

/// Report markup plus the temporary file it came from, if any.
#[derive(Debug)]
pub struct Report {
    pub html: String,
    pub path: PathBuf,
    generated: bool,
}

impl Report {
    /// Remove the report file if we generated it. Idempotent.
    pub fn cleanup(&mut self) {
        if self.generated {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!(path = %self.path.display(), "failed to remove report: {}", e);
            }
            self.generated = false;
        }
    }
}

impl Drop for Report {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl ReportSource {
    /// Obtain the report text, running PowerTOP if needed.
    pub fn acquire(&self) -> Result<Report> {
        match self {
            ReportSource::File(path) => Ok(Report {
                html: read_report(path)?,
                path: path.clone(),
                generated: false,
            }),
            ReportSource::Generate(powertop) => {
                if !nix::unistd::geteuid().is_root() {
                    return Err(Error::NotRoot {
                        operation: "running powertop".to_string(),
                    });
                }
                let path = generate(powertop)?;
                // Take ownership first so the file is removed even if reading fails.
                let mut report = Report {
                    html: String::new(),
                    path,
                    generated: true,
                };
                report.html = read_report(&report.path)?;
                Ok(report)
            }
        }
    }
}

fn read_report(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::ReportRead {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Run PowerTOP and return the path of the HTML report it wrote.
fn generate(powertop: &PowertopConfig) -> Result<PathBuf> {
    tracing::info!(binary = %powertop.binary, time = powertop.time, "running powertop");

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Running PowerTOP, please wait...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let output = Command::new(&powertop.binary)
        .arg(format!("--html={}", powertop.html_base.display()))
        .arg(format!("--time={}", powertop.time))
        .env("LANG", "")
        .output();
    spinner.finish_and_clear();

    let output = output
        .map_err(|e| Error::Generator(format!("failed to run {}: {}", powertop.binary, e)))?;

    if !output.status.success() {
        return Err(Error::Generator(format!(
            "{} exited with {}",
            powertop.binary, output.status
        )));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    parse_generator_output(&stderr).ok_or_else(|| {
        Error::Generator(format!(
            "{} did not report where it wrote the HTML output",
            powertop.binary
        ))
    })
}

/// Extract the report file name PowerTOP announces on stderr.
fn parse_generator_output(stderr: &str) -> Option<PathBuf> {
    let start = stderr.find(OUTPUT_MARKER)? + OUTPUT_MARKER.len();
    let name = stderr[start..].lines().next()?.trim();
    if name.is_empty() {
        return None;
    }
    Some(PathBuf::from(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generator_output() {
        let stderr = "Loaded 0 prior measurements\n\
                      Preparing to take measurements\n\
                      PowerTOP outputing using base filename /tmp/powertop.html\n";
        assert_eq!(
            parse_generator_output(stderr),
            Some(PathBuf::from("/tmp/powertop.html"))
        );
    }

    #[test]
    fn test_parse_generator_output_without_trailing_newline() {
        assert_eq!(
            parse_generator_output("PowerTOP outputing using base filename /tmp/p.html"),
            Some(PathBuf::from("/tmp/p.html"))
        );
    }

    #[test]
    fn test_parse_generator_output_missing_marker() {
        assert_eq!(parse_generator_output("modprobe cpufreq_stats failed\n"), None);
        assert_eq!(
            parse_generator_output("PowerTOP outputing using base filename \n"),
            None
        );
    }

    #[test]
    fn test_file_source_reads_report() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.html");
        std::fs::write(&path, "<html></html>").unwrap();

        let report = ReportSource::File(path.clone()).acquire().unwrap();
        assert_eq!(report.html, "<html></html>");
        drop(report);
        // User-supplied reports are never deleted.
        assert!(path.exists());
    }

    #[test]
    fn test_file_source_missing() {
        let err = ReportSource::File(PathBuf::from("/nonexistent/report.html"))
            .acquire()
            .unwrap_err();
        assert!(matches!(err, Error::ReportRead { .. }));
    }

    #[test]
    fn test_generated_report_removed_on_cleanup() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("powertop.html");
        std::fs::write(&path, "<html></html>").unwrap();

        let mut report = Report {
            html: String::new(),
            path: path.clone(),
            generated: true,
        };
        report.cleanup();
        assert!(!path.exists());
        report.cleanup();
    }
}
