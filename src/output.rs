//! Human-readable run summary
//!
//! One block per directory with its status and the dependencies that were
//! updated, followed by a totals line. Colors can be turned off so the
//! output is stable in tests and pipes.

use crate::orchestrator::RunReport;
use crate::pipeline::{DirectoryReport, DirectoryStatus};
use colored::Colorize;
use std::io::Write;

/// Text formatter for the run summary
pub struct SummaryFormatter {
    /// Whether to use colors
    color: bool,
    /// Whether to list changed files
    verbose: bool,
}

impl SummaryFormatter {
    /// Create a new formatter with colors enabled
    pub fn new(verbose: bool) -> Self {
        Self {
            color: true,
            verbose,
        }
    }

    /// Create a new formatter with color option
    pub fn with_color(verbose: bool, color: bool) -> Self {
        Self { color, verbose }
    }

    /// Write the summary of `report`
    pub fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        for directory in &report.directories {
            self.format_directory(directory, writer)?;
        }
        self.format_totals(report, writer)
    }

    fn status_label(&self, status: DirectoryStatus) -> String {
        let label = status.label();
        if !self.color {
            return label.to_string();
        }
        match status {
            DirectoryStatus::Updated => label.green().bold().to_string(),
            DirectoryStatus::NoChanges => label.dimmed().to_string(),
            DirectoryStatus::NotEligible => label.yellow().to_string(),
            DirectoryStatus::DiscoveryFailed => label.red().bold().to_string(),
        }
    }

    fn format_directory(
        &self,
        directory: &DirectoryReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let status = self.status_label(directory.status);
        if self.color {
            writeln!(writer, "{} [{}]", directory.directory.bold(), status)?;
        } else {
            writeln!(writer, "{} [{}]", directory.directory, status)?;
        }

        if let Some(error) = &directory.error {
            if self.color {
                writeln!(writer, "  {}", error.red())?;
            } else {
                writeln!(writer, "  {}", error)?;
            }
        }

        let width = directory
            .updated_dependencies
            .iter()
            .map(|d| d.name.len())
            .max()
            .unwrap_or(0);
        for dependency in &directory.updated_dependencies {
            let from = dependency.previous_version.as_deref().unwrap_or("?");
            let to = dependency.version.as_deref().unwrap_or("?");
            if self.color {
                writeln!(
                    writer,
                    "  {:width$} {} {} {}",
                    dependency.name,
                    from.dimmed(),
                    "→".dimmed(),
                    to.bright_white().bold(),
                    width = width
                )?;
            } else {
                writeln!(
                    writer,
                    "  {:width$} {} -> {}",
                    dependency.name,
                    from,
                    to,
                    width = width
                )?;
            }
        }

        if self.verbose {
            for file in &directory.changed_files {
                writeln!(writer, "  changed: {}", file)?;
            }
        }
        Ok(())
    }

    fn format_totals(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let updates = report.total_updates();
        let directories = report.directories.len();
        let failed = report.count(DirectoryStatus::DiscoveryFailed);

        let mut line = format!(
            "{} {} in {} {}",
            updates,
            if updates == 1 { "update" } else { "updates" },
            directories,
            if directories == 1 {
                "directory"
            } else {
                "directories"
            }
        );
        if failed > 0 {
            line.push_str(&format!(", {} failed", failed));
        }

        writeln!(writer)?;
        if self.color {
            writeln!(writer, "{}", line.bold())
        } else {
            writeln!(writer, "{}", line)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ReportedDependency, RunResult};

    fn bump(name: &str, from: &str, to: &str) -> ReportedDependency {
        ReportedDependency {
            name: name.to_string(),
            version: Some(to.to_string()),
            requirements: Vec::new(),
            previous_version: Some(from.to_string()),
            previous_requirements: None,
        }
    }

    fn render(report: &RunReport, verbose: bool) -> String {
        let mut buf = Vec::new();
        SummaryFormatter::with_color(verbose, false)
            .format(report, &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn sample() -> RunReport {
        RunReport {
            result: RunResult::empty("abc"),
            directories: vec![
                DirectoryReport {
                    directory: "/src".to_string(),
                    status: DirectoryStatus::Updated,
                    updated_dependencies: vec![
                        bump("Some.Package", "1.0.0", "2.0.0"),
                        bump("Pkg", "0.1.0", "0.2.0"),
                    ],
                    changed_files: vec!["/src/a.csproj".to_string()],
                    error: None,
                },
                DirectoryReport {
                    directory: "/lib".to_string(),
                    status: DirectoryStatus::DiscoveryFailed,
                    updated_dependencies: Vec::new(),
                    changed_files: Vec::new(),
                    error: Some("MissingFile".to_string()),
                },
            ],
        }
    }

    #[test]
    fn test_plain_summary() {
        let output = render(&sample(), false);
        assert!(output.contains("/src [updated]"));
        assert!(output.contains("  Some.Package 1.0.0 -> 2.0.0"));
        assert!(output.contains("  Pkg          0.1.0 -> 0.2.0"));
        assert!(output.contains("/lib [discovery failed]"));
        assert!(output.contains("  MissingFile"));
        assert!(output.contains("2 updates in 2 directories, 1 failed"));
        assert!(!output.contains("changed:"));
    }

    #[test]
    fn test_verbose_lists_changed_files() {
        let output = render(&sample(), true);
        assert!(output.contains("  changed: /src/a.csproj"));
    }

    #[test]
    fn test_singular_totals() {
        let report = RunReport {
            result: RunResult::empty("abc"),
            directories: vec![DirectoryReport {
                directory: "/".to_string(),
                status: DirectoryStatus::Updated,
                updated_dependencies: vec![bump("Some.Package", "1.0.0", "2.0.0")],
                changed_files: Vec::new(),
                error: None,
            }],
        };
        assert!(render(&report, false).contains("1 update in 1 directory"));
    }
}
