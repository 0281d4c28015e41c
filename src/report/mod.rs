mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::analysis::MemberVerdict;
use miette::Result;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

impl ReportFormat {
    /// Parse the `report.format` config value
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "terminal" | "text" => Some(ReportFormat::Terminal),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Reporter for member usage verdicts
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
    show_unused: bool,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
            show_unused: true,
        }
    }

    pub fn with_show_unused(mut self, show: bool) -> Self {
        self.show_unused = show;
        self
    }

    pub fn report(&self, verdicts: &[MemberVerdict]) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => {
                let reporter = TerminalReporter::new().with_show_unused(self.show_unused);
                reporter.report(verdicts)
            }
            ReportFormat::Json => {
                let reporter = JsonReporter::new(self.output_path.clone())
                    .with_show_unused(self.show_unused);
                reporter.report(verdicts)
            }
        }
    }
}
