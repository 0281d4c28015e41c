use crate::analysis::{MemberVerdict, UsageSummary};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
    show_unused: bool,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self {
            output_path,
            show_unused: true,
        }
    }

    pub fn with_show_unused(mut self, show: bool) -> Self {
        self.show_unused = show;
        self
    }

    pub fn report(&self, verdicts: &[MemberVerdict]) -> Result<()> {
        let json = self.render(verdicts)?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }

    pub fn render(&self, verdicts: &[MemberVerdict]) -> Result<String> {
        let report = JsonReport::from_verdicts(verdicts, self.show_unused);
        serde_json::to_string_pretty(&report).into_diagnostic()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    total_members: usize,
    members: Vec<JsonMember<'a>>,
    summary: UsageSummary,
}

#[derive(Serialize)]
struct JsonMember<'a> {
    class: &'a str,
    kind: Option<&'static str>,
    method: &'a str,
    constructor: bool,
    resolved: bool,
    used: bool,
    provider: Option<&'static str>,
    rule: Option<&'static str>,
}

impl<'a> JsonReport<'a> {
    fn from_verdicts(verdicts: &'a [MemberVerdict], show_unused: bool) -> Self {
        let members = verdicts
            .iter()
            .filter(|v| show_unused || v.is_used())
            .map(|v| JsonMember {
                class: &v.class,
                kind: v.kind.map(|k| k.display_name()),
                method: &v.method,
                constructor: v.constructor,
                resolved: v.resolved,
                used: v.verdict.used,
                provider: v.verdict.provider,
                rule: v.verdict.rule,
            })
            .collect();

        Self {
            version: "1.0",
            total_members: verdicts.len(),
            members,
            summary: UsageSummary::from_verdicts(verdicts),
        }
    }
}
