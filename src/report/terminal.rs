use crate::analysis::{MemberVerdict, UsageSummary};
use colored::Colorize;
use miette::Result;
use std::collections::BTreeMap;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// List members that stay reported as dead code
    show_unused: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self { show_unused: true }
    }

    pub fn with_show_unused(mut self, show: bool) -> Self {
        self.show_unused = show;
        self
    }

    pub fn report(&self, verdicts: &[MemberVerdict]) -> Result<()> {
        if verdicts.is_empty() {
            println!("{}", "No members to evaluate.".green().bold());
            return Ok(());
        }

        // Group by class
        let mut by_class: BTreeMap<&str, Vec<&MemberVerdict>> = BTreeMap::new();
        for item in verdicts {
            if self.show_unused || item.is_used() {
                by_class.entry(item.class.as_str()).or_default().push(item);
            }
        }

        println!();
        for (class, items) in &by_class {
            match items.first().and_then(|item| item.kind) {
                Some(kind) => println!("{} {}", kind.display_name().dimmed(), class.cyan().bold()),
                None => println!("{}", class.cyan().bold()),
            }

            for item in items {
                self.print_item(item);
            }

            println!();
        }

        self.print_summary(&UsageSummary::from_verdicts(verdicts));

        Ok(())
    }

    fn print_item(&self, item: &MemberVerdict) {
        let kind = if item.constructor { "constructor" } else { "method" };

        match (item.verdict.provider, item.verdict.rule) {
            (Some(provider), Some(rule)) if item.verdict.used => println!(
                "  {} {} {} {}",
                "✓".green().bold(),
                kind.dimmed(),
                item.method.white(),
                format!("[{}:{}]", provider, rule).dimmed()
            ),
            _ if !item.resolved => println!(
                "  {} {} {} {}",
                "?".yellow(),
                kind.dimmed(),
                item.method.white(),
                "(not in metadata)".dimmed()
            ),
            _ => println!("  {} {} {}", "✗".red(), kind.dimmed(), item.method.white()),
        }
    }

    fn print_summary(&self, summary: &UsageSummary) {
        println!("{}", "─".repeat(60).dimmed());
        println!(
            "Summary: {} members, {}, {}",
            summary.total,
            format!("{} used by a framework", summary.used).green(),
            format!("{} still unused", summary.unused).red()
        );

        if summary.unresolved > 0 {
            println!(
                "{}",
                format!("⚠ {} findings were not found in the metadata snapshot", summary.unresolved)
                    .yellow()
            );
        }

        if !summary.by_rule.is_empty() {
            println!();
            println!("{}", "By Rule:".dimmed());
            for (rule, count) in &summary.by_rule {
                println!("  {} {}", format!("{:>5}", count).green(), rule);
            }
        }

        println!();
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
