//! Runs the provider registry over analyzer findings
//!
//! The host analyzer reports members without direct references; each one is
//! either suppressed (some provider marks it used) or left standing.

mod candidates;

pub use candidates::{parse_candidates, Candidate, CandidateError};

use crate::metadata::{ClassDescriptor, ClassKind, MetadataAccessor, MethodDescriptor};
use crate::providers::{ProviderRegistry, Verdict};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Verdict for one class member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberVerdict {
    pub class: String,
    /// Kind of the declaring type, unknown for unresolved findings
    pub kind: Option<ClassKind>,
    pub method: String,
    pub constructor: bool,
    /// False when the member is not in the metadata snapshot
    pub resolved: bool,
    pub verdict: Verdict,
}

impl MemberVerdict {
    fn for_method(method: &MethodDescriptor<'_>, verdict: Verdict) -> Self {
        Self {
            class: method.declaring_class().name().to_string(),
            kind: Some(method.declaring_class().kind()),
            method: method.name().to_string(),
            constructor: method.is_constructor(),
            resolved: true,
            verdict,
        }
    }

    fn unresolved(candidate: &Candidate) -> Self {
        Self {
            class: candidate.class.clone(),
            kind: None,
            method: candidate.method.clone(),
            constructor: false,
            resolved: false,
            verdict: Verdict::unused(),
        }
    }

    pub fn is_used(&self) -> bool {
        self.verdict.used
    }

    pub fn display(&self) -> String {
        format!("{}::{}", self.class, self.method)
    }
}

/// Counts over a set of verdicts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
    pub total: usize,
    pub used: usize,
    pub unused: usize,
    pub unresolved: usize,
    pub by_rule: BTreeMap<String, usize>,
}

impl UsageSummary {
    pub fn from_verdicts(verdicts: &[MemberVerdict]) -> Self {
        let mut summary = Self {
            total: verdicts.len(),
            ..Self::default()
        };

        for v in verdicts {
            if !v.resolved {
                summary.unresolved += 1;
            }
            match v.verdict.rule {
                Some(rule) if v.verdict.used => {
                    summary.used += 1;
                    *summary.by_rule.entry(rule.to_string()).or_default() += 1;
                }
                _ => summary.unused += 1,
            }
        }

        summary
    }
}

/// Evaluates members against a [`ProviderRegistry`]
pub struct UsageAnalyzer<'a> {
    registry: &'a ProviderRegistry,
    parallel: bool,
}

impl<'a> UsageAnalyzer<'a> {
    pub fn new(registry: &'a ProviderRegistry) -> Self {
        Self {
            registry,
            parallel: false,
        }
    }

    /// Evaluate classes on the rayon pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Verdicts for every method of every known class, in snapshot order
    pub fn analyze_all(&self, accessor: &dyn MetadataAccessor) -> Vec<MemberVerdict> {
        let classes = accessor.classes();
        info!("Evaluating {} classes against {} providers", classes.len(), self.registry.len());

        let verdicts: Vec<MemberVerdict> = if self.parallel {
            classes
                .par_iter()
                .flat_map_iter(|class| self.analyze_class(class))
                .collect()
        } else {
            classes
                .iter()
                .flat_map(|class| self.analyze_class(class))
                .collect()
        };

        debug!(
            "{} of {} methods marked as used",
            verdicts.iter().filter(|v| v.is_used()).count(),
            verdicts.len()
        );

        verdicts
    }

    /// Verdicts for the given findings only; unknown members stay unused
    pub fn analyze_candidates(
        &self,
        accessor: &dyn MetadataAccessor,
        candidates: &[Candidate],
    ) -> Vec<MemberVerdict> {
        let evaluate = |candidate: &Candidate| {
            let method = accessor
                .class(&candidate.class)
                .and_then(|class| class.method(&candidate.method));

            match method {
                Some(method) => MemberVerdict::for_method(&method, self.registry.verdict(&method)),
                None => {
                    debug!("Finding {} not in metadata snapshot", candidate);
                    MemberVerdict::unresolved(candidate)
                }
            }
        };

        if self.parallel {
            candidates.par_iter().map(evaluate).collect()
        } else {
            candidates.iter().map(evaluate).collect()
        }
    }

    pub fn analyze_class(&self, class: &ClassDescriptor) -> Vec<MemberVerdict> {
        class
            .methods()
            .map(|method| MemberVerdict::for_method(&method, self.registry.verdict(&method)))
            .collect()
    }
}
