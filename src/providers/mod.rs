//! Usage providers
//!
//! A provider answers one question for one framework: is this method called
//! by the framework even though no code references it? Each invocation
//! convention is a [`UsageRule`]; a provider evaluates its [`RuleSet`] and
//! the [`ProviderRegistry`] ORs the providers together.
//!
//! Adding a framework means registering another provider. Existing rules and
//! providers are never edited for it.

mod doctrine;
mod registry;

pub use doctrine::{
    DoctrineUsageProvider, EntityListenerRule, EventSubscriberRule, LifecycleCallbackRule,
    ListenerNamingRule, RepositoryConstructorRule, DOCTRINE_PACKAGES,
};
pub use registry::ProviderRegistry;

use crate::metadata::{ClassDescriptor, MethodDescriptor};
use serde::Serialize;
use tracing::trace;

/// One invocation convention, as a pure predicate
///
/// Implementations must not depend on evaluation order or on other rules.
pub trait UsageRule: Send + Sync {
    /// Short identifier shown in reports (e.g. `event-subscriber`)
    fn name(&self) -> &'static str;

    fn matches(&self, class: &ClassDescriptor, method: &MethodDescriptor<'_>) -> bool;
}

/// Ordered rules combined with short-circuit OR
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn UsageRule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: impl UsageRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// First rule that matches, if any
    pub fn first_match(&self, method: &MethodDescriptor<'_>) -> Option<&'static str> {
        let class = method.declaring_class();
        self.rules
            .iter()
            .find(|rule| rule.matches(class, method))
            .map(|rule| {
                trace!("{} matched {}", rule.name(), method.display());
                rule.name()
            })
    }

    pub fn matches(&self, method: &MethodDescriptor<'_>) -> bool {
        self.first_match(method).is_some()
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.rule_names()).finish()
    }
}

/// Outcome of a usage query, with the provider and rule that decided it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Verdict {
    pub used: bool,
    pub provider: Option<&'static str>,
    pub rule: Option<&'static str>,
}

impl Verdict {
    pub fn unused() -> Self {
        Self::default()
    }

    pub fn used_by(provider: &'static str, rule: &'static str) -> Self {
        Self {
            used: true,
            provider: Some(provider),
            rule: Some(rule),
        }
    }
}

/// A framework-specific source of "used" justifications
pub trait MemberUsageProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fixed for the provider's lifetime
    fn is_enabled(&self) -> bool;

    /// Diagnostic form of [`should_mark_as_used`](Self::should_mark_as_used)
    fn verdict(&self, method: &MethodDescriptor<'_>) -> Verdict;

    fn should_mark_as_used(&self, method: &MethodDescriptor<'_>) -> bool {
        self.verdict(method).used
    }
}
