use super::{DoctrineUsageProvider, MemberUsageProvider, Verdict};
use crate::config::ProvidersConfig;
use crate::metadata::{ClassDescriptor, MethodDescriptor};
use crate::packages::PackageDetector;
use crate::runtime::Capabilities;
use tracing::debug;

/// All usage providers known to the analyzer, combined with OR
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Box<dyn MemberUsageProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider, configured from `config`
    pub fn from_config(
        config: &ProvidersConfig,
        capabilities: Capabilities,
        detector: &dyn PackageDetector,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(DoctrineUsageProvider::new(
            config.doctrine.enabled,
            capabilities,
            detector,
        )));

        debug!(
            "{} of {} usage providers enabled",
            registry.enabled_count(),
            registry.len()
        );

        registry
    }

    pub fn register(&mut self, provider: Box<dyn MemberUsageProvider>) {
        self.providers.push(provider);
    }

    pub fn with_provider(mut self, provider: impl MemberUsageProvider + 'static) -> Self {
        self.register(Box::new(provider));
        self
    }

    /// True when any provider marks the method as used
    pub fn is_used_by_any_provider(&self, method: &MethodDescriptor<'_>) -> bool {
        self.providers.iter().any(|p| p.should_mark_as_used(method))
    }

    /// Verdict of the first provider that marks the method as used
    pub fn verdict(&self, method: &MethodDescriptor<'_>) -> Verdict {
        self.providers
            .iter()
            .map(|p| p.verdict(method))
            .find(|v| v.used)
            .unwrap_or_default()
    }

    /// Analyzer entry point: should the dead-code finding for
    /// `class::method_name` be suppressed? Unknown methods are not used.
    pub fn is_member_used(&self, class: &ClassDescriptor, method_name: &str) -> bool {
        class
            .method(method_name)
            .is_some_and(|method| self.is_used_by_any_provider(&method))
    }

    pub fn providers(&self) -> impl Iterator<Item = &dyn MemberUsageProvider> {
        self.providers.iter().map(|p| &**p as &dyn MemberUsageProvider)
    }

    pub fn enabled_count(&self) -> usize {
        self.providers.iter().filter(|p| p.is_enabled()).count()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
