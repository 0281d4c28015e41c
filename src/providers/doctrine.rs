use super::{MemberUsageProvider, RuleSet, UsageRule, Verdict};
use crate::metadata::{ClassDescriptor, MethodDescriptor, TagValue};
use crate::packages::PackageDetector;
use crate::runtime::Capabilities;
use tracing::info;

const EVENT_SUBSCRIBER: &str = "Doctrine\\Common\\EventSubscriber";
const ENTITY_REPOSITORY: &str = "Doctrine\\ORM\\EntityRepository";
const AS_ENTITY_LISTENER: &str = "Doctrine\\Bundle\\DoctrineBundle\\Attribute\\AsEntityListener";

const LIFECYCLE_CALLBACKS: &[&str] = &[
    "Doctrine\\ORM\\Mapping\\PostLoad",
    "Doctrine\\ORM\\Mapping\\PostPersist",
    "Doctrine\\ORM\\Mapping\\PostUpdate",
    "Doctrine\\ORM\\Mapping\\PostRemove",
    "Doctrine\\ORM\\Mapping\\PreFlush",
    "Doctrine\\ORM\\Mapping\\PrePersist",
    "Doctrine\\ORM\\Mapping\\PreRemove",
    "Doctrine\\ORM\\Mapping\\PreUpdate",
];

/// Method names of `Doctrine\ORM\Events`
const LISTENER_METHODS: &[&str] = &[
    "preRemove",
    "postRemove",
    "prePersist",
    "postPersist",
    "preUpdate",
    "postUpdate",
    "postLoad",
    "loadClassMetadata",
    "onClassMetadataNotFound",
    "preFlush",
    "onFlush",
    "postFlush",
    "onClear",
];

/// Packages whose presence turns the provider on when unconfigured
pub const DOCTRINE_PACKAGES: &[&str] = &[
    "doctrine/orm",
    "doctrine/event-manager",
    "doctrine/doctrine-bundle",
];

/// Every method of an `EventSubscriber` implementation
///
/// Simplification: the subscribed events are only known from the body of
/// `getSubscribedEvents()`, so the whole class is kept.
pub struct EventSubscriberRule;

impl UsageRule for EventSubscriberRule {
    fn name(&self) -> &'static str {
        "event-subscriber"
    }

    fn matches(&self, class: &ClassDescriptor, _method: &MethodDescriptor<'_>) -> bool {
        class.implements_interface(EVENT_SUBSCRIBER)
    }
}

/// Methods carrying a lifecycle callback attribute (`#[PrePersist]`, ...)
pub struct LifecycleCallbackRule {
    capabilities: Capabilities,
}

impl LifecycleCallbackRule {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }
}

impl UsageRule for LifecycleCallbackRule {
    fn name(&self) -> &'static str {
        "lifecycle-callback"
    }

    fn matches(&self, _class: &ClassDescriptor, method: &MethodDescriptor<'_>) -> bool {
        if !self.capabilities.supports_declarative_metadata() {
            return false;
        }

        LIFECYCLE_CALLBACKS.iter().any(|tag| method.has_tag(tag))
    }
}

/// Methods registered by `#[AsEntityListener(method: ...)]` on their class
pub struct EntityListenerRule {
    capabilities: Capabilities,
}

impl EntityListenerRule {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }
}

impl UsageRule for EntityListenerRule {
    fn name(&self) -> &'static str {
        "entity-listener"
    }

    fn matches(&self, class: &ClassDescriptor, method: &MethodDescriptor<'_>) -> bool {
        if !self.capabilities.supports_declarative_metadata() {
            return false;
        }

        // AsEntityListener(event, method, lazy, entityManager, entity, priority)
        class.tags_named(AS_ENTITY_LISTENER).any(|tag| {
            tag.arguments
                .named_or_positional("method", 1)
                .and_then(TagValue::as_str)
                .is_some_and(|listener| listener == method.name())
        })
    }
}

/// Constructors of `EntityRepository` subclasses, instantiated by the ORM
pub struct RepositoryConstructorRule;

impl UsageRule for RepositoryConstructorRule {
    fn name(&self) -> &'static str {
        "repository-constructor"
    }

    fn matches(&self, class: &ClassDescriptor, method: &MethodDescriptor<'_>) -> bool {
        method.is_constructor() && class.is_subclass_of(ENTITY_REPOSITORY)
    }
}

/// Methods named after a Doctrine event, in any class
///
/// Listeners registered in container configuration are invisible here, so
/// the event name alone is taken as evidence.
pub struct ListenerNamingRule;

impl UsageRule for ListenerNamingRule {
    fn name(&self) -> &'static str {
        "listener-naming"
    }

    fn matches(&self, _class: &ClassDescriptor, method: &MethodDescriptor<'_>) -> bool {
        LISTENER_METHODS.contains(&method.name())
    }
}

/// Marks methods invoked by Doctrine ORM as used
#[derive(Debug)]
pub struct DoctrineUsageProvider {
    enabled: bool,
    rules: RuleSet,
}

impl DoctrineUsageProvider {
    pub const NAME: &'static str = "doctrine";

    /// `enabled: None` asks the detector once whether Doctrine is installed
    pub fn new(
        enabled: Option<bool>,
        capabilities: Capabilities,
        detector: &dyn PackageDetector,
    ) -> Self {
        let enabled = match enabled {
            Some(explicit) => {
                info!("Doctrine usage provider {} by configuration", on_off(explicit));
                explicit
            }
            None => {
                let installed = DOCTRINE_PACKAGES.iter().find(|p| detector.is_installed(p));
                match installed {
                    Some(package) => info!("Doctrine usage provider enabled ({} installed)", package),
                    None => info!("Doctrine usage provider disabled (no Doctrine package installed)"),
                }
                installed.is_some()
            }
        };

        Self {
            enabled,
            rules: Self::default_rules(capabilities),
        }
    }

    pub fn default_rules(capabilities: Capabilities) -> RuleSet {
        RuleSet::new()
            .with_rule(EventSubscriberRule)
            .with_rule(LifecycleCallbackRule::new(capabilities))
            .with_rule(RepositoryConstructorRule)
            .with_rule(EntityListenerRule::new(capabilities))
            .with_rule(ListenerNamingRule)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl MemberUsageProvider for DoctrineUsageProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn verdict(&self, method: &MethodDescriptor<'_>) -> Verdict {
        if !self.enabled {
            return Verdict::unused();
        }

        match self.rules.first_match(method) {
            Some(rule) => Verdict::used_by(Self::NAME, rule),
            None => Verdict::unused(),
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}
