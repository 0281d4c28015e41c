//! False positive tests for memberusage
//!
//! Each test describes a member that a reference-based analyzer would report
//! as dead even though Doctrine calls it, and checks that the registry
//! suppresses the finding (or, for the negative cases, keeps it).
//!
//! Categories:
//! 1. Event subscribers (interface contract)
//! 2. Lifecycle callbacks (method attributes)
//! 3. Entity listeners (class attributes)
//! 4. Repository constructors (inheritance)
//! 5. Listeners wired in container configuration (naming)
//! 6. Provider toggles

use memberusage::metadata::{
    ClassDescriptor, MetadataTag, MethodDescriptor, MethodMetadata, TagArguments, TagValue,
};
use memberusage::packages::InstalledPackages;
use memberusage::providers::{DoctrineUsageProvider, MemberUsageProvider};
use memberusage::runtime::Capabilities;

const EVENT_SUBSCRIBER: &str = "Doctrine\\Common\\EventSubscriber";
const ENTITY_REPOSITORY: &str = "Doctrine\\ORM\\EntityRepository";
const AS_ENTITY_LISTENER: &str = "Doctrine\\Bundle\\DoctrineBundle\\Attribute\\AsEntityListener";

const LIFECYCLE_TAGS: &[&str] = &[
    "Doctrine\\ORM\\Mapping\\PostLoad",
    "Doctrine\\ORM\\Mapping\\PostPersist",
    "Doctrine\\ORM\\Mapping\\PostUpdate",
    "Doctrine\\ORM\\Mapping\\PostRemove",
    "Doctrine\\ORM\\Mapping\\PreFlush",
    "Doctrine\\ORM\\Mapping\\PrePersist",
    "Doctrine\\ORM\\Mapping\\PreRemove",
    "Doctrine\\ORM\\Mapping\\PreUpdate",
];

const CONVENTIONAL_NAMES: &[&str] = &[
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

fn provider() -> DoctrineUsageProvider {
    DoctrineUsageProvider::new(Some(true), Capabilities::modern(), &InstalledPackages::new())
}

fn provider_with(capabilities: Capabilities) -> DoctrineUsageProvider {
    DoctrineUsageProvider::new(Some(true), capabilities, &InstalledPackages::new())
}

fn is_used(provider: &DoctrineUsageProvider, class: &ClassDescriptor, method: &str) -> bool {
    let method: MethodDescriptor<'_> = class.method(method).expect("method declared in fixture");
    provider.should_mark_as_used(&method)
}

// ============================================================================
// 1. Event subscribers
// ============================================================================

mod event_subscriber {
    use super::*;

    #[test]
    fn test_all_methods_of_subscriber_are_used() {
        let class = ClassDescriptor::new("App\\EventSubscriber\\SearchIndexer")
            .with_interface(EVENT_SUBSCRIBER)
            .with_method(MethodMetadata::new("getSubscribedEvents"))
            .with_method(MethodMetadata::new("reindex"))
            .with_method(MethodMetadata::new("notWiredAnywhere"))
            .with_method(MethodMetadata::new("__construct"));

        let provider = provider();
        for method in class.methods() {
            assert!(
                provider.should_mark_as_used(&method),
                "{} should be kept",
                method.display()
            );
        }
    }

    #[test]
    fn test_subscriber_works_without_capability() {
        let class = ClassDescriptor::new("App\\EventSubscriber\\SearchIndexer")
            .with_interface(EVENT_SUBSCRIBER)
            .with_method(MethodMetadata::new("reindex"));

        assert!(is_used(&provider_with(Capabilities::legacy()), &class, "reindex"));
    }

    #[test]
    fn test_other_interfaces_do_not_count() {
        let class = ClassDescriptor::new("App\\Service\\Exporter")
            .with_interface("Symfony\\Component\\EventDispatcher\\EventSubscriberInterface")
            .with_method(MethodMetadata::new("export"));

        assert!(!is_used(&provider(), &class, "export"));
    }
}

// ============================================================================
// 2. Lifecycle callbacks
// ============================================================================

mod lifecycle_callbacks {
    use super::*;

    #[test]
    fn test_every_lifecycle_tag_is_recognised() {
        for tag in LIFECYCLE_TAGS {
            let class = ClassDescriptor::new("App\\Entity\\Invoice")
                .with_method(MethodMetadata::new("callback").with_tag(MetadataTag::new(*tag)));

            assert!(is_used(&provider(), &class, "callback"), "{} not recognised", tag);
            assert!(
                !is_used(&provider_with(Capabilities::legacy()), &class, "callback"),
                "{} must be ignored without attribute support",
                tag
            );
        }
    }

    #[test]
    fn test_unrelated_tag_is_ignored() {
        let class = ClassDescriptor::new("App\\Entity\\Invoice").with_method(
            MethodMetadata::new("total").with_tag(MetadataTag::new("Doctrine\\ORM\\Mapping\\Column")),
        );

        assert!(!is_used(&provider(), &class, "total"));
    }

    #[test]
    fn test_tag_on_class_does_not_mark_methods() {
        let class = ClassDescriptor::new("App\\Entity\\Invoice")
            .with_tag(MetadataTag::new("Doctrine\\ORM\\Mapping\\PrePersist"))
            .with_method(MethodMetadata::new("total"));

        assert!(!is_used(&provider(), &class, "total"));
    }
}

// ============================================================================
// 3. Entity listeners
// ============================================================================

mod entity_listeners {
    use super::*;

    fn listener(arguments: TagArguments) -> ClassDescriptor {
        ClassDescriptor::new("App\\Listener\\InvoiceListener")
            .with_tag(MetadataTag::new(AS_ENTITY_LISTENER).with_arguments(arguments))
            .with_method(MethodMetadata::new("sync"))
            .with_method(MethodMetadata::new("other"))
    }

    #[test]
    fn test_method_argument() {
        let class = listener(TagArguments::new().with_named("method", "sync"));

        assert!(is_used(&provider(), &class, "sync"));
        assert!(!is_used(&provider(), &class, "other"));
    }

    #[test]
    fn test_second_positional_argument() {
        let class = listener(TagArguments::new().with_positional("preUpdate").with_positional("sync"));

        assert!(is_used(&provider(), &class, "sync"));
        assert!(!is_used(&provider(), &class, "other"));
    }

    #[test]
    fn test_event_name_alone_is_not_a_method() {
        let class = listener(TagArguments::new().with_named("event", "sync"));
        assert!(!is_used(&provider(), &class, "sync"));
    }

    #[test]
    fn test_non_string_method_argument() {
        let class = listener(
            TagArguments::new()
                .with_named("method", TagValue::List(vec![TagValue::from("sync")])),
        );
        assert!(!is_used(&provider(), &class, "sync"));
    }

    #[test]
    fn test_listener_needs_capability() {
        let class = listener(TagArguments::new().with_named("method", "sync"));
        assert!(!is_used(&provider_with(Capabilities::legacy()), &class, "sync"));
    }

    #[test]
    fn test_listener_method_name_is_case_sensitive() {
        let class = listener(TagArguments::new().with_named("method", "Sync"));
        assert!(!is_used(&provider(), &class, "sync"));
    }
}

// ============================================================================
// 4. Repository constructors
// ============================================================================

mod repository_constructors {
    use super::*;

    #[test]
    fn test_constructor_of_repository_subclass() {
        let class = ClassDescriptor::new("App\\Repository\\InvoiceRepository")
            .with_ancestor("App\\Repository\\BaseRepository")
            .with_ancestor(ENTITY_REPOSITORY)
            .with_method(MethodMetadata::new("__construct"))
            .with_method(MethodMetadata::new("findOverdue"));

        assert!(is_used(&provider(), &class, "__construct"));
        assert!(!is_used(&provider(), &class, "findOverdue"));
    }

    #[test]
    fn test_entity_repository_itself_is_not_a_subclass() {
        let class = ClassDescriptor::new(ENTITY_REPOSITORY)
            .with_method(MethodMetadata::new("__construct"));

        assert!(!is_used(&provider(), &class, "__construct"));
    }

    #[test]
    fn test_repository_method_kept_by_another_rule() {
        let class = ClassDescriptor::new("App\\Repository\\InvoiceRepository")
            .with_ancestor(ENTITY_REPOSITORY)
            .with_method(MethodMetadata::new("onClear"));

        assert!(is_used(&provider(), &class, "onClear"));
    }
}

// ============================================================================
// 5. Naming conventions
// ============================================================================

mod naming_conventions {
    use super::*;

    #[test]
    fn test_every_conventional_name() {
        let provider = provider();
        for name in CONVENTIONAL_NAMES {
            let class = ClassDescriptor::new("App\\Unrelated\\Thing").with_method(MethodMetadata::new(*name));
            assert!(is_used(&provider, &class, name), "{} should be kept", name);
        }
    }

    #[test]
    fn test_near_misses_are_reported() {
        let provider = provider();
        for name in ["postload", "onFlushed", "on_clear", "flush", "load"] {
            let class = ClassDescriptor::new("App\\Unrelated\\Thing").with_method(MethodMetadata::new(name));
            assert!(!is_used(&provider, &class, name), "{} should stay dead", name);
        }
    }
}

// ============================================================================
// 6. Provider toggles
// ============================================================================

mod toggles {
    use super::*;

    fn everything_matches() -> ClassDescriptor {
        ClassDescriptor::new("App\\Everything")
            .with_interface(EVENT_SUBSCRIBER)
            .with_ancestor(ENTITY_REPOSITORY)
            .with_tag(
                MetadataTag::new(AS_ENTITY_LISTENER)
                    .with_arguments(TagArguments::new().with_named("method", "sync")),
            )
            .with_method(MethodMetadata::new("__construct"))
            .with_method(MethodMetadata::new("sync"))
            .with_method(MethodMetadata::new("postLoad"))
            .with_method(
                MethodMetadata::new("touch").with_tag(MetadataTag::new("Doctrine\\ORM\\Mapping\\PreUpdate")),
            )
    }

    #[test]
    fn test_disabled_provider_keeps_every_finding() {
        let provider =
            DoctrineUsageProvider::new(Some(false), Capabilities::modern(), &InstalledPackages::new());
        let class = everything_matches();

        for method in class.methods() {
            assert!(!provider.should_mark_as_used(&method));
        }
    }

    #[test]
    fn test_unset_without_packages_equals_disabled() {
        let inferred = DoctrineUsageProvider::new(
            None,
            Capabilities::modern(),
            &InstalledPackages::from_names(["symfony/framework-bundle"]),
        );
        let disabled =
            DoctrineUsageProvider::new(Some(false), Capabilities::modern(), &InstalledPackages::new());
        let class = everything_matches();

        for method in class.methods() {
            assert_eq!(inferred.verdict(&method), disabled.verdict(&method));
        }
    }

    #[test]
    fn test_unset_with_event_manager_enables() {
        let provider = DoctrineUsageProvider::new(
            None,
            Capabilities::modern(),
            &InstalledPackages::from_names(["doctrine/event-manager"]),
        );
        let class = everything_matches();

        assert!(class.methods().all(|m| provider.should_mark_as_used(&m)));
    }

    #[test]
    fn test_verdicts_are_idempotent() {
        let provider = provider();
        let class = everything_matches();

        for method in class.methods() {
            let first = provider.verdict(&method);
            let second = provider.verdict(&method);
            assert_eq!(first, second);
        }
    }
}
