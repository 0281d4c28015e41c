//! Integration tests for the Doctrine provider against metadata snapshots
//!
//! These tests load fixture snapshots through `ClassIndex`, so inheritance
//! resolution, tag parsing and the rules are exercised together.

use memberusage::analysis::{parse_candidates, UsageAnalyzer, UsageSummary};
use memberusage::config::ProvidersConfig;
use memberusage::metadata::{ClassIndex, ClassKind, MetadataAccessor};
use memberusage::packages::InstalledPackages;
use memberusage::providers::{DoctrineUsageProvider, MemberUsageProvider, ProviderRegistry};
use memberusage::runtime::{Capabilities, RuntimeVersion};
use std::path::PathBuf;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_index(filename: &str) -> ClassIndex {
    let path = fixtures_path().join("metadata").join(filename);
    if !path.exists() {
        panic!("Fixture not found: {:?}", path);
    }
    ClassIndex::load(&path).expect("Failed to load snapshot")
}

fn enabled_provider(capabilities: Capabilities) -> DoctrineUsageProvider {
    DoctrineUsageProvider::new(Some(true), capabilities, &InstalledPackages::new())
}

/// Names of `Class::method` members the provider marks as used
fn used_members(index: &ClassIndex, provider: &DoctrineUsageProvider) -> Vec<String> {
    index
        .classes()
        .iter()
        .flat_map(|class| class.methods())
        .filter(|method| provider.should_mark_as_used(method))
        .map(|method| method.display())
        .collect()
}

// ============================================================================
// Snapshot Loading Tests
// ============================================================================

mod snapshot_tests {
    use super::*;

    #[test]
    fn test_doctrine_fixture_loads() {
        let index = load_index("doctrine_app.json");

        assert_eq!(index.len(), 7);
        assert_eq!(index.method_count(), 14);
        assert_eq!(index.runtime_version(), Some("8.2.13"));
    }

    #[test]
    fn test_subscriber_interface_resolved_through_interface_inheritance() {
        let index = load_index("doctrine_app.json");
        let subscriber = index.class("App\\EventSubscriber\\AuditLogSubscriber").unwrap();

        assert!(subscriber.implements_interface("Doctrine\\Common\\EventSubscriber"));
    }

    #[test]
    fn test_repository_resolved_through_abstract_parent() {
        let index = load_index("doctrine_app.json");
        let repository = index.class("App\\Repository\\UserRepository").unwrap();

        assert!(repository.is_subclass_of("Doctrine\\ORM\\EntityRepository"));
    }

    #[test]
    fn test_yaml_fixture_loads() {
        let index = load_index("legacy_app.yaml");
        assert_eq!(index.runtime_version(), Some("7.4.33"));
        assert_eq!(index.method_count(), 3);
    }
}

// ============================================================================
// Rule Coverage Tests
// ============================================================================

mod rule_tests {
    use super::*;

    #[test]
    fn test_modern_runtime_verdicts() {
        let index = load_index("doctrine_app.json");
        let used = used_members(&index, &enabled_provider(Capabilities::modern()));

        assert_eq!(
            used,
            vec![
                "App\\EventSubscriber\\AuditLogSubscriber::getSubscribedEvents",
                "App\\EventSubscriber\\AuditLogSubscriber::logChange",
                "App\\Entity\\User::touch",
                "App\\Entity\\User::initialize",
                "App\\Listener\\UserListener::sync",
                "App\\Listener\\UserListener::forget",
                "App\\Repository\\UserRepository::__construct",
                "App\\Service\\CacheWarmer::onClear",
            ]
        );
    }

    #[test]
    fn test_pre_attribute_runtime_drops_tag_rules() {
        let index = load_index("doctrine_app.json");
        let php74 = Capabilities::for_version(RuntimeVersion::new(7, 4, 33));
        let used = used_members(&index, &enabled_provider(php74));

        assert_eq!(
            used,
            vec![
                "App\\EventSubscriber\\AuditLogSubscriber::getSubscribedEvents",
                "App\\EventSubscriber\\AuditLogSubscriber::logChange",
                "App\\Repository\\UserRepository::__construct",
                "App\\Service\\CacheWarmer::onClear",
            ]
        );
    }

    #[test]
    fn test_legacy_snapshot_keeps_naming_rule() {
        let index = load_index("legacy_app.yaml");
        let version = RuntimeVersion::parse(index.runtime_version().unwrap()).unwrap();
        let used = used_members(&index, &enabled_provider(Capabilities::for_version(version)));

        assert_eq!(used, vec!["App\\Entity\\Order::postLoad"]);
    }

    #[test]
    fn test_yaml_listener_with_integer_keys() {
        let index = load_index("attributes_app.yaml");
        let version = RuntimeVersion::parse(index.runtime_version().unwrap()).unwrap();
        let used = used_members(&index, &enabled_provider(Capabilities::for_version(version)));

        assert_eq!(used, vec!["App\\Listener\\InvoiceListener::sync"]);
    }

    #[test]
    fn test_verdict_names_the_rule() {
        let index = load_index("doctrine_app.json");
        let provider = enabled_provider(Capabilities::modern());
        let listener = index.class("App\\Listener\\UserListener").unwrap();

        let verdict = provider.verdict(&listener.method("forget").unwrap());
        assert!(verdict.used);
        assert_eq!(verdict.provider, Some("doctrine"));
        assert_eq!(verdict.rule, Some("entity-listener"));
    }
}

// ============================================================================
// Registry and Analyzer Tests
// ============================================================================

mod registry_tests {
    use super::*;

    #[test]
    fn test_registry_enabled_from_installed_json() {
        let vendor = fixtures_path().join("projects/doctrine/vendor");
        let packages = InstalledPackages::from_vendor_dir(&vendor).unwrap();
        let registry =
            ProviderRegistry::from_config(&ProvidersConfig::default(), Capabilities::modern(), &packages);

        assert_eq!(registry.enabled_count(), 1);

        let index = load_index("doctrine_app.json");
        let user = index.class("App\\Entity\\User").unwrap();
        assert!(registry.is_member_used(user, "touch"));
        assert!(!registry.is_member_used(user, "getEmail"));
    }

    #[test]
    fn test_registry_without_doctrine_installed() {
        let dir = tempfile::tempdir().unwrap();
        let packages = InstalledPackages::from_vendor_dir(&dir.path().join("vendor")).unwrap();
        let registry =
            ProviderRegistry::from_config(&ProvidersConfig::default(), Capabilities::modern(), &packages);

        let index = load_index("doctrine_app.json");
        let verdicts = UsageAnalyzer::new(&registry).analyze_all(&index);
        assert!(verdicts.iter().all(|v| !v.is_used()));
    }

    #[test]
    fn test_findings_file_end_to_end() {
        let contents = std::fs::read_to_string(fixtures_path().join("findings.txt")).unwrap();
        let candidates = parse_candidates(&contents).unwrap();
        let index = load_index("doctrine_app.json");
        let registry = ProviderRegistry::new().with_provider(enabled_provider(Capabilities::modern()));

        let verdicts = UsageAnalyzer::new(&registry)
            .with_parallel(true)
            .analyze_candidates(&index, &candidates);
        let suppressed: Vec<_> = verdicts
            .iter()
            .filter(|v| v.is_used())
            .map(|v| v.display())
            .collect();

        assert_eq!(
            suppressed,
            vec![
                "App\\Entity\\User::touch",
                "App\\Listener\\UserListener::sync",
                "App\\Repository\\UserRepository::__construct",
            ]
        );

        assert_eq!(verdicts[0].kind, Some(ClassKind::Class));
        assert_eq!(verdicts[4].kind, None);

        let summary = UsageSummary::from_verdicts(&verdicts);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.unresolved, 1);
        assert_eq!(summary.unused, 2);
    }
}
