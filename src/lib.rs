//! memberusage - Framework usage providers for PHP dead code analysis
//!
//! A static analyzer reports every method without a textual reference as
//! dead code. Frameworks call many methods indirectly (interfaces, attributes,
//! naming conventions), so this library decides which of those findings to
//! suppress.
//!
//! # Architecture
//!
//! The decision pipeline consists of:
//! 1. **Metadata** - Class/method descriptors exported by the host analyzer
//! 2. **Runtime** - Capability gate for attribute support
//! 3. **Packages** - Installed-package detection to auto-enable providers
//! 4. **Providers** - Convention rules per framework, combined in a registry
//! 5. **Analysis** - Verdicts for every member or for reported findings
//! 6. **Reporting** - Output results in various formats

pub mod analysis;
pub mod config;
pub mod metadata;
pub mod packages;
pub mod providers;
pub mod report;
pub mod runtime;

pub use analysis::{Candidate, MemberVerdict, UsageAnalyzer, UsageSummary};
pub use config::Config;
pub use metadata::{ClassDescriptor, ClassIndex, MetadataAccessor, MethodDescriptor};
pub use packages::{InstalledPackages, PackageDetector};
pub use providers::{DoctrineUsageProvider, MemberUsageProvider, ProviderRegistry, UsageRule, Verdict};
pub use report::{ReportFormat, Reporter};
pub use runtime::{Capabilities, RuntimeVersion};
