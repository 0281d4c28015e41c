mod loader;

pub use loader::{Config, PackagesConfig, ProviderToggle, ProvidersConfig, ReportConfig, RuntimeConfig};
