mod filesystem;
mod loader;
mod model;

pub use filesystem::{FileSystem, RealFileSystem};
pub use loader::{ConfigLoader, FileConfigLoader};
pub use model::{
    CONFIG_VERSION, Config, DEFAULT_EXCLUSION_REF, DEFAULT_MAX_DEPTH, DEFAULT_PREFIX,
    DEFAULT_REMOTE, DEFAULT_SNAPSHOT_REF, InvestigateConfig, LedgerConfig, MetricsConfig,
    ModulesConfig, PluginsConfig, ReportConfig,
};
