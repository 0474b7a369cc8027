pub mod loaders;
pub mod registry;
pub mod vendor;

pub use loaders::{load_registry_file, parse_registry};
pub use registry::Registry;
pub use vendor::{
    DownloadResult, InteractiveConfig, StaticLinkConfig, StrategyConfig, StrategyKind,
    VendorEntry,
};
