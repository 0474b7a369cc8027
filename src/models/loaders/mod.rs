pub mod toml_loader;

pub use toml_loader::{load_registry_file, parse_registry};
