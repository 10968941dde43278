//! Grid configuration persistence.
//! Settings live in a TOML file under the platform config directory.

mod service;

pub use service::SettingsService;
