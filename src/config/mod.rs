//! Project configuration loaded from `.repovault.toml`.

pub mod settings;

pub use settings::Settings;
