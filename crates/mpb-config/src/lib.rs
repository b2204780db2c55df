//! Bridge configuration loading and validation.

pub mod config;

pub use config::{APP_NAME, BridgeConfig, PublishOptions, SiteConfig, StoreConfig};
