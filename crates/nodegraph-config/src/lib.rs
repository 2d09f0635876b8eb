pub mod config;

pub use config::{AppConfig, KeyRepeatSettings, CONFIG_PATH_ENV};
