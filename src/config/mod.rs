/// Settings loading from config.toml
pub mod settings;

/// State file location and its environment override
pub mod storage;
