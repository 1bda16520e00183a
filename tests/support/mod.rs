#![allow(dead_code)]

use std::path::Path;

use psqlcm::models::{ConnectionProfile, SslMode};
use psqlcm::storage::PointerStyle;
use psqlcm::StoreConfig;
use secrecy::SecretString;

pub const TEST_KEY: &str = "an-example-key-for-tests";

pub fn keyed_config(dir: &Path) -> StoreConfig {
    StoreConfig::new(dir).with_key(TEST_KEY)
}

pub fn keyed_config_with_style(dir: &Path, style: PointerStyle) -> StoreConfig {
    keyed_config(dir).with_pointer_style(style)
}

pub fn local_profile(password: &str) -> ConnectionProfile {
    ConnectionProfile {
        host: "localhost".to_string(),
        port: 5432,
        database: "postgres".to_string(),
        user: "postgres".to_string(),
        password: SecretString::from(password.to_string()),
        ssl_mode: SslMode::Require,
    }
}

/// Pointer styles supported on this platform.
pub fn pointer_styles() -> Vec<PointerStyle> {
    if cfg!(unix) {
        vec![PointerStyle::Symlink, PointerStyle::File]
    } else {
        vec![PointerStyle::File]
    }
}
