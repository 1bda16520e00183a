use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::models::{ConnectionProfile, ProfileName, CURRENT_ENTRY};
use crate::storage::codec;

/// Read and decrypt a profile.
///
/// With no name (or the literal `current`) the current pointer is resolved
/// first. A pointer whose target has gone missing is reported as
/// `DanglingCurrentPointer`, not `NotFound`.
pub fn read_profile(config: &StoreConfig, name: Option<&str>) -> Result<ConnectionProfile> {
    let cipher = config.cipher()?;
    let store = config.profiles();

    let (name, bytes) = match name.filter(|n| *n != CURRENT_ENTRY) {
        Some(name) => {
            let name = ProfileName::new(name)?;
            let bytes = store.get(&name)?;
            (name, bytes)
        }
        None => {
            let name = config.pointer().resolve()?.ok_or_else(|| StoreError::NotFound {
                name: CURRENT_ENTRY.to_string(),
            })?;
            debug!(name = %name, "Resolved current connection");
            let bytes = store.get(&name).map_err(|e| match e {
                StoreError::NotFound { name } => StoreError::DanglingCurrentPointer { name },
                other => other,
            })?;
            (name, bytes)
        }
    };

    let record = codec::decode(&bytes, &store.path(&name))?;
    let password = cipher.open(&record.password)?;

    Ok(ConnectionProfile {
        host: record.host,
        port: record.port,
        database: record.database,
        user: record.user,
        password,
        ssl_mode: record.ssl_mode,
    })
}
