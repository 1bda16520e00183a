use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::Result;
use crate::models::{ProfileName, CURRENT_ENTRY};

use super::types::ProfileEntry;

/// All stored profiles in lexical order, with the current one marked.
///
/// Does not need the cipher key.
pub fn list_profiles(config: &StoreConfig) -> Result<Vec<ProfileEntry>> {
    let entries = config.profiles().list()?;
    let current = config.pointer().resolve()?;

    let mut output = Vec::new();
    for name in entries {
        if name == CURRENT_ENTRY {
            continue;
        }
        if !ProfileName::is_valid(&name) {
            debug!(entry = %name, "Skipping non-profile store entry");
            continue;
        }
        let is_current = current.as_ref().is_some_and(|c| c.as_str() == name);
        output.push(ProfileEntry {
            name,
            current: is_current,
        });
    }

    if let Some(current) = current {
        if !output.iter().any(|e| e.current) {
            warn!(name = %current, "Current pointer targets a missing connection");
        }
    }

    Ok(output)
}
