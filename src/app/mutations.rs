use secrecy::ExposeSecret;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::models::{ConnectionProfile, ProfileName, StoredProfile};
use crate::storage::codec;

/// Options for `create_profile`.
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Profile name; `pg<unix-millis>` is generated when absent.
    pub name: Option<String>,
    /// Point `current` at the new profile once it is written.
    pub set_current: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            name: None,
            set_current: true,
        }
    }
}

pub fn create_profile(
    config: &StoreConfig,
    profile: &ConnectionProfile,
    options: CreateOptions,
) -> Result<ProfileName> {
    create_profile_with(config, profile, options, &SystemClock)
}

/// Seal, encode and write a profile, then optionally make it current.
///
/// An existing profile of the same name is replaced. If repointing fails
/// the record stays written.
pub fn create_profile_with(
    config: &StoreConfig,
    profile: &ConnectionProfile,
    options: CreateOptions,
    clock: &dyn Clock,
) -> Result<ProfileName> {
    let cipher = config.cipher()?;
    let name = match options.name {
        Some(name) => ProfileName::new(name)?,
        None => ProfileName::generate(clock),
    };

    let store = config.profiles();
    let record = StoredProfile {
        host: profile.host.clone(),
        port: profile.port,
        database: profile.database.clone(),
        user: profile.user.clone(),
        password: cipher.seal(profile.password.expose_secret())?,
        ssl_mode: profile.ssl_mode,
    };
    record
        .validate()
        .map_err(|reason| StoreError::MalformedRecord {
            path: store.path(&name),
            reason,
        })?;

    let bytes = codec::encode(&record, &store.path(&name))?;
    store.put(&name, &bytes)?;
    if options.set_current {
        config.pointer().set(&name)?;
    }

    info!(name = %name, current = options.set_current, "Connection saved");
    Ok(name)
}

/// Delete a profile, clearing the current pointer first if it targets it.
pub fn delete_profile(config: &StoreConfig, name: &str) -> Result<()> {
    let name = ProfileName::new(name)?;
    let store = config.profiles();
    if !store.exists(&name)? {
        return Err(StoreError::NotFound {
            name: name.to_string(),
        });
    }

    let pointer = config.pointer();
    if pointer.is_current(&name)? {
        pointer.clear()?;
    }
    store.delete(&name)?;

    info!(name = %name, "Connection deleted");
    Ok(())
}

/// Make an existing profile current.
pub fn set_current(config: &StoreConfig, name: &str) -> Result<()> {
    let name = ProfileName::new(name)?;
    if !config.profiles().exists(&name)? {
        return Err(StoreError::NotFound {
            name: name.to_string(),
        });
    }

    config.pointer().set(&name)?;
    info!(name = %name, "Current connection set");
    Ok(())
}
