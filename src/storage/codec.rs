//! JSON encoding for profile records.

use std::path::Path;

use tracing::warn;

use crate::error::{Result, StoreError};
use crate::models::StoredProfile;

/// Field written by an older schema that tracked "current" inside each record.
const LEGACY_CURRENT_FIELD: &str = "isCurrent";

/// Encode a record bound for `path` as pretty-printed JSON with a trailing
/// newline.
pub fn encode(profile: &StoredProfile, path: &Path) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(profile).map_err(|e| StoreError::MalformedRecord {
        path: path.to_path_buf(),
        reason: format!("failed to serialize record: {e}"),
    })?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decode and validate a record read from `path`.
pub fn decode(bytes: &[u8], path: &Path) -> Result<StoredProfile> {
    let malformed = |reason: String| StoreError::MalformedRecord {
        path: path.to_path_buf(),
        reason,
    };

    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| malformed(format!("invalid JSON: {e}")))?;

    if value.get(LEGACY_CURRENT_FIELD).is_some() {
        warn!(path = %path.display(), "Legacy connection record with isCurrent field");
        return Err(malformed(format!(
            "legacy schema (`{LEGACY_CURRENT_FIELD}` field) is not supported; delete and recreate this connection"
        )));
    }

    let profile: StoredProfile =
        serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;
    profile.validate().map_err(malformed)?;
    Ok(profile)
}
