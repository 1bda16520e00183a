mod support;

use anyhow::Result;
use psqlcm::app::{self, CreateOptions};
use psqlcm::cipher::KeyPolicy;
use psqlcm::{StoreConfig, StoreError};
use tempfile::TempDir;

use support::{keyed_config, local_profile};

#[test]
fn create_without_key_fails_before_touching_store() -> Result<()> {
    let dir = TempDir::new()?;
    let store_dir = dir.path().join("psqlcm");
    let config = StoreConfig::new(&store_dir);

    let err = app::create_profile(&config, &local_profile("secret"), CreateOptions::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::KeyMissing { ref var } if var == "PSQLCM_KEY"));
    assert!(!store_dir.exists());
    Ok(())
}

#[test]
fn read_without_key_fails_before_touching_store() -> Result<()> {
    let dir = TempDir::new()?;
    // A store dir that cannot be read would otherwise produce an Io error.
    let config = StoreConfig::new(dir.path().join("missing"));

    let err = app::read_profile(&config, None).unwrap_err();
    assert!(matches!(err, StoreError::KeyMissing { .. }), "{err:?}");
    let err = app::read_profile(&config, Some("anything")).unwrap_err();
    assert!(matches!(err, StoreError::KeyMissing { .. }), "{err:?}");
    Ok(())
}

#[test]
fn empty_key_counts_as_missing() -> Result<()> {
    let dir = TempDir::new()?;
    let config = StoreConfig::new(dir.path()).with_key("");

    let err = app::create_profile(&config, &local_profile("secret"), CreateOptions::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::KeyMissing { .. }));
    Ok(())
}

#[test]
fn list_and_delete_do_not_need_key() -> Result<()> {
    let dir = TempDir::new()?;
    let keyed = keyed_config(dir.path());
    let name = app::create_profile(&keyed, &local_profile("secret"), CreateOptions::default())?;

    let unkeyed = StoreConfig::new(dir.path());
    assert_eq!(app::list_profiles(&unkeyed)?.len(), 1);
    app::delete_profile(&unkeyed, name.as_str())?;
    assert!(app::list_profiles(&unkeyed)?.is_empty());
    Ok(())
}

#[test]
fn strict_policy_rejects_short_key() -> Result<()> {
    let dir = TempDir::new()?;
    let config = StoreConfig::new(dir.path())
        .with_key("short")
        .with_key_policy(KeyPolicy::Strict);

    let err = app::create_profile(&config, &local_profile("secret"), CreateOptions::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidKeyLength { len: 5, .. }));
    Ok(())
}

#[test]
fn non_utf8_key_bytes_seal_and_open() -> Result<()> {
    let dir = TempDir::new()?;
    let raw_key = vec![0xc3, 0x28, b'k', b'e', b'y', 0xff];
    let config = StoreConfig::new(dir.path()).with_key(raw_key.clone());

    app::create_profile(&config, &local_profile("secret"), CreateOptions::default())?;
    let shown = app::read_profile(&StoreConfig::new(dir.path()).with_key(raw_key), None)?;
    assert!(shown.connection_string().contains(":secret@"));

    let lossy = String::from_utf8_lossy(&[0xc3, 0x28, b'k', b'e', b'y', 0xff]).into_owned();
    let err = app::read_profile(&StoreConfig::new(dir.path()).with_key(lossy), None).unwrap_err();
    assert!(matches!(err, StoreError::AuthenticationFailure));
    Ok(())
}
