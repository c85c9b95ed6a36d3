//! Document schema versioning.
//!
//! Stored documents carry a `schemaVersion` field. Documents written before
//! versioning existed have none and are treated as version 0. Upgrades run
//! on the raw JSON value, before it is decoded into a [`super::Document`],
//! so that a migration can reshape fields the current types no longer accept.

use serde_json::{Map, Value};
use tracing::info;

use crate::error::{Error, Result};

/// The current document schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Key holding the schema version inside the document.
const VERSION_KEY: &str = "schemaVersion";

/// Collections every document must have.
const COLLECTIONS: [&str; 5] = ["users", "ships", "components", "jobs", "notifications"];

/// Bring `value` up to [`CURRENT_VERSION`].
///
/// Returns `true` if anything was changed, meaning the caller should write
/// the upgraded document back.
///
/// # Errors
///
/// Returns [`Error::CorruptStore`] if the value is not a document at all and
/// [`Error::Migration`] if it was written by a newer version.
pub fn upgrade(value: &mut Value) -> Result<bool> {
    let doc = value
        .as_object_mut()
        .ok_or_else(|| Error::corrupt("document is not a JSON object"))?;

    let version = schema_version(doc)?;
    if version > CURRENT_VERSION {
        return Err(Error::Migration {
            message: format!(
                "document version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    let mut current = version;
    while current < CURRENT_VERSION {
        current += 1;
        run_migration(doc, current)?;
    }

    if version < CURRENT_VERSION {
        info!("Upgraded document from version {} to {}", version, current);
    }
    Ok(version < CURRENT_VERSION)
}

/// Read the schema version. Returns 0 if none is set (unversioned document).
fn schema_version(doc: &Map<String, Value>) -> Result<u32> {
    match doc.get(VERSION_KEY) {
        None => Ok(0),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| Error::Migration {
                message: format!("invalid schema version: {v}"),
            }),
    }
}

/// Run a specific migration version.
fn run_migration(doc: &mut Map<String, Value>, version: u32) -> Result<()> {
    match version {
        1 => migrate_v1(doc),
        _ => Err(Error::Migration {
            message: format!("unknown migration version: {version}"),
        }),
    }
}

/// Migration to version 1: stamp the version on an unversioned document.
///
/// The record layout is unchanged, so this only checks that every collection
/// is present.
fn migrate_v1(doc: &mut Map<String, Value>) -> Result<()> {
    for name in COLLECTIONS {
        match doc.get(name) {
            Some(Value::Array(_)) => {}
            Some(_) => return Err(Error::corrupt(format!("`{name}` is not an array"))),
            None => return Err(Error::corrupt(format!("missing collection `{name}`"))),
        }
    }
    doc.insert(VERSION_KEY.to_string(), Value::from(1));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn legacy() -> Value {
        json!({
            "users": [],
            "ships": [],
            "components": [],
            "jobs": [],
            "notifications": []
        })
    }

    #[test]
    fn test_upgrade_stamps_unversioned_document() {
        let mut value = legacy();
        assert!(upgrade(&mut value).unwrap());
        assert_eq!(value[VERSION_KEY], json!(CURRENT_VERSION));
    }

    #[test]
    fn test_upgrade_current_is_noop() {
        let mut value = legacy();
        upgrade(&mut value).unwrap();
        let before = value.clone();
        assert!(!upgrade(&mut value).unwrap());
        assert_eq!(value, before);
    }

    #[test]
    fn test_upgrade_rejects_newer_version() {
        let mut value = legacy();
        value[VERSION_KEY] = json!(CURRENT_VERSION + 1);
        let err = upgrade(&mut value).unwrap_err();
        assert!(matches!(err, Error::Migration { .. }));
        assert_eq!(err.kind(), ErrorKind::CorruptStore);
    }

    #[test]
    fn test_upgrade_rejects_missing_collection() {
        let mut value = json!({ "users": [], "ships": [] });
        let err = upgrade(&mut value).unwrap_err();
        assert!(err.to_string().contains("components"));
        assert_eq!(err.kind(), ErrorKind::CorruptStore);
    }

    #[test]
    fn test_upgrade_rejects_non_object() {
        let mut value = json!([1, 2, 3]);
        assert!(matches!(
            upgrade(&mut value).unwrap_err(),
            Error::CorruptStore { .. }
        ));
    }

    #[test]
    fn test_invalid_version_value() {
        let mut value = legacy();
        value[VERSION_KEY] = json!("one");
        let err = upgrade(&mut value).unwrap_err();
        assert!(err.to_string().contains("invalid schema version"));
    }
}
