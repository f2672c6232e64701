use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

use crate::store::kv::KvStore;

pub const ACTIVE_USER_KEY: &str = "cotes_active_user";
pub const SESSIONS_KEY: &str = "cotes_sessions";
pub const USERS_KEY: &str = "cotes_users";

/// Suffix of the key an unparseable value is copied to before it is ignored.
pub const CORRUPT_SUFFIX: &str = "_corrupt";

/// Load and deserialize a value. Absent keys and values that fail to parse
/// both come back as `None`. An unparseable value is first copied to
/// `<key>_corrupt` so the next write under `key` cannot lose it.
pub fn load_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            let backup = format!("{key}{CORRUPT_SUFFIX}");
            store.set(&backup, &raw)?;
            tracing::warn!(key, backup = %backup, error = %e, "ignoring unparseable stored value");
            Ok(None)
        }
    }
}

/// Like [`load_json`] but falls back to `T::default()`.
pub fn load_json_or_default<T: DeserializeOwned + Default>(
    store: &dyn KvStore,
    key: &str,
) -> Result<T> {
    Ok(load_json(store, key)?.unwrap_or_default())
}

/// Serialize `data` and write it under `key` as a single value.
pub fn save_json<T: Serialize>(store: &dyn KvStore, key: &str, data: &T) -> Result<()> {
    let json = serde_json::to_string(data)?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::MemoryKvStore;

    #[test]
    fn test_absent_key_loads_default() {
        let store = MemoryKvStore::new();
        let users: Vec<String> = load_json_or_default(&store, USERS_KEY).unwrap();
        assert!(users.is_empty());
    }

    #[test]
    fn test_corrupt_value_treated_as_absent() {
        let store = MemoryKvStore::new();
        store.set(SESSIONS_KEY, "{not json").unwrap();
        let loaded: Option<Vec<u32>> = load_json(&store, SESSIONS_KEY).unwrap();
        assert!(loaded.is_none());
        assert_eq!(
            store.get("cotes_sessions_corrupt").unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn test_valid_value_leaves_no_backup() {
        let store = MemoryKvStore::new();
        store.set(USERS_KEY, "[]").unwrap();
        let _: Vec<u32> = load_json_or_default(&store, USERS_KEY).unwrap();
        assert_eq!(store.get("cotes_users_corrupt").unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryKvStore::new();
        save_json(&store, SESSIONS_KEY, &vec![1u32, 2, 3]).unwrap();
        let loaded: Vec<u32> = load_json_or_default(&store, SESSIONS_KEY).unwrap();
        assert_eq!(loaded, vec![1, 2, 3]);
    }
}
