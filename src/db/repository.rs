//! JSON codec between typed record collections and the key-value store.
//!
//! Every collection lives under a single key as a serialized JSON array,
//! rewritten whole on each mutation.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{KeyValueStore, StoreError};

/// Load the array stored under `key`.
///
/// Returns `None` when the key is absent or holds JSON `null`, so callers can
/// tell a missing collection apart from an empty one.
pub fn load_collection<T, S>(store: &S, key: &str) -> Result<Option<Vec<T>>, StoreError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    load_record::<Vec<T>, S>(store, key)
}

/// Serialize `items` as a JSON array and write it under `key`.
pub fn save_collection<T, S>(store: &S, key: &str, items: &[T]) -> Result<(), StoreError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    save_record(store, key, items)
}

/// Load a single JSON value stored under `key`.
pub fn load_record<T, S>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str::<Option<T>>(&raw).map_err(|source| StoreError::Json {
        key: key.to_string(),
        source,
    })
}

/// Serialize `value` as JSON and write it under `key`.
pub fn save_record<T, S>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Json {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

/// Next sequential id: one past the largest existing id, 1 when there are none.
pub fn next_id(ids: impl IntoIterator<Item = u64>) -> Result<u64, StoreError> {
    match ids.into_iter().max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(StoreError::IdsExhausted),
    }
}
