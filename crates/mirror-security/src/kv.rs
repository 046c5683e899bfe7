//! Spin key-value bucket store.

use spin_sdk::key_value::Store;

use crate::limits::{BucketState, BucketStore, LimitsError};

/// Throttle buckets in a Spin key-value store, shared by every instance of
/// the component.
pub struct KvBucketStore {
    store: Store,
}

impl KvBucketStore {
    /// Open a named key-value store.
    pub fn open(name: &str) -> Result<Self, LimitsError> {
        let store = Store::open(name).map_err(|e| LimitsError::Store(e.to_string()))?;
        Ok(Self { store })
    }
}

impl BucketStore for KvBucketStore {
    fn load(&self, key: &str) -> Result<Option<BucketState>, LimitsError> {
        match self.store.get(key) {
            Ok(Some(bytes)) => BucketState::from_bytes(&bytes).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(LimitsError::Store(e.to_string())),
        }
    }

    fn save(&self, key: &str, bucket: &BucketState) -> Result<(), LimitsError> {
        let bytes = bucket.to_bytes()?;
        self.store
            .set(key, &bytes)
            .map_err(|e| LimitsError::Store(e.to_string()))
    }
}
