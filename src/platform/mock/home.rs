//! In-memory home storage

use crate::home::{decode_home, encode_home, HomeStore, StorageError, HOME_RECORD_LEN};
use antenna_tracker_core::navigation::Location;

/// Home store backed by a single in-memory record.
///
/// Starts erased (0xFF). Writes can be made to fail for error-path tests.
#[derive(Debug, Clone)]
pub struct MemoryHomeStore {
    record: [u8; HOME_RECORD_LEN],
    fail_writes: bool,
    writes: u32,
}

impl MemoryHomeStore {
    pub fn new() -> Self {
        Self {
            record: [0xFF; HOME_RECORD_LEN],
            fail_writes: false,
            writes: 0,
        }
    }

    /// Store pre-populated with `home`
    pub fn with_home(home: Location) -> Self {
        Self {
            record: encode_home(&home),
            ..Self::new()
        }
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Successful writes so far
    pub fn writes(&self) -> u32 {
        self.writes
    }

    pub fn raw(&self) -> &[u8; HOME_RECORD_LEN] {
        &self.record
    }

    /// Overwrite the raw record (corruption tests)
    pub fn set_raw(&mut self, record: [u8; HOME_RECORD_LEN]) {
        self.record = record;
    }
}

impl Default for MemoryHomeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HomeStore for MemoryHomeStore {
    fn load(&mut self) -> Result<Option<Location>, StorageError> {
        decode_home(&self.record)
    }

    fn save(&mut self, home: &Location) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::WriteFailed);
        }
        self.record = encode_home(home);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_starts_empty() {
        let mut store = MemoryHomeStore::new();
        assert_eq!(store.load(), Ok(None));
    }

    #[test]
    fn test_memory_store_save_and_load() {
        let mut store = MemoryHomeStore::new();
        let home = Location::new(473_977_418, 85_455_939, 48_800);
        store.save(&home).unwrap();
        assert_eq!(store.load(), Ok(Some(home)));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_memory_store_failed_write_keeps_record() {
        let home = Location::new(473_977_418, 85_455_939, 48_800);
        let mut store = MemoryHomeStore::with_home(home);
        store.set_fail_writes(true);
        assert_eq!(
            store.save(&Location::new(1, 2, 3)),
            Err(StorageError::WriteFailed)
        );
        assert_eq!(store.load(), Ok(Some(home)));
        assert_eq!(store.writes(), 0);
    }
}
