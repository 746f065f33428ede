//! Persistent home location
//!
//! The home location is stored as a fixed 16-byte record:
//!
//! | Offset | Size | Field                          |
//! |--------|------|--------------------------------|
//! | 0      | 4    | Magic `HOME`                   |
//! | 4      | 4    | Latitude, degrees ×1e7 (LE)    |
//! | 8      | 4    | Longitude, degrees ×1e7 (LE)   |
//! | 12     | 4    | Altitude, centimeters (LE)     |
//!
//! The storage medium is behind [`HomeStore`]; an erased or foreign record
//! reads back as "no home".

use antenna_tracker_core::navigation::Location;

/// Size of an encoded home record
pub const HOME_RECORD_LEN: usize = 16;

const HOME_MAGIC: [u8; 4] = *b"HOME";

/// Home storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage read failed")]
    ReadFailed,

    #[error("storage write failed")]
    WriteFailed,

    #[error("stored record is corrupt")]
    Corrupt,
}

/// Persistent storage for the home location
pub trait HomeStore {
    /// Stored home, `Ok(None)` when nothing has been saved yet
    fn load(&mut self) -> Result<Option<Location>, StorageError>;

    /// Replace the stored home
    fn save(&mut self, home: &Location) -> Result<(), StorageError>;
}

/// Encode a home record
pub fn encode_home(home: &Location) -> [u8; HOME_RECORD_LEN] {
    let mut record = [0u8; HOME_RECORD_LEN];
    record[0..4].copy_from_slice(&HOME_MAGIC);
    record[4..8].copy_from_slice(&home.lat.to_le_bytes());
    record[8..12].copy_from_slice(&home.lng.to_le_bytes());
    record[12..16].copy_from_slice(&home.alt_cm.to_le_bytes());
    record
}

/// Decode a home record.
///
/// Returns `Ok(None)` for an erased record (all 0xFF or all zero) and
/// [`StorageError::Corrupt`] for anything else that is not a plausible home.
pub fn decode_home(record: &[u8]) -> Result<Option<Location>, StorageError> {
    if record.len() < HOME_RECORD_LEN {
        return Err(StorageError::Corrupt);
    }
    let record = &record[..HOME_RECORD_LEN];
    if record.iter().all(|b| *b == 0xFF) || record.iter().all(|b| *b == 0) {
        return Ok(None);
    }
    if record[0..4] != HOME_MAGIC {
        return Err(StorageError::Corrupt);
    }

    let field = |offset: usize| {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&record[offset..offset + 4]);
        i32::from_le_bytes(bytes)
    };
    let home = Location::new(field(4), field(8), field(12));
    if !home.is_plausible() {
        return Err(StorageError::Corrupt);
    }
    Ok(Some(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_record_layout() {
        let home = Location::new(-353_632_620, 1_491_652_300, 58_400);
        let record = encode_home(&home);
        assert_eq!(&record[0..4], b"HOME");
        assert_eq!(&record[12..16], &58_400i32.to_le_bytes());
        assert_eq!(decode_home(&record), Ok(Some(home)));
    }

    #[test]
    fn test_erased_record_is_empty() {
        assert_eq!(decode_home(&[0xFF; HOME_RECORD_LEN]), Ok(None));
        assert_eq!(decode_home(&[0; HOME_RECORD_LEN]), Ok(None));
    }

    #[test]
    fn test_corrupt_records() {
        let mut record = encode_home(&Location::new(100, 200, 0));
        record[0] = b'X';
        assert_eq!(decode_home(&record), Err(StorageError::Corrupt));
        assert_eq!(decode_home(&record[..8]), Err(StorageError::Corrupt));

        // latitude beyond 90 degrees
        let bad = encode_home(&Location::new(950_000_000, 0, 0));
        assert_eq!(decode_home(&bad), Err(StorageError::Corrupt));
    }
}
