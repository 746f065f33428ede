//! Tracker parameter table
//!
//! A flat name/value table holding every tunable the tracker exposes over
//! MAVLink. Typed views (`TrackerParams`, `ServoParams`) are rebuilt from it
//! whenever a value changes. Persisting the table is the platform's concern.

use super::error::ParameterError;
use bitflags::bitflags;
use heapless::index_map::FnvIndexMap;
use heapless::String;

/// MAVLink `param_id` width
pub const PARAM_NAME_LEN: usize = 16;

/// Table capacity
pub const MAX_PARAMS: usize = 64;

type Name = String<PARAM_NAME_LEN>;

bitflags! {
    /// Per-entry access flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Not listed or counted over MAVLink
        const HIDDEN = 1 << 0;
        /// Rejects PARAM_SET
        const READ_ONLY = 1 << 1;
    }
}

/// A parameter value; the variant fixed at registration is kept for life
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    Float(f32),
}

impl ParamValue {
    /// Wire representation (MAVLink carries every parameter as `f32`)
    pub fn as_f32(&self) -> f32 {
        match *self {
            ParamValue::Bool(true) => 1.0,
            ParamValue::Bool(false) => 0.0,
            ParamValue::Int(v) => v as f32,
            ParamValue::Float(v) => v,
        }
    }

    /// Convert `incoming` to this value's variant
    fn coerce(self, incoming: ParamValue) -> ParamValue {
        let raw = incoming.as_f32();
        match self {
            ParamValue::Bool(_) => ParamValue::Bool(raw != 0.0),
            ParamValue::Int(_) => ParamValue::Int(raw as i32),
            ParamValue::Float(_) => ParamValue::Float(raw),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: ParamValue,
    flags: ParamFlags,
}

impl Entry {
    fn visible(&self) -> bool {
        !self.flags.contains(ParamFlags::HIDDEN)
    }
}

/// Registered parameters in registration order, plus an unsaved-changes flag
#[derive(Default)]
pub struct ParameterStore {
    entries: FnvIndexMap<Name, Entry, MAX_PARAMS>,
    dirty: bool,
}

fn name(raw: &str) -> Result<Name, ParameterError> {
    Name::try_from(raw).map_err(|_| ParameterError::NameTooLong)
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, raw: &str) -> Option<&ParamValue> {
        let key = name(raw).ok()?;
        self.entries.get(&key).map(|entry| &entry.value)
    }

    /// Overwrite a registered parameter and mark the table dirty.
    ///
    /// The stored variant wins: a float sent to an integer parameter is
    /// truncated, which is how PARAM_SET delivers integers.
    pub fn set(&mut self, raw: &str, value: ParamValue) -> Result<(), ParameterError> {
        let key = name(raw)?;
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or(ParameterError::UnknownParameter)?;
        if entry.flags.contains(ParamFlags::READ_ONLY) {
            return Err(ParameterError::ReadOnly);
        }
        entry.value = entry.value.coerce(value);
        self.dirty = true;
        Ok(())
    }

    /// Add a parameter with its default. Registering a known name keeps the
    /// current value, so defaults can be registered over a loaded table.
    pub fn register(
        &mut self,
        raw: &str,
        default: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), ParameterError> {
        let key = name(raw)?;
        if self.entries.contains_key(&key) {
            return Ok(());
        }
        self.entries
            .insert(key, Entry { value: default, flags })
            .map_err(|_| ParameterError::StoreFull)?;
        self.dirty = true;
        Ok(())
    }

    /// Names visible over MAVLink, in registration order
    pub fn iter_names(&self) -> impl Iterator<Item = &Name> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.visible())
            .map(|(key, _)| key)
    }

    /// Visible parameter count, the `param_count` reported to the GCS
    pub fn count(&self) -> usize {
        self.entries.values().filter(|entry| entry.visible()).count()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// All entries including hidden ones
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Float parameter clamped into `[min, max]`; `default` when missing or NaN.
pub fn load_float(store: &ParameterStore, name: &str, default: f32, min: f32, max: f32) -> f32 {
    let value = match store.get(name) {
        Some(ParamValue::Float(v)) if v.is_finite() => *v,
        Some(ParamValue::Int(v)) => *v as f32,
        _ => return default,
    };
    value.clamp(min, max)
}

/// Integer parameter clamped into `[min, max]`; `default` when missing.
pub fn load_int(store: &ParameterStore, name: &str, default: i32, min: i32, max: i32) -> i32 {
    let value = match store.get(name) {
        Some(ParamValue::Float(v)) if !v.is_finite() => return default,
        Some(other) => other.as_f32() as i32,
        None => return default,
    };
    value.clamp(min, max)
}

pub fn load_bool(store: &ParameterStore, name: &str, default: bool) -> bool {
    store.get(name).map_or(default, |v| v.as_f32() != 0.0)
}
