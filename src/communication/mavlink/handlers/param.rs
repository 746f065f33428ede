//! MAVLink Parameter Protocol Handler
//!
//! Implements parameter read/write for Ground Control Stations on top of the
//! core [`ParameterStore`].
//!
//! # Supported Messages
//!
//! - **PARAM_REQUEST_LIST**: Stream all visible parameters, a few per tick
//! - **PARAM_REQUEST_READ**: Send one parameter by index or name
//! - **PARAM_SET**: Update a parameter, answered with its new PARAM_VALUE
//!
//! Values travel as `f32` and are converted back to the registered type by
//! the store.

use antenna_tracker_core::parameters::{ParamValue, ParameterError, ParameterStore};
use heapless::Vec;
use mavlink::common::{
    MavMessage, MavParamType, PARAM_REQUEST_READ_DATA, PARAM_SET_DATA, PARAM_VALUE_DATA,
};

/// PARAM_VALUE messages sent per list batch
pub const PARAM_BATCH: usize = 4;

/// Parameter protocol handler
#[derive(Debug, Default)]
pub struct ParamHandler {
    /// Next index to send while a list request is in progress
    list_cursor: Option<usize>,
}

fn param_name(param_id: &[u8; 16]) -> Option<&str> {
    let end = param_id.iter().position(|b| *b == 0).unwrap_or(param_id.len());
    core::str::from_utf8(&param_id[..end]).ok()
}

impl ParamHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start streaming the full parameter list
    pub fn handle_request_list(&mut self) {
        crate::log_debug!("PARAM_REQUEST_LIST received");
        self.list_cursor = Some(0);
    }

    /// True while a list request still has parameters to send
    pub fn list_in_progress(&self) -> bool {
        self.list_cursor.is_some()
    }

    /// Next batch of PARAM_VALUE messages for an active list request
    pub fn next_list_batch(&mut self, store: &ParameterStore) -> Vec<MavMessage, PARAM_BATCH> {
        let mut messages = Vec::new();
        let Some(start) = self.list_cursor else {
            return messages;
        };

        let count = store.count();
        let mut index = start;
        for name in store.iter_names().skip(start) {
            if messages.is_full() {
                break;
            }
            if let Some(msg) = Self::param_value(store, name.as_str(), index, count) {
                let _ = messages.push(msg);
            }
            index += 1;
        }

        self.list_cursor = if index >= count { None } else { Some(index) };
        messages
    }

    /// Handle PARAM_REQUEST_READ: by index when `param_index >= 0`, else by name
    pub fn handle_request_read(
        &self,
        store: &ParameterStore,
        data: &PARAM_REQUEST_READ_DATA,
    ) -> Option<MavMessage> {
        let count = store.count();
        if data.param_index >= 0 {
            let index = data.param_index as usize;
            let name = store.iter_names().nth(index)?;
            return Self::param_value(store, name.as_str(), index, count);
        }

        let name = param_name(&data.param_id)?;
        let index = store.iter_names().position(|n| n.as_str() == name)?;
        Self::param_value(store, name, index, count)
    }

    /// Handle PARAM_SET, returning the PARAM_VALUE to echo back
    pub fn handle_set(
        &mut self,
        store: &mut ParameterStore,
        data: &PARAM_SET_DATA,
    ) -> Result<MavMessage, ParameterError> {
        let name = param_name(&data.param_id).ok_or(ParameterError::UnknownParameter)?;
        store.set(name, ParamValue::Float(data.param_value))?;
        crate::log_info!("Parameter {} set to {}", name, data.param_value);

        let count = store.count();
        let index = store
            .iter_names()
            .position(|n| n.as_str() == name)
            .ok_or(ParameterError::UnknownParameter)?;
        Self::param_value(store, name, index, count).ok_or(ParameterError::UnknownParameter)
    }

    fn param_value(store: &ParameterStore, name: &str, index: usize, count: usize) -> Option<MavMessage> {
        let value = store.get(name)?;

        let mut param_id = [0u8; 16];
        let bytes = name.as_bytes();
        let len = bytes.len().min(param_id.len());
        param_id[..len].copy_from_slice(&bytes[..len]);

        let param_type = match value {
            ParamValue::Bool(_) => MavParamType::MAV_PARAM_TYPE_UINT8,
            ParamValue::Int(_) => MavParamType::MAV_PARAM_TYPE_INT32,
            ParamValue::Float(_) => MavParamType::MAV_PARAM_TYPE_REAL32,
        };

        Some(MavMessage::PARAM_VALUE(PARAM_VALUE_DATA {
            param_value: value.as_f32(),
            param_count: count as u16,
            param_index: index as u16,
            param_id,
            param_type,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antenna_tracker_core::parameters::{ParamFlags, TrackerParams};

    fn store() -> ParameterStore {
        let mut store = ParameterStore::new();
        store
            .register("SR_POSITION", ParamValue::Int(2), ParamFlags::empty())
            .unwrap();
        store
            .register("TRK_TIMEOUT", ParamValue::Float(5.0), ParamFlags::empty())
            .unwrap();
        store
            .register("YAW_REV", ParamValue::Bool(false), ParamFlags::empty())
            .unwrap();
        store
            .register("DEV_OPTIONS", ParamValue::Int(0), ParamFlags::HIDDEN)
            .unwrap();
        store
    }

    fn id(name: &str) -> [u8; 16] {
        let mut param_id = [0u8; 16];
        param_id[..name.len()].copy_from_slice(name.as_bytes());
        param_id
    }

    #[test]
    fn test_request_list_in_batches() {
        let mut store = ParameterStore::new();
        TrackerParams::register_defaults(&mut store).unwrap();
        let total = store.count();

        let mut handler = ParamHandler::new();
        assert!(handler.next_list_batch(&store).is_empty());

        handler.handle_request_list();
        let mut sent = 0;
        while handler.list_in_progress() {
            let batch = handler.next_list_batch(&store);
            assert!(!batch.is_empty());
            for msg in &batch {
                if let MavMessage::PARAM_VALUE(data) = msg {
                    assert_eq!(data.param_index as usize, sent);
                    assert_eq!(data.param_count as usize, total);
                    sent += 1;
                }
            }
        }
        assert_eq!(sent, total);
    }

    #[test]
    fn test_request_read_by_name_and_index() {
        let store = store();
        let handler = ParamHandler::new();

        let by_name = PARAM_REQUEST_READ_DATA {
            param_index: -1,
            param_id: id("TRK_TIMEOUT"),
            ..Default::default()
        };
        match handler.handle_request_read(&store, &by_name) {
            Some(MavMessage::PARAM_VALUE(data)) => {
                assert_eq!(data.param_value, 5.0);
                assert_eq!(data.param_type, MavParamType::MAV_PARAM_TYPE_REAL32);
                assert_eq!(data.param_count, 3);
            }
            other => panic!("unexpected {:?}", other),
        }

        let by_index = PARAM_REQUEST_READ_DATA {
            param_index: 0,
            ..Default::default()
        };
        assert!(handler.handle_request_read(&store, &by_index).is_some());

        let hidden = PARAM_REQUEST_READ_DATA {
            param_index: -1,
            param_id: id("DEV_OPTIONS"),
            ..Default::default()
        };
        assert!(handler.handle_request_read(&store, &hidden).is_none());
    }

    #[test]
    fn test_param_set_keeps_type() {
        let mut store = store();
        let mut handler = ParamHandler::new();

        let set = PARAM_SET_DATA {
            param_value: 7.0,
            param_id: id("SR_POSITION"),
            param_type: MavParamType::MAV_PARAM_TYPE_REAL32,
            ..Default::default()
        };
        match handler.handle_set(&mut store, &set) {
            Ok(MavMessage::PARAM_VALUE(data)) => {
                assert_eq!(data.param_value, 7.0);
                assert_eq!(data.param_type, MavParamType::MAV_PARAM_TYPE_INT32);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(store.get("SR_POSITION"), Some(&ParamValue::Int(7)));
    }

    #[test]
    fn test_param_set_unknown() {
        let mut store = store();
        let mut handler = ParamHandler::new();
        let set = PARAM_SET_DATA {
            param_value: 1.0,
            param_id: id("NOPE"),
            ..Default::default()
        };
        assert_eq!(
            handler.handle_set(&mut store, &set).err(),
            Some(ParameterError::UnknownParameter)
        );
    }
}
