//! Telemetry link abstraction
//!
//! The link owns framing and transport. Receiving never blocks: an empty
//! queue returns `None`. Sending either completes or fails immediately; the
//! tracker queues what could not be sent and retries from a scheduler task.

use mavlink::common::MavMessage;
use mavlink::MavHeader;
use std::collections::VecDeque;

/// Link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("transmit buffer full")]
    WouldBlock,

    #[error("link disconnected")]
    Disconnected,
}

/// Bidirectional, non-blocking MAVLink link
pub trait TelemetryLink {
    /// Next decoded inbound message, `None` when nothing is pending
    fn receive(&mut self) -> Option<(MavHeader, MavMessage)>;

    /// Send one message
    fn send(&mut self, header: &MavHeader, message: &MavMessage) -> Result<(), LinkError>;
}

/// In-memory link for tests and loopback use.
///
/// Inbound messages are injected with [`MemoryLink::inject`]; outbound ones are
/// collected and can be drained with [`MemoryLink::take_sent`].
#[derive(Debug, Default)]
pub struct MemoryLink {
    inbound: VecDeque<(MavHeader, MavMessage)>,
    sent: Vec<(MavHeader, MavMessage)>,
    would_block: bool,
    connected: bool,
}

impl MemoryLink {
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Default::default()
        }
    }

    /// Queue a message as if it had arrived from `system_id`
    pub fn inject(&mut self, system_id: u8, component_id: u8, message: MavMessage) {
        let header = MavHeader {
            system_id,
            component_id,
            sequence: 0,
        };
        self.inbound.push_back((header, message));
    }

    pub fn pending_inbound(&self) -> usize {
        self.inbound.len()
    }

    /// Make every send fail with `WouldBlock` until cleared
    pub fn set_would_block(&mut self, would_block: bool) {
        self.would_block = would_block;
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Messages sent so far, oldest first
    pub fn sent(&self) -> impl Iterator<Item = &MavMessage> {
        self.sent.iter().map(|(_, message)| message)
    }

    /// Drain the sent messages
    pub fn take_sent(&mut self) -> Vec<MavMessage> {
        self.sent.drain(..).map(|(_, message)| message).collect()
    }

    pub fn sent_headers(&self) -> impl Iterator<Item = &MavHeader> {
        self.sent.iter().map(|(header, _)| header)
    }
}

impl TelemetryLink for MemoryLink {
    fn receive(&mut self) -> Option<(MavHeader, MavMessage)> {
        self.inbound.pop_front()
    }

    fn send(&mut self, header: &MavHeader, message: &MavMessage) -> Result<(), LinkError> {
        if !self.connected {
            return Err(LinkError::Disconnected);
        }
        if self.would_block {
            return Err(LinkError::WouldBlock);
        }
        self.sent.push((*header, message.clone()));
        Ok(())
    }
}
