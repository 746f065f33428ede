//! In-memory collaborators for tests and host runs
//!
//! Each mock records what the tracker did to it so tests can assert on it.

mod actuators;
mod home;

pub use actuators::RecordingActuators;
pub use home::MemoryHomeStore;

use super::Platform;
use crate::communication::MemoryLink;
use antenna_tracker_core::traits::MockTime;
use core::marker::PhantomData;

/// Platform made of in-memory collaborators sharing a test clock
pub struct MockPlatform<'a> {
    _time: PhantomData<&'a MockTime>,
}

impl<'a> Platform for MockPlatform<'a> {
    type Time = &'a MockTime;
    type Actuators = RecordingActuators;
    type HomeStore = MemoryHomeStore;
    type Link = MemoryLink;
}
