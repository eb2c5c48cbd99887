mod pipewire;
mod pulse;

pub use pipewire::PipewireMixer;
pub use pulse::PulseMixer;

use crate::error::ToolError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mixer-native handle for one playback stream. Either backend may be
/// present on a system; ids from both are carried side by side.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StreamId {
    PipewireNode(u32),
    PulseSinkInput(u32),
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamId::PipewireNode(id) => write!(f, "pipewire node {}", id),
            StreamId::PulseSinkInput(idx) => write!(f, "sink-input {}", idx),
        }
    }
}

/// One live playback stream with the process identity the mixer reports
/// for it. Queried fresh for every action, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioStream {
    pub id: StreamId,
    pub pid: Option<u32>,
    pub binary: Option<String>,
    pub app_name: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
pub trait AudioMixer {
    fn list_streams(&self) -> Vec<AudioStream>;
    fn set_mute(&self, id: StreamId, mute: bool) -> Result<(), ToolError>;
}

/// Union of the PipeWire node graph and the Pulse sink-input list. Either
/// backend may be missing; each contributes what it can.
pub struct SystemMixer {
    pipewire: PipewireMixer,
    pulse: PulseMixer,
}

impl SystemMixer {
    pub fn new() -> Self {
        Self {
            pipewire: PipewireMixer::new(),
            pulse: PulseMixer::new(),
        }
    }
}

impl Default for SystemMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioMixer for SystemMixer {
    fn list_streams(&self) -> Vec<AudioStream> {
        let mut streams = self.pipewire.list_streams();
        streams.extend(self.pulse.list_streams());
        streams
    }

    fn set_mute(&self, id: StreamId, mute: bool) -> Result<(), ToolError> {
        match id {
            StreamId::PipewireNode(_) => self.pipewire.set_mute(id, mute),
            StreamId::PulseSinkInput(_) => self.pulse.set_mute(id, mute),
        }
    }
}
