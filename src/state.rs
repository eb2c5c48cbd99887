use crate::error::StateError;
use crate::mixer::StreamId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

/// Everything we have suppressed and not yet restored, persisted across
/// invocations so "unmute" always undoes exactly what "mute" did even
/// after a daemon restart.
///
/// A player name lives in at most one of the two player sets at a time:
/// recording it in one removes it from the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionState {
    #[serde(default)]
    pub paused_players: BTreeSet<String>,
    #[serde(default)]
    pub stopped_players: BTreeSet<String>,
    #[serde(default)]
    pub muted_streams: BTreeSet<StreamId>,
}

impl SuppressionState {
    pub fn is_empty(&self) -> bool {
        self.paused_players.is_empty()
            && self.stopped_players.is_empty()
            && self.muted_streams.is_empty()
    }

    pub fn record_paused<I: IntoIterator<Item = String>>(&mut self, names: I) {
        for name in names {
            self.stopped_players.remove(&name);
            self.paused_players.insert(name);
        }
    }

    pub fn record_stopped<I: IntoIterator<Item = String>>(&mut self, names: I) {
        for name in names {
            self.paused_players.remove(&name);
            self.stopped_players.insert(name);
        }
    }

    pub fn record_muted<I: IntoIterator<Item = StreamId>>(&mut self, ids: I) {
        self.muted_streams.extend(ids);
    }
}

/// File-backed store for [`SuppressionState`].
///
/// Reads are tolerant: a missing or unparseable file is empty state, never
/// an error. Writes go to a sibling temp file first and are renamed into
/// place so a crash mid-write cannot leave a corrupt state behind.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> SuppressionState {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                log::warn!(
                    "unreadable state file {}: {}; treating as empty",
                    self.path.display(),
                    e
                );
                SuppressionState::default()
            }),
            Err(_) => SuppressionState::default(),
        }
    }

    pub fn save(&self, state: &SuppressionState) -> Result<(), StateError> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(state)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
