use crate::classifier::BgmClassifier;
use crate::config::{Config, ControlMode};
use crate::error::StateError;
use crate::hotkeys::HotkeyAction;
use crate::media::MediaPlayers;
use crate::mixer::AudioMixer;
use crate::notify::Notifier;
use crate::state::StateStore;
use crate::wm::WindowSystem;
use std::collections::BTreeSet;

/// Orchestrates suppress/restore actions: snapshots the active window,
/// asks the classifier for candidates, fans out the control calls
/// best-effort, and keeps the persisted state in sync.
///
/// Restore is driven purely by persisted state, so it undoes exactly what
/// an earlier suppress did — including one from a previous daemon run —
/// and nothing else.
pub struct Suppressor<'a> {
    config: &'a Config,
    store: StateStore,
    players: &'a dyn MediaPlayers,
    mixer: &'a dyn AudioMixer,
    windows: &'a dyn WindowSystem,
    notifier: &'a dyn Notifier,
}

impl<'a> Suppressor<'a> {
    pub fn new(
        config: &'a Config,
        store: StateStore,
        players: &'a dyn MediaPlayers,
        mixer: &'a dyn AudioMixer,
        windows: &'a dyn WindowSystem,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            config,
            store,
            players,
            mixer,
            windows,
            notifier,
        }
    }

    /// Entry point from the hotkey loop. Errors are logged, never
    /// propagated: a failed action must not take the daemon down.
    pub fn handle(&self, action: HotkeyAction) {
        let result = match (action, self.config.control_mode) {
            (HotkeyAction::MuteOrPause, ControlMode::Pause) => self.pause(),
            (HotkeyAction::MuteOrPause, ControlMode::Mute) => self.mute(),
            (HotkeyAction::UnmuteOrResume, ControlMode::Pause) => self.resume(),
            (HotkeyAction::UnmuteOrResume, ControlMode::Mute) => self.unmute(),
            (HotkeyAction::Stop, ControlMode::Pause) => self.stop(),
            (HotkeyAction::Stop, ControlMode::Mute) => {
                log::debug!("stop chord ignored in mute mode");
                Ok(())
            }
            (HotkeyAction::Toggle, _) => self.toggle(),
        };
        if let Err(e) = result {
            log::error!("{:?} failed: {}", action, e);
        }
    }

    fn classifier(&self) -> BgmClassifier<'_> {
        BgmClassifier::new(self.config, self.players, self.windows, self.mixer)
    }

    fn active_pid(&self) -> Option<u32> {
        self.windows.active_window().and_then(|w| w.pid)
    }

    pub fn pause(&self) -> Result<(), StateError> {
        let candidates = self.classifier().bgm_players(self.active_pid());
        if candidates.is_empty() {
            log::info!("pause: no candidates (url/title match failed)");
            self.notifier.notify("Nothing to pause", "");
            return Ok(());
        }
        for player in &candidates {
            if let Err(e) = self.players.pause(player) {
                log::warn!("pause {} failed: {}", player, e);
            }
        }
        let mut state = self.store.load();
        state.record_paused(candidates.iter().cloned());
        self.store.save(&state)?;
        log::info!("pause: {:?}", candidates);
        self.notifier
            .notify("Playback paused", &candidates.join(", "));
        Ok(())
    }

    pub fn resume(&self) -> Result<(), StateError> {
        let mut state = self.store.load();
        let existing: BTreeSet<String> = self.players.list().into_iter().collect();
        let mut played = Vec::new();

        for player in state.paused_players.iter().chain(&state.stopped_players) {
            // players that exited since the suppress are dropped silently
            if existing.contains(player) {
                if let Err(e) = self.players.play(player) {
                    log::warn!("play {} failed: {}", player, e);
                }
                played.push(player.clone());
            }
        }

        state.paused_players.clear();
        state.stopped_players.clear();
        self.store.save(&state)?;

        log::info!("resume: {:?}", played);
        let body = if played.is_empty() {
            "nothing to resume".to_string()
        } else {
            played.join(", ")
        };
        self.notifier.notify("Playback resumed", &body);
        Ok(())
    }

    pub fn stop(&self) -> Result<(), StateError> {
        let candidates = self.classifier().bgm_players(self.active_pid());
        if candidates.is_empty() {
            log::info!("stop: no candidates");
            self.notifier.notify("Nothing to stop", "");
            return Ok(());
        }
        for player in &candidates {
            // some players do not implement Stop; pause them instead but
            // record them as stopped either way so resume reissues play
            if let Err(e) = self.players.stop(player) {
                log::debug!("stop {} failed ({}), falling back to pause", player, e);
                if let Err(e) = self.players.pause(player) {
                    log::warn!("pause fallback for {} failed: {}", player, e);
                }
            }
        }
        let mut state = self.store.load();
        state.record_stopped(candidates.iter().cloned());
        self.store.save(&state)?;
        log::info!("stop: {:?}", candidates);
        self.notifier
            .notify("Playback stopped", &candidates.join(", "));
        Ok(())
    }

    pub fn mute(&self) -> Result<(), StateError> {
        let streams = self.classifier().bgm_streams(self.active_pid());
        if streams.is_empty() {
            log::info!(
                "mute: no matching streams (pattern={})",
                self.config.bgm_pattern.as_str()
            );
            self.notifier.notify(
                "Nothing to mute",
                &format!("pattern: {}", self.config.bgm_pattern.as_str()),
            );
            return Ok(());
        }
        for stream in &streams {
            if let Err(e) = self.mixer.set_mute(stream.id, true) {
                log::warn!("mute {} failed: {}", stream.id, e);
            }
        }
        let mut state = self.store.load();
        state.record_muted(streams.iter().map(|s| s.id));
        self.store.save(&state)?;
        log::info!("mute: {:?}", state.muted_streams);
        self.notifier.notify("Background media muted", "");
        Ok(())
    }

    pub fn unmute(&self) -> Result<(), StateError> {
        let mut state = self.store.load();
        if state.muted_streams.is_empty() {
            log::info!("unmute: nothing saved");
            self.notifier.notify("Nothing to unmute", "");
            return Ok(());
        }
        for id in &state.muted_streams {
            if let Err(e) = self.mixer.set_mute(*id, false) {
                log::warn!("unmute {} failed: {}", id, e);
            }
        }
        let muted = std::mem::take(&mut state.muted_streams);
        self.store.save(&state)?;
        log::info!("unmute: {:?}", muted);
        self.notifier.notify("Background media unmuted", "");
        Ok(())
    }

    /// One chord for both directions: restore when anything is suppressed,
    /// suppress otherwise. Restore undoes all persisted suppression, no
    /// matter which mode recorded it, so a mode change between presses
    /// cannot strand state.
    pub fn toggle(&self) -> Result<(), StateError> {
        let state = self.store.load();
        if state.is_empty() {
            return match self.config.control_mode {
                ControlMode::Pause => self.pause(),
                ControlMode::Mute => self.mute(),
            };
        }
        if !state.paused_players.is_empty() || !state.stopped_players.is_empty() {
            self.resume()?;
        }
        if !state.muted_streams.is_empty() {
            self.unmute()?;
        }
        Ok(())
    }
}
