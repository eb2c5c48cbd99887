use crate::config::Config;
use crate::media::{MediaPlayers, PlaybackStatus};
use crate::mixer::{AudioMixer, AudioStream};
use crate::proc;
use crate::wm::WindowSystem;
use std::collections::BTreeSet;

/// Decides which of the currently-playing media sources count as
/// background music, given the pid of the focused window.
///
/// The rule of thumb: never silence the application the user is actively
/// working in — except when the stream URL itself is a known BGM site,
/// because the chord is pressed precisely to silence that.
pub struct BgmClassifier<'a> {
    config: &'a Config,
    players: &'a dyn MediaPlayers,
    windows: &'a dyn WindowSystem,
    mixer: &'a dyn AudioMixer,
}

impl<'a> BgmClassifier<'a> {
    pub fn new(
        config: &'a Config,
        players: &'a dyn MediaPlayers,
        windows: &'a dyn WindowSystem,
        mixer: &'a dyn AudioMixer,
    ) -> Self {
        Self {
            config,
            players,
            windows,
            mixer,
        }
    }

    /// Players that should be paused/stopped: Playing, and identified as
    /// BGM by URL or by name-keyword plus window title.
    pub fn bgm_players(&self, active_pid: Option<u32>) -> Vec<String> {
        self.players
            .list()
            .into_iter()
            .filter(|name| self.is_bgm_player(name, active_pid))
            .collect()
    }

    fn is_bgm_player(&self, name: &str, active_pid: Option<u32>) -> bool {
        if self.players.status(name) != PlaybackStatus::Playing {
            return false;
        }

        if let Some(url) = self.players.url(name) {
            if self.config.bgm_url_pattern.is_match(&url) {
                return true;
            }
        }

        let pid = self.players.pid(name);
        if pid.is_some() && pid == active_pid {
            // focused application, and the URL didn't give it away
            return false;
        }

        let lowered = name.to_lowercase();
        if !self
            .config
            .player_keywords
            .iter()
            .any(|keyword| lowered.contains(keyword))
        {
            return false;
        }

        // without a pid there is no window to title-match against
        let Some(pid) = pid else {
            return false;
        };
        self.windows
            .titles_for_pid(pid)
            .iter()
            .any(|title| self.config.bgm_pattern.is_match(title))
    }

    /// Mixer streams that should be muted: streams owned by any process
    /// whose window matches the BGM pattern, excluding the focused pid.
    /// Streams are matched by pid, by binary name, or by the declared
    /// application name, across both mixer backends.
    pub fn bgm_streams(&self, active_pid: Option<u32>) -> Vec<AudioStream> {
        let mut bgm_pids = BTreeSet::new();
        for window in self
            .windows
            .windows_matching(self.config.bgm_pattern.as_str())
        {
            if let Some(pid) = window.pid {
                if Some(pid) != active_pid {
                    bgm_pids.insert(pid);
                }
            }
        }
        if bgm_pids.is_empty() {
            return Vec::new();
        }

        let streams = self.mixer.list_streams();
        let mut selected = Vec::new();
        let mut seen = BTreeSet::new();
        for pid in bgm_pids {
            let binary = proc::binary_name(pid);
            log::debug!("bgm pid={} binary={:?}", pid, binary);
            for stream in &streams {
                if stream_matches(stream, pid, binary.as_deref()) && seen.insert(stream.id) {
                    selected.push(stream.clone());
                }
            }
        }
        selected
    }
}

fn stream_matches(stream: &AudioStream, pid: u32, binary: Option<&str>) -> bool {
    if stream.pid == Some(pid) {
        return true;
    }
    let Some(binary) = binary.filter(|b| !b.is_empty()) else {
        return false;
    };
    if stream
        .binary
        .as_deref()
        .map_or(false, |b| b.ends_with(binary))
    {
        return true;
    }
    stream
        .app_name
        .as_deref()
        .map_or(false, |name| name.to_lowercase().contains(&binary.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MockMediaPlayers;
    use crate::mixer::{MockAudioMixer, StreamId};
    use crate::wm::{MockWindowSystem, WindowInfo};

    fn config() -> Config {
        Config::default()
    }

    fn quiet_mixer() -> MockAudioMixer {
        let mut mixer = MockAudioMixer::new();
        mixer.expect_list_streams().return_const(Vec::new());
        mixer
    }

    #[test]
    fn test_playing_url_match_is_bgm_even_when_focused() {
        let config = config();
        let mut players = MockMediaPlayers::new();
        players
            .expect_list()
            .return_const(vec!["firefox.instance200".to_string()]);
        players
            .expect_status()
            .returning(|_| PlaybackStatus::Playing);
        players
            .expect_url()
            .returning(|_| Some("https://music.youtube.com/watch?v=x".to_string()));
        let windows = MockWindowSystem::new();
        let mixer = quiet_mixer();

        let classifier = BgmClassifier::new(&config, &players, &windows, &mixer);
        // pid 200 is the focused window, but the URL is unambiguous
        assert_eq!(
            classifier.bgm_players(Some(200)),
            vec!["firefox.instance200"]
        );
    }

    #[test]
    fn test_paused_player_is_never_a_candidate() {
        let config = config();
        let mut players = MockMediaPlayers::new();
        players.expect_list().return_const(vec!["spotify".to_string()]);
        players.expect_status().returning(|_| PlaybackStatus::Paused);
        let windows = MockWindowSystem::new();
        let mixer = quiet_mixer();

        let classifier = BgmClassifier::new(&config, &players, &windows, &mixer);
        assert!(classifier.bgm_players(Some(100)).is_empty());
    }

    #[test]
    fn test_focused_player_without_url_match_is_excluded() {
        let config = config();
        let mut players = MockMediaPlayers::new();
        players.expect_list().return_const(vec!["vlc".to_string()]);
        players
            .expect_status()
            .returning(|_| PlaybackStatus::Playing);
        players.expect_url().returning(|_| None);
        players.expect_pid().returning(|_| Some(100));
        let windows = MockWindowSystem::new();
        let mixer = quiet_mixer();

        let classifier = BgmClassifier::new(&config, &players, &windows, &mixer);
        assert!(classifier.bgm_players(Some(100)).is_empty());
    }

    #[test]
    fn test_keyword_player_needs_a_matching_window_title() {
        let config = config();
        let mut players = MockMediaPlayers::new();
        players
            .expect_list()
            .return_const(vec!["chromium.instance8892".to_string()]);
        players
            .expect_status()
            .returning(|_| PlaybackStatus::Playing);
        players.expect_url().returning(|_| None);
        players.expect_pid().returning(|_| Some(8892));
        let mut windows = MockWindowSystem::new();
        windows
            .expect_titles_for_pid()
            .withf(|pid| *pid == 8892)
            .return_const(vec!["lofi beats - YouTube".to_string()]);
        let mixer = quiet_mixer();

        let classifier = BgmClassifier::new(&config, &players, &windows, &mixer);
        assert_eq!(
            classifier.bgm_players(Some(100)),
            vec!["chromium.instance8892"]
        );
    }

    #[test]
    fn test_keyword_player_with_unrelated_titles_is_not_bgm() {
        let config = config();
        let mut players = MockMediaPlayers::new();
        players
            .expect_list()
            .return_const(vec!["firefox.instance7".to_string()]);
        players
            .expect_status()
            .returning(|_| PlaybackStatus::Playing);
        players.expect_url().returning(|_| None);
        players.expect_pid().returning(|_| Some(7));
        let mut windows = MockWindowSystem::new();
        windows
            .expect_titles_for_pid()
            .return_const(vec!["Issue tracker".to_string()]);
        let mixer = quiet_mixer();

        let classifier = BgmClassifier::new(&config, &players, &windows, &mixer);
        assert!(classifier.bgm_players(Some(100)).is_empty());
    }

    #[test]
    fn test_unresolvable_pid_skips_title_matching() {
        let config = config();
        let mut players = MockMediaPlayers::new();
        players.expect_list().return_const(vec!["vlc".to_string()]);
        players
            .expect_status()
            .returning(|_| PlaybackStatus::Playing);
        players.expect_url().returning(|_| None);
        players.expect_pid().returning(|_| None);
        // no titles_for_pid expectation: it must not be called
        let windows = MockWindowSystem::new();
        let mixer = quiet_mixer();

        let classifier = BgmClassifier::new(&config, &players, &windows, &mixer);
        assert!(classifier.bgm_players(Some(100)).is_empty());
    }

    #[test]
    fn test_only_the_playing_url_player_is_selected() {
        // active pid 100; A playing with a BGM URL, B paused
        let config = config();
        let mut players = MockMediaPlayers::new();
        players
            .expect_list()
            .return_const(vec!["A".to_string(), "B".to_string()]);
        players.expect_status().returning(|name| match name {
            "A" => PlaybackStatus::Playing,
            _ => PlaybackStatus::Paused,
        });
        players.expect_url().returning(|name| match name {
            "A" => Some("https://music.youtube.com/x".to_string()),
            _ => None,
        });
        let windows = MockWindowSystem::new();
        let mixer = quiet_mixer();

        let classifier = BgmClassifier::new(&config, &players, &windows, &mixer);
        assert_eq!(classifier.bgm_players(Some(100)), vec!["A"]);
    }

    #[test]
    fn test_streams_selected_for_bgm_windows_excluding_active() {
        let config = config();
        let players = MockMediaPlayers::new();
        let mut windows = MockWindowSystem::new();
        windows.expect_windows_matching().return_const(vec![
            WindowInfo {
                id: "w1".to_string(),
                pid: Some(100), // the focused pid, must be skipped
            },
            WindowInfo {
                id: "w2".to_string(),
                pid: Some(4321),
            },
        ]);
        let mut mixer = MockAudioMixer::new();
        mixer.expect_list_streams().return_const(vec![
            AudioStream {
                id: StreamId::PipewireNode(55),
                pid: Some(4321),
                binary: None,
                app_name: None,
            },
            AudioStream {
                id: StreamId::PulseSinkInput(9),
                pid: Some(4321),
                binary: None,
                app_name: None,
            },
            AudioStream {
                id: StreamId::PipewireNode(60),
                pid: Some(100),
                binary: None,
                app_name: None,
            },
        ]);

        let classifier = BgmClassifier::new(&config, &players, &windows, &mixer);
        let streams = classifier.bgm_streams(Some(100));
        let ids: Vec<StreamId> = streams.iter().map(|s| s.id).collect();
        // both backends contribute for the same pid; the focused pid does not
        assert_eq!(
            ids,
            vec![StreamId::PipewireNode(55), StreamId::PulseSinkInput(9)]
        );
    }

    #[test]
    fn test_no_matching_windows_means_no_streams() {
        let config = config();
        let players = MockMediaPlayers::new();
        let mut windows = MockWindowSystem::new();
        windows
            .expect_windows_matching()
            .return_const(Vec::new());
        // the mixer must not even be queried
        let mixer = MockAudioMixer::new();

        let classifier = BgmClassifier::new(&config, &players, &windows, &mixer);
        assert!(classifier.bgm_streams(Some(100)).is_empty());
    }

    #[test]
    fn test_stream_matching_rules() {
        let stream = AudioStream {
            id: StreamId::PipewireNode(1),
            pid: Some(10),
            binary: Some("/usr/lib/firefox/firefox".to_string()),
            app_name: Some("Firefox Nightly".to_string()),
        };
        // by pid
        assert!(stream_matches(&stream, 10, None));
        // by binary suffix
        assert!(stream_matches(&stream, 11, Some("firefox")));
        // by application name, case-insensitive
        let nameless = AudioStream {
            binary: None,
            ..stream.clone()
        };
        assert!(stream_matches(&nameless, 11, Some("FIREFOX")));
        // no identity at all
        assert!(!stream_matches(&stream, 11, None));
        assert!(!stream_matches(&stream, 11, Some("")));
        assert!(!stream_matches(&stream, 11, Some("mpv")));
    }
}
