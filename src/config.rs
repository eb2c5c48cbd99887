use regex::{Regex, RegexBuilder};
use std::path::PathBuf;

/// Window titles/classes that identify a background-media source.
const DEFAULT_BGM_PATTERN: &str = "YouTube|YouTube Music|Spotify|SoundCloud|NicoNico";

/// Stream URLs that identify a background-media source unambiguously.
const DEFAULT_BGM_URL_PATTERN: &str = r"youtube\.com|music\.youtube\.com|open\.spotify\.com|soundcloud\.com|nicovideo\.jp|niconico\.jp|radiko\.jp|tunein\.com";

/// Player names worth title-checking at all. Anything else (e.g. a games
/// console emulator exposing MPRIS) is left alone.
const DEFAULT_PLAYER_KEYWORDS: &str =
    "spotify,youtube,music,vlc,brave,chrome,chromium,edge,vivaldi,firefox";

const STATE_FILE_NAME: &str = "hushkey-suppressed.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    /// Pause/resume MPRIS players.
    Pause,
    /// Mute/unmute mixer streams.
    Mute,
}

impl ControlMode {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "pause" => ControlMode::Pause,
            "mute" => ControlMode::Mute,
            other => {
                log::warn!("unknown CONTROL_MODE '{}', falling back to mute", other);
                ControlMode::Mute
            }
        }
    }
}

/// Runtime configuration, sourced entirely from the environment.
/// Every option has a default; a malformed value falls back with a warning
/// rather than aborting startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bgm_pattern: Regex,
    pub bgm_url_pattern: Regex,
    pub player_keywords: Vec<String>,
    pub control_mode: ControlMode,
    pub state_dir: Option<PathBuf>,
    pub kdotool_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup so tests can feed values
    /// without touching the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let bgm_pattern = compile_pattern("BGM_PATTERN", get("BGM_PATTERN"), DEFAULT_BGM_PATTERN);
        let bgm_url_pattern = compile_pattern(
            "BGM_URL_PATTERN",
            get("BGM_URL_PATTERN"),
            DEFAULT_BGM_URL_PATTERN,
        );
        let player_keywords = get("BGM_PLAYER_KEYWORDS")
            .unwrap_or_else(|| DEFAULT_PLAYER_KEYWORDS.to_string())
            .split(',')
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        let control_mode = get("CONTROL_MODE")
            .map(|v| ControlMode::parse(&v))
            .unwrap_or(ControlMode::Mute);
        let state_dir = get("HUSHKEY_STATE_DIR").map(PathBuf::from);
        let kdotool_path = get("KDOT_PATH").map(PathBuf::from);

        Self {
            bgm_pattern,
            bgm_url_pattern,
            player_keywords,
            control_mode,
            state_dir,
            kdotool_path,
        }
    }

    /// Location of the persisted suppression state: explicit override, else
    /// the user runtime dir, else the temp dir. The file itself may not
    /// exist yet.
    pub fn state_file(&self) -> PathBuf {
        self.state_dir
            .clone()
            .or_else(dirs::runtime_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join(STATE_FILE_NAME)
    }
}

fn compile_pattern(name: &str, value: Option<String>, default: &str) -> Regex {
    let source = value.unwrap_or_else(|| default.to_string());
    match RegexBuilder::new(&source).case_insensitive(true).build() {
        Ok(re) => re,
        Err(e) => {
            log::warn!("invalid {} regex '{}': {}; using default", name, source, e);
            RegexBuilder::new(default)
                .case_insensitive(true)
                .build()
                .unwrap_or_else(|_| unreachable!("default pattern is valid"))
        }
    }
}
