use super::{AudioMixer, AudioStream, StreamId};
use crate::error::ToolError;
use crate::tool;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Node classes that carry application playback audio.
static MEDIA_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(Audio/Stream$)|(Stream/Output/Audio$)").unwrap());

/// PipeWire adapter: stream discovery via `pw-dump`, mute via `wpctl`.
pub struct PipewireMixer;

impl PipewireMixer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PipewireMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioMixer for PipewireMixer {
    fn list_streams(&self) -> Vec<AudioStream> {
        match tool::run("pw-dump", "pw-dump", Vec::<&str>::new()) {
            Ok(out) => parse_pw_dump(&out),
            Err(e) => {
                log::debug!("pw-dump unavailable: {}", e);
                Vec::new()
            }
        }
    }

    fn set_mute(&self, id: StreamId, mute: bool) -> Result<(), ToolError> {
        let StreamId::PipewireNode(node) = id else {
            return Ok(());
        };
        let flag = if mute { "1" } else { "0" };
        tool::run("wpctl", "wpctl", ["set-mute", &node.to_string(), flag]).map(|_| ())
    }
}

/// Pull playback-stream nodes out of a `pw-dump` object dump. Property
/// values arrive as strings or numbers depending on the PipeWire version,
/// so both are accepted.
fn parse_pw_dump(raw: &str) -> Vec<AudioStream> {
    let Ok(Value::Array(objects)) = serde_json::from_str(raw) else {
        log::debug!("pw-dump output was not a JSON array");
        return Vec::new();
    };

    let mut streams = Vec::new();
    for obj in &objects {
        if obj.get("type").and_then(Value::as_str) != Some("PipeWire:Interface:Node") {
            continue;
        }
        let Some(id) = obj.get("id").and_then(Value::as_u64) else {
            continue;
        };
        let props = &obj["info"]["props"];
        let media_class = props.get("media.class").and_then(Value::as_str).unwrap_or("");
        if !MEDIA_CLASS.is_match(media_class) {
            continue;
        }
        streams.push(AudioStream {
            id: StreamId::PipewireNode(id as u32),
            pid: lenient_u32(props.get("application.process.id")),
            binary: lenient_string(props.get("application.process.binary")),
            app_name: lenient_string(props.get("application.name")),
        });
    }
    streams
}

fn lenient_u32(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().map(|n| n as u32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}
