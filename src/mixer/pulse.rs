use super::{AudioMixer, AudioStream, StreamId};
use crate::error::ToolError;
use crate::tool;

/// PulseAudio adapter: stream discovery and mute via `pactl`. Also covers
/// pipewire-pulse systems, where both this and the node-graph view exist.
pub struct PulseMixer;

impl PulseMixer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PulseMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioMixer for PulseMixer {
    fn list_streams(&self) -> Vec<AudioStream> {
        match tool::run("pactl", "pactl", ["list", "sink-inputs"]) {
            Ok(out) => parse_sink_inputs(&out),
            Err(e) => {
                log::debug!("pactl unavailable: {}", e);
                Vec::new()
            }
        }
    }

    fn set_mute(&self, id: StreamId, mute: bool) -> Result<(), ToolError> {
        let StreamId::PulseSinkInput(index) = id else {
            return Ok(());
        };
        let flag = if mute { "1" } else { "0" };
        tool::run(
            "pactl",
            "pactl",
            ["set-sink-input-mute", &index.to_string(), flag],
        )
        .map(|_| ())
    }
}

/// Parse `pactl list sink-inputs` output: one `Sink Input #N` block per
/// stream, with `key = "value"` property lines indented below it.
fn parse_sink_inputs(raw: &str) -> Vec<AudioStream> {
    let mut streams = Vec::new();
    let mut current: Option<AudioStream> = None;

    for line in raw.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Sink Input #") {
            if let Some(stream) = current.take() {
                streams.push(stream);
            }
            if let Ok(index) = rest.trim().parse() {
                current = Some(AudioStream {
                    id: StreamId::PulseSinkInput(index),
                    pid: None,
                    binary: None,
                    app_name: None,
                });
            }
            continue;
        }
        let Some(stream) = current.as_mut() else {
            continue;
        };
        if let Some(value) = property_value(line, "application.process.id") {
            stream.pid = value.parse().ok();
        } else if let Some(value) = property_value(line, "application.process.binary") {
            stream.binary = Some(value);
        } else if let Some(value) = property_value(line, "application.name") {
            stream.app_name = Some(value);
        }
    }
    if let Some(stream) = current {
        streams.push(stream);
    }
    streams
}

fn property_value(line: &str, key: &str) -> Option<String> {
    let rest = line.strip_prefix(key)?.trim_start().strip_prefix('=')?;
    Some(rest.trim().trim_matches('"').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"Sink Input #227
	Driver: protocol-native.c
	Owner Module: 12
	Client: 42
	Sink: 1
	Mute: no
	Properties:
		application.name = "Firefox"
		application.process.id = "4321"
		application.process.binary = "firefox"
		media.name = "AudioStream"

Sink Input #301
	Driver: protocol-native.c
	Mute: yes
	Properties:
		application.name = "Spotify"
		application.process.id = "999"
"#;

    #[test]
    fn test_parse_sink_inputs() {
        let streams = parse_sink_inputs(LISTING);
        assert_eq!(streams.len(), 2);

        assert_eq!(streams[0].id, StreamId::PulseSinkInput(227));
        assert_eq!(streams[0].pid, Some(4321));
        assert_eq!(streams[0].binary.as_deref(), Some("firefox"));
        assert_eq!(streams[0].app_name.as_deref(), Some("Firefox"));

        assert_eq!(streams[1].id, StreamId::PulseSinkInput(301));
        assert_eq!(streams[1].pid, Some(999));
        assert_eq!(streams[1].binary, None);
    }

    #[test]
    fn test_parse_empty_listing() {
        assert!(parse_sink_inputs("").is_empty());
    }

    #[test]
    fn test_unrelated_properties_ignored() {
        let streams = parse_sink_inputs("Sink Input #5\n\tmedia.role = \"music\"\n");
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].pid, None);
    }
}
