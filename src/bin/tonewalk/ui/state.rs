//! What the UI shows, captured from the client once per frame

use tonewalk::{
    dsp::Waveform,
    engine::MixerHandle,
    host::Host,
    protocol::{JsonExchange, Vector},
    runtime::Client,
    sequencing::{BeatPosition, BeatState},
};

/// The client the terminal front end drives.
pub type TerminalClient = Client<MixerHandle, JsonExchange<Host>>;

/// One live voice.
#[derive(Clone, Debug)]
pub struct VoiceRow {
    pub key: String,
    pub frequency: f32,
    pub waveform: Waveform,
    pub target: f32,
}

/// One connector and its counter.
#[derive(Clone, Debug)]
pub struct EdgeRow {
    pub start: String,
    pub end: String,
    pub label: String,
}

#[derive(Clone, Debug)]
pub struct View {
    pub tempo: f64,
    pub listening: bool,
    pub multiplayer: bool,
    pub proximity: bool,
    pub beat: BeatState,
    pub position: BeatPosition,
    pub queued: usize,
    /// Voices the audio thread is rendering, fading ones included.
    pub rendering: usize,
    pub sample_rate: f32,
    pub listener: Option<Vector>,
    pub selection: Vec<String>,
    pub voices: Vec<VoiceRow>,
    pub edges: Vec<EdgeRow>,
}

impl View {
    pub fn capture(client: &TerminalClient) -> Self {
        let canvas = client.exchange().endpoint().canvas();
        let current = canvas.current_session();
        let presence = client.presence();
        let beat = client.beat();

        let voices = client
            .reconciler()
            .voices()
            .iter()
            .map(|(key, voice)| VoiceRow {
                key: key.to_string(),
                frequency: voice.frequency,
                waveform: voice.waveform,
                target: voice.target,
            })
            .collect();

        let edges = canvas
            .edges()
            .iter()
            .map(|edge| EdgeRow {
                start: edge.start.to_string(),
                end: edge
                    .end
                    .as_ref()
                    .map_or_else(|| "?".to_string(), ToString::to_string),
                label: edge.label.clone().unwrap_or_default(),
            })
            .collect();

        Self {
            tempo: client.scheduler().tempo(),
            listening: client.is_listening(),
            multiplayer: presence.multiplayer,
            proximity: presence.proximity,
            beat,
            position: beat.position(),
            queued: client.scheduler().queued(),
            rendering: client.backend().active_voices(),
            sample_rate: client.backend().sample_rate(),
            listener: current.and_then(|s| s.position),
            selection: current
                .map(|s| s.selection.iter().map(ToString::to_string).collect())
                .unwrap_or_default(),
            voices,
            edges,
        }
    }
}
