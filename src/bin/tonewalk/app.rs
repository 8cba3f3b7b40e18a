//! Audio output and the client loop

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use tracing::{error, info};

use tonewalk::{
    engine::mixer,
    host::{Canvas, Host},
    protocol::JsonExchange,
    runtime::Client,
    Config, MAX_BLOCK_SIZE,
};

use crate::ui::UiApp;

/// Samples kept for the oscilloscope.
const SCOPE_CAPACITY: usize = 8192;

pub fn run(config: Config, canvas: Canvas) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let stream_config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = stream_config.sample_rate().0 as f32;
    let channels = stream_config.channels() as usize;
    info!(sample_rate, channels, "audio device ready");

    let (handle, mut mixer) = mixer(
        sample_rate,
        config.mixer.max_voices,
        config.mixer.command_capacity,
    );
    let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_CAPACITY);

    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];
    let stream = device.build_output_stream(
        &stream_config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let block = &mut render_buf[..frames_to_render];
                mixer.render_block(block);

                // Mono to every channel
                let out_off = frames_written * channels;
                for (i, &s) in block.iter().enumerate() {
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = s;
                    }
                    // Scope is best effort
                    let _ = scope_tx.push(s);
                }

                frames_written += frames_to_render;
            }
        },
        |err| error!("audio stream error: {err}"),
        None,
    )?;
    stream.play()?;

    let exchange = JsonExchange::new(Host::new(canvas));
    let mut client = Client::new(&config, handle, exchange)?;
    client.set_listening(true);

    let mut terminal = ratatui::init();
    let result = UiApp::new(client, config.scheduler.lookahead, scope_rx).run(&mut terminal);
    ratatui::restore();
    result
}
