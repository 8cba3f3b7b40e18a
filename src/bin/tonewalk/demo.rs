//! The canvas the terminal client walks.

use tonewalk::{
    dsp::Waveform,
    host::{Canvas, Session},
    ids::NodeId,
    protocol::Vector,
    sequencing::notes::{frequency_from_octave_and_step, note_label, step_from_name, REST},
};

/// Horizontal distance between neighbouring tone nodes.
const SPACING: f32 = 120.0;

/// Local session id.
pub const YOU: &str = "you";

/// The other player the demo starts with.
pub const ADA: &str = "ada";

const SCALE: [&str; 7] = ["C", "D", "E", "F", "G", "A", "B"];

fn tone(canvas: &mut Canvas, octave: i32, step: u8, wave: Waveform, position: Vector) -> NodeId {
    canvas.add_tone(
        note_label(octave, step),
        frequency_from_octave_and_step(octave, step),
        wave,
        position,
    )
}

/// A small loop over a C major scale with a square bass group and a rest.
///
/// ```text
///   C3 ──2──▶ E3 ──1──▶ G3 ──2──▶ rest ──1──▶ C3
///    └───────────4───────────▶ bass {C2, G2} ──4──▶ A3 ──2──▶ C3
/// ```
pub fn canvas() -> Canvas {
    let mut canvas = Canvas::new();

    let row: Vec<NodeId> = SCALE
        .into_iter()
        .filter_map(step_from_name)
        .enumerate()
        .map(|(i, step)| {
            tone(
                &mut canvas,
                3,
                step,
                Waveform::Sine,
                Vector::new(i as f32 * SPACING, 0.0),
            )
        })
        .collect();
    let [c3, _, e3, _, g3, a3, b3] = [0, 1, 2, 3, 4, 5, 6].map(|i| row[i].clone());

    let rest = canvas.add_tone("rest", REST, Waveform::Sine, Vector::new(4.0 * SPACING, 200.0));

    let c2 = tone(&mut canvas, 2, 0, Waveform::Square, Vector::new(0.0, 400.0));
    let g2 = tone(&mut canvas, 2, 7, Waveform::Square, Vector::new(SPACING, 400.0));
    let bass = canvas.add_group("bass", Vector::new(SPACING * 0.5, 400.0), &[c2, g2]);

    canvas.connect("c3-e3", c3.clone(), e3.clone(), 2);
    canvas.connect("e3-g3", e3, g3.clone(), 1);
    canvas.connect("g3-rest", g3, rest.clone(), 2);
    canvas.connect("rest-c3", rest, c3.clone(), 1);
    canvas.connect("c3-bass", c3.clone(), bass.clone(), 4);
    canvas.connect("bass-a3", bass, a3.clone(), 4);
    canvas.connect("a3-c3", a3, c3.clone(), 2);

    let mut you = Session::new(YOU, "You");
    you.position = Some(Vector::ORIGIN);
    you.selection = vec![c3];
    canvas.join(you);

    canvas.join(ada(b3));

    canvas
}

/// The second player, parked at the far end of the scale.
pub fn ada(start: NodeId) -> Session {
    let mut ada = Session::new(ADA, "Ada");
    ada.position = Some(Vector::new(6.0 * SPACING, 300.0));
    ada.selection = vec![start];
    ada
}
