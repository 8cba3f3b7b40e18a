/*
Note Names and Pitch
====================

Tone nodes are tuned in twelve-tone equal temperament against A4 = 440 Hz.
A pitch is addressed by octave and by step within the octave:

  step   0   1   2   3   4   5   6   7   8   9   10  11
  name   C   C#  D   D#  E   F   F#  G   G#  A   A#  B

The distance from A4 in semitones is

    semitones = (octave - 4) · 12 + step - 9

and every semitone multiplies the frequency by 2^(1/12):

    frequency = 440 · 2^(semitones / 12)

A frequency of 0 Hz is a rest: the node is part of the walk but is silent.
*/

/// Note names by step within the octave.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Frequency used for a rest.
pub const REST: f32 = 0.0;

/// Frequency in Hz of `step` (0 = C) in `octave`.
pub fn frequency_from_octave_and_step(octave: i32, step: u8) -> f32 {
    let semitones_from_a4 = (octave - 4) * 12 + step as i32 - 9;
    440.0 * 2.0_f32.powf(semitones_from_a4 as f32 / 12.0)
}

/// Step within the octave for a note name such as `"F#"`.
pub fn step_from_name(name: &str) -> Option<u8> {
    NOTE_NAMES
        .iter()
        .position(|n| *n == name)
        .map(|step| step as u8)
}

/// Display name such as `"C#3"`.
pub fn note_label(octave: i32, step: u8) -> String {
    let name = NOTE_NAMES.get(step as usize).copied().unwrap_or("?");
    format!("{name}{octave}")
}
