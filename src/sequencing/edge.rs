use std::fmt;

/*
Edge Counters
=============

Each edge between two sequencer nodes carries a small counter:

  length     how many beats it takes to travel the edge (≥ 1)
  position   which of those beats we are on (1..=length)

The counter lives on the canvas as the edge's text label so every
participant sees the same state and it survives reloads of the client:

  "4"     length 4, position 1   (at rest, or just arrived)
  "4:3"   length 4, position 3

Anything that does not look like that - no label, "abc", "4:", "-2", a number
too large to hold - decodes as "1" (length 1, position 1). Decoding never
fails; a bad label just turns the edge into a one-beat edge.

Decoded values are clamped so the invariant 1 ≤ position ≤ length always
holds, e.g. "0" reads as "1" and "3:9" reads as "3:3".
*/

/// Decoded form of an edge label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeState {
    length: u32,
    position: u32,
}

/// Result of moving one beat along an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStep {
    /// Still travelling; the start node stays selected.
    Travelling(EdgeState),
    /// Reached the end; the counter is back at rest and the end node is next.
    Arrived(EdgeState),
}

impl EdgeState {
    pub const DEFAULT: EdgeState = EdgeState {
        length: 1,
        position: 1,
    };

    pub fn new(length: u32, position: u32) -> Self {
        let length = length.max(1);
        Self {
            length,
            position: position.clamp(1, length),
        }
    }

    /// At rest at the start of an edge of `length` beats.
    pub fn at_rest(length: u32) -> Self {
        Self::new(length, 1)
    }

    /// Decode a label; see the module notes for the accepted format.
    pub fn parse(label: &str) -> Self {
        let (length, position) = match label.split_once(':') {
            Some((length, position)) => (length, Some(position)),
            None => (label, None),
        };
        let Some(length) = parse_digits(length) else {
            return Self::DEFAULT;
        };
        match position.map(parse_digits) {
            None => Self::new(length, 1),
            Some(Some(position)) => Self::new(length, position),
            Some(None) => Self::DEFAULT,
        }
    }

    /// Decode an optional label, treating a missing one as the default.
    pub fn from_label(label: Option<&str>) -> Self {
        label.map_or(Self::DEFAULT, Self::parse)
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn is_at_rest(&self) -> bool {
        self.position == 1
    }

    /// The same edge with its counter parked at position 1.
    pub fn rest(self) -> Self {
        Self::at_rest(self.length)
    }

    /// Move one beat along the edge.
    pub fn advance(self) -> EdgeStep {
        match self.position.checked_add(1) {
            Some(next) if next <= self.length => EdgeStep::Travelling(Self {
                length: self.length,
                position: next,
            }),
            _ => EdgeStep::Arrived(self.rest()),
        }
    }

    /// Encode back into label text.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl Default for EdgeState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for EdgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.position == 1 {
            write!(f, "{}", self.length)
        } else {
            write!(f, "{}:{}", self.length, self.position)
        }
    }
}

/// One or more ASCII digits, nothing else.
fn parse_digits(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_length() {
        let state = EdgeState::parse("4");
        assert_eq!((state.length(), state.position()), (4, 1));
    }

    #[test]
    fn parses_length_and_position() {
        let state = EdgeState::parse("4:3");
        assert_eq!((state.length(), state.position()), (4, 3));
    }

    #[test]
    fn malformed_labels_decode_as_default() {
        for label in ["", "abc", "4:", ":2", "4:2:1", "-3", "+3", " 4", "4 ", "٣", "4:x", "99999999999"] {
            assert_eq!(EdgeState::parse(label), EdgeState::DEFAULT, "label {label:?}");
        }
        assert_eq!(EdgeState::from_label(None), EdgeState::DEFAULT);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(EdgeState::parse("0"), EdgeState::new(1, 1));
        assert_eq!(EdgeState::parse("3:9"), EdgeState::new(3, 3));
        assert_eq!(EdgeState::parse("3:0"), EdgeState::new(3, 1));
    }

    #[test]
    fn formats_position_one_as_bare_length() {
        assert_eq!(EdgeState::new(4, 1).label(), "4");
        assert_eq!(EdgeState::new(4, 2).label(), "4:2");
        assert_eq!(EdgeState::parse("4:1").label(), "4");
    }

    #[test]
    fn advance_travels_then_arrives() {
        let mut state = EdgeState::parse("3");
        let mut labels = Vec::new();
        loop {
            match state.advance() {
                EdgeStep::Travelling(next) => {
                    labels.push(next.label());
                    state = next;
                }
                EdgeStep::Arrived(next) => {
                    labels.push(next.label());
                    break;
                }
            }
        }
        assert_eq!(labels, ["3:2", "3:3", "3"]);
    }

    #[test]
    fn one_beat_edge_arrives_immediately() {
        assert_eq!(
            EdgeState::parse("1").advance(),
            EdgeStep::Arrived(EdgeState::DEFAULT)
        );
    }
}
