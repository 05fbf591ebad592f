//! Move values and their textual notation.
//!
//! Inside the engine a move is the tagged value [`Move`]; the `R` / `R'`
//! strings only exist at the boundaries (parsing user input, history display).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{CubeError, Result};

/// One of the six outer faces of the cube.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Up,
    Down,
    Left,
    Right,
    Front,
    Back,
}

impl Face {
    /// All faces, in the order used to index per-face arrays.
    pub const ALL: [Face; 6] = [
        Face::Up,
        Face::Down,
        Face::Left,
        Face::Right,
        Face::Front,
        Face::Back,
    ];

    /// Position of the face in [`Face::ALL`].
    pub fn index(self) -> usize {
        match self {
            Face::Up => 0,
            Face::Down => 1,
            Face::Left => 2,
            Face::Right => 3,
            Face::Front => 4,
            Face::Back => 5,
        }
    }

    /// Upper-case notation letter.
    pub fn letter(self) -> char {
        match self {
            Face::Up => 'U',
            Face::Down => 'D',
            Face::Left => 'L',
            Face::Right => 'R',
            Face::Front => 'F',
            Face::Back => 'B',
        }
    }

    /// Looks up a face by its notation letter, ignoring case.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'U' => Some(Face::Up),
            'D' => Some(Face::Down),
            'L' => Some(Face::Left),
            'R' => Some(Face::Right),
            'F' => Some(Face::Front),
            'B' => Some(Face::Back),
            _ => None,
        }
    }

    /// The face on the other side of the cube.
    pub fn opposite(self) -> Self {
        match self {
            Face::Up => Face::Down,
            Face::Down => Face::Up,
            Face::Left => Face::Right,
            Face::Right => Face::Left,
            Face::Front => Face::Back,
            Face::Back => Face::Front,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Turning direction of a quarter turn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn from_clockwise(clockwise: bool) -> Self {
        if clockwise {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }

    /// `+1` for clockwise, `-1` for counter-clockwise.
    pub fn sign(self) -> i8 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

/// A single quarter turn of one face.
///
/// Serialises as its notation string, e.g. `"R"` or `"U'"`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Move {
    pub face: Face,
    pub direction: Direction,
}

impl Move {
    pub fn new(face: Face, direction: Direction) -> Self {
        Self { face, direction }
    }

    pub fn clockwise(face: Face) -> Self {
        Self::new(face, Direction::Clockwise)
    }

    pub fn counter_clockwise(face: Face) -> Self {
        Self::new(face, Direction::CounterClockwise)
    }

    /// The move that undoes this one: same face, opposite direction.
    pub fn inverse(self) -> Self {
        Self::new(self.face, self.direction.reversed())
    }

    pub fn is_clockwise(self) -> bool {
        self.direction == Direction::Clockwise
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Clockwise => write!(f, "{}", self.face),
            Direction::CounterClockwise => write!(f, "{}'", self.face),
        }
    }
}

impl FromStr for Move {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CubeError::InvalidNotation(s.to_string());

        let mut chars = s.trim().chars();
        let face = chars
            .next()
            .filter(char::is_ascii_uppercase)
            .and_then(Face::from_letter)
            .ok_or_else(invalid)?;
        let direction = match (chars.next(), chars.next()) {
            (None, _) => Direction::Clockwise,
            (Some('\''), None) => Direction::CounterClockwise,
            _ => return Err(invalid()),
        };

        Ok(Move::new(face, direction))
    }
}

impl From<Move> for String {
    fn from(value: Move) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Move {
    type Error = CubeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Parses a whitespace separated move sequence such as `"R U' F"`.
pub fn parse_sequence(text: &str) -> Result<Vec<Move>> {
    text.split_whitespace().map(str::parse).collect()
}

/// Formats moves the way the history overlay shows them.
pub fn format_sequence<'a>(moves: impl IntoIterator<Item = &'a Move>) -> String {
    moves
        .into_iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_and_parses_notation() {
        let sequence = parse_sequence(" R U'  F\tB' ").unwrap();
        assert_eq!(
            sequence,
            vec![
                Move::clockwise(Face::Right),
                Move::counter_clockwise(Face::Up),
                Move::clockwise(Face::Front),
                Move::counter_clockwise(Face::Back),
            ]
        );
        assert_eq!(format_sequence(&sequence), "R U' F B'");
    }

    #[test]
    fn rejects_unknown_tokens() {
        for token in ["X", "r", "R2", "R''", "", "'"] {
            let err = token.parse::<Move>().unwrap_err();
            assert!(matches!(err, CubeError::InvalidNotation(_)), "{token}");
        }
        assert!(parse_sequence("R Q").is_err());
    }

    #[test]
    fn inverse_toggles_the_marker() {
        for face in Face::ALL {
            let mv = Move::clockwise(face);
            assert_eq!(mv.inverse().to_string(), format!("{face}'"));
            assert_eq!(mv.inverse().inverse(), mv);
        }
    }

    #[test]
    fn face_indices_match_the_table_order() {
        for (index, face) in Face::ALL.into_iter().enumerate() {
            assert_eq!(face.index(), index);
            assert_eq!(Face::from_letter(face.letter()), Some(face));
            assert_eq!(face.opposite().opposite(), face);
        }
    }

    #[test]
    fn serialises_as_notation_string() {
        let json = serde_json::to_string(&Move::counter_clockwise(Face::Left)).unwrap();
        assert_eq!(json, "\"L'\"");
        let back: Move = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Move::counter_clockwise(Face::Left));
    }
}
