use crossterm::style::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies an ant for as long as it is alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AntId(pub u64);

/// Identifies a nest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NestId(pub u64);

/// Identifies a single piece of a nest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u64);

/// Identifies a species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpeciesId(pub u64);

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "species #{}", self.0)
    }
}

/// Hands out unique ids for every entity in a simulation.
///
/// Ids are shared across entity types and strictly increasing, so ordering by id is
/// ordering by creation.
#[derive(Debug, Default)]
pub struct IdGenerator {
    current: u64,
}

impl IdGenerator {
    pub fn next_ant(&mut self) -> AntId {
        AntId(self.next())
    }

    pub fn next_nest(&mut self) -> NestId {
        NestId(self.next())
    }

    pub fn next_piece(&mut self) -> PieceId {
        PieceId(self.next())
    }

    pub fn next_species(&mut self) -> SpeciesId {
        SpeciesId(self.next())
    }

    fn next(&mut self) -> u64 {
        self.current += 1;
        self.current
    }
}

/// The kinds of occupant that can stand in a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Queen,
    Worker,
    Soldier,
    /// A static piece of a nest, stored alongside ants so they can see it
    NestPiece,
}

impl AgentType {
    pub fn char(&self) -> char {
        match self {
            AgentType::Queen => 'Q',
            AgentType::Worker => 'w',
            AgentType::Soldier => 's',
            AgentType::NestPiece => '#',
        }
    }
}

/// A 24-bit colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Rgb {
        Rgb { r, g, b }
    }

    /// Builds a colour from a `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Rgb {
        Rgb {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }
}

impl From<Rgb> for Color {
    fn from(value: Rgb) -> Color {
        Color::Rgb {
            r: value.r,
            g: value.g,
            b: value.b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_generating_ids_they_are_unique_and_increasing_across_entity_types() {
        let mut ids = IdGenerator::default();

        let species = ids.next_species();
        let ant = ids.next_ant();
        let nest = ids.next_nest();
        let piece = ids.next_piece();

        assert_eq!(species.0, 1);
        assert_eq!(ant.0, 2);
        assert_eq!(nest.0, 3);
        assert_eq!(piece.0, 4);
    }

    #[test]
    fn when_two_generators_are_used_they_do_not_share_state() {
        let mut first = IdGenerator::default();
        let mut second = IdGenerator::default();

        first.next_ant();
        first.next_ant();

        assert_eq!(second.next_ant(), AntId(1));
    }

    #[test]
    fn when_parsing_a_hex_colour_the_channels_are_split_correctly() {
        let colour = Rgb::from_hex(0xE8E5A3);

        assert_eq!(colour, Rgb::new(0xE8, 0xE5, 0xA3));
        assert_eq!(
            Color::from(colour),
            Color::Rgb {
                r: 0xE8,
                g: 0xE5,
                b: 0xA3
            }
        );
    }

    #[test]
    fn when_getting_the_char_of_each_agent_type_they_are_distinct() {
        let chars = [
            AgentType::Queen.char(),
            AgentType::Worker.char(),
            AgentType::Soldier.char(),
            AgentType::NestPiece.char(),
        ];

        for (i, a) in chars.iter().enumerate() {
            for b in chars.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
