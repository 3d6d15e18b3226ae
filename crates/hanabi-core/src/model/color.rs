use core::fmt;
use serde::{Deserialize, Serialize};

/// Firework colours. Declaration order is the fixed priority used to break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Color {
    Red = 0,
    Green = 1,
    Yellow = 2,
    White = 3,
    Blue = 4,
}

impl Color {
    pub const COUNT: usize = 5;

    pub const ALL: [Color; Color::COUNT] = [
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::White,
        Color::Blue,
    ];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Color::Red),
            1 => Some(Color::Green),
            2 => Some(Color::Yellow),
            3 => Some(Color::White),
            4 => Some(Color::Blue),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn initial(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Yellow => 'Y',
            Color::White => 'W',
            Color::Blue => 'B',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::White => "white",
            Color::Blue => "blue",
        };
        f.write_str(label)
    }
}
