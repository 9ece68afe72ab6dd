// SongKey - the closed set of 42 keys offered by the key selector
// Seven letters, each natural/sharp/flat, each major or minor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a key name does not belong to the key set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown song key: {0:?}")]
pub struct SongKeyParseError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_char() == c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    pub const ALL: [Accidental; 3] = [Accidental::Natural, Accidental::Sharp, Accidental::Flat];

    fn suffix(self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    fn suffix(self) -> char {
        match self {
            Mode::Major => 'M',
            Mode::Minor => 'm',
        }
    }
}

/// A song key such as "CM" (C major) or "F#m" (F sharp minor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SongKey {
    pub letter: Letter,
    pub accidental: Accidental,
    pub mode: Mode,
}

impl SongKey {
    pub const fn new(letter: Letter, accidental: Accidental, mode: Mode) -> Self {
        Self {
            letter,
            accidental,
            mode,
        }
    }

    /// C major, the default key of a new song
    pub const fn c_major() -> Self {
        Self::new(Letter::C, Accidental::Natural, Mode::Major)
    }

    /// Every key in the selector, in letter/accidental/mode order
    pub fn all() -> impl Iterator<Item = SongKey> {
        Letter::ALL.into_iter().flat_map(|letter| {
            Accidental::ALL.into_iter().flat_map(move |accidental| {
                [Mode::Major, Mode::Minor]
                    .into_iter()
                    .map(move |mode| SongKey::new(letter, accidental, mode))
            })
        })
    }

    /// Pitch class of the tonic (C = 0 .. B = 11)
    pub fn tonic_pitch_class(&self) -> u8 {
        let base: i8 = match self.letter {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        };
        let offset: i8 = match self.accidental {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        };
        (base + offset).rem_euclid(12) as u8
    }
}

impl Default for SongKey {
    fn default() -> Self {
        Self::c_major()
    }
}

impl fmt::Display for SongKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.letter.as_char(),
            self.accidental.suffix(),
            self.mode.suffix()
        )
    }
}

impl FromStr for SongKey {
    type Err = SongKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SongKeyParseError(s.to_string());
        let mut chars = s.chars();

        let letter = chars.next().and_then(Letter::from_char).ok_or_else(err)?;
        let mode = match chars.next_back() {
            Some('M') => Mode::Major,
            Some('m') => Mode::Minor,
            _ => return Err(err()),
        };
        let accidental = match chars.as_str() {
            "" => Accidental::Natural,
            "#" => Accidental::Sharp,
            "b" => Accidental::Flat,
            _ => return Err(err()),
        };

        Ok(SongKey::new(letter, accidental, mode))
    }
}

impl TryFrom<String> for SongKey {
    type Error = SongKeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SongKey> for String {
    fn from(key: SongKey) -> Self {
        key.to_string()
    }
}
