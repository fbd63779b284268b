//! Level strings: decoding, validation and the built-in levels.

use std::fmt::{Display, Formatter};
use std::num::{NonZero, ParseIntError};
use std::str::FromStr;

use itertools::Itertools;

use crate::affiliation::{self, AffiliationID};
use crate::location::Dimension;

/// Levels shipped with the game, smallest first.
pub const BUILTIN: [&str; 3] = [
    "a1abc2bc",
    "2b7gfe5d10d1f3b1g2e1c2ca1h3a5h5",
    "4o1i9l6a11eb5g5e20j2g26n9f1f9l7h1o7n10j7c6pd3mc4h5p6im3kad23b2k1",
];

/// Upper bound on the number of cells a level string may expand to.
pub const MAX_CELLS: usize = 128 * 128;

/// Reasons a level string cannot be decoded into a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    /// Level strings are made only of ASCII digits and letters.
    #[error("unexpected character {character:?} at offset {offset}")]
    UnexpectedCharacter {
        #[allow(missing_docs)]
        character: char,
        #[allow(missing_docs)]
        offset: usize,
    },
    /// A run of empty cells whose length could not be read.
    #[error("bad run length {run:?} at offset {offset}")]
    BadRunLength {
        #[allow(missing_docs)]
        run: String,
        #[allow(missing_docs)]
        offset: usize,
        #[allow(missing_docs)]
        #[source]
        source: ParseIntError,
    },
    /// The level expands to more than [`MAX_CELLS`] cells.
    #[error("level has more than {} cells", MAX_CELLS)]
    TooLarge,
    /// The level has no cells at all.
    #[error("level is empty")]
    Empty,
    /// The cell count is not a perfect square, so the cells cannot form a square grid.
    #[error("invalid grid definition: {cells} cells do not form a square")]
    NotSquare {
        #[allow(missing_docs)]
        cells: usize,
    },
}

/// Reasons a decoded level is not a fair puzzle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LevelInvalidReason {
    /// Every color must have exactly two endpoints; this one has `count`.
    UnpairedColor {
        #[allow(missing_docs)]
        color: AffiliationID,
        #[allow(missing_docs)]
        count: usize,
    },
}

/// A decoded level: the color of every endpoint, 0 elsewhere, in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    size: Dimension,
    values: Vec<AffiliationID>,
}

impl Level {
    /// Decode a level string.
    ///
    /// A decimal number `n` stands for `n` empty cells; a letter stands for one endpoint whose color is the letter's
    /// position in the alphabet, so `a` and `A` are both color 1.
    /// The string is consumed left to right and must expand to a perfect square number of cells, at most
    /// [`MAX_CELLS`] of them.
    ///
    /// Pairing of endpoints is not checked here; see [`Self::validate`].
    pub fn decode(encoded: &str) -> Result<Self, LevelError> {
        let mut values: Vec<AffiliationID> = Vec::new();
        let mut chars = encoded.char_indices().peekable();

        while let Some(&(offset, character)) = chars.peek() {
            if character.is_ascii_digit() {
                let run: String = chars.peeking_take_while(|(_, c)| c.is_ascii_digit())
                    .map(|(_, c)| c)
                    .collect();
                let length = run.parse::<usize>()
                    .map_err(|source| LevelError::BadRunLength { run: run.clone(), offset, source })?;

                if values.len().checked_add(length).map_or(true, |total| total > MAX_CELLS) {
                    return Err(LevelError::TooLarge);
                }
                values.resize(values.len() + length, 0);
            } else if character.is_ascii_alphabetic() {
                chars.next();
                match affiliation::from_display(character) {
                    Some(color) => values.push(color.get()),
                    None => return Err(LevelError::UnexpectedCharacter { character, offset }),
                }
                if values.len() > MAX_CELLS {
                    return Err(LevelError::TooLarge);
                }
            } else {
                return Err(LevelError::UnexpectedCharacter { character, offset });
            }
        }

        if values.is_empty() {
            return Err(LevelError::Empty);
        }

        let size = exact_sqrt(values.len())
            .and_then(NonZero::new)
            .ok_or(LevelError::NotSquare { cells: values.len() })?;

        Ok(Self { size, values })
    }

    /// Width (and height) of the level in cells.
    pub fn size(&self) -> usize {
        self.size.get()
    }

    pub(crate) fn dimension(&self) -> Dimension {
        self.size
    }

    /// Cell values in row-major order: 0 for an empty cell, the color otherwise.
    pub fn values(&self) -> &[AffiliationID] {
        &self.values
    }

    /// Check that every color present has exactly two endpoints.
    ///
    /// Returns every violation found, ordered by color.
    pub fn validate(&self) -> Result<(), Vec<LevelInvalidReason>> {
        let reasons = self.values.iter()
            .filter(|value| **value != 0)
            .counts()
            .into_iter()
            .filter(|(_, count)| *count != 2)
            .sorted()
            .map(|(color, count)| LevelInvalidReason::UnpairedColor { color: *color, count })
            .collect_vec();

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(reasons)
        }
    }
}

impl FromStr for Level {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// Writes the shortest encoding: runs of empty cells as numbers, endpoints as lowercase letters.
impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (empty, run) in &self.values.iter().chunk_by(|value| **value == 0) {
            if empty {
                write!(f, "{}", run.count())?;
            } else {
                for value in run {
                    write!(f, "{}", NonZero::new(*value).map_or('?', affiliation::display_of))?;
                }
            }
        }

        Ok(())
    }
}

fn exact_sqrt(n: usize) -> Option<usize> {
    // exact for anything up to MAX_CELLS
    let root = (n as f64).sqrt().round() as usize;
    (root * root == n).then_some(root)
}
