//! Per-color lines and the edits a player makes to them.

use std::collections::BTreeMap;

use tracing::trace;

use crate::affiliation::Color;
use crate::board::Board;
use crate::shape::{SquareStep, Step};

/// The cells currently drawn for one color, in drawing order.
///
/// The head is the terminus the line was started from; the tail is the cell drawn last.
/// A path never holds a single cell: a lone terminus with nothing attached is an empty path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    color: Color,
    cells: Vec<usize>,
}

impl Path {
    pub(crate) fn new(color: Color) -> Self {
        Self { color, cells: Vec::new() }
    }

    /// The color of every cell on this path.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Flat indices of the cells on this path, head first.
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell drawn last.
    pub fn tail(&self) -> Option<usize> {
        self.cells.last().copied()
    }

    /// Position of cell `index` on this path.
    pub fn position(&self, index: usize) -> Option<usize> {
        self.cells.iter().position(|cell| *cell == index)
    }

    /// Start the path at `index` without linking it to anything.
    pub(crate) fn push(&mut self, index: usize) {
        self.cells.push(index);
    }

    /// Shrink this path to its first `keep` cells, unpainting and unlinking whatever is cut off.
    ///
    /// A `keep` of 0 behaves like 1. Every cell of this color on the board loses its completed mark, since the path
    /// no longer reaches both termini. If only the head survives, it is dropped too.
    pub(crate) fn trim(&mut self, board: &mut Board, keep: usize) {
        if self.cells.is_empty() {
            return;
        }

        for cell in board.cells.iter_mut().filter(|cell| cell.color == Some(self.color)) {
            cell.completed = false;
        }

        let keep = keep.max(1);
        while self.cells.len() > keep {
            let (Some(tail), Some(&before)) = (self.cells.pop(), self.cells.last()) else {
                break;
            };

            if let Some(direction) = board.direction_between(before, tail) {
                if let Some(cell) = board.cell_mut(before) {
                    cell.exits.remove(&direction);
                }
                if let Some(cell) = board.cell_mut(tail) {
                    cell.exits.remove(&direction.invert());
                }
            }
            if let Some(cell) = board.cell_mut(tail) {
                if !cell.terminus {
                    cell.color = None;
                }
            }
        }

        if self.cells.len() == 1 {
            self.cells.clear();
        }

        trace!(color = self.color.get(), len = self.cells.len(), "trimmed path");
    }

    /// Draw from `from`, which must be the tail, one step in `direction` onto `to`.
    pub(crate) fn extend(&mut self, board: &mut Board, from: usize, to: usize, direction: SquareStep) {
        debug_assert_eq!(self.tail(), Some(from));
        debug_assert_eq!(board.direction_between(from, to), Some(direction));

        if let Some(cell) = board.cell_mut(from) {
            cell.exits.insert(direction);
        }
        if let Some(cell) = board.cell_mut(to) {
            cell.exits.insert(direction.invert());
            cell.color.get_or_insert(self.color);
        }
        self.cells.push(to);

        trace!(color = self.color.get(), from, to, ?direction, "extended path");
    }

    /// [Extend](Self::extend) onto the terminus `endpoint` and mark the whole path completed.
    pub(crate) fn complete(&mut self, board: &mut Board, from: usize, endpoint: usize, direction: SquareStep) {
        self.extend(board, from, endpoint, direction);

        for index in &self.cells {
            if let Some(cell) = board.cell_mut(*index) {
                cell.completed = true;
            }
        }
    }
}

/// One [`Path`] per color, created the first time that color is touched.
#[derive(Clone, Debug, Default)]
pub struct PathStore {
    paths: BTreeMap<Color, Path>,
}

impl PathStore {
    /// The path of `color`, if that color was ever touched.
    pub fn get(&self, color: Color) -> Option<&Path> {
        self.paths.get(&color)
    }

    pub(crate) fn get_mut(&mut self, color: Color) -> Option<&mut Path> {
        self.paths.get_mut(&color)
    }

    pub(crate) fn entry(&mut self, color: Color) -> &mut Path {
        self.paths.entry(color).or_insert_with(|| Path::new(color))
    }

    /// Every path, ordered by color.
    pub fn iter(&self) -> impl Iterator<Item=&Path> {
        self.paths.values()
    }

    pub(crate) fn clear(&mut self) {
        self.paths.clear();
    }
}
