use std::str::FromStr;

use tracing::{debug, error, warn};

use crate::affiliation::Color;
use crate::board::Board;
use crate::cell::Cell;
use crate::level::{Level, LevelError};
use crate::path::PathStore;
use crate::shape::{SquareStep, Step};
use crate::solver::SolverFailure;

/// Whether a line is being drawn, and in which color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawState {
    /// No pointer is held down over a colored cell.
    #[default]
    Idle,
    /// A pointer went down on a cell of this color and has not been released.
    Drawing(Color),
}

/// What produced a pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerDevice {
    /// Only the primary button starts drawing.
    Mouse {
        #[allow(missing_docs)]
        primary: bool,
    },
    #[allow(missing_docs)]
    Touch,
    #[allow(missing_docs)]
    Pen,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
}

/// A pointer event, already resolved to the cell under the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerEvent {
    #[allow(missing_docs)]
    pub kind: PointerEventKind,
    /// Flat index of the cell under the pointer, or [`None`] if the pointer is not over the board.
    pub target: Option<usize>,
    #[allow(missing_docs)]
    pub device: PointerDevice,
}

/// How a [`Session`] dealt with an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The event means nothing to the board; let the host handle it.
    Ignored,
    /// The event was taken, but nothing on the board changed.
    Consumed,
    /// The board or a path changed; redraw.
    Changed,
}

impl Outcome {
    /// Whether the host should suppress its default handling of the event, e.g. scrolling on touch devices.
    pub fn prevent_default(self) -> bool {
        self != Self::Ignored
    }

    #[allow(missing_docs)]
    pub fn changed(self) -> bool {
        self == Self::Changed
    }
}

/// Everything that changes while a level is played: the board, the paths drawn on it and the pointer state.
///
/// A session lives for exactly one level. [Loading](Self::load) another level replaces all of it.
#[derive(Clone, Debug)]
pub struct Session {
    board: Board,
    paths: PathStore,
    state: DrawState,
    // color of the last pointer-down, kept after release
    selected: Option<Color>,
    // cell the line is being drawn from
    current: Option<usize>,
    moves: usize,
}

impl From<&Level> for Session {
    fn from(level: &Level) -> Self {
        Self {
            board: Board::from(level),
            paths: PathStore::default(),
            state: DrawState::Idle,
            selected: None,
            current: None,
            moves: 0,
        }
    }
}

impl FromStr for Session {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(&Level::decode(s)?))
    }
}

impl Session {
    #[allow(missing_docs)]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[allow(missing_docs)]
    pub fn paths(&self) -> &PathStore {
        &self.paths
    }

    #[allow(missing_docs)]
    pub fn state(&self) -> DrawState {
        self.state
    }

    /// The cell drawing currently continues from, if any.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// How many times the player switched to a different color. Purely informational.
    pub fn moves(&self) -> usize {
        self.moves
    }

    /// Replace this session with a fresh one for the level `encoded`.
    ///
    /// If `encoded` does not decode, the error is logged and returned and this session is left as it was.
    pub fn load(&mut self, encoded: &str) -> Result<(), LevelError> {
        let level = Level::decode(encoded).inspect_err(|err| error!(%err, "invalid grid definition"))?;
        if let Err(reasons) = level.validate() {
            warn!(?reasons, "level has unpaired colors");
        }

        *self = Self::from(&level);
        debug!(size = level.size(), "loaded level");
        Ok(())
    }

    /// Feed one pointer event through the matching handler.
    pub fn handle(&mut self, event: PointerEvent) -> Outcome {
        match event.kind {
            PointerEventKind::Down => self.pointer_down(event.target, event.device),
            PointerEventKind::Move => self.pointer_move(event.target),
            PointerEventKind::Up => self.pointer_up(),
        }
    }

    /// Start drawing from the colored cell `target`.
    ///
    /// Pressing a terminus starts its color over from that terminus. Pressing a cell in the middle of a drawn path
    /// cuts the path back to that cell and continues from there. Empty cells and non-primary mouse buttons are
    /// ignored.
    pub fn pointer_down(&mut self, target: Option<usize>, device: PointerDevice) -> Outcome {
        let Some((index, color, terminus)) = target
            .and_then(|index| self.board.cell(index).map(|cell| (index, cell)))
            .and_then(|(index, cell)| Some((index, cell.color()?, cell.is_terminus())))
        else {
            return Outcome::Ignored;
        };

        if matches!(device, PointerDevice::Mouse { primary: false }) {
            return Outcome::Ignored;
        }

        // a painted cell outside of its color's path would break the paths' invariants
        let position = self.paths.get(color).and_then(|path| path.position(index));
        if !terminus && position.is_none() {
            warn!(index, color = color.get(), "painted cell is not on its path");
            return Outcome::Ignored;
        }

        if self.selected != Some(color) {
            self.moves += 1;
        }
        self.selected = Some(color);
        self.state = DrawState::Drawing(color);
        debug!(index, color = color.get(), "started drawing");

        if self.current == Some(index) {
            return Outcome::Consumed;
        }
        self.current = Some(index);

        let path = self.paths.entry(color);
        match position {
            _ if terminus => path.trim(&mut self.board, 1),
            Some(position) => path.trim(&mut self.board, position + 1),
            None => {}
        }
        if path.tail() != Some(index) {
            path.push(index);
        }

        Outcome::Changed
    }

    /// Continue the line onto `target`.
    ///
    /// Only steps onto a neighbor of the current cell count. Stepping back onto the line cuts it back to that cell;
    /// stepping onto the other terminus of the color completes the line; stepping onto an empty cell extends it.
    /// Cells of other colors block the line.
    pub fn pointer_move(&mut self, target: Option<usize>) -> Outcome {
        let DrawState::Drawing(color) = self.state else {
            return Outcome::Ignored;
        };
        let Some((target, target_color, target_terminus)) = target
            .and_then(|index| self.board.cell(index).map(|cell| (index, cell.color(), cell.is_terminus())))
        else {
            return Outcome::Ignored;
        };
        let Some(current) = self.current.filter(|current| *current != target) else {
            return Outcome::Consumed;
        };
        let Some(direction) = self.board.direction_between(current, target) else {
            return Outcome::Ignored;
        };
        let Some(path) = self.paths.get_mut(color) else {
            return Outcome::Consumed;
        };

        match target_color {
            Some(target_color) if target_color == color => {
                if let Some(position) = path.position(target) {
                    path.trim(&mut self.board, position + 1);
                    self.current = path.tail();
                    Outcome::Changed
                } else if target_terminus {
                    path.complete(&mut self.board, current, target, direction);
                    self.current = Some(target);
                    debug!(color = color.get(), len = path.len(), "completed path");
                    Outcome::Changed
                } else {
                    Outcome::Consumed
                }
            }
            Some(_) => Outcome::Consumed,
            None => {
                // a line that already left a terminus cannot continue through one
                let from_terminus = self.board.cell(current).is_some_and(Cell::is_terminus);
                if from_terminus && path.len() > 1 {
                    return Outcome::Consumed;
                }

                path.extend(&mut self.board, current, target, direction);
                self.current = Some(target);
                Outcome::Changed
            }
        }
    }

    /// Stop drawing. The line stays as drawn.
    pub fn pointer_up(&mut self) -> Outcome {
        match self.state {
            DrawState::Drawing(color) => {
                self.state = DrawState::Idle;
                debug!(color = color.get(), "stopped drawing");
                Outcome::Consumed
            }
            DrawState::Idle => Outcome::Ignored,
        }
    }

    /// Replace every drawn line with the solution of the level.
    ///
    /// On failure the session is left as it was.
    pub fn reveal(&mut self) -> Result<(), SolverFailure> {
        let solved = self.board.clone().solve()?;

        self.board.cells.iter_mut().for_each(Cell::clear);
        self.paths.clear();
        self.state = DrawState::Idle;
        self.current = None;

        // follow each solved line from its first terminus, drawing it as a player would
        for (start, cell) in solved.cells().enumerate() {
            let Some(color) = cell.color().filter(|_| cell.is_terminus()) else {
                continue;
            };
            if self.paths.get(color).is_some_and(|path| !path.is_empty()) {
                continue;
            }

            let path = self.paths.entry(color);
            path.push(start);
            let mut from = start;
            while let Some((direction, to)) = next_step(&solved, path.cells(), from) {
                if self.board.cell(to).is_some_and(Cell::is_terminus) {
                    path.complete(&mut self.board, from, to, direction);
                    break;
                }
                path.extend(&mut self.board, from, to, direction);
                from = to;
            }
        }

        debug!(paths = self.paths.iter().count(), "revealed solution");
        Ok(())
    }
}

/// The exit of `from` on `solved` that does not lead back onto `drawn`.
fn next_step(solved: &Board, drawn: &[usize], from: usize) -> Option<(SquareStep, usize)> {
    let location = solved.location_of(from)?;
    solved.cell(from)?.exits().iter()
        .filter_map(|direction| Some((*direction, solved.index_of(direction.attempt_from(location))?)))
        .find(|(_, to)| !drawn.contains(to))
}
