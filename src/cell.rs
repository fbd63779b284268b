use std::collections::HashSet;

use crate::affiliation::Color;
use crate::shape::SquareStep;

/// One square of a board, as seen by a renderer after every event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub(crate) color: Option<Color>,
    pub(crate) terminus: bool,
    // at most two; a terminus has at most one
    pub(crate) exits: HashSet<SquareStep>,
    pub(crate) completed: bool,
}

impl Cell {
    pub(crate) fn terminus(color: Color) -> Self {
        Self {
            color: Some(color),
            terminus: true,
            ..Default::default()
        }
    }

    /// The color painted on this cell, if any. Termini always have one.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Whether this cell is one of the two fixed endpoints of its color.
    pub fn is_terminus(&self) -> bool {
        self.terminus
    }

    /// Directions in which a path leaves this cell.
    pub fn exits(&self) -> &HashSet<SquareStep> {
        &self.exits
    }

    /// Whether this cell is on a path that joins both endpoints of its color.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Return this cell to its just-decoded state.
    pub(crate) fn clear(&mut self) {
        self.exits.clear();
        self.completed = false;
        if !self.terminus {
            self.color = None;
        }
    }
}
