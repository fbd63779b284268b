use std::fmt::{Display, Formatter};
use std::num::NonZero;

use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;

use crate::affiliation::{self, Color};
use crate::cell::Cell;
use crate::level::Level;
use crate::location::{Dimension, Location};
use crate::shape::{BoardShape, SquareStep, Step};
use crate::solver::{GraphSolver, SolverFailure, Subject};

/// Vertex of the graph handed to the solver.
#[derive(Copy, Clone, Hash, PartialEq, Eq, Ord, PartialOrd, Debug)]
pub(crate) struct Node {
    pub(crate) location: Location,
    pub(crate) terminus: Option<Color>,
}

/// A square board of [`Cell`]s, built from a [`Level`].
///
/// Cells are addressed by their flat, row-major index; see [`Self::location_of`] for the conversion.
#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) cells: Array2<Cell>,
    pub(crate) size: Dimension,
}

impl From<&Level> for Board {
    fn from(level: &Level) -> Self {
        let size = level.dimension();
        let cells = Array2::from_shape_fn((size.get(), size.get()), |(row, col)| {
            match NonZero::new(level.values()[row * size.get() + col]) {
                Some(color) => Cell::terminus(color),
                None => Cell::default(),
            }
        });

        Self { cells, size }
    }
}

impl Board {
    /// Width (and height) of the board in cells.
    pub fn size(&self) -> usize {
        self.size.get()
    }

    /// The cell at flat `index`, if there is one.
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(self.location_of(index)?.as_index())
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        let location = self.location_of(index)?;
        self.cells.get_mut(location.as_index())
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item=&Cell> {
        self.cells.iter()
    }

    /// The location of flat `index`, or [`None`] if it is past the last cell.
    pub fn location_of(&self, index: usize) -> Option<Location> {
        (index < self.cells.len()).then(|| Location::from_flat(index, self.size))
    }

    /// The flat index of `location`, or [`None`] if it is off the board.
    pub fn index_of(&self, location: Location) -> Option<usize> {
        location.to_flat(self.size)
    }

    /// The direction of the single step leading from cell `a` to cell `b`.
    ///
    /// Returns [`None`] when the two are not orthogonal neighbors: the same cell, diagonal, further apart, or either
    /// index off the board.
    pub fn direction_between(&self, a: usize, b: usize) -> Option<SquareStep> {
        SquareStep::direction_to(self.location_of(a)?, self.location_of(b)?)
    }

    /// Build the graph of this board for the solver: one vertex per cell and one edge per pair of neighbors.
    /// Painted path cells are ignored; only termini carry a color.
    pub(crate) fn graph(&self) -> UnGraphMap<Node, ()> {
        let size = self.size.get();
        let mut graph = UnGraphMap::with_capacity(
            self.cells.len(),
            // "horizontal" and "vertical" edges
            2 * (size - 1) * size,
        );

        let nodes = Array2::from_shape_fn(self.cells.raw_dim(), |ind| Node {
            location: Location::from(ind),
            terminus: self.cells[ind].color.filter(|_| self.cells[ind].terminus),
        });

        for node in nodes.iter() {
            graph.add_node(*node);
            // add edges down and to the right, if possible
            for step in SquareStep::FORWARD_VARIANTS {
                if let Some(other) = nodes.get(step.attempt_from(node.location).as_index()) {
                    graph.add_edge(*node, *other, ());
                }
            }
        }

        graph
    }

    /// Solves this board, consuming it and returning a copy with every cell painted and connected.
    ///
    /// Whatever paths were drawn on `self` are discarded first; only the termini matter.
    /// Every cell of the result is marked completed.
    ///
    /// Returns according to the result of [`GraphSolver::solve`].
    pub fn solve(mut self) -> Result<Self, SolverFailure> {
        let graph = self.graph();
        let solution = GraphSolver::from(&graph).solve()?;

        for node in graph.nodes() {
            let cell = &mut self.cells[node.location.as_index()];
            cell.clear();
            cell.completed = true;
            if !cell.terminus {
                cell.color = solution.get(&Subject::from(node)).copied().and_then(NonZero::new);
            }
        }

        for triple in graph.all_edges() {
            let joined = solution.get(&Subject::from(triple)).is_some_and(|aff| *aff != 0);
            let (n1, n2, _) = triple;
            if let (true, Some(direction)) = (joined, SquareStep::direction_to(n1.location, n2.location)) {
                self.cells[n1.location.as_index()].exits.insert(direction);
                self.cells[n2.location.as_index()].exits.insert(direction.invert());
            }
        }

        Ok(self)
    }
}

impl Level {
    /// Shorthand for building a [`Board`] from this level and [solving](Board::solve) it.
    pub fn solve(&self) -> Result<Board, SolverFailure> {
        Board::from(self).solve()
    }
}

/// Lay out one character per cell, one row per line.
pub(crate) fn print(board: Array2<char>) -> String {
    let mut out = String::with_capacity(board.nrows() * (board.ncols() + 1));

    for row in board.rows() {
        for col in row {
            out.push(*col);
        }
        out.push('\n');
    }

    out
}

/// Termini print as uppercase letters, painted cells as lowercase letters and empty cells as `.`.
impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", print(self.cells.map(|cell| match cell.color {
            Some(color) if cell.terminus => affiliation::display_of(color).to_ascii_uppercase(),
            Some(color) => affiliation::display_of(color),
            None => '.',
        })))
    }
}
