#![warn(missing_docs)]

//! # `flowlink`
//!
//! The playable half of [Numberlink](https://en.wikipedia.org/wiki/Numberlink) as posited in the mobile game Flow Free:
//! decoding levels and turning a player's pointer drags into lines.
//!
//! Begin by decoding a level string with [`Level::decode`], then start a [`Session`] from it.
//! Feed the session pointer events already resolved to cell indices ([`Session::pointer_down`],
//! [`Session::pointer_move`], [`Session::pointer_up`]) and redraw from [`Session::board`] whenever an event returns
//! [`Outcome::Changed`].
//!
//! # Levels
//! A level string is read left to right. A decimal number `n` stands for `n` empty cells and a letter stands for an
//! endpoint, `a` being color 1, `b` color 2 and so on. The cells fill a square board row by row, so the total must be
//! a perfect square: `a1abc2bc` is the 3x3 board
//! ```text
//! A.A
//! BC.
//! .BC
//! ```
//!
//! # Drawing
//! Each color owns one [`Path`](path::Path). Pressing a terminus starts its color over; dragging onto empty neighbors
//! extends the line, dragging back over it cuts it back, and reaching the other terminus completes it.
//! Lines of other colors block the way.
//!
//! # Solving
//! [`Board::solve`] expresses the board as a Boolean satisfiability problem over an undirected graph of its cells,
//! in the manner of [Matt Zucker's solution](https://mzucker.github.io/2016/09/02/eating-sat-flavored-crow.html),
//! and hands it to a SAT solver. [`Session::reveal`] draws the result.

pub use affiliation::{AffiliationID, Color};
pub use board::Board;
pub use cell::Cell;
pub use level::{Level, LevelError, LevelInvalidReason};
pub use location::Location;
pub use session::{DrawState, Outcome, PointerDevice, PointerEvent, PointerEventKind, Session};
pub use solver::SolverFailure;

pub(crate) mod affiliation;
pub(crate) mod board;
pub(crate) mod cell;
pub mod level;
pub(crate) mod location;
pub(crate) mod logic;
pub mod path;
pub(crate) mod session;
pub mod shape;
pub(crate) mod solver;
mod tests;
#[cfg(feature = "wasm")]
pub mod wasm;
