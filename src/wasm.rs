//! Bindings for a browser host.
//!
//! The host resolves pointer events to cell indices itself, forwards them here, and redraws from
//! [`colors`](Game::colors), [`termini`](Game::termini), [`exits`](Game::exits) and [`completed`](Game::completed)
//! whenever a handler returns `true`.

use wasm_bindgen::prelude::*;

use crate::level::{Level, BUILTIN};
use crate::session::{PointerDevice, Session};
use crate::shape::SquareStep;

/// A [`Session`] exposed to JavaScript.
#[wasm_bindgen]
pub struct Game {
    session: Session,
}

fn exit_bit(direction: &SquareStep) -> u8 {
    match direction {
        SquareStep::Up => 1,
        SquareStep::Down => 2,
        SquareStep::Left => 4,
        SquareStep::Right => 8,
    }
}

#[wasm_bindgen]
impl Game {
    /// Start a game on the level `encoded`.
    #[wasm_bindgen(constructor)]
    pub fn new(encoded: &str) -> Result<Game, JsError> {
        Ok(Self { session: encoded.parse::<Session>()? })
    }

    /// Start a game on one of the built-in levels, picked at random.
    pub fn random() -> Result<Game, JsError> {
        let pick = (js_sys::Math::random() * BUILTIN.len() as f64) as usize;
        let level = Level::decode(BUILTIN[pick.min(BUILTIN.len() - 1)])?;
        Ok(Self { session: Session::from(&level) })
    }

    /// Switch to the level `encoded`, keeping the current one if it does not decode.
    pub fn load(&mut self, encoded: &str) -> Result<(), JsError> {
        Ok(self.session.load(encoded)?)
    }

    #[allow(missing_docs)]
    pub fn size(&self) -> usize {
        self.session.board().size()
    }

    #[allow(missing_docs)]
    pub fn moves(&self) -> usize {
        self.session.moves()
    }

    /// `mouse_button` is the DOM `MouseEvent.button` for mice and absent for touch and pen.
    ///
    /// Returns whether the event should have its default action prevented.
    pub fn pointer_down(&mut self, target: Option<u32>, mouse_button: Option<i16>) -> bool {
        let device = match mouse_button {
            Some(button) => PointerDevice::Mouse { primary: button == 0 },
            None => PointerDevice::Touch,
        };
        self.session.pointer_down(target.map(|index| index as usize), device).prevent_default()
    }

    /// Returns whether the event should have its default action prevented.
    pub fn pointer_move(&mut self, target: Option<u32>) -> bool {
        self.session.pointer_move(target.map(|index| index as usize)).prevent_default()
    }

    /// Returns whether the event should have its default action prevented.
    pub fn pointer_up(&mut self) -> bool {
        self.session.pointer_up().prevent_default()
    }

    /// Fill in every line with the solution.
    pub fn reveal(&mut self) -> Result<(), JsError> {
        Ok(self.session.reveal()?)
    }

    /// Color of every cell in row-major order, 0 where unpainted.
    pub fn colors(&self) -> Vec<u32> {
        self.session.board().cells()
            .map(|cell| cell.color().map_or(0, |color| color.get() as u32))
            .collect()
    }

    /// 1 for every terminus, 0 elsewhere.
    pub fn termini(&self) -> Vec<u8> {
        self.session.board().cells().map(|cell| cell.is_terminus() as u8).collect()
    }

    /// Exits of every cell as a bitmask: up = 1, down = 2, left = 4, right = 8.
    pub fn exits(&self) -> Vec<u8> {
        self.session.board().cells()
            .map(|cell| cell.exits().iter().map(exit_bit).fold(0, |mask, bit| mask | bit))
            .collect()
    }

    /// 1 for every cell on a completed line, 0 elsewhere.
    pub fn completed(&self) -> Vec<u8> {
        self.session.board().cells().map(|cell| cell.is_completed() as u8).collect()
    }
}
