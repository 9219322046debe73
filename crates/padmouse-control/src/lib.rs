//! Delivers virtual mouse events to the desktop through enigo.

mod action;
mod injector;

use thiserror::Error;

pub use action::{Action, PointerButton, ScrollAxis, SystemKey};
pub use injector::Injector;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("cannot connect to the input system: {0}")]
    Connect(#[from] enigo::NewConError),
    #[error("input injection failed: {0}")]
    Input(#[from] enigo::InputError),
}
