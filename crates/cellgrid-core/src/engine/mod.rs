//! Per-sheet interaction engine (UI-agnostic).

mod clipboard_ops;
mod input;
mod layout;
mod ops;
mod state;

pub use state::SheetEngine;
