//! cellgrid-core - UI-agnostic grid interaction engine.
//!
//! Selection, in-place editing, undo/redo, clipboard and viewport
//! virtualization for one sheet at a time. Rendering and key decoding belong
//! to the host; it feeds pointer gestures and [`GridAction`]s into a
//! [`SheetEngine`] and reads back display values, selection and layout.

pub mod action;
pub mod clipboard;
pub mod config;
pub mod editable;
pub mod engine;
pub mod error;
pub mod history;
pub mod resolver;
pub mod selection;
pub mod sheet;
pub mod viewport;

pub use action::{EngineMode, GridAction, PointerModifiers};
pub use clipboard::{ClipboardBlock, ClipboardProvider, MemoryClipboard};
#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;
pub use config::GridConfig;
pub use editable::{CommitDirection, EditTrigger, EditableController};
pub use engine::SheetEngine;
pub use error::{GridError, Result};
pub use history::{Patch, UndoLog};
pub use resolver::FormulaResolver;
pub use selection::{Direction, GridBounds, Selection, SelectionRect};
pub use sheet::{ChangeHandler, ChangeSet, Sheet};
pub use viewport::{CellKind, CellRect, ResizeStrategy, Viewport, VisibleRange};

pub use cellgrid_formula::{CellAddress, CellValue, FormulaEngine, FormulaError, Grid};
