//! Scene authoring: hierarchy edits with undo/redo.
//!
//! # Invariants
//! - All authoring ops are reversible.
//! - After every op the scene's resolved parent links are current.

mod editor;

pub use editor::{EditCommand, EditError, Editor};
