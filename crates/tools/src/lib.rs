//! Developer tooling: scene inspector.
//!
//! # Invariants
//! - Tools only read scenes; they never change links or nodes.

mod inspector;

pub use inspector::{NodeInfo, SceneInspector, SceneSummary};
