//! Scene activation: swaps the active scene graph as one blocking sequence.
//!
//! # Invariants
//! - Collaborators are told about a reset before the active slot changes.
//! - A scene is published only after it is initialized and reconciled.
//! - A failed load leaves no scene active, never a stale or partial one.

pub mod bus;
pub mod config;
pub mod console;
pub mod controller;

pub use bus::{Broadcaster, MessageBus, ResetSignal};
pub use config::SceneManagerConfig;
pub use console::{Console, TracingConsole};
pub use controller::{ActivationPhase, InitError, LoadOutcome, SceneManager, SceneSlot};
