//! Operation history for commands issued against an external editor process.
//!
//! [`OperationHistory`] is the cursor-based log of mutating commands with named
//! checkpoints. [`UndoData`] captures what each command needs to be reversed,
//! and [`command`] turns records into concrete host commands for undo and redo.

pub mod command;
pub mod error;
pub mod history;
pub mod id;
pub mod record;

pub use command::{
    inverse_command, known_tools, replay_command, wire_command, HostCommand, StepDirection,
};
pub use error::CoreError;
pub use history::{HistoryStatus, OperationHistory};
pub use id::RecordId;
pub use record::{ActorSnapshot, OperationRecord, PreviousActorState, UndoData, Vec3};
