//! Application layer - Use cases that coordinate the package domain.
//!
//! This layer orchestrates the flow of data between the CLI layer and the
//! filesystem, one action per direction.

mod relocate;
mod restore;

pub use relocate::{RelocateAction, RelocationReport};
pub use restore::{RestoreAction, RestoreReport};
