use log::{debug, warn};
use std::path::PathBuf;

use crate::runtime::Runtime;

/// A directory move that may have to be undone.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMove {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Tracks completed moves so a failed batch can be rolled back
#[derive(Debug, Default)]
pub struct RelocationJournal {
    moves: Vec<RecordedMove>,
}

impl RelocationJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a move that has completed
    pub fn record(&mut self, from: PathBuf, to: PathBuf) {
        self.moves.push(RecordedMove { from, to });
    }

    pub fn moves(&self) -> &[RecordedMove] {
        &self.moves
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Undo every recorded move, newest first.
    ///
    /// Rollback is best effort: a move that cannot be undone is logged and
    /// returned, and the remaining moves are still attempted.
    pub fn rollback<R: Runtime>(self, runtime: &R) -> Vec<RecordedMove> {
        let mut stuck = Vec::new();
        for recorded in self.moves.into_iter().rev() {
            debug!("Rolling back: {:?} -> {:?}", recorded.to, recorded.from);
            if let Err(e) = runtime.rename(&recorded.to, &recorded.from) {
                warn!("Could not move {:?} back: {:#}", recorded.to, e);
                stuck.push(recorded);
            }
        }
        stuck
    }
}
