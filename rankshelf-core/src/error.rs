//! Error types for the few fallible surfaces of the crate.
//!
//! Fitting, pair selection and prediction are total functions; only the
//! insertion state machine can be driven with input it cannot accept.

use thiserror::Error;

use crate::insertion::InsertionStage;

/// Errors raised while driving an [`InsertionSession`](crate::InsertionSession).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertionError {
    /// The existing score list is not sorted descending.
    #[error("existing scores must be sorted descending; entry {index} is higher than the one before it")]
    Unsorted {
        /// Position of the first out-of-order entry.
        index: usize,
    },
    /// An existing score lies outside the 0-100 display scale.
    #[error("existing score {score} at entry {index} is outside 0-100")]
    OutOfRange { index: usize, score: i32 },
    /// A transition was fed to a stage that does not accept it.
    #[error("{input} is not accepted while the session is {stage}")]
    UnexpectedInput {
        stage: InsertionStage,
        input: &'static str,
    },
    /// The session already reached a terminal stage.
    #[error("session is already {stage}")]
    Terminal { stage: InsertionStage },
}

/// Unrecognised category name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category \"{0}\" (expected movie, show, book or podcast)")]
pub struct ParseCategoryError(pub String);
