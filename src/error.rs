use serde::Serialize;
use thiserror::Error;

use crate::types::SequenceKind;

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid pitch: {pitch} Hz (must be finite and > 0)")]
    InvalidPitch { pitch: f64 },
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
    #[error("{sequence} sequence is not ordered by start time at index {index}")]
    UnorderedSequence { sequence: SequenceKind, index: usize },
    #[error("{context}: {message}")]
    Alignment {
        context: &'static str,
        message: String,
    },
}

impl DiffError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub(crate) fn alignment(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Alignment {
            context,
            message: err.to_string(),
        }
    }
}

/// Why a single note was excluded from alignment.
///
/// These never abort a diff; they are collected into [`NoteWarning`]s.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoteIssue {
    #[error("pitch {pitch} Hz is not a positive finite frequency")]
    InvalidPitch { pitch: f64 },
    #[error("interval [{start}, {end}) is empty, negative or non-finite")]
    InvalidInterval { start: f64, end: f64 },
    #[error("velocity {velocity} is outside 0..=127")]
    InvalidVelocity { velocity: u8 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteWarning {
    pub sequence: SequenceKind,
    /// Index into the caller's input sequence.
    pub index: usize,
    pub issue: NoteIssue,
}
