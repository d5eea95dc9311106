//! Error types for model loading and transform input.

use std::path::PathBuf;
use thiserror::Error;

use crate::geometry::Axis;

/// Result type for model parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for transform input.
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors that abort a model load. A failed load never yields a partial mesh.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The model path is missing, unreadable or not a regular file.
    #[error("cannot open model file: {}", .path.display())]
    FileNotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// A recognized record has the wrong arity or non-numeric fields.
    #[error("malformed `{kind}` record on line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number in the source text.
        line: usize,
        /// Record keyword (`v` or `f`).
        kind: &'static str,
        /// What was wrong with the record.
        reason: String,
    },

    /// A face references a vertex that does not exist.
    #[error("face on line {line} references vertex {index}, but the model has {vertex_count} vertices")]
    DanglingFaceIndex {
        /// 1-based line number of the face record.
        line: usize,
        /// The vertex reference as written in the file.
        index: i64,
        /// Number of vertices available when the reference was resolved.
        vertex_count: usize,
    },

    /// The file contains no vertex records.
    #[error("model contains no vertices")]
    EmptyModel,

    /// An I/O failure while reading a file that was opened.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Payload-free discriminant of [`ParseError`], cheap to hand to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// See [`ParseError::FileNotFound`].
    FileNotFound,
    /// See [`ParseError::MalformedRecord`].
    MalformedRecord,
    /// See [`ParseError::DanglingFaceIndex`].
    DanglingFaceIndex,
    /// See [`ParseError::EmptyModel`].
    EmptyModel,
    /// See [`ParseError::Io`].
    Io,
}

impl ParseError {
    pub(crate) fn malformed(line: usize, kind: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            kind,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            Self::FileNotFound { .. } => ParseErrorKind::FileNotFound,
            Self::MalformedRecord { .. } => ParseErrorKind::MalformedRecord,
            Self::DanglingFaceIndex { .. } => ParseErrorKind::DanglingFaceIndex,
            Self::EmptyModel => ParseErrorKind::EmptyModel,
            Self::Io(_) => ParseErrorKind::Io,
        }
    }
}

/// Rejected transform input. Only the offending field is affected; pending
/// state for every other field is kept.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TransformError {
    /// Scale factors must be finite and strictly positive.
    #[error("invalid scale factor {value}: must be finite and greater than zero")]
    InvalidScaleInput { value: f32 },

    /// Translation and rotation deltas must be finite.
    #[error("non-finite delta {value} on axis {axis:?}")]
    NonFiniteInput { axis: Axis, value: f32 },
}
