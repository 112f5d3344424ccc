/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm::DbErr;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    PreconditionFailed,
    Unauthorized,
    Unavailable,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::PreconditionFailed => "precondition failed",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internal error",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn not_found(entity: &str, id: impl fmt::Display) -> Self {
        CoreError::NotFound(format!("{} {} not found", entity, id))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::Conflict(_) => ErrorKind::Conflict,
            CoreError::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
            CoreError::Unauthorized(_) => ErrorKind::Unauthorized,
            CoreError::Unavailable(_) => ErrorKind::Unavailable,
            CoreError::Internal(_) => ErrorKind::Internal,
            CoreError::Database(DbErr::Conn(_))
            | CoreError::Database(DbErr::ConnectionAcquire(_)) => ErrorKind::Unavailable,
            CoreError::Database(_) => ErrorKind::Internal,
        }
    }

    /// The constant user-visible message, or the underlying error text.
    pub fn message(&self) -> String {
        match self {
            CoreError::NotFound(m)
            | CoreError::Conflict(m)
            | CoreError::PreconditionFailed(m)
            | CoreError::Unauthorized(m)
            | CoreError::Unavailable(m)
            | CoreError::Internal(m) => m.clone(),
            CoreError::Database(e) => e.to_string(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.kind() == ErrorKind::Unavailable
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Internal(format!("Failed to parse JSON: {}", e))
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        CoreError::Unavailable(e.to_string())
    }
}
