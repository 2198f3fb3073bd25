//! The module contains the errors the engine can throw.
//!
//! Every validation failure maps to exactly one variant so callers can
//! distinguish the kind; amounts are never coerced and no partial mutation
//! is ever committed alongside an error.

use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("{0}")]
    NotAMember(String),
    #[error("Already a member: {0}")]
    AlreadyMember(String),
    #[error("\"{0}\" already exists!")]
    AlreadyExists(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::NotAMember(a), Self::NotAMember(b)) => a == b,
            (Self::AlreadyMember(a), Self::AlreadyMember(b)) => a == b,
            (Self::AlreadyExists(a), Self::AlreadyExists(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
