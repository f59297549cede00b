//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when caller input is malformed.
//! - [`InvalidState`] thrown when a draft-only operation hits a submitted request.
//! - [`IllegalTransition`] thrown when a decision targets a request that is not
//!   in a legal source status (or lost a race to another decision).
//! - [`AlreadySubmitted`] thrown when `submit` loses the race on a draft.
//! - [`KeyNotFound`] thrown when an item is absent or not visible to the caller.
//! - [`ExistingKey`] thrown on duplicate usernames and double-claimed bank
//!   transactions.
//! - [`Unauthorized`] and [`Forbidden`] for bad credentials and missing role.
//!
//! Email delivery failures are **not** engine errors: they travel in
//! [`DispatchReport`](crate::DispatchReport).
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvalidState`]: EngineError::InvalidState
//!  [`IllegalTransition`]: EngineError::IllegalTransition
//!  [`AlreadySubmitted`]: EngineError::AlreadySubmitted
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`Forbidden`]: EngineError::Forbidden
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Illegal transition: {0}")]
    IllegalTransition(String),
    #[error("Request already submitted: {0}")]
    AlreadySubmitted(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::IllegalTransition(a), Self::IllegalTransition(b)) => a == b,
            (Self::AlreadySubmitted(a), Self::AlreadySubmitted(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
