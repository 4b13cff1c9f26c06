use std::fmt;

use color_eyre::eyre::{eyre, Report};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Template,
    Subaccount,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Template => write!(f, "template"),
            ResourceKind::Subaccount => write!(f, "subaccount"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EmailClientError {
    #[error("Email service unavailable")]
    ServiceUnavailable,

    #[error("No {kind} ({id}) found")]
    NotFound { kind: ResourceKind, id: String },

    #[error("The {kind} ({id}) already exists")]
    AlreadyExists { kind: ResourceKind, id: String },

    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
}

impl EmailClientError {
    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    pub fn already_exists(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::AlreadyExists { kind, id: id.into() }
    }

    pub fn unexpected<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Self::UnexpectedError(Report::new(error))
    }

    pub fn unexpected_msg(msg: &str) -> Self {
        Self::UnexpectedError(eyre!(msg.to_owned()))
    }
}

// Report is not comparable, so two unexpected errors are never equal.
impl PartialEq for EmailClientError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ServiceUnavailable, Self::ServiceUnavailable) => true,
            (
                Self::NotFound { kind: a, id: x },
                Self::NotFound { kind: b, id: y },
            ) => a == b && x == y,
            (
                Self::AlreadyExists { kind: a, id: x },
                Self::AlreadyExists { kind: b, id: y },
            ) => a == b && x == y,
            _ => false,
        }
    }
}
