//! Error types for molecule construction, readiness checks and parsing.
//!
//! Timeouts and degenerate inputs are not errors: those produce explicit
//! invalid results instead.

use thiserror::Error;

use crate::molecule::{AtomKey, Descriptor};

#[derive(Debug, Error)]
pub enum Error {
    /// A pass ran on a molecule that lacks a required descriptor.
    #[error("descriptor '{0}' is required")]
    MissingDescriptor(Descriptor),

    #[error("atom {0} does not exist")]
    UnknownAtom(AtomKey),

    #[error("atom {0} cannot be bonded to itself")]
    SelfLoop(AtomKey),

    #[error("atoms {0} and {1} are already bonded")]
    DuplicateBond(AtomKey, AtomKey),

    /// Distances are packed into 6 bits.
    #[error("diameter must be within 1..=63, got {0}")]
    InvalidDiameter(u32),

    #[error("construction share must be within [0, 1], got {0}")]
    InvalidShare(f64),

    #[error("parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
