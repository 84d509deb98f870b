//! Error taxonomy for the world model.
//!
//! Nothing here is fatal: every variant is a value the caller maps to a
//! [`GameEvent`](crate::events::GameEvent) or a fallback.

use serde::Serialize;
use thiserror::Error;
use tsify_next::Tsify;

use crate::coordinates::Cell;
use crate::types::Money;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("invalid position {cell} in {area}")]
    OutOfBounds { area: String, cell: Cell },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("unknown area '{0}'")]
    UnknownArea(String),
    #[error("unknown npc '{0}'")]
    UnknownNpc(String),
    #[error("unknown item '{0}'")]
    UnknownItem(String),
    #[error("no destination area")]
    NoArea,
}

/// Typed outcome of a failed shop transaction.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionError {
    #[error("not sold here")]
    NotFound,
    #[error("out of stock")]
    OutOfStock,
    #[error("cannot afford (costs ${price:.2})")]
    CannotAfford { price: Money },
    #[error("could not create an instance of '{name}'")]
    CreationFailed { name: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid rules: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid range {name}: {min} > {max}")]
    Range { name: &'static str, min: u32, max: u32 },
    #[error("invalid detection bounds: min_chance {min} must be finite and not above max_chance {max}")]
    ChanceBounds { min: f64, max: f64 },
}

/// A command line that could not be turned into an action.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Tsify)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandError {
    #[error("{usage}")]
    MissingArgument { verb: String, usage: &'static str },
    #[error("Command not understood. Try 'help' for commands.")]
    Unknown { input: String },
}
