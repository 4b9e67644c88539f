use colis_model::{DemandID, MissionID, ModelError};
use thiserror::Error;

use crate::demands::ClaimRejection;

/// Error taxonomy of the mission engine.
///
/// Every variant carries a stable kind string (see [`CoreError::kind`]) which
/// is what callers key on; raw datastore messages never cross the public
/// boundary.
///
/// An unresolved shipper agency is deliberately absent here: it is a soft
/// condition that never fails the transition and is reported through
/// [`TransitionOutcome::unresolved_agency`](crate::lifecycle::TransitionOutcome)
/// instead.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A referenced mission/demand/parcel/warehouse does not exist (or is
    /// not visible to the caller's agency scope).
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity family ("mission", "demand", "parcel", "warehouse").
        entity: &'static str,
        /// The id (or other key) that failed to resolve.
        id: String,
    },

    /// The requested status change is not permitted from the current state.
    #[error("invalid transition from `{from}` to `{to}`")]
    InvalidTransition {
        /// Current state.
        from: String,
        /// Requested state.
        to: String,
    },

    /// The demand is already claimed by another active mission.
    #[error("demand {0} is already assigned to an active mission")]
    AlreadyAssigned(DemandID),

    /// The supplied completion code does not match the issued one.
    #[error("completion code mismatch for mission {0}")]
    CodeMismatch(MissionID),

    /// None of the requested demands (or parcels) could be claimed, so
    /// mission creation was aborted.
    #[error("none of the requested demands could be claimed")]
    NoDemandsClaimed {
        /// Per-demand rejection reasons.
        rejected: Vec<(DemandID, ClaimRejection)>,
    },

    /// The request is malformed in a way the type system cannot express
    /// (e.g. a direct-parcel creation with no agency).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Datastore-level uniqueness/foreign-key violation not classified
    /// above. Callers retry the operation at most once before surfacing it.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A status string stored in the datastore fell outside its closed set.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Any other datastore failure.
    #[error("database error: {0}")]
    Database(String),
}

impl CoreError {
    /// Stable machine-readable kind string for API surfaces and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::AlreadyAssigned(_) => "already_assigned",
            Self::CodeMismatch(_) => "code_mismatch",
            Self::NoDemandsClaimed { .. } => "no_demands_claimed",
            Self::InvalidRequest(_) => "invalid_request",
            Self::ConstraintViolation(_) => "constraint_violation",
            Self::Model(_) => "invalid_stored_status",
            Self::Database(_) => "database_error",
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation
                | sqlx::error::ErrorKind::ForeignKeyViolation
                | sqlx::error::ErrorKind::CheckViolation => {
                    Self::ConstraintViolation(db.constraint().unwrap_or("unknown").to_string())
                }
                _ => Self::Database(err.to_string()),
            },
            _ => Self::Database(err.to_string()),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CoreError>;
