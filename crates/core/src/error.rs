use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The live F5 controller could not be reached or answered with an
    /// unexpected status.
    #[error("Controller unreachable: {0}")]
    ControllerUnreachable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
