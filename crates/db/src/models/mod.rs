//! Database row structs.
//!
//! Each submodule holds a `FromRow` struct matching the table and the
//! conversion into the matching `albmig_core` domain type. Status columns are
//! TEXT, so those conversions are fallible.

pub mod conversion;
pub mod lab_controller;
pub mod playbook;
pub mod run;
pub mod virtual_service;

/// Wrap a domain decoding failure as a sqlx decode error.
pub(crate) fn decode_error(err: albmig_core::error::CoreError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}
