//! Domain types and rules for the F5 to Avi migration tracker.
//!
//! Shared by the REST service (`albmig-api`), the store (`albmig-db`) and the
//! operator-side wizard client (`albmig-wizard`).

pub mod conversion;
pub mod discovery;
pub mod error;
pub mod lab_controller;
pub mod migration;
pub mod overview;
pub mod playbook;
pub mod types;
