//! Business-logic services.

pub mod incidents;

pub use incidents::{DeclareParams, IncidentService};
