//! Intake core for the state childcare subsidy program: typed application drafts,
//! per-step field validation, eligibility derivation and the draft wizard that ties them
//! together behind injected persistence, provider and record-store collaborators.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
