//! Domain helpers shared by the export and outreach stages.
//!
//! Phone numbers are compared in a canonical digits-only form, and agent
//! display names are resolved to messaging-provider identifiers through a
//! fixed, injectable table.

pub mod agents;
pub mod phone;

pub use agents::AgentDirectory;
pub use phone::normalize;
