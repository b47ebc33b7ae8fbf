//! Data models for exported contacts and the two GraphQL APIs.
//!
//! This module contains the flat contact record written to CSV, the CRM
//! search request/response shapes, and the conversation summaries returned
//! by the messaging provider.

pub mod contact;
pub mod conversation;
pub mod crm;

pub use contact::{ContactRecord, CONTACT_FIELDS};
pub use conversation::ConversationSummary;
pub use crm::{CrmObject, CrmProperty, Filter, SearchQuery, SortKey};
