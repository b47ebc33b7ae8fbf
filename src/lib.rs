//! CRM Outreach - exports CRM contacts and sends them a templated WhatsApp message.
//!
//! The pipeline has two sequential stages:
//!
//! 1. **Export**: page through the CRM's internal GraphQL search with a
//!    replayed browser session and write the matching contacts to a CSV file.
//! 2. **Outreach**: read that file, compose a message per contact from its
//!    tax-verification fields, send it through the messaging provider, then
//!    find the resulting open conversation and assign it to an agent.
//!
//! # Architecture
//!
//! - **config**: Configuration loaded once from the environment
//! - **error**: Custom error types for precise error handling
//! - **client**: HTTP clients for the CRM and the messaging provider
//! - **export**: Pagination loop writing the flat file
//! - **compose**: Message body selection
//! - **outreach**: Per-row send, lookup and assignment loop
//! - **domain**: Phone normalization and agent lookup
//! - **models**: Contact record and API shapes
//! - **metrics**: Counters reported at the end of a run
//! - **prompt**: Interactive questions asked by the binary

pub mod client;
pub mod compose;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod metrics;
pub mod models;
pub mod outreach;
pub mod prompt;

pub use client::{ApiResponse, AssignOutcome, CrmClient, CrmSession, MessagingClient};
pub use compose::{compose, MessageTemplates};
pub use config::{Config, CrmConfig, MessagingConfig};
pub use domain::{normalize, AgentDirectory};
pub use error::{ApiError, ConfigError, ExportError, InvalidRow, OutreachError};
pub use export::{ContactSearch, ExportSummary, Exporter};
pub use metrics::{Metrics, MetricsSummary};
pub use models::{ContactRecord, CONTACT_FIELDS};
pub use outreach::{Assignment, MessagingGateway, Outreach, OutreachReport, RowOutcome};
