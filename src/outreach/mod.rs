//! CSV → templated outreach → conversation assignment.
//!
//! Rows are processed strictly one after another. A row's send failure never
//! stops the run, and the conversation lookup is attempted even when the send
//! failed. Only configuration and validation problems abort, and both do so
//! before the first message is sent.

mod rows;

pub use rows::{load_rows, normalize_validity_date, validate_rows};

use crate::client::{ApiResponse, AssignOutcome};
use crate::compose::MessageTemplates;
use crate::config::MessagingConfig;
use crate::domain::AgentDirectory;
use crate::error::{ApiResult, OutreachError, OutreachResult};
use crate::models::ContactRecord;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Pause between rows.
pub const DEFAULT_ROW_DELAY: Duration = Duration::from_millis(500);

/// Messaging operations needed by the outreach loop.
pub trait MessagingGateway {
    /// Send the outreach template; only the status of the response matters.
    fn send_template(
        &self,
        target_number: &str,
        recipient_name: &str,
        agent_name: &str,
        body_text: &str,
    ) -> ApiResult<ApiResponse>;

    /// Ids of open conversations with `target_number`, in provider order.
    fn find_open_conversations(&self, target_number: &str) -> ApiResult<Vec<String>>;

    /// Assign a conversation; `None` is a no-op returning `NotFound`.
    fn assign_conversation(
        &self,
        conversation_id: Option<&str>,
        agent_id: &str,
    ) -> ApiResult<AssignOutcome>;
}

impl<T: MessagingGateway + ?Sized> MessagingGateway for &T {
    fn send_template(
        &self,
        target_number: &str,
        recipient_name: &str,
        agent_name: &str,
        body_text: &str,
    ) -> ApiResult<ApiResponse> {
        (**self).send_template(target_number, recipient_name, agent_name, body_text)
    }

    fn find_open_conversations(&self, target_number: &str) -> ApiResult<Vec<String>> {
        (**self).find_open_conversations(target_number)
    }

    fn assign_conversation(
        &self,
        conversation_id: Option<&str>,
        agent_id: &str,
    ) -> ApiResult<AssignOutcome> {
        (**self).assign_conversation(conversation_id, agent_id)
    }
}

/// What happened to the conversation step of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// Assignment accepted with status 200
    Assigned(String),
    /// Assignment posted but answered with another status
    Rejected { conversation_id: String, status: u16 },
    /// No open conversation matched the phone number
    NotFound,
    /// Listing conversations failed; assignment was skipped
    LookupFailed(String),
    /// Posting the assignment failed in transport
    AssignFailed(String),
}

/// Outcome of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
    /// 1-based position among the processed rows
    pub line: usize,
    pub hs_object_id: String,
    pub phone: String,
    /// Send answered with status 200
    pub dispatched: bool,
    pub assignment: Assignment,
}

/// Result of an outreach run.
#[derive(Debug, Clone, Default)]
pub struct OutreachReport {
    pub agent_name: String,
    pub agent_id: String,
    pub rows: Vec<RowOutcome>,
    /// Records whose send was accepted
    pub dispatched: Vec<ContactRecord>,
}

impl OutreachReport {
    pub fn attempted(&self) -> usize {
        self.rows.len()
    }

    pub fn send_failures(&self) -> usize {
        self.rows.iter().filter(|r| !r.dispatched).count()
    }

    pub fn assigned(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r.assignment, Assignment::Assigned(_)))
            .count()
    }

    pub fn lookup_misses(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.assignment == Assignment::NotFound)
            .count()
    }
}

/// The per-row send/lookup/assign loop.
pub struct Outreach<G> {
    gateway: G,
    agents: AgentDirectory,
    default_agent_name: String,
    templates: MessageTemplates,
    delay: Duration,
}

impl<G: MessagingGateway> Outreach<G> {
    pub fn new(gateway: G, config: &MessagingConfig) -> Self {
        Self {
            gateway,
            agents: config.agents.clone(),
            default_agent_name: config.agent_name.clone(),
            templates: MessageTemplates::default(),
            delay: DEFAULT_ROW_DELAY,
        }
    }

    pub fn with_templates(mut self, templates: MessageTemplates) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Read `source` and contact every row, up to `count_limit` rows when it
    /// is greater than zero.
    ///
    /// A blank or missing `agent_name` selects the configured default agent.
    pub fn run(
        &self,
        source: &Path,
        agent_name: Option<&str>,
        count_limit: usize,
    ) -> OutreachResult<OutreachReport> {
        let rows = load_rows(source)?;
        self.run_rows(&rows, agent_name, count_limit)
    }

    /// Same as [`Outreach::run`] over rows already in memory.
    pub fn run_rows(
        &self,
        rows: &[ContactRecord],
        agent_name: Option<&str>,
        count_limit: usize,
    ) -> OutreachResult<OutreachReport> {
        if let Err(invalid) = validate_rows(rows) {
            tracing::error!("Rows with empty required fields (phone, firstname):");
            for row in &invalid {
                tracing::error!("  {}", row);
            }
            return Err(OutreachError::Validation(invalid));
        }

        let agent_name = agent_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.default_agent_name)
            .to_string();
        let agent_id = self.agents.resolve(&agent_name).to_string();

        let selected = if count_limit > 0 {
            &rows[..count_limit.min(rows.len())]
        } else {
            rows
        };
        tracing::info!(
            "CSV loaded: {} row(s) (agent: {} / {})",
            selected.len(),
            agent_name,
            agent_id
        );

        let mut report = OutreachReport {
            agent_name,
            agent_id,
            ..OutreachReport::default()
        };

        for (index, row) in selected.iter().enumerate() {
            let outcome = self.process_row(index + 1, row, &report.agent_name, &report.agent_id);
            if outcome.dispatched {
                report.dispatched.push(row.clone());
            }
            report.rows.push(outcome);
        }

        tracing::info!(
            "Outreach finished: {} attempted, {} sent, {} assigned, {} without conversation",
            report.attempted(),
            report.dispatched.len(),
            report.assigned(),
            report.lookup_misses()
        );
        Ok(report)
    }

    fn process_row(
        &self,
        line: usize,
        row: &ContactRecord,
        agent_name: &str,
        agent_id: &str,
    ) -> RowOutcome {
        let message = self.templates.compose(row);

        tracing::info!(
            "Row {}: sending to {} ({})",
            line,
            row.firstname,
            row.phone
        );
        let dispatched =
            match self
                .gateway
                .send_template(&row.phone, &row.firstname, agent_name, &message)
            {
                Ok(response) if response.is_ok() => {
                    tracing::info!("Row {}: message sent", line);
                    true
                }
                Ok(response) => {
                    tracing::warn!(
                        "Row {}: send failed with HTTP {}: {}",
                        line,
                        response.status,
                        response.data
                    );
                    false
                }
                Err(e) => {
                    tracing::error!("Row {}: send failed: {}", line, e);
                    false
                }
            };

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        tracing::info!("Row {}: looking up open conversation", line);
        let assignment = match self.gateway.find_open_conversations(&row.phone) {
            Err(e) => {
                tracing::error!("Row {}: conversation lookup failed: {}", line, e);
                Assignment::LookupFailed(e.to_string())
            }
            Ok(ids) => self.assign(line, ids.first().map(String::as_str), agent_id),
        };

        RowOutcome {
            line,
            hs_object_id: row.hs_object_id.clone(),
            phone: row.phone.clone(),
            dispatched,
            assignment,
        }
    }

    fn assign(&self, line: usize, conversation_id: Option<&str>, agent_id: &str) -> Assignment {
        match self.gateway.assign_conversation(conversation_id, agent_id) {
            Ok(AssignOutcome::NotFound) => {
                tracing::warn!("Row {}: no open conversation found to assign", line);
                Assignment::NotFound
            }
            Ok(AssignOutcome::Assigned {
                conversation_id,
                response,
            }) if response.is_ok() => {
                tracing::info!(
                    "Row {}: conversation {} assigned to agent {}",
                    line,
                    conversation_id,
                    agent_id
                );
                Assignment::Assigned(conversation_id)
            }
            Ok(AssignOutcome::Assigned {
                conversation_id,
                response,
            }) => {
                tracing::warn!(
                    "Row {}: assigning conversation {} returned HTTP {}: {}",
                    line,
                    conversation_id,
                    response.status,
                    response.data
                );
                Assignment::Rejected {
                    conversation_id,
                    status: response.status,
                }
            }
            Err(e) => {
                tracing::error!("Row {}: assignment failed: {}", line, e);
                Assignment::AssignFailed(e.to_string())
            }
        }
    }
}
