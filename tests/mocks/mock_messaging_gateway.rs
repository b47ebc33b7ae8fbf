use crm_outreach::client::{ApiResponse, AssignOutcome};
use crm_outreach::error::{ApiError, ApiResult};
use crm_outreach::outreach::MessagingGateway;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Mock messaging gateway for testing.
///
/// Conversations are registered per normalized phone number and every call
/// is recorded so tests can check exactly what the outreach loop did.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct MockMessagingGateway {
    conversations: Arc<Mutex<HashMap<String, Vec<String>>>>,
    failing_sends: Arc<Mutex<HashSet<String>>>,
    failing_lookups: Arc<Mutex<HashSet<String>>>,
    sends: Arc<Mutex<Vec<SentMessage>>>,
    lookups: Arc<Mutex<Vec<String>>>,
    assignments: Arc<Mutex<Vec<(Option<String>, String)>>>,
}

/// A recorded template send.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub number: String,
    pub name: String,
    pub agent: String,
    pub body: String,
}

#[allow(dead_code)]
impl MockMessagingGateway {
    /// Create a new empty MockMessagingGateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register open conversations for a number, most recent first.
    pub fn add_conversations(&self, number: &str, ids: &[&str]) {
        self.conversations.lock().unwrap().insert(
            crm_outreach::normalize(number),
            ids.iter().map(|id| id.to_string()).collect(),
        );
    }

    /// Sends to this number are answered with HTTP 500.
    pub fn fail_send_for(&self, number: &str) {
        self.failing_sends
            .lock()
            .unwrap()
            .insert(crm_outreach::normalize(number));
    }

    /// Lookups for this number fail in transport.
    pub fn fail_lookup_for(&self, number: &str) {
        self.failing_lookups
            .lock()
            .unwrap()
            .insert(crm_outreach::normalize(number));
    }

    pub fn sends(&self) -> Vec<SentMessage> {
        self.sends.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn assignments(&self) -> Vec<(Option<String>, String)> {
        self.assignments.lock().unwrap().clone()
    }
}

impl MessagingGateway for MockMessagingGateway {
    fn send_template(
        &self,
        target_number: &str,
        recipient_name: &str,
        agent_name: &str,
        body_text: &str,
    ) -> ApiResult<ApiResponse> {
        self.sends.lock().unwrap().push(SentMessage {
            number: target_number.to_string(),
            name: recipient_name.to_string(),
            agent: agent_name.to_string(),
            body: body_text.to_string(),
        });

        let failing = self
            .failing_sends
            .lock()
            .unwrap()
            .contains(&crm_outreach::normalize(target_number));
        if failing {
            Ok(ApiResponse::new(500, json!({"raw": "Internal Server Error"})))
        } else {
            Ok(ApiResponse::new(
                200,
                json!({"data": {"sendMessageV2": {"status": "SENT"}}}),
            ))
        }
    }

    fn find_open_conversations(&self, target_number: &str) -> ApiResult<Vec<String>> {
        self.lookups.lock().unwrap().push(target_number.to_string());

        let key = crm_outreach::normalize(target_number);
        if self.failing_lookups.lock().unwrap().contains(&key) {
            return Err(ApiError::Timeout);
        }
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    fn assign_conversation(
        &self,
        conversation_id: Option<&str>,
        agent_id: &str,
    ) -> ApiResult<AssignOutcome> {
        self.assignments
            .lock()
            .unwrap()
            .push((conversation_id.map(str::to_string), agent_id.to_string()));

        match conversation_id {
            None => Ok(AssignOutcome::NotFound),
            Some(id) => Ok(AssignOutcome::Assigned {
                conversation_id: id.to_string(),
                response: ApiResponse::new(200, json!({"data": {}})),
            }),
        }
    }
}
