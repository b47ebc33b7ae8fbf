//! Client for the messaging provider's internal GraphQL endpoint.
//!
//! Three operations are used: sending the outreach template, listing the
//! workspace's open conversations, and assigning a conversation to an agent.
//! Every operation needs the authorization token.

use super::{build_agent, post_json, ApiResponse};
use crate::config::MessagingConfig;
use crate::domain::phone;
use crate::error::{ApiError, ApiResult, ConfigError};
use crate::metrics::Metrics;
use crate::models::conversation::{conversation_items, ConversationSummary};
use crate::outreach::MessagingGateway;
use serde_json::{json, Value};

pub const SEND_OPERATION: &str = "sendMessage_Mutation";
pub const LIST_OPERATION: &str = "ConversationsList_Query";
pub const ASSIGN_OPERATION: &str = "assignConversation_Mutation";

/// Number of most recent open conversations inspected per lookup.
pub const CONVERSATION_PAGE_LIMIT: usize = 10;

const SEND_QUERY: &str = r#"mutation sendMessage_Mutation($input: SendMessageV2Input!) {
  sendMessageV2(input: $input) {
    ... on SendMessageV2Output {
      channel messageID direction status text
      mediaDetails { url fileName __typename }
      __typename
    }
    ... on SendMessageV2Error {
      code limitType message __typename
    }
    ...GenericExceptionFragment
    __typename
  }
}
fragment GenericExceptionFragment on GenericException { __typename code message }"#;

const LIST_QUERY: &str = r#"query ConversationsList_Query($filters: AircallWorkspaceConversationsFilters, $pageRequest: AircallWorkspaceConversationsPageRequest) {
  getAircallWorkspaceConversations(filters: $filters, pageRequest: $pageRequest) {
    __typename
    ... on PaginatedConversations {
      pageInfo { nextToken }
      items {
        ID
        externalNumber { phoneNumber }
        line { entity { ID name } }
        lastMessageAt
        lastWhatsappAt
        lastEngagementAt
      }
    }
  }
}"#;

const ASSIGN_QUERY: &str = r#"mutation assignConversation_Mutation($ID: ID!, $agentID: ID!) {
  assignAircallWorkspaceConversation(ID: $ID, agentID: $agentID) {
    __typename
    ... on AircallWorkspaceConversation { ID __typename }
    ... on GenericException { code message __typename }
  }
}"#;

/// Result of an assignment attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignOutcome {
    /// The mutation was posted; `response.status` tells whether it was accepted.
    Assigned {
        conversation_id: String,
        response: ApiResponse,
    },
    /// No conversation id was available, so nothing was posted.
    NotFound,
}

/// Ids of the conversations whose external number equals `target` once both
/// are normalized, in provider order.
///
/// A target without any digit matches nothing.
pub fn matching_conversation_ids(items: &[ConversationSummary], target: &str) -> Vec<String> {
    let target = phone::normalize(target);
    if target.is_empty() {
        return Vec::new();
    }
    items
        .iter()
        .filter(|item| phone::normalize(item.phone_number()) == target)
        .filter_map(|item| item.id.clone())
        .collect()
}

/// HTTP client for the messaging provider.
#[derive(Clone)]
pub struct MessagingClient {
    api_url: String,
    origin: String,
    auth_token: Option<String>,
    channel: String,
    line_id: String,
    template_id: String,
    agent: ureq::Agent,
    metrics: Metrics,
}

impl MessagingClient {
    /// Create a new MessagingClient from configuration.
    ///
    /// The token is not checked here; each operation fails with
    /// [`ConfigError::MissingVar`] when it is absent.
    pub fn new(config: &MessagingConfig, timeout_secs: u64, metrics: Metrics) -> Self {
        Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            origin: config.origin.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            channel: config.channel.clone(),
            line_id: config.line_id.clone(),
            template_id: config.template_id.clone(),
            agent: build_agent(timeout_secs),
            metrics,
        }
    }

    fn build_url(&self, operation: &str) -> String {
        format!(
            "{}/graphql?name={}",
            self.api_url,
            urlencoding::encode(operation)
        )
    }

    /// Authenticated POST request for a named operation.
    fn request(&self, operation: &str) -> ApiResult<ureq::Request> {
        let token = self
            .auth_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("AIRCALL_AUTH_TOKEN".to_string()))?;

        Ok(self
            .agent
            .post(&self.build_url(operation))
            .set("accept", "*/*")
            .set("content-type", "application/json")
            .set("authorization", token)
            .set("origin", &self.origin)
            .set("referer", &format!("{}/workspace/conversations", self.origin)))
    }

    /// GraphQL body for a template send.
    pub fn send_body(
        &self,
        target_number: &str,
        recipient_name: &str,
        agent_name: &str,
        body_text: &str,
    ) -> Value {
        json!({
            "operationName": SEND_OPERATION,
            "variables": {
                "input": {
                    "text": "",
                    "mediaKeys": [],
                    "lineID": self.line_id,
                    "externalNumber": target_number,
                    "channel": self.channel,
                    "templateParams": {
                        "id": self.template_id,
                        "body": [
                            {"key": "{{1}}", "value": recipient_name},
                            {"key": "{{2}}", "value": agent_name},
                            {"key": "{{3}}", "value": body_text},
                        ],
                    },
                }
            },
            "query": SEND_QUERY,
        })
    }

    /// Send the outreach template to `target_number`.
    ///
    /// The payload is not inspected; callers only look at the status.
    pub fn send_template(
        &self,
        target_number: &str,
        recipient_name: &str,
        agent_name: &str,
        body_text: &str,
    ) -> ApiResult<ApiResponse> {
        let request = self.request(SEND_OPERATION)?;
        let body = self.send_body(target_number, recipient_name, agent_name, body_text);
        let response = post_json(request, &body, &self.metrics)?;
        if response.is_ok() {
            self.metrics.record_message_sent();
        }
        Ok(response)
    }

    /// The most recent open conversations of the workspace.
    pub fn list_open_conversations(&self) -> ApiResult<Vec<ConversationSummary>> {
        let request = self.request(LIST_OPERATION)?;
        let body = json!({
            "operationName": LIST_OPERATION,
            "query": LIST_QUERY,
            "variables": {
                "filters": {"status": {"in": ["OPENED"]}},
                "pageRequest": {"limit": CONVERSATION_PAGE_LIMIT, "sort": "desc"},
            },
        });

        let response = post_json(request, &body, &self.metrics)?;
        if !response.is_ok() {
            return Err(ApiError::Status {
                status: response.status,
                body: response.data.to_string(),
            });
        }
        if response.data.get("raw").is_some() {
            return Err(ApiError::HttpError(format!(
                "Conversation list is not JSON: {}",
                response.data["raw"]
            )));
        }

        Ok(conversation_items(&response.data))
    }

    /// Ids of open conversations with `target_number`, most recent first.
    pub fn find_open_conversations(&self, target_number: &str) -> ApiResult<Vec<String>> {
        let items = self.list_open_conversations()?;
        Ok(matching_conversation_ids(&items, target_number))
    }

    /// Assign a conversation to an agent.
    ///
    /// Without a conversation id this is a no-op returning
    /// [`AssignOutcome::NotFound`].
    pub fn assign_conversation(
        &self,
        conversation_id: Option<&str>,
        agent_id: &str,
    ) -> ApiResult<AssignOutcome> {
        let Some(conversation_id) = conversation_id.filter(|id| !id.is_empty()) else {
            return Ok(AssignOutcome::NotFound);
        };

        let request = self.request(ASSIGN_OPERATION)?;
        let body = json!({
            "operationName": ASSIGN_OPERATION,
            "query": ASSIGN_QUERY,
            "variables": {"ID": conversation_id, "agentID": agent_id},
        });

        let response = post_json(request, &body, &self.metrics)?;
        if response.is_ok() {
            self.metrics.record_conversation_assigned();
        }
        Ok(AssignOutcome::Assigned {
            conversation_id: conversation_id.to_string(),
            response,
        })
    }
}

impl MessagingGateway for MessagingClient {
    fn send_template(
        &self,
        target_number: &str,
        recipient_name: &str,
        agent_name: &str,
        body_text: &str,
    ) -> ApiResult<ApiResponse> {
        MessagingClient::send_template(self, target_number, recipient_name, agent_name, body_text)
    }

    fn find_open_conversations(&self, target_number: &str) -> ApiResult<Vec<String>> {
        MessagingClient::find_open_conversations(self, target_number)
    }

    fn assign_conversation(
        &self,
        conversation_id: Option<&str>,
        agent_id: &str,
    ) -> ApiResult<AssignOutcome> {
        MessagingClient::assign_conversation(self, conversation_id, agent_id)
    }
}
