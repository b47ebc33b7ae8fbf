//! Conversation summaries returned by the messaging provider.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExternalNumber {
    pub phone_number: Option<String>,
}

/// One open conversation as listed by the provider.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversationSummary {
    #[serde(rename = "ID")]
    pub id: Option<String>,
    pub external_number: Option<ExternalNumber>,
}

impl ConversationSummary {
    pub fn phone_number(&self) -> &str {
        self.external_number
            .as_ref()
            .and_then(|n| n.phone_number.as_deref())
            .unwrap_or("")
    }
}

/// Extract `data.getAircallWorkspaceConversations.items` from a list response.
pub fn conversation_items(body: &Value) -> Vec<ConversationSummary> {
    body.pointer("/data/getAircallWorkspaceConversations/items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|it| serde_json::from_value(it.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conversation_items() {
        let body = json!({"data": {"getAircallWorkspaceConversations": {
            "__typename": "PaginatedConversations",
            "items": [
                {"ID": "c1", "externalNumber": {"phoneNumber": "+34 600 123 456"}},
                {"ID": "c2", "externalNumber": null}
            ]
        }}});
        let items = conversation_items(&body);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id.as_deref(), Some("c1"));
        assert_eq!(items[0].phone_number(), "+34 600 123 456");
        assert_eq!(items[1].phone_number(), "");
    }

    #[test]
    fn test_conversation_items_missing() {
        assert!(conversation_items(&json!({"data": null})).is_empty());
    }
}
