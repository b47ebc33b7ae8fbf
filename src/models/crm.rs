//! CRM search request and response shapes.
//!
//! The request side ([`SearchQuery`], [`Filter`], [`SortKey`]) is serialized
//! into the `variables` of the CRM index search query. The response side
//! ([`CrmObject`], [`CrmProperty`]) is read leniently: anything that does not
//! look like a result list is treated as an empty page.

use super::contact::CONTACT_FIELDS;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// CRM object type id for contacts.
pub const CONTACT_OBJECT_TYPE: &str = "0-1";

/// A single filter inside a filter group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub operator: String,
    pub property: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time_format: Option<String>,
}

impl Filter {
    fn new(operator: &str, property: &str) -> Self {
        Self {
            operator: operator.to_string(),
            property: property.to_string(),
            value: None,
            values: None,
            date_time_format: None,
        }
    }

    /// `property == value`
    pub fn equals(property: &str, value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
            ..Self::new("EQ", property)
        }
    }

    /// `property > date` where `date` is `YYYY-MM-DD`
    pub fn after_date(property: &str, date: &str) -> Self {
        Self {
            value: Some(date.to_string()),
            date_time_format: Some("DATE".to_string()),
            ..Self::new("GT", property)
        }
    }

    pub fn is_in(property: &str, values: &[&str]) -> Self {
        Self {
            values: Some(values.iter().map(|v| v.to_string()).collect()),
            ..Self::new("IN", property)
        }
    }

    pub fn not_in(property: &str, values: &[&str]) -> Self {
        Self {
            values: Some(values.iter().map(|v| v.to_string()).collect()),
            ..Self::new("NOT_IN", property)
        }
    }

    pub fn missing(property: &str) -> Self {
        Self::new("NOT_HAS_PROPERTY", property)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub property: String,
    pub order: SortOrder,
}

impl SortKey {
    pub fn new(property: &str, order: SortOrder) -> Self {
        Self {
            property: property.to_string(),
            order,
        }
    }
}

/// Everything about a CRM search except pagination.
///
/// [`SearchQuery::default`] encodes the outreach eligibility rules: contacts
/// created after 2025-12-01, owned by the outreach owner, in progress, with a
/// failed tax verification, and never reached on WhatsApp before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub filters: Vec<Filter>,
    pub sorts: Vec<SortKey>,
    pub properties: Vec<String>,
    pub object_type_id: String,
}

impl SearchQuery {
    /// GraphQL `variables` for one page.
    pub fn variables(&self, offset: usize, count: usize) -> Value {
        serde_json::json!({
            "count": count,
            "filterGroups": [{ "filters": self.filters }],
            "objectTypeId": self.object_type_id,
            "offset": offset,
            "properties": self.properties,
            "query": "",
            "sorts": self.sorts,
        })
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            filters: vec![
                Filter::not_in("acquisition_channel", &["LABORAI_WHATSAPP_2025"]),
                Filter::missing("last_aircall_whatsapp_message_timestamp"),
                Filter::after_date("createdate", "2025-12-01"),
                Filter::is_in("hubspot_owner_id", &["76484327"]),
                Filter::is_in("hs_lead_status", &["IN_PROGRESS_LABORAI"]),
                Filter::is_in("query_type", &["reclama"]),
                Filter::is_in("lifecyclestage", &["customer", "lead"]),
                Filter::equals("aeat_reference", "ERROR"),
            ],
            // createdate alone is not stable across pages while the CRM is being written to
            sorts: vec![
                SortKey::new("createdate", SortOrder::Asc),
                SortKey::new("hs_object_id", SortOrder::Desc),
            ],
            properties: CONTACT_FIELDS.iter().map(|f| f.to_string()).collect(),
            object_type_id: CONTACT_OBJECT_TYPE.to_string(),
        }
    }
}

/// A property of a CRM object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmProperty {
    pub name: String,
    pub value: Option<String>,
}

/// A search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmObject {
    pub id: Value,
    pub properties: Vec<CrmProperty>,
}

/// Extract `data.crmObjectsSearch.results` from a search response body.
///
/// Missing keys, nulls and malformed entries all yield an empty list.
pub fn search_results(body: &Value) -> Vec<CrmObject> {
    body.pointer("/data/crmObjectsSearch/results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .filter_map(|r| serde_json::from_value(r.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
