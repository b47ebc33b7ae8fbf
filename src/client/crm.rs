//! Client for the CRM's internal GraphQL search endpoint.
//!
//! Authentication piggybacks on a browser session: the raw `Cookie` header of
//! a logged-in user is replayed together with the CSRF token found in it.

use super::{build_agent, post_json, ApiResponse};
use crate::config::CrmConfig;
use crate::error::ApiResult;
use crate::export::ContactSearch;
use crate::metrics::Metrics;
use crate::models::SearchQuery;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Cookies that may carry the CSRF token, in lookup order.
pub const CSRF_COOKIE_NAMES: [&str; 2] = ["hubspotapi-csrf", "csrf.app"];

const CSRF_HEADER: &str = "x-hubspot-csrf-hubspotapi";
const SEARCH_OPERATION: &str = "CrmIndexSearchQuery";
const SEARCH_QUERY: &str = concat!(
    "query CrmIndexSearchQuery($filterGroups: [FilterGroup!]!, $sorts: [Sort!], $query: String, ",
    "$objectTypeId: String!, $properties: [String!]!, $count: Int, $offset: Int) {",
    "  crmObjectsSearch(filterGroups: $filterGroups, sorts: $sorts, query: $query, type: $objectTypeId, count: $count, offset: $offset) {",
    "    total offset results { ...CrmObjectFragment __typename } validationErrors { __typename ... on GenericValidationError { message __typename } } __typename",
    "  }",
    "}",
    "fragment CrmObjectFragment on CrmObject {",
    "  id objectId: id properties(names: $properties) { id name value __typename }",
    "  userPermissions { currentUserCanEdit currentUserCanDelete __typename } __typename",
    "}",
);

/// Parse a raw cookie string (`a=1; b=2`) into name/value pairs.
///
/// Segments without `=` are dropped. Names and values are trimmed and a
/// repeated name keeps its last value.
pub fn parse_cookies(raw: &str) -> BTreeMap<String, String> {
    raw.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

/// Authenticated browser session replayed against the CRM.
#[derive(Debug, Clone, Default)]
pub struct CrmSession {
    cookies: BTreeMap<String, String>,
    csrf_token: Option<String>,
}

impl CrmSession {
    /// Build a session from a raw cookie string.
    ///
    /// A missing CSRF cookie is only warned about; the CRM will reject the
    /// requests with 401 later.
    pub fn from_cookie_string(raw: &str) -> Self {
        let cookies = parse_cookies(raw);
        let csrf_token = CSRF_COOKIE_NAMES
            .iter()
            .filter_map(|name| cookies.get(*name))
            .find(|value| !value.is_empty())
            .cloned();

        if csrf_token.is_none() {
            tracing::warn!(
                "No CSRF cookie ({}) found in the session cookies; CRM requests will be rejected",
                CSRF_COOKIE_NAMES.join(" or ")
            );
        }

        Self {
            cookies,
            csrf_token,
        }
    }

    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Value for the `Cookie` request header.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// HTTP client for the CRM search API.
#[derive(Clone)]
pub struct CrmClient {
    origin: String,
    portal_id: String,
    app_version: String,
    user_agent: String,
    session: CrmSession,
    query: SearchQuery,
    agent: ureq::Agent,
    metrics: Metrics,
}

impl CrmClient {
    /// Create a new CrmClient from configuration.
    pub fn new(config: &CrmConfig, timeout_secs: u64, metrics: Metrics) -> Self {
        Self {
            origin: config.origin.trim_end_matches('/').to_string(),
            portal_id: config.portal_id.clone(),
            app_version: config.app_version.clone(),
            user_agent: config.user_agent.clone(),
            session: CrmSession::from_cookie_string(&config.cookie),
            query: SearchQuery::default(),
            agent: build_agent(timeout_secs),
            metrics,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/graphql/crm", self.origin)
    }

    /// GraphQL body for one page.
    pub fn request_body(&self, offset: usize, count: usize) -> Value {
        json!({
            "operationName": SEARCH_OPERATION,
            "variables": self.query.variables(offset, count),
            "query": SEARCH_QUERY,
        })
    }

    /// Fetch one page of matching contacts.
    pub fn search(&self, offset: usize, count: usize) -> ApiResult<ApiResponse> {
        let mut request = self
            .agent
            .post(&self.endpoint())
            .query("portalId", &self.portal_id)
            .query("clienttimeout", "14000")
            .query("hs_static_app", "crm-index-ui")
            .query("hs_static_app_version", &self.app_version)
            .set("accept", "application/json, text/javascript, */*; q=0.01")
            .set("accept-language", "es-ES,es;q=0.9,en;q=0.8")
            .set("content-type", "application/json")
            .set("user-agent", &self.user_agent)
            .set("origin", &self.origin)
            .set(
                "referer",
                &format!(
                    "{}/contacts/{}/objects/0-1/views/all/list",
                    self.origin, self.portal_id
                ),
            );

        if !self.session.cookies().is_empty() {
            request = request.set("cookie", &self.session.cookie_header());
        }
        if let Some(csrf) = self.session.csrf_token() {
            request = request.set(CSRF_HEADER, csrf);
        }

        post_json(request, &self.request_body(offset, count), &self.metrics)
    }
}

impl ContactSearch for CrmClient {
    fn search_page(&self, offset: usize, count: usize) -> ApiResult<ApiResponse> {
        self.search(offset, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookies() {
        let cookies = parse_cookies("a=1; b=2");
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies["a"], "1");
        assert_eq!(cookies["b"], "2");
    }

    #[test]
    fn test_parse_cookies_drops_malformed_segments() {
        let cookies = parse_cookies("a=1; garbage; ; b = x=y ");
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies["a"], "1");
        assert_eq!(cookies["b"], "x=y");
    }

    #[test]
    fn test_parse_cookies_empty() {
        assert!(parse_cookies("").is_empty());
        assert!(parse_cookies(" ; ;").is_empty());
    }

    #[test]
    fn test_session_csrf_lookup_order() {
        let session = CrmSession::from_cookie_string("csrf.app=second; hubspotapi-csrf=first");
        assert_eq!(session.csrf_token(), Some("first"));

        let session = CrmSession::from_cookie_string("csrf.app=only");
        assert_eq!(session.csrf_token(), Some("only"));

        let session = CrmSession::from_cookie_string("hubspotapi-csrf=; csrf.app=fallback");
        assert_eq!(session.csrf_token(), Some("fallback"));
    }

    #[test]
    fn test_session_without_csrf() {
        let session = CrmSession::from_cookie_string("hubspotutk=abc");
        assert_eq!(session.csrf_token(), None);
        assert_eq!(session.cookie_header(), "hubspotutk=abc");
    }

    #[test]
    fn test_request_body() {
        let client = CrmClient::new(&CrmConfig::default(), 10, Metrics::new());
        let body = client.request_body(15, 5);
        assert_eq!(body["operationName"], "CrmIndexSearchQuery");
        assert_eq!(body["variables"]["offset"], 15);
        assert_eq!(body["variables"]["count"], 5);
        assert!(body["query"].as_str().unwrap().contains("crmObjectsSearch"));
    }
}
