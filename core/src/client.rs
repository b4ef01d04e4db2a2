//! DHIS2 API client: URL composition, parameter merging, execution and
//! response parsing.
//!
//! # Design
//! `Dhis2Client` holds only a base URL and the fixed default query
//! parameters; it carries no mutable state between calls, so concurrent
//! requests on one instance are independent. Request building and response
//! parsing are split out (`build_request` / `parse_response`) and stay free
//! of I/O; `request` is the one place that touches the network, executing a
//! single best-effort round-trip over ureq. No retries, no caching.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, error};
use url::{form_urlencoded, Url};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Relative path the DHIS2 server exposes its Web API under, as seen from
/// a custom form or report hosted inside the application.
pub const DEFAULT_BASE_URL: &str = "../../../api";

/// Client for the DHIS2 Web API.
#[derive(Debug, Clone)]
pub struct Dhis2Client {
    base_url: String,
    default_params: BTreeMap<String, String>,
}

impl Default for Dhis2Client {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Dhis2Client {
    /// Create a client bound to `base_url`, stored verbatim (no
    /// trailing-slash normalization, no validation — a malformed value
    /// surfaces later as `ApiError::InvalidUrl`).
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            default_params: BTreeMap::from([("paging".to_string(), "false".to_string())]),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Overlay `params` onto the instance defaults. Call-site entries win
    /// on key collision; every key from either side appears exactly once.
    pub fn merged_params(&self, params: &[(&str, &str)]) -> BTreeMap<String, String> {
        let mut merged = self.default_params.clone();
        for (key, value) in params {
            merged.insert((*key).to_string(), (*value).to_string());
        }
        merged
    }

    /// Compose `base_url + "/" + endpoint` with the merged query string
    /// appended, without touching the network.
    pub fn build_request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        params: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<HttpRequest, ApiError> {
        let target = format!("{}/{}", self.base_url, endpoint);
        match Url::parse(&target) {
            Ok(_) => {}
            // The default base URL is relative and resolves against the
            // hosting page; it cannot be validated here.
            Err(url::ParseError::RelativeUrlWithoutBase) => {}
            Err(e) => return Err(ApiError::InvalidUrl(format!("{target}: {e}"))),
        }

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.merged_params(params))
            .finish();
        let url = if query.is_empty() {
            target
        } else {
            format!("{target}?{query}")
        };

        Ok(HttpRequest {
            method,
            url,
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            body: body.map(Value::to_string),
        })
    }

    /// Interpret a response: non-2xx becomes `HttpStatus`, otherwise the
    /// body is parsed as JSON.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value, ApiError> {
        if !(200..300).contains(&response.status) {
            return Err(ApiError::HttpStatus {
                status: response.status,
                body: response.body,
            });
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::JsonParse(e.to_string()))
    }

    /// Build, execute and parse one request. Every failure is logged once
    /// before it propagates; callers that log as well will see duplicate
    /// entries, which is accepted.
    pub fn request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        params: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let result = self.try_request(endpoint, method, params, body);
        if let Err(e) = &result {
            error!(endpoint, method = method.as_str(), error = %e, "DHIS2 API request failed");
        }
        result
    }

    fn try_request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        params: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let request = self.build_request(endpoint, method, params, body)?;
        debug!(url = %request.url, method = method.as_str(), "issuing request");
        let response = execute(request)?;
        self.parse_response(response)
    }

    /// GET `endpoint` with the merged query parameters.
    pub fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value, ApiError> {
        self.request(endpoint, HttpMethod::Get, params, None)
    }

    /// POST `body` to `endpoint`.
    pub fn post(
        &self,
        endpoint: &str,
        body: &Value,
        params: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        self.request(endpoint, HttpMethod::Post, params, Some(body))
    }

    /// PUT `body` to `endpoint`.
    pub fn put(
        &self,
        endpoint: &str,
        body: &Value,
        params: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        self.request(endpoint, HttpMethod::Put, params, Some(body))
    }

    /// DELETE `endpoint`.
    pub fn delete(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value, ApiError> {
        self.request(endpoint, HttpMethod::Delete, params, None)
    }
}

/// Execute an `HttpRequest` over ureq and return the raw `HttpResponse`.
///
/// ureq's automatic status-code-as-error behavior is disabled so 4xx/5xx
/// responses come back as data and status interpretation stays with
/// `parse_response`. Agents are cheap to build, and a fresh one per call
/// keeps the client free of shared connection state.
fn execute(request: HttpRequest) -> Result<HttpResponse, ApiError> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let HttpRequest {
        method,
        url,
        headers,
        body,
    } = request;

    // A body goes over the wire whenever one is present, whatever the
    // method; GET and DELETE need `force_send_body` on ureq's
    // without-body builder.
    let result = match (method, body) {
        (HttpMethod::Get, None) => with_headers(agent.get(&url), &headers).call(),
        (HttpMethod::Get, Some(body)) => with_headers(agent.get(&url), &headers)
            .force_send_body()
            .send(body.as_bytes()),
        (HttpMethod::Delete, None) => with_headers(agent.delete(&url), &headers).call(),
        (HttpMethod::Delete, Some(body)) => with_headers(agent.delete(&url), &headers)
            .force_send_body()
            .send(body.as_bytes()),
        (HttpMethod::Post, Some(body)) => {
            with_headers(agent.post(&url), &headers).send(body.as_bytes())
        }
        (HttpMethod::Post, None) => with_headers(agent.post(&url), &headers).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            with_headers(agent.put(&url), &headers).send(body.as_bytes())
        }
        (HttpMethod::Put, None) => with_headers(agent.put(&url), &headers).send_empty(),
    };
    let mut response = result.map_err(|e| ApiError::Network(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::Network(e.to_string()))?;

    Ok(HttpResponse { status, body })
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> Dhis2Client {
        Dhis2Client::new("https://play.dhis2.org/api")
    }

    #[test]
    fn default_client_uses_relative_api_path() {
        assert_eq!(Dhis2Client::default().base_url(), "../../../api");
    }

    #[test]
    fn explicit_base_url_is_stored_verbatim() {
        let c = Dhis2Client::new("https://host/api");
        assert_eq!(c.base_url(), "https://host/api");
        // No trailing-slash normalization either way.
        let c = Dhis2Client::new("https://host/api/");
        assert_eq!(c.base_url(), "https://host/api/");
    }

    #[test]
    fn merged_params_default_only() {
        let merged = client().merged_params(&[]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get("paging").map(String::as_str), Some("false"));
    }

    #[test]
    fn merged_params_union_with_call_site() {
        let merged = client().merged_params(&[("fields", "id,name"), ("filter", "level:eq:2")]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get("paging").map(String::as_str), Some("false"));
        assert_eq!(merged.get("fields").map(String::as_str), Some("id,name"));
        assert_eq!(merged.get("filter").map(String::as_str), Some("level:eq:2"));
    }

    #[test]
    fn merged_params_call_site_wins_on_collision() {
        let merged = client().merged_params(&[("paging", "true")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get("paging").map(String::as_str), Some("true"));
    }

    #[test]
    fn build_get_request_appends_paging_default() {
        let req = client()
            .build_request("organisationUnits.json", HttpMethod::Get, &[], None)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "https://play.dhis2.org/api/organisationUnits.json?paging=false"
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn build_request_sets_json_headers() {
        let req = client()
            .build_request("me.json", HttpMethod::Get, &[], None)
            .unwrap();
        assert_eq!(
            req.headers,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ]
        );
    }

    #[test]
    fn build_request_encodes_query_values() {
        let req = client()
            .build_request(
                "organisationUnits.json",
                HttpMethod::Get,
                &[("filter", "level:eq:2")],
                None,
            )
            .unwrap();
        assert_eq!(
            req.url,
            "https://play.dhis2.org/api/organisationUnits.json?filter=level%3Aeq%3A2&paging=false"
        );
    }

    #[test]
    fn build_request_paging_override_appears_once() {
        let req = client()
            .build_request("events.json", HttpMethod::Get, &[("paging", "true")], None)
            .unwrap();
        assert_eq!(req.url, "https://play.dhis2.org/api/events.json?paging=true");
        assert_eq!(req.url.matches("paging").count(), 1);
    }

    #[test]
    fn build_post_request_serializes_body() {
        let body = json!({"name": "a"});
        let req = client()
            .build_request("metadata", HttpMethod::Post, &[], Some(&body))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://play.dhis2.org/api/metadata?paging=false");
        let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, body);
    }

    #[test]
    fn build_request_relative_base_is_accepted() {
        let req = Dhis2Client::default()
            .build_request("organisationUnits.json", HttpMethod::Get, &[], None)
            .unwrap();
        assert_eq!(req.url, "../../../api/organisationUnits.json?paging=false");
    }

    #[test]
    fn build_request_rejects_malformed_absolute_url() {
        let c = Dhis2Client::new("http://[oops");
        let err = c
            .build_request("me.json", HttpMethod::Get, &[], None)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn parse_response_returns_json_value() {
        let response = HttpResponse {
            status: 200,
            body: r#"{"id":"1"}"#.to_string(),
        };
        let value = client().parse_response(response).unwrap();
        assert_eq!(value["id"], "1");
    }

    #[test]
    fn parse_response_non_2xx_is_http_status() {
        let response = HttpResponse {
            status: 404,
            body: String::new(),
        };
        let err = client().parse_response(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus { status: 404, .. }));
    }

    #[test]
    fn parse_response_bad_json_is_parse_error() {
        let response = HttpResponse {
            status: 200,
            body: "<html>maintenance</html>".to_string(),
        };
        let err = client().parse_response(response).unwrap_err();
        assert!(matches!(err, ApiError::JsonParse(_)));
    }

    #[test]
    fn parse_response_201_is_success() {
        let response = HttpResponse {
            status: 201,
            body: r#"{"httpStatus":"Created"}"#.to_string(),
        };
        assert!(client().parse_response(response).is_ok());
    }
}
