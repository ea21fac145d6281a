//! HTTP-backed principal source for the batched resolution fetch.

use std::collections::HashMap;
use std::time::Duration;

use crate::cancel::CancellationToken;
use crate::error::{AclError, AclResult};
use crate::principal;
use crate::resolve::{BoxFuture, PrincipalInfo, PrincipalSource};

/// Configuration for the principal details endpoint.
#[derive(Clone, Debug)]
pub struct HttpPrincipalSourceConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    /// Targets the event-scoped variant of the endpoint, which additionally
    /// resolves persons local to that event. Same contract, different
    /// backing dataset.
    pub event_id: Option<i64>,
    pub timeout_ms: u64,
}

impl HttpPrincipalSourceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            event_id: None,
            timeout_ms: 30_000,
        }
    }

    pub fn with_api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    pub fn with_event_id(mut self, event_id: i64) -> Self {
        self.event_id = Some(event_id);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Batched principal resolver speaking JSON over HTTP.
///
/// One POST per resolve call: `{"identifiers": [...]}` in, a mapping of
/// identifier to principal record out. Identifiers omitted from the
/// response stay pending on the caller's side.
#[derive(Clone, Debug)]
pub struct HttpPrincipalSource {
    base_url: String,
    api_token: Option<String>,
    event_id: Option<i64>,
    timeout_ms: u64,
}

impl HttpPrincipalSource {
    pub fn new(config: HttpPrincipalSourceConfig) -> AclResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(AclError::MissingConfig(
                "principal source base_url is required".to_string(),
            ));
        }
        Ok(Self {
            base_url: config.base_url,
            api_token: config.api_token,
            event_id: config.event_id,
            timeout_ms: config.timeout_ms.max(1),
        })
    }

    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        match self.event_id {
            Some(event_id) => format!("{base}/events/{event_id}/principals"),
            None => format!("{base}/principals"),
        }
    }
}

impl PrincipalSource for HttpPrincipalSource {
    fn resolve_batch(
        &self,
        identifiers: Vec<String>,
        cancel: CancellationToken,
    ) -> BoxFuture<'_, AclResult<HashMap<String, PrincipalInfo>>> {
        let endpoint = self.endpoint();
        let payload = build_request_payload(&identifiers);
        let api_token = self.api_token.clone();
        let timeout_ms = self.timeout_ms;
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(AclError::Aborted {
                    reason: cancel.abort_reason(),
                });
            }

            let agent = ureq::AgentBuilder::new()
                .timeout(Duration::from_millis(timeout_ms))
                .build();

            let mut request_builder = agent
                .post(&endpoint)
                .set("Content-Type", "application/json");
            if let Some(token) = api_token.as_deref() {
                request_builder = request_builder.set("Authorization", &format!("Bearer {token}"));
            }

            let response = request_builder.send_json(payload);
            let response_json = match response {
                Ok(resp) => resp.into_json::<serde_json::Value>().map_err(|err| {
                    AclError::FetchFailed {
                        endpoint: endpoint.clone(),
                        message: format!("decode response failed: {err}"),
                    }
                })?,
                Err(ureq::Error::Status(status, resp)) => {
                    let body = resp.into_string().unwrap_or_default();
                    let detail = parse_error_message(&body).unwrap_or(body);
                    return Err(AclError::FetchFailed {
                        endpoint,
                        message: format!("status {status}: {detail}"),
                    });
                }
                Err(err) => {
                    return Err(AclError::FetchFailed {
                        endpoint,
                        message: err.to_string(),
                    });
                }
            };

            if cancel.is_cancelled() {
                return Err(AclError::Aborted {
                    reason: cancel.abort_reason(),
                });
            }

            parse_batch_response(&endpoint, response_json)
        })
    }
}

fn build_request_payload(identifiers: &[String]) -> serde_json::Value {
    serde_json::json!({ "identifiers": identifiers })
}

fn parse_batch_response(
    endpoint: &str,
    value: serde_json::Value,
) -> AclResult<HashMap<String, PrincipalInfo>> {
    let object = value
        .as_object()
        .ok_or_else(|| AclError::FetchFailed {
            endpoint: endpoint.to_string(),
            message: "response is not an object".to_string(),
        })?;
    let mut records = HashMap::new();
    for (identifier, raw) in object {
        let info = parse_principal_record(identifier, raw)?;
        records.insert(identifier.clone(), info);
    }
    Ok(records)
}

fn parse_principal_record(identifier: &str, raw: &serde_json::Value) -> AclResult<PrincipalInfo> {
    // Records missing an explicit type fall back to classifying the
    // identifier key itself.
    let kind = match raw.get("type").and_then(|v| v.as_str()) {
        Some(name) => serde_json::from_value(serde_json::Value::String(name.to_string()))
            .map_err(|_| AclError::UnknownIdentifierType(identifier.to_string()))?,
        None => principal::classify(identifier)?,
    };
    let name = raw
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or(identifier)
        .to_string();
    let mut info = PrincipalInfo::new(identifier, name, kind);
    if let Some(detail) = raw.get("detail").and_then(|v| v.as_str()) {
        info = info.with_detail(detail);
    }
    if let Some(meta) = raw.get("meta") {
        if !meta.is_null() {
            info = info.with_meta(meta.clone());
        }
    }
    if raw.get("invalid").and_then(|v| v.as_bool()).unwrap_or(false) {
        info = info.invalid();
    }
    Ok(info)
}

fn parse_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(|message| message.as_str())
        .map(|message| message.to_string())
}
