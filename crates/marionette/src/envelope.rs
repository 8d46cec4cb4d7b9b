//! The uniform operation envelope: one request/response contract covering
//! both synchronous reads ("query") and asynchronous writes ("event").
//!
//! `execute` never returns an error: malformed requests, unreachable
//! engines and non-2xx responses are all captured into the same
//! [`OperationResult`] shape so callers check one contract.

use crate::address::{Address, CapabilityId};
use crate::client::EngineClient;
use crate::errors::Error;
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// The two operation styles the engine exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Event,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Query => write!(f, "query"),
            OperationKind::Event => write!(f, "event"),
        }
    }
}

/// Selector for one operation: a capability/operation pair for queries, a
/// domain/type pair for events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Query {
        capability: CapabilityId,
        operation: String,
    },
    Event {
        domain: String,
        event_type: String,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Query { .. } => OperationKind::Query,
            Operation::Event { .. } => OperationKind::Event,
        }
    }
}

/// A single validated request against one target address.
#[derive(Debug, Clone)]
pub struct OperationEnvelope {
    /// Caller-supplied correlation id; generated when absent.
    pub correlation_id: Option<String>,
    pub target: Address,
    pub operation: Operation,
    /// Serialized verbatim as the request body; no schema coercion.
    pub arguments: Map<String, Value>,
}

impl OperationEnvelope {
    pub fn query(
        target: impl Into<Address>,
        capability: impl Into<CapabilityId>,
        operation: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id: None,
            target: target.into(),
            operation: Operation::Query {
                capability: capability.into(),
                operation: operation.into(),
            },
            arguments: Map::new(),
        }
    }

    pub fn event(
        target: impl Into<Address>,
        domain: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id: None,
            target: target.into(),
            operation: Operation::Event {
                domain: domain.into(),
                event_type: event_type.into(),
            },
            arguments: Map::new(),
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_arguments(mut self, arguments: Map<String, Value>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Validate a raw JSON envelope into a typed one.
    ///
    /// Wire shape:
    /// `{ "id"?, "target": {"address"}, "op": {"kind", ...}, "args"? }`
    /// where `op` carries `capability`/`operation` for queries and
    /// `domain`/`type` for events. The returned message is surfaced
    /// verbatim as the `INVALID_REQUEST` error message.
    pub fn from_value(raw: &Value) -> Result<Self, String> {
        let envelope = raw
            .as_object()
            .ok_or_else(|| "request must be a JSON object".to_string())?;

        let target = envelope
            .get("target")
            .and_then(|t| t.get("address"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "missing required field: target.address (string)".to_string())?;

        let op = envelope
            .get("op")
            .and_then(Value::as_object)
            .ok_or_else(|| "missing required field: op (object)".to_string())?;

        let operation = match op.get("kind").and_then(Value::as_str) {
            Some("query") => {
                let capability = op.get("capability").and_then(Value::as_str);
                let operation = op.get("operation").and_then(Value::as_str);
                match (capability, operation) {
                    (Some(capability), Some(operation)) => Operation::Query {
                        capability: CapabilityId::from(capability),
                        operation: operation.to_string(),
                    },
                    _ => {
                        return Err(
                            "query requires op.capability (string) and op.operation (string)"
                                .to_string(),
                        )
                    }
                }
            }
            Some("event") => {
                let domain = op.get("domain").and_then(Value::as_str);
                let event_type = op.get("type").and_then(Value::as_str);
                match (domain, event_type) {
                    (Some(domain), Some(event_type)) => Operation::Event {
                        domain: domain.to_string(),
                        event_type: event_type.to_string(),
                    },
                    _ => {
                        return Err(
                            "event requires op.domain (string) and op.type (string)".to_string()
                        )
                    }
                }
            }
            _ => return Err(r#"missing required field: op.kind ("query"|"event")"#.to_string()),
        };

        // Only an absent `args` defaults to an empty map; an explicit
        // JSON null is a malformed request like any other non-object.
        let arguments = match envelope.get("args") {
            None => Map::new(),
            Some(Value::Object(args)) => args.clone(),
            Some(_) => return Err("args must be an object when provided".to_string()),
        };

        Ok(Self {
            correlation_id: envelope
                .get("id")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            target: Address::from(target),
            operation,
            arguments,
        })
    }
}

/// Machine-readable failure class of an [`OperationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed envelope; caught before any network call.
    InvalidRequest,
    /// The engine could not be reached.
    NetworkError,
    /// The engine answered with a non-2xx status.
    HttpError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::InvalidRequest => write!(f, "INVALID_REQUEST"),
            ErrorCode::NetworkError => write!(f, "NETWORK_ERROR"),
            ErrorCode::HttpError => write!(f, "HTTP_ERROR"),
        }
    }
}

/// Enough of the call shape to diagnose a failure without re-deriving it.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<OperationKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Upstream status code, present whenever a response arrived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_status: Option<u16>,
}

impl CallMetadata {
    fn for_envelope(envelope: &OperationEnvelope) -> Self {
        let mut metadata = Self {
            kind: Some(envelope.operation.kind()),
            target: Some(envelope.target.clone()),
            ..Self::default()
        };
        match &envelope.operation {
            Operation::Query {
                capability,
                operation,
            } => {
                metadata.capability = Some(capability.to_string());
                metadata.operation = Some(operation.clone());
            }
            Operation::Event { domain, event_type } => {
                metadata.domain = Some(domain.clone());
                metadata.event_type = Some(event_type.clone());
            }
        }
        metadata
    }
}

/// Normalized outcome of one envelope execution.
///
/// `success=true` means the transport round trip succeeded (2xx). The
/// payload itself may still embed an application-level error; this layer
/// deliberately does not unwrap that; see [`embedded_error`].
///
/// [`embedded_error`]: OperationResult::embedded_error
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub correlation_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<Value>,
    pub metadata: CallMetadata,
}

impl OperationResult {
    fn ok(correlation_id: String, data: Option<Value>, metadata: CallMetadata) -> Self {
        Self {
            correlation_id,
            success: true,
            data,
            error_code: None,
            error_message: None,
            error_details: None,
            metadata,
        }
    }

    fn err(
        correlation_id: String,
        code: ErrorCode,
        message: String,
        details: Option<Value>,
        metadata: CallMetadata,
    ) -> Self {
        Self {
            correlation_id,
            success: false,
            data: None,
            error_code: Some(code),
            error_message: Some(message),
            error_details: details,
            metadata,
        }
    }

    /// An application-level error embedded in an otherwise-successful
    /// payload, when present.
    ///
    /// Whether such a payload should count as a failure is an unresolved
    /// product decision: some call sites check it, others do not. Both
    /// surfaces are therefore exposed: the raw result, and this explicit
    /// opt-in check on `data.error`.
    pub fn embedded_error(&self) -> Option<&Value> {
        self.data
            .as_ref()
            .and_then(|data| data.get("error"))
            .filter(|e| !e.is_null())
    }
}

/// Correlation id for callers that did not supply one: wall-clock millis
/// plus a random suffix. Not required to be cryptographically unique.
fn generate_correlation_id() -> String {
    format!(
        "{}-{}",
        chrono::Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

impl EngineClient {
    /// Validate and execute a raw JSON envelope.
    ///
    /// This is the surface exposed to untyped callers (tool transports,
    /// scripts). A malformed envelope short-circuits to `INVALID_REQUEST`
    /// with zero network calls.
    pub async fn execute_value(&self, raw: &Value) -> OperationResult {
        match OperationEnvelope::from_value(raw) {
            Ok(envelope) => self.execute(envelope).await,
            Err(message) => {
                let correlation_id = raw
                    .get("id")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(generate_correlation_id);
                debug!(%correlation_id, %message, "rejected malformed envelope");
                // Record whatever call shape the malformed envelope did carry.
                let metadata = CallMetadata {
                    kind: match raw.pointer("/op/kind").and_then(Value::as_str) {
                        Some("query") => Some(OperationKind::Query),
                        Some("event") => Some(OperationKind::Event),
                        _ => None,
                    },
                    target: raw
                        .pointer("/target/address")
                        .and_then(Value::as_str)
                        .map(Address::from),
                    ..CallMetadata::default()
                };
                OperationResult::err(
                    correlation_id,
                    ErrorCode::InvalidRequest,
                    message,
                    Some(json!({ "envelope": raw })),
                    metadata,
                )
            }
        }
    }

    /// Execute a validated envelope. Never returns an error: transport
    /// failures and non-2xx responses are captured into the result.
    pub async fn execute(&self, envelope: OperationEnvelope) -> OperationResult {
        let correlation_id = envelope
            .correlation_id
            .clone()
            .unwrap_or_else(generate_correlation_id);
        let mut metadata = CallMetadata::for_envelope(&envelope);

        let segments: Vec<&str> = match &envelope.operation {
            Operation::Query {
                capability,
                operation,
            } => vec![
                "c",
                envelope.target.as_str(),
                "query",
                capability.as_str(),
                operation,
            ],
            Operation::Event { domain, event_type } => {
                vec!["c", envelope.target.as_str(), "event", domain, event_type]
            }
        };
        let url = self.transport.endpoint(&segments);
        let url_string = url.to_string();
        let body = Value::Object(envelope.arguments.clone());

        match self.transport.send(Method::POST, url, Some(&body)).await {
            Ok(reply) => {
                metadata.transport_status = Some(reply.status);
                if reply.is_success() {
                    OperationResult::ok(correlation_id, reply.payload, metadata)
                } else {
                    OperationResult::err(
                        correlation_id,
                        ErrorCode::HttpError,
                        format!("upstream returned HTTP {}", reply.status),
                        reply.payload,
                        metadata,
                    )
                }
            }
            Err(Error::Transport { source, .. }) => OperationResult::err(
                correlation_id,
                ErrorCode::NetworkError,
                source.to_string(),
                Some(json!({ "url": url_string })),
                metadata,
            ),
            // send() only fails with Transport, but keep the envelope
            // contract total rather than panicking on a refactor.
            Err(other) => OperationResult::err(
                correlation_id,
                ErrorCode::NetworkError,
                other.to_string(),
                Some(json!({ "url": url_string })),
                metadata,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_query() -> Value {
        json!({
            "id": "corr-1",
            "target": { "address": "chan-1" },
            "op": { "kind": "query", "capability": "app.notes", "operation": "list" },
            "args": { "limit": 10 }
        })
    }

    #[test]
    fn accepts_valid_query_envelope() {
        let envelope = OperationEnvelope::from_value(&valid_query()).unwrap();
        assert_eq!(envelope.correlation_id.as_deref(), Some("corr-1"));
        assert_eq!(envelope.target, Address::from("chan-1"));
        assert_eq!(envelope.operation.kind(), OperationKind::Query);
        assert_eq!(envelope.arguments.get("limit"), Some(&json!(10)));
    }

    #[test]
    fn accepts_valid_event_envelope_without_args() {
        let envelope = OperationEnvelope::from_value(&json!({
            "target": { "address": "chan-1" },
            "op": { "kind": "event", "domain": "workspace", "type": "create_actor" }
        }))
        .unwrap();
        assert!(envelope.correlation_id.is_none());
        assert_eq!(envelope.operation.kind(), OperationKind::Event);
        assert!(envelope.arguments.is_empty());
    }

    #[test]
    fn rejects_non_object_request() {
        let err = OperationEnvelope::from_value(&json!("nope")).unwrap_err();
        assert_eq!(err, "request must be a JSON object");
    }

    #[test]
    fn rejects_missing_target_address() {
        let mut raw = valid_query();
        raw["target"] = json!({});
        let err = OperationEnvelope::from_value(&raw).unwrap_err();
        assert!(err.contains("target.address"));
    }

    #[test]
    fn rejects_missing_kind() {
        let mut raw = valid_query();
        raw["op"] = json!({ "capability": "app.notes", "operation": "list" });
        let err = OperationEnvelope::from_value(&raw).unwrap_err();
        assert!(err.contains("op.kind"));
    }

    #[test]
    fn rejects_query_missing_selector() {
        let mut raw = valid_query();
        raw["op"] = json!({ "kind": "query", "capability": "app.notes" });
        let err = OperationEnvelope::from_value(&raw).unwrap_err();
        assert!(err.contains("op.capability"));
    }

    #[test]
    fn rejects_event_missing_selector() {
        let err = OperationEnvelope::from_value(&json!({
            "target": { "address": "chan-1" },
            "op": { "kind": "event", "domain": "workspace" }
        }))
        .unwrap_err();
        assert!(err.contains("op.domain"));
    }

    #[test]
    fn rejects_non_object_args() {
        let mut raw = valid_query();
        raw["args"] = json!([1, 2, 3]);
        let err = OperationEnvelope::from_value(&raw).unwrap_err();
        assert!(err.contains("args"));
    }

    #[test]
    fn rejects_explicit_null_args() {
        let mut raw = valid_query();
        raw["args"] = Value::Null;
        let err = OperationEnvelope::from_value(&raw).unwrap_err();
        assert!(err.contains("args"));
    }

    #[test]
    fn absent_args_default_to_empty() {
        let mut raw = valid_query();
        raw.as_object_mut().unwrap().remove("args");
        let envelope = OperationEnvelope::from_value(&raw).unwrap();
        assert!(envelope.arguments.is_empty());
    }

    #[test]
    fn error_codes_serialize_screaming_snake() {
        assert_eq!(
            serde_json::to_value(ErrorCode::InvalidRequest).unwrap(),
            json!("INVALID_REQUEST")
        );
        assert_eq!(ErrorCode::NetworkError.to_string(), "NETWORK_ERROR");
    }

    #[test]
    fn result_serializes_camel_case_and_skips_absent_fields() {
        let metadata = CallMetadata {
            kind: Some(OperationKind::Query),
            target: Some(Address::from("chan-1")),
            capability: Some("app.notes".to_string()),
            operation: Some("list".to_string()),
            transport_status: Some(200),
            ..CallMetadata::default()
        };
        let result = OperationResult::ok("id-1".to_string(), Some(json!({"n": 1})), metadata);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["correlationId"], json!("id-1"));
        assert_eq!(value["metadata"]["transportStatus"], json!(200));
        assert!(value.get("errorCode").is_none());
        assert!(value["metadata"].get("domain").is_none());
    }

    #[test]
    fn embedded_error_only_surfaces_non_null_error_member() {
        let metadata = CallMetadata::default();
        let with_error = OperationResult::ok(
            "id".to_string(),
            Some(json!({ "error": "no such thing" })),
            metadata.clone(),
        );
        assert_eq!(with_error.embedded_error(), Some(&json!("no such thing")));

        let clean = OperationResult::ok(
            "id".to_string(),
            Some(json!({ "things": {} })),
            metadata.clone(),
        );
        assert!(clean.embedded_error().is_none());

        let null_error =
            OperationResult::ok("id".to_string(), Some(json!({ "error": null })), metadata);
        assert!(null_error.embedded_error().is_none());
    }

    #[test]
    fn generated_correlation_ids_carry_time_and_randomness() {
        let a = generate_correlation_id();
        let b = generate_correlation_id();
        assert_ne!(a, b);
        assert!(a.contains('-'));
    }
}
