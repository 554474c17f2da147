//! Line-delimited JSON host for the capability registry.
//!
//! Each stdin line is one request; each stdout line is one response carrying
//! the request's `id`. Calls run concurrently, so responses may arrive out of
//! order.

use crate::capabilities::{CapabilityArgs, CapabilityRegistry};
use crate::core::CancellationToken;
use crate::utils::error::{AgentError, InvokeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

const OUTBOX_CAPACITY: usize = 64;

#[derive(Debug, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
enum HostCall {
    ListCapabilities,
    Invoke {
        capability: String,
        #[serde(default)]
        arguments: Value,
    },
}

#[derive(Debug, Serialize)]
struct HostError {
    kind: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct HostResponse {
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<HostError>,
}

impl HostResponse {
    fn ok(id: Value, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failed(id: Value, kind: &'static str, message: String) -> Self {
        Self {
            id,
            result: None,
            error: Some(HostError { kind, message }),
        }
    }

    fn from_invoke(id: Value, outcome: std::result::Result<Value, InvokeError>) -> Self {
        match outcome {
            Ok(result) => Self::ok(id, result),
            Err(e) => Self::failed(id, e.kind(), e.to_string()),
        }
    }
}

/// Serves requests from `reader` until EOF or until `cancel` fires, then
/// waits for in-flight calls and flushes their responses to `writer`.
pub async fn serve<R, W>(
    registry: Arc<CapabilityRegistry>,
    mut reader: R,
    writer: W,
    cancel: CancellationToken,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (outbox, inbox) = mpsc::channel::<HostResponse>(OUTBOX_CAPACITY);
    let writer_task = tokio::spawn(write_responses(writer, inbox));
    let mut in_flight = JoinSet::new();
    let mut buf = Vec::new();

    // Every exit path falls through to the drain below.
    let outcome: Result<()> = loop {
        buf.clear();
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Host cancelled; no further requests will be read");
                break Ok(());
            }
            read = reader.read_until(b'\n', &mut buf) => read,
        };
        match read {
            Ok(0) => {
                tracing::debug!("Request stream closed");
                break Ok(());
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Failed to read request stream: {}", e);
                break Err(AgentError::IoError(e));
            }
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Discarding request line that is not UTF-8: {}", e);
                let message = format!("request line is not valid UTF-8: {}", e);
                send(&outbox, HostResponse::failed(Value::Null, "invalid_request", message)).await;
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let (id, call) = match parse_request(line) {
            Ok(parsed) => parsed,
            Err(response) => {
                send(&outbox, response).await;
                continue;
            }
        };

        match call {
            HostCall::ListCapabilities => {
                let response = match serde_json::to_value(registry.describe()) {
                    Ok(listing) => HostResponse::ok(id, listing),
                    Err(e) => HostResponse::failed(id, "handler_failed", e.to_string()),
                };
                send(&outbox, response).await;
            }
            HostCall::Invoke {
                capability,
                arguments,
            } => {
                let registry = registry.clone();
                let outbox = outbox.clone();
                let cancel = cancel.clone();
                in_flight.spawn(async move {
                    let outcome = registry
                        .invoke(&capability, CapabilityArgs::from(arguments), &cancel)
                        .await;
                    send(&outbox, HostResponse::from_invoke(id, outcome)).await;
                });
            }
        }
    };

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Capability task aborted: {}", e);
        }
    }
    drop(outbox);

    let written = writer_task.await.map_err(std::io::Error::other)?;
    outcome?;
    written?;
    Ok(())
}

fn parse_request(line: &str) -> std::result::Result<(Value, HostCall), HostResponse> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        tracing::warn!("Discarding unparsable request line: {}", e);
        HostResponse::failed(Value::Null, "invalid_request", format!("invalid JSON: {}", e))
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let call = HostCall::deserialize(&value).map_err(|e| {
        HostResponse::failed(id.clone(), "invalid_request", format!("invalid request: {}", e))
    })?;

    Ok((id, call))
}

async fn send(outbox: &mpsc::Sender<HostResponse>, response: HostResponse) {
    if outbox.send(response).await.is_err() {
        tracing::error!("Response writer stopped; dropping response");
    }
}

async fn write_responses<W>(
    mut writer: W,
    mut inbox: mpsc::Receiver<HostResponse>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = inbox.recv().await {
        let mut line = serde_json::to_vec(&response)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    writer.shutdown().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_keeps_id_on_bad_method() {
        let err = parse_request(r#"{"id": 7, "method": "shutdown"}"#).unwrap_err();
        assert_eq!(err.id, Value::from(7));
        assert_eq!(err.error.unwrap().kind, "invalid_request");
    }

    #[test]
    fn test_parse_request_invoke_defaults_arguments() {
        let (id, call) =
            parse_request(r#"{"id": "a", "method": "invoke", "capability": "Echo"}"#).unwrap();
        assert_eq!(id, Value::from("a"));
        match call {
            HostCall::Invoke { capability, arguments } => {
                assert_eq!(capability, "Echo");
                assert_eq!(arguments, Value::Null);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_parse_request_rejects_garbage() {
        let err = parse_request("not json").unwrap_err();
        assert_eq!(err.id, Value::Null);
    }
}
