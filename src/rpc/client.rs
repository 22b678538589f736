//! rTorrent XML-RPC adapter.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Request, Url};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::xmlrpc::{decode_response, encode_call, fault_error, Value};
use super::TorrentRpc;
use crate::error::{ReaperError, Result};
use crate::ratelimit::Transport;
use crate::torrent::{Torrent, TorrentState, TorrentStatus};

/// View listed when none is configured.
pub const DEFAULT_VIEW: &str = "main";

/// Per-torrent fields requested by the list call, in column order.
const LIST_FIELDS: [&str; 7] = [
    "d.hash=",
    "d.name=",
    "d.complete=",
    "d.size_bytes=",
    "d.ratio=",
    "d.custom1=",
    "d.base_path=",
];

/// Methods batched into the status call, in result order.
const STATUS_METHODS: [&str; 6] = [
    "d.complete",
    "d.completed_bytes",
    "d.down.rate",
    "d.up.rate",
    "d.ratio",
    "d.size_bytes",
];

/// XML-RPC client for an rTorrent daemon.
///
/// Every call is a single POST issued through the wrapped [`Transport`], so
/// wrapping the HTTP transport in a throttle bounds the whole client.
pub struct RtorrentClient<T> {
    /// XML-RPC endpoint
    url: Url,
    /// Request executor
    transport: T,
    /// Pre-encoded basic auth header, if credentials were given
    authorization: Option<HeaderValue>,
}

impl<T: Transport> RtorrentClient<T> {
    /// Create a client for the endpoint at `url`.
    pub fn new(url: Url, transport: T) -> Self {
        Self {
            url,
            transport,
            authorization: None,
        }
    }

    /// Send HTTP basic auth credentials with every call.
    ///
    /// Nothing is sent when both username and password are empty.
    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Result<Self> {
        if username.is_empty() && password.is_empty() {
            self.authorization = None;
            return Ok(self);
        }

        let encoded = STANDARD.encode(format!("{username}:{password}"));
        let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
            .map_err(|e| ReaperError::Config(format!("invalid credentials: {e}")))?;
        value.set_sensitive(true);
        self.authorization = Some(value);
        Ok(self)
    }

    /// Get the endpoint this client talks to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Invoke `method` and return its decoded result.
    pub async fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
        let body = encode_call(method, params);

        let mut request = Request::new(Method::POST, self.url.clone());
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/xml"));
        if let Some(ref authorization) = self.authorization {
            request
                .headers_mut()
                .insert(AUTHORIZATION, authorization.clone());
        }
        *request.body_mut() = Some(body.into());

        debug!(method = %method, "Calling daemon");

        let response = self.transport.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReaperError::Status {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        decode_response(&text)
    }

    async fn call_for_hash(&self, method: &str, torrent: &Torrent) -> Result<Value> {
        self.call(method, &[Value::from(torrent.hash.as_str())]).await
    }
}

#[async_trait]
impl<T: Transport> TorrentRpc for RtorrentClient<T> {
    async fn list_torrents(&self, view: &str) -> Result<Vec<Result<Torrent>>> {
        let mut params = vec![Value::from(""), Value::from(view)];
        params.extend(LIST_FIELDS.iter().map(|field| Value::from(*field)));

        let rows = self
            .call("d.multicall2", &params)
            .await?
            .into_array()
            .ok_or_else(|| unexpected("d.multicall2 did not return an array"))?;

        Ok(rows.iter().map(torrent_from_row).collect())
    }

    async fn state(&self, torrent: &Torrent) -> Result<TorrentState> {
        let value = self.call_for_hash("d.state", torrent).await?;
        value
            .as_i64()
            .map(TorrentState::from_raw)
            .ok_or_else(|| unexpected(format!("d.state returned {value:?}")))
    }

    async fn state_changed(&self, torrent: &Torrent) -> Result<DateTime<Utc>> {
        let value = self.call_for_hash("d.state_changed", torrent).await?;
        let secs = value
            .as_i64()
            .ok_or_else(|| unexpected(format!("d.state_changed returned {value:?}")))?;
        DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| unexpected(format!("d.state_changed out of range: {secs}")))
    }

    async fn status(&self, torrent: &Torrent) -> Result<TorrentStatus> {
        let calls = STATUS_METHODS
            .iter()
            .map(|method| {
                let mut call = BTreeMap::new();
                call.insert("methodName".to_string(), Value::from(*method));
                call.insert(
                    "params".to_string(),
                    Value::Array(vec![Value::from(torrent.hash.as_str())]),
                );
                Value::Struct(call)
            })
            .collect::<Vec<_>>();

        let results = self
            .call("system.multicall", &[Value::Array(calls)])
            .await?
            .into_array()
            .ok_or_else(|| unexpected("system.multicall did not return an array"))?;

        if results.len() != STATUS_METHODS.len() {
            return Err(unexpected(format!(
                "system.multicall returned {} results, expected {}",
                results.len(),
                STATUS_METHODS.len()
            )));
        }

        let mut values = Vec::with_capacity(results.len());
        for (method, result) in STATUS_METHODS.iter().zip(results) {
            // Each entry is a one-element array on success, a fault struct otherwise
            let value = match result {
                Value::Array(mut items) if items.len() == 1 => items.remove(0),
                fault @ Value::Struct(_) => return Err(fault_error(&fault)),
                other => return Err(unexpected(format!("{method} returned {other:?}"))),
            };
            values.push(value);
        }

        Ok(TorrentStatus {
            completed: column_bool(&values, 0, "d.complete")?,
            completed_bytes: column_u64(&values, 1, "d.completed_bytes")?,
            down_rate: column_u64(&values, 2, "d.down.rate")?,
            up_rate: column_u64(&values, 3, "d.up.rate")?,
            ratio: column_i64(&values, 4, "d.ratio")?,
            size_bytes: column_u64(&values, 5, "d.size_bytes")?,
        })
    }

    async fn delete(&self, torrent: &Torrent) -> Result<()> {
        self.call_for_hash("d.erase", torrent).await?;
        Ok(())
    }
}

fn torrent_from_row(row: &Value) -> Result<Torrent> {
    let columns = row
        .as_array()
        .ok_or_else(|| unexpected(format!("torrent row is not an array: {row:?}")))?;

    let hash = column_str(columns, 0, "d.hash")?;
    let name = column_str(columns, 1, "d.name")?;
    let completed = column_bool(columns, 2, "d.complete")?;

    // No rule reads these, so a bad value is defaulted rather than failing the row
    let size_bytes = informational(&hash, "d.size_bytes", column_u64(columns, 3, "d.size_bytes"));
    let ratio = informational(&hash, "d.ratio", column_i64(columns, 4, "d.ratio"));
    let label = informational(&hash, "d.custom1", column_str(columns, 5, "d.custom1"));
    let base_path = informational(&hash, "d.base_path", column_str(columns, 6, "d.base_path"));

    Ok(Torrent {
        hash,
        name,
        completed,
        size_bytes,
        ratio,
        label,
        base_path,
    })
}

fn informational<T: Default>(hash: &str, field: &str, value: Result<T>) -> T {
    value.unwrap_or_else(|err| {
        warn!(hash, field, error = %err, "Ignoring unreadable torrent column");
        T::default()
    })
}

fn column<'a>(columns: &'a [Value], index: usize, field: &str) -> Result<&'a Value> {
    columns
        .get(index)
        .ok_or_else(|| unexpected(format!("missing column {field}")))
}

fn column_str(columns: &[Value], index: usize, field: &str) -> Result<String> {
    let value = column(columns, index, field)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| unexpected(format!("{field} is not a string: {value:?}")))
}

fn column_i64(columns: &[Value], index: usize, field: &str) -> Result<i64> {
    let value = column(columns, index, field)?;
    value
        .as_i64()
        .ok_or_else(|| unexpected(format!("{field} is not an integer: {value:?}")))
}

fn column_u64(columns: &[Value], index: usize, field: &str) -> Result<u64> {
    let raw = column_i64(columns, index, field)?;
    u64::try_from(raw).map_err(|_| unexpected(format!("{field} is negative: {raw}")))
}

fn column_bool(columns: &[Value], index: usize, field: &str) -> Result<bool> {
    let value = column(columns, index, field)?;
    value
        .as_bool()
        .ok_or_else(|| unexpected(format!("{field} is not a flag: {value:?}")))
}

fn unexpected(message: impl Into<String>) -> ReaperError {
    ReaperError::UnexpectedResponse(message.into())
}
