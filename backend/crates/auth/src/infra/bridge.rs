//! Privileged Session Bridge
//!
//! Talks to the elevated helper process over line-delimited JSON. Every
//! request is `{op, payload}` and every reply is `{ok, data?, msg?}`;
//! the op names are part of the wire contract with the helper and must
//! not change.
//!
//! [`FallbackBridge`] layers a secondary implementation underneath: only
//! transport-level failures ([`AuthError::BridgeUnavailable`]) fall
//! through, an application-level refusal from the helper is final.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

use crate::domain::entity::{AdminEntry, Identity};
use crate::domain::gateway::SessionBridge;
use crate::error::{AuthError, AuthResult};

// ============================================================================
// Wire envelope
// ============================================================================

/// Request line sent to the helper
#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    op: &'a str,
    payload: Value,
}

/// Reply line from the helper
#[derive(Debug, Serialize, Deserialize)]
pub struct BridgeResponse {
    /// Whether the operation succeeded
    pub ok: bool,
    /// Operation result on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Failure description on `ok: false`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl BridgeResponse {
    /// Unwrap the envelope into the typed result
    fn into_data<T: DeserializeOwned>(self, op: &str) -> AuthResult<T> {
        if !self.ok {
            let msg = self
                .msg
                .unwrap_or_else(|| "Bridge reported failure without a message".to_string());
            tracing::warn!(op, msg = %msg, "Bridge operation failed");
            return Err(AuthError::Internal(msg));
        }
        let data = self.data.unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|e| {
            AuthError::Internal(format!("Bridge returned unexpected data for {op}: {e}"))
        })
    }
}

// ============================================================================
// Transport
// ============================================================================

/// One request/reply exchange with the helper process
#[trait_variant::make(BridgeTransport: Send)]
pub trait LocalBridgeTransport {
    async fn request(&self, op: &str, payload: Value) -> AuthResult<BridgeResponse>;
}

/// Line-delimited JSON over the helper's stdin/stdout
///
/// Requests are serialized behind a mutex; the helper answers strictly
/// in order, one line per request.
pub struct StdioTransport {
    inner: Mutex<StdioInner>,
}

struct StdioInner {
    // Held so the helper is reaped when the transport drops
    _child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl StdioTransport {
    /// Spawn the helper process and attach to its pipes
    pub fn spawn(program: &str, args: &[String]) -> AuthResult<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AuthError::BridgeUnavailable(format!("Failed to spawn {program}: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| AuthError::BridgeUnavailable("Helper stdin not piped".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AuthError::BridgeUnavailable("Helper stdout not piped".to_string()))?;

        tracing::info!(program, "Privileged bridge helper spawned");
        Ok(Self {
            inner: Mutex::new(StdioInner {
                _child: child,
                stdin,
                stdout: BufReader::new(stdout),
            }),
        })
    }
}

impl BridgeTransport for StdioTransport {
    async fn request(&self, op: &str, payload: Value) -> AuthResult<BridgeResponse> {
        let mut inner = self.inner.lock().await;

        let mut line = serde_json::to_string(&BridgeRequest { op, payload })
            .map_err(|e| AuthError::Internal(format!("Bridge request encoding failed: {e}")))?;
        line.push('\n');

        inner
            .stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| AuthError::BridgeUnavailable(format!("Bridge write failed: {e}")))?;
        inner
            .stdin
            .flush()
            .await
            .map_err(|e| AuthError::BridgeUnavailable(format!("Bridge flush failed: {e}")))?;

        let mut reply = String::new();
        let n = inner
            .stdout
            .read_line(&mut reply)
            .await
            .map_err(|e| AuthError::BridgeUnavailable(format!("Bridge read failed: {e}")))?;
        if n == 0 {
            return Err(AuthError::BridgeUnavailable(
                "Bridge helper closed its output".to_string(),
            ));
        }

        serde_json::from_str(&reply)
            .map_err(|e| AuthError::BridgeUnavailable(format!("Malformed bridge reply: {e}")))
    }
}

// ============================================================================
// Process bridge
// ============================================================================

/// Session bridge backed by the elevated helper process
pub struct ProcessBridge<T: BridgeTransport> {
    transport: T,
}

impl<T: BridgeTransport> ProcessBridge<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

impl<T: BridgeTransport + Sync> SessionBridge for ProcessBridge<T> {
    async fn fetch_admins(&self) -> AuthResult<HashMap<String, AdminEntry>> {
        let response = self.transport.request("fetchAdmins", Value::Null).await?;
        // Absent directory node comes back as data: null
        let admins: Option<HashMap<String, AdminEntry>> = response.into_data("fetchAdmins")?;
        Ok(admins.unwrap_or_default())
    }

    async fn create_custom_token(&self, uid: &str) -> AuthResult<String> {
        let response = self
            .transport
            .request("createCustomToken", json!({ "uid": uid }))
            .await?;
        response.into_data("createCustomToken")
    }

    async fn save_last_user(&self, identity: &Identity) -> AuthResult<()> {
        let payload = serde_json::to_value(identity.without_token())
            .map_err(|e| AuthError::Internal(format!("Identity encoding failed: {e}")))?;
        let response = self.transport.request("saveLastUser", payload).await?;
        response.into_data::<Option<Value>>("saveLastUser")?;
        Ok(())
    }

    async fn get_last_user(&self) -> AuthResult<Option<Identity>> {
        let response = self.transport.request("getLastUser", Value::Null).await?;
        response.into_data("getLastUser")
    }

    async fn clear_last_user(&self) -> AuthResult<()> {
        let response = self.transport.request("clearLastUser", Value::Null).await?;
        response.into_data::<Option<Value>>("clearLastUser")?;
        Ok(())
    }

    async fn update_admin_last_login(&self, uid: &str, at: DateTime<Utc>) -> AuthResult<()> {
        let payload = json!({ "uid": uid, "lastLogin": at.to_rfc3339() });
        let response = self.transport.request("updateAdmin", payload).await?;
        response.into_data::<Option<Value>>("updateAdmin")?;
        Ok(())
    }
}

// ============================================================================
// Fallback bridge
// ============================================================================

/// Prefer the privileged bridge, fall back to a direct implementation
///
/// `primary` is `None` when no helper was configured at startup. Only
/// [`AuthError::BridgeUnavailable`] triggers the secondary path; every
/// other error, including application-level refusals, is returned as-is.
pub struct FallbackBridge<P: SessionBridge, S: SessionBridge> {
    primary: Option<P>,
    secondary: S,
}

impl<P: SessionBridge, S: SessionBridge> FallbackBridge<P, S> {
    pub fn new(primary: Option<P>, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

macro_rules! with_fallback {
    ($self:ident, $op:literal, $call:ident ( $($arg:expr),* )) => {{
        if let Some(primary) = &$self.primary {
            match primary.$call($($arg),*).await {
                Err(AuthError::BridgeUnavailable(reason)) => {
                    tracing::warn!(op = $op, reason = %reason, "Bridge unavailable, using direct path");
                }
                other => return other,
            }
        }
        $self.secondary.$call($($arg),*).await
    }};
}

impl<P, S> SessionBridge for FallbackBridge<P, S>
where
    P: SessionBridge + Sync,
    S: SessionBridge + Sync,
{
    async fn fetch_admins(&self) -> AuthResult<HashMap<String, AdminEntry>> {
        with_fallback!(self, "fetchAdmins", fetch_admins())
    }

    async fn create_custom_token(&self, uid: &str) -> AuthResult<String> {
        with_fallback!(self, "createCustomToken", create_custom_token(uid))
    }

    async fn save_last_user(&self, identity: &Identity) -> AuthResult<()> {
        with_fallback!(self, "saveLastUser", save_last_user(identity))
    }

    async fn get_last_user(&self) -> AuthResult<Option<Identity>> {
        with_fallback!(self, "getLastUser", get_last_user())
    }

    async fn clear_last_user(&self) -> AuthResult<()> {
        with_fallback!(self, "clearLastUser", clear_last_user())
    }

    async fn update_admin_last_login(&self, uid: &str, at: DateTime<Utc>) -> AuthResult<()> {
        with_fallback!(self, "updateAdmin", update_admin_last_login(uid, at))
    }
}
