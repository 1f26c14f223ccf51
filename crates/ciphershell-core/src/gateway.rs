//! Client side of the remote crypto service.
//!
//! Every call is fire-and-forget from the terminal's point of view: the host
//! spawns it with [`spawn_call`] and later feeds the resulting [`Completion`]
//! back into the terminal. There is no timeout, cancellation or retry.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordMode {
    Random,
    Memorable,
}

impl PasswordMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PasswordMode::Random => "random",
            PasswordMode::Memorable => "memorable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherOp {
    Encrypt,
    Decrypt,
}

impl CipherOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CipherOp::Encrypt => "encrypt",
            CipherOp::Decrypt => "decrypt",
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum GatewayRequest {
    GeneratePassword { mode: PasswordMode },
    /// `text` is the message when encrypting, the ciphertext when decrypting.
    Vault { op: CipherOp, text: String, passphrase: String },
    GenerateKeys,
    /// `key` is the public key when encrypting, the private key when
    /// decrypting.
    Rsa { op: CipherOp, text: String, key: String },
    Background { theme: String },
}

impl GatewayRequest {
    pub fn method(&self) -> Method {
        match self {
            GatewayRequest::Background { .. } => Method::GET,
            _ => Method::POST,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            GatewayRequest::GeneratePassword { .. } => "/api/generate-password",
            GatewayRequest::Vault { op: CipherOp::Encrypt, .. } => "/api/encrypt",
            GatewayRequest::Vault { op: CipherOp::Decrypt, .. } => "/api/decrypt",
            GatewayRequest::GenerateKeys => "/api/generate-keys",
            GatewayRequest::Rsa { op: CipherOp::Encrypt, .. } => "/api/rsa-encrypt",
            GatewayRequest::Rsa { op: CipherOp::Decrypt, .. } => "/api/rsa-decrypt",
            GatewayRequest::Background { .. } => "/api/background",
        }
    }

    /// JSON body, if the endpoint takes one.
    pub fn body(&self) -> Option<serde_json::Value> {
        match self {
            GatewayRequest::GeneratePassword { mode } => Some(json!({ "mode": mode })),
            GatewayRequest::Vault { op: CipherOp::Encrypt, text, passphrase } => {
                Some(json!({ "message": text, "passphrase": passphrase }))
            }
            GatewayRequest::Vault { op: CipherOp::Decrypt, text, passphrase } => {
                Some(json!({ "ciphertext": text, "passphrase": passphrase }))
            }
            GatewayRequest::Rsa { op: CipherOp::Encrypt, text, key } => {
                Some(json!({ "message": text, "public_key": key }))
            }
            GatewayRequest::Rsa { op: CipherOp::Decrypt, text, key } => {
                Some(json!({ "ciphertext": text, "private_key": key }))
            }
            GatewayRequest::GenerateKeys | GatewayRequest::Background { .. } => None,
        }
    }

    pub fn query(&self) -> Option<[(&'static str, &str); 1]> {
        match self {
            GatewayRequest::Background { theme } => Some([("theme", theme.as_str())]),
            _ => None,
        }
    }
}

// Passphrases and private keys must never reach the logs.
impl fmt::Debug for GatewayRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayRequest::GeneratePassword { mode } => {
                f.debug_struct("GeneratePassword").field("mode", mode).finish()
            }
            GatewayRequest::Vault { op, text, .. } => f
                .debug_struct("Vault")
                .field("op", op)
                .field("text_len", &text.len())
                .field("passphrase", &"<redacted>")
                .finish(),
            GatewayRequest::GenerateKeys => f.write_str("GenerateKeys"),
            GatewayRequest::Rsa { op, text, .. } => f
                .debug_struct("Rsa")
                .field("op", op)
                .field("text_len", &text.len())
                .field("key", &"<redacted>")
                .finish(),
            GatewayRequest::Background { theme } => {
                f.debug_struct("Background").field("theme", theme).finish()
            }
        }
    }
}

/// Everything any endpoint may answer with. Which fields matter depends on
/// the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayReply {
    pub password: Option<String>,
    pub result: Option<String>,
    pub error: Option<String>,
    pub public: Option<String>,
    pub private: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("gateway returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// A call the terminal wants issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTicket {
    pub id: u64,
    pub request: GatewayRequest,
}

/// The outcome of a spawned call, tagged with its ticket id.
#[derive(Debug)]
pub struct Completion {
    pub id: u64,
    pub outcome: Result<GatewayReply, GatewayError>,
}

pub trait CryptoGateway: Send + Sync + 'static {
    fn call(
        &self,
        request: GatewayRequest,
    ) -> impl Future<Output = Result<GatewayReply, GatewayError>> + Send;
}

/// reqwest-backed gateway talking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, request: &GatewayRequest) -> String {
        format!("{}{}", self.base_url, request.path())
    }
}

impl CryptoGateway for HttpGateway {
    fn call(
        &self,
        request: GatewayRequest,
    ) -> impl Future<Output = Result<GatewayReply, GatewayError>> + Send {
        let client = self.client.clone();
        let url = self.url_for(&request);
        async move {
            let mut builder = client.request(request.method(), &url);
            if let Some(query) = request.query() {
                builder = builder.query(&query);
            }
            if let Some(body) = request.body() {
                builder = builder.json(&body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| GatewayError::Transport(e.to_string()))?;
            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| GatewayError::Transport(e.to_string()))?;

            // The vault endpoints answer 400 with a JSON body that still has
            // to be shown, so the body is parsed whatever the status.
            serde_json::from_str::<GatewayReply>(&text).map_err(|_| GatewayError::Status {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            })
        }
    }
}

/// Run one call on the tokio runtime and deliver its completion on `tx`.
pub fn spawn_call<G: CryptoGateway>(
    gateway: Arc<G>,
    ticket: CallTicket,
    tx: mpsc::Sender<Completion>,
) {
    tokio::spawn(async move {
        let CallTicket { id, request } = ticket;
        let path = request.path();
        debug!(id, path, "gateway call issued");
        let outcome = gateway.call(request).await;
        match &outcome {
            Ok(_) => debug!(id, path, "gateway call completed"),
            Err(e) => warn!(id, path, error = %e, "gateway call failed"),
        }
        if tx.send(Completion { id, outcome }).await.is_err() {
            debug!(id, "completion receiver dropped");
        }
    });
}
