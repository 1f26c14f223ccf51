use crate::gateway::{CipherOp, GatewayRequest};
use crate::keys::SessionKeyStore;

/// Sentinel accepted at the key step meaning "use the session public key".
pub const OWN_KEY_SENTINEL: &str = "my";

/// The pending step of a multi-line command. Values collected by earlier
/// steps travel inside the variant that needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    VaultMessage { op: CipherOp },
    VaultPassword { op: CipherOp, message: String },
    IdentityMessage,
    IdentityKey { message: String },
    IdentityCiphertext,
}

/// Result of feeding one submitted line into a step.
#[derive(Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Next(Step),
    /// Final step reached; the session ends and this call is issued.
    Fire(GatewayRequest),
    /// Local validation failed; the session ends without a call.
    Abort(&'static str),
}

impl Step {
    /// Question rendered when the step is entered.
    pub fn question(&self) -> String {
        match self {
            Step::VaultMessage { op } => format!("Enter text to {}:", op.as_str()),
            Step::VaultPassword { .. } => "Enter Passphrase:".to_string(),
            Step::IdentityMessage => "Enter message:".to_string(),
            Step::IdentityKey { .. } => format!("Paste Public Key (or '{OWN_KEY_SENTINEL}'):"),
            Step::IdentityCiphertext => "Paste ciphertext:".to_string(),
        }
    }

    /// Short tag shown in the input prompt while the step waits.
    pub fn tag(&self) -> &'static str {
        match self {
            Step::VaultMessage { .. } | Step::IdentityMessage => "message",
            Step::VaultPassword { .. } => "passphrase",
            Step::IdentityKey { .. } => "key",
            Step::IdentityCiphertext => "ciphertext",
        }
    }

    /// Whether input for this step is captured masked.
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Step::VaultPassword { .. })
    }

    /// Consume one submitted value.
    pub fn advance(self, value: String, keys: &SessionKeyStore) -> StepOutcome {
        match self {
            Step::VaultMessage { op } => {
                if value.is_empty() {
                    return StepOutcome::Abort(match op {
                        CipherOp::Encrypt => "Message required.",
                        CipherOp::Decrypt => "Ciphertext required.",
                    });
                }
                StepOutcome::Next(Step::VaultPassword { op, message: value })
            }
            Step::VaultPassword { op, message } => {
                if value.is_empty() {
                    return StepOutcome::Abort("Passphrase required.");
                }
                StepOutcome::Fire(GatewayRequest::Vault {
                    op,
                    text: message,
                    passphrase: value,
                })
            }
            Step::IdentityMessage => {
                if value.is_empty() {
                    return StepOutcome::Abort("Message required.");
                }
                StepOutcome::Next(Step::IdentityKey { message: value })
            }
            Step::IdentityKey { message } => {
                let key = if value == OWN_KEY_SENTINEL {
                    keys.public().map(str::to_string)
                } else {
                    Some(value).filter(|v| !v.is_empty())
                };
                match key {
                    Some(key) => StepOutcome::Fire(GatewayRequest::Rsa {
                        op: CipherOp::Encrypt,
                        text: message,
                        key,
                    }),
                    None => StepOutcome::Abort("No key found."),
                }
            }
            Step::IdentityCiphertext => {
                if value.is_empty() {
                    return StepOutcome::Abort("Ciphertext required.");
                }
                match keys.private() {
                    Some(private) => StepOutcome::Fire(GatewayRequest::Rsa {
                        op: CipherOp::Decrypt,
                        text: value,
                        key: private.to_string(),
                    }),
                    None => StepOutcome::Abort("No Private Key loaded."),
                }
            }
        }
    }
}
