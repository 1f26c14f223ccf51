use std::fmt;

use zeroize::Zeroize;

/// A PEM-encoded RSA key pair as returned by the gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public: String,
    pub private: String,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_len", &self.public.len())
            .field("private", &"<redacted>")
            .finish()
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.private.zeroize();
    }
}

/// Holds the most recently generated key pair for the lifetime of the
/// process. Both halves are always replaced together.
#[derive(Debug, Default)]
pub struct SessionKeyStore {
    current: Option<KeyPair>,
}

impl SessionKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly generated pair if both halves are present and
    /// non-empty. Returns whether the store changed.
    pub fn replace(&mut self, public: Option<String>, private: Option<String>) -> bool {
        match (public, private) {
            (Some(public), Some(private)) if !public.is_empty() && !private.is_empty() => {
                self.current = Some(KeyPair { public, private });
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&KeyPair> {
        self.current.as_ref()
    }

    pub fn public(&self) -> Option<&str> {
        self.current.as_ref().map(|k| k.public.as_str())
    }

    pub fn private(&self) -> Option<&str> {
        self.current.as_ref().map(|k| k.private.as_str())
    }
}
