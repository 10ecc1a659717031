//! API key pair used to authenticate against the email API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::http::HttpRequest;

/// Public/private API key pair. Fixed once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    public: String,
    private: String,
}

impl Credentials {
    pub fn new(public: impl Into<String>, private: impl Into<String>) -> Self {
        Self {
            public: public.into(),
            private: private.into(),
        }
    }

    pub fn public_key(&self) -> &str {
        &self.public
    }

    pub fn private_key(&self) -> &str {
        &self.private
    }

    /// `Basic` authorization value for this key pair.
    pub fn basic_auth(&self) -> String {
        let raw = format!("{}:{}", self.public, self.private);
        format!("Basic {}", STANDARD.encode(raw))
    }

    /// Stamp the `Authorization` header onto `request`, replacing any earlier one.
    pub fn authorize(&self, request: &mut HttpRequest) {
        request.set_header("Authorization", self.basic_auth());
    }
}

// The private key never shows up in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("public", &self.public)
            .field("private", &"***")
            .finish()
    }
}
