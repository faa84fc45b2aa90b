//! Content fingerprints for extracted functions.
//!
//! A fingerprint is the SHA-256 of a function's token stream: leaf tokens in
//! source order, comments excluded, separated by a single space. Layout and
//! comments therefore never influence it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Placeholder substituted for identifiers under [`FingerprintPolicy::abstract_identifiers`].
pub const IDENTIFIER_PLACEHOLDER: &str = "$id";

/// How tokens are normalized before hashing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintPolicy {
    /// Replace every identifier token with a placeholder.
    pub abstract_identifiers: bool,
}

/// Incremental fingerprint builder.
pub struct Fingerprinter {
    hasher: Sha256,
    policy: FingerprintPolicy,
    empty: bool,
}

impl Fingerprinter {
    /// Start a fingerprint under the given policy.
    pub fn new(policy: FingerprintPolicy) -> Self {
        Self {
            hasher: Sha256::new(),
            policy,
            empty: true,
        }
    }

    /// Feed a non-identifier token (keyword, operator, literal, punctuation).
    pub fn push_token(&mut self, token: &str) {
        if token.is_empty() {
            return;
        }
        if !self.empty {
            self.hasher.update(b" ");
        }
        self.hasher.update(token.as_bytes());
        self.empty = false;
    }

    /// Feed an identifier token.
    pub fn push_identifier(&mut self, identifier: &str) {
        if self.policy.abstract_identifiers {
            self.push_token(IDENTIFIER_PLACEHOLDER);
        } else {
            self.push_token(identifier);
        }
    }

    /// Finish and return the lowercase hex digest.
    pub fn finish(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}
