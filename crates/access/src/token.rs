//! Upload credentials.
//!
//! Uploads are authorized by a capability token embedded in the request
//! path. The regular upload token is single-use: it is replaced after every
//! successful upload it authorized. The super token never changes for the
//! lifetime of the process and may be reused indefinitely.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use tracing::{debug, warn};

use crate::error::{Result, ShareError};

/// Length of the rotating upload token.
pub const UPLOAD_TOKEN_LENGTH: usize = 16;

/// Length of the fixed super token.
pub const SUPER_TOKEN_LENGTH: usize = 32;

/// Generate a random alphanumeric token of `length` characters.
///
/// Tokens are drawn from `A-Z`, `a-z` and `0-9` using the operating
/// system's CSPRNG. When `exclude` is given, draws equal to it are
/// discarded.
pub fn generate_token(length: usize, exclude: Option<&str>) -> String {
    loop {
        let candidate: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect();

        if exclude != Some(candidate.as_str()) {
            return candidate;
        }
    }
}

/// Turn an operator-supplied seed into a token of exactly `length`
/// characters.
///
/// A missing or blank seed yields a fresh random token. Longer seeds are
/// truncated; shorter ones are padded with random characters.
pub fn normalize_token(raw: Option<&str>, length: usize) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return generate_token(length, None);
    }

    let mut token: String = trimmed.chars().take(length).collect();
    let missing = length - token.chars().count();
    if missing > 0 {
        token.push_str(&generate_token(missing, None));
    }
    token
}

/// Which credential authorized an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    /// The rotating upload token, as it was when the request was checked.
    Upload {
        /// The token value the request presented.
        token: String,
    },
    /// The fixed super token.
    Super,
}

/// Holder of the current upload token and the super token.
///
/// The current token lives behind a mutex; `get`, `set` and `rotate` are
/// the only ways to touch it. The lock is held only while the string is
/// read or replaced.
pub struct TokenAuthority {
    current: Mutex<String>,
    super_token: String,
}

impl TokenAuthority {
    /// Create an authority from optional seeds, normalizing both.
    pub fn new(upload_seed: Option<&str>, super_seed: Option<&str>) -> Self {
        Self {
            current: Mutex::new(normalize_token(upload_seed, UPLOAD_TOKEN_LENGTH)),
            super_token: normalize_token(super_seed, SUPER_TOKEN_LENGTH),
        }
    }

    /// Create an authority with freshly generated tokens.
    pub fn generate() -> Self {
        Self::new(None, None)
    }

    // A panic while holding the lock cannot leave a half-written String
    // behind, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, String> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current upload token.
    pub fn get(&self) -> String {
        self.lock().clone()
    }

    /// Install a new upload token, normalized to the upload token length.
    pub fn set(&self, raw: &str) -> String {
        let token = normalize_token(Some(raw), UPLOAD_TOKEN_LENGTH);
        *self.lock() = token.clone();
        token
    }

    /// Replace the current upload token with a different random one.
    pub fn rotate(&self) -> String {
        let mut current = self.lock();
        let next = generate_token(UPLOAD_TOKEN_LENGTH, Some(current.as_str()));
        *current = next.clone();
        debug!("Upload token rotated");
        next
    }

    /// The fixed super token.
    pub fn super_token(&self) -> &str {
        &self.super_token
    }

    /// Whether `presented` matches the current upload token or the super token.
    pub fn validate(&self, presented: &str) -> bool {
        self.authorize(presented).is_ok()
    }

    /// Check `presented` and report which credential it matched.
    pub fn authorize(&self, presented: &str) -> Result<Grant> {
        let current = self.get();
        if constant_time_eq(presented, &current) {
            return Ok(Grant::Upload { token: current });
        }
        if constant_time_eq(presented, &self.super_token) {
            return Ok(Grant::Super);
        }

        warn!("Rejected upload token of length {}", presented.len());
        Err(ShareError::Unauthorized)
    }

    /// Finish a successful upload.
    ///
    /// Uploads authorized by the rotating token consume it and the new token
    /// is returned; super-token uploads leave the current token in place.
    pub fn complete(&self, grant: &Grant) -> Option<String> {
        match grant {
            Grant::Upload { .. } => Some(self.rotate()),
            Grant::Super => None,
        }
    }
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("current", &"<redacted>")
            .field("super_token", &"<redacted>")
            .finish()
    }
}

impl Default for TokenAuthority {
    fn default() -> Self {
        Self::generate()
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .as_bytes()
            .iter()
            .zip(b.as_bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}
