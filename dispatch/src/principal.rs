use std::fmt;

use crate::types::SubjectId;

/// Bearer secret presented by the caller. Wrapped so it never leaks
/// through Debug formatting of the structs that carry it.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Credential(secret.into())
    }

    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Authenticated caller identity attached to every dispatched operation.
#[derive(Clone, Debug)]
pub struct Principal {
    pub subject: SubjectId,
    pub email: Option<String>,
    pub credential: Credential,
    /// Set when the credential is recognized but expired. The dispatcher
    /// refuses to run operations for such a principal.
    pub needs_refresh: bool,
}

impl Principal {
    pub fn new(subject: SubjectId, credential: Credential) -> Self {
        Principal {
            subject,
            email: None,
            credential,
            needs_refresh: false,
        }
    }
}
