use std::fmt;

/// Opaque credential identifying the signed-in human to the gateway,
/// typically the raw value of the session cookie.
///
/// The value is forwarded verbatim and never parsed. `Debug` and `Display`
/// are redacted so the identity cannot leak through logs or error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionIdentity(String);

impl SessionIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SessionIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionIdentity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionIdentity(<redacted>)")
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_forwarded_verbatim_but_never_formatted() {
        let identity = SessionIdentity::new("session=abc; theme=dark");
        assert_eq!(identity.as_str(), "session=abc; theme=dark");
        assert!(!format!("{identity:?}").contains("abc"));
        assert!(!identity.to_string().contains("abc"));
    }
}
