//! Basic authentication from URL-embedded credentials.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// `user:pass` taken from a target URL, already percent-decoded.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Value for the `Authorization` header (RFC 7617).
    pub fn basic_authorization(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

// Keep passwords out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_user_and_password() {
        let creds = Credentials::new("user", "pass");
        assert_eq!(creds.basic_authorization(), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn admin_admin() {
        let creds = Credentials::new("admin", "admin");
        assert_eq!(creds.basic_authorization(), "Basic YWRtaW46YWRtaW4=");
    }

    #[test]
    fn empty_password_keeps_colon() {
        let creds = Credentials::new("alice", "");
        assert_eq!(creds.basic_authorization(), "Basic YWxpY2U6");
    }

    #[test]
    fn debug_hides_password() {
        let rendered = format!("{:?}", Credentials::new("user", "hunter2"));
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("hunter2"));
    }
}
