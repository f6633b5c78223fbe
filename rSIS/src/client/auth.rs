//! Authentication state management.

/// Authentication information for the SIS backend.
///
/// The auth code doubles as the session credential: direct requests send the
/// signed-in user's own code, while parent-proxy requests send the parent's
/// code plus the child's code as a separate parameter.
#[derive(Debug, Clone)]
pub struct AuthInfo {
    /// Session auth code.
    pub auth_code: String,
    /// User account ID.
    pub user_id: String,
}

impl AuthInfo {
    /// Create new auth info.
    pub fn new(auth_code: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            auth_code: auth_code.into(),
            user_id: user_id.into(),
        }
    }

    /// Check if auth looks valid.
    pub fn is_valid(&self) -> bool {
        !self.auth_code.is_empty() && !self.user_id.is_empty() && self.user_id != "0"
    }
}
