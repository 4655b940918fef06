//! User entity - Identity of the person using the client, as kept in the session.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// Connected user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Role of the user
    #[serde(rename = "type")]
    pub user_type: UserType,
    /// Login email; employees always carry one once logged in
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Model {
    /// Returns the session email or a session error when none is recorded.
    pub fn require_email(&self) -> Result<&str> {
        self.email
            .as_deref()
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| Error::Session {
                message: "no email recorded for the connected user".to_string(),
            })
    }
}

/// Roles known to the application
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    Employee,
    Admin,
}
