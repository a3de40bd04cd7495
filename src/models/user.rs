use serde::{Deserialize, Serialize};

/// One entry of the users document, keyed by username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    // username is the map key in the users document
    #[serde(skip)]
    pub username: String,

    #[serde(rename = "password", alias = "password_hash")]
    pub password_hash: String,

    #[serde(default)]
    pub is_admin: bool,

    pub initial_balance: f64,
    pub balance: f64,
}

/// The authenticated user attached to a request by the auth middleware.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentUser {
    pub username: String,
    pub is_admin: bool,
}

impl From<&User> for CurrentUser {
    fn from(u: &User) -> Self {
        CurrentUser {
            username: u.username.clone(),
            is_admin: u.is_admin,
        }
    }
}
