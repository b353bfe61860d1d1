use serde::{Deserialize, Serialize};

use super::enums::UserType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }
}

/// Registration form payload. The id is assigned by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
}
