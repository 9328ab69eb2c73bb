use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::EnumString;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub role: String,
}

impl User {
    pub fn is_requester(&self) -> bool {
        UserRole::from_str(&self.role) == Ok(UserRole::Requester)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Requester,
    Validator,
}
