use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Support-desk account. Nothing checks the password yet.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl User {
    pub fn new(new: NewUser) -> Self {
        User {
            id: Uuid::new_v4(),
            username: new.username,
            password: new.password,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}
