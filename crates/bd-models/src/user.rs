//! User model
//!
//! Only what the lifecycle needs: identity and roles.

use bd_core::traits::UserContext;
use serde::{Deserialize, Serialize};

use crate::{Entity, Id, Identifiable};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<Id>,
    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl User {
    pub fn new(username: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            full_name: full_name.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }
}

impl Identifiable for User {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for User {
    const TYPE_NAME: &'static str = "User";
}

impl UserContext for User {
    fn id(&self) -> Id {
        self.id.unwrap_or_default()
    }

    fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
