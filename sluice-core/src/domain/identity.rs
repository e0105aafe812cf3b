//! Caller identity and global roles

use serde::{Deserialize, Serialize};

/// The authenticated user behind a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub name: String,
}

impl CallerIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A user's platform-wide role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRole {
    pub name: String,
}

impl GlobalRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn is(&self, sentinel: &str) -> bool {
        self.name == sentinel
    }
}
