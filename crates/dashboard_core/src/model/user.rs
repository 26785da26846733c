//! Caller identity.

use serde::{Deserialize, Serialize};

/// Numeric user identifier assigned by the authentication collaborator.
pub type UserId = i64;

/// Already-authenticated caller identity.
///
/// Only `id` is stored, as the dashboard owner; users themselves are never
/// persisted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
}

impl User {
    pub fn new(id: UserId) -> Self {
        Self { id }
    }
}

#[cfg(test)]
mod tests {
    use super::User;

    #[test]
    fn identity_serializes_as_id_only() {
        let user = User::new(7);
        assert_eq!(
            serde_json::to_value(user).unwrap(),
            serde_json::json!({ "id": 7 })
        );
    }
}
