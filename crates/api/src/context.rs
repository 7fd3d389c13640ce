use puntoventa_core::UserId;

/// Authenticated user context for a request.
///
/// This is immutable and must be present for all resource routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    user_id: UserId,
    username: String,
    email: String,
}

impl AuthContext {
    pub fn new(user_id: UserId, username: String, email: String) -> Self {
        Self {
            user_id,
            username,
            email,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}
