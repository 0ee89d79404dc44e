//! Visitor identity for duplicate detection.
//!
//! An identity only decides whether two views inside the dedup window came
//! from the same visitor. It is never stored and never derived from the
//! session token.

use crate::domain::views::models::{UserId, ViewEvent, ViewRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated { user_id: UserId },
    Anonymous { ip_address: String, user_agent: String },
}

impl Identity {
    /// Resolves the identity of a view request.
    pub fn resolve(request: &ViewRequest) -> Self {
        Self::from_parts(
            request.user_id,
            request.ip_address.trim(),
            request.user_agent.trim(),
        )
    }

    /// Whether `event` was recorded by this same visitor.
    pub fn matches(&self, event: &ViewEvent) -> bool {
        match (self, event.user_id) {
            (Self::Authenticated { user_id }, Some(event_user)) => *user_id == event_user,
            (
                Self::Anonymous {
                    ip_address,
                    user_agent,
                },
                None,
            ) => *ip_address == event.ip_address && *user_agent == event.user_agent,
            _ => false,
        }
    }

    fn from_parts(user_id: Option<UserId>, ip_address: &str, user_agent: &str) -> Self {
        match user_id {
            Some(user_id) => Self::Authenticated { user_id },
            None => Self::Anonymous {
                ip_address: ip_address.to_string(),
                user_agent: user_agent.to_string(),
            },
        }
    }
}
