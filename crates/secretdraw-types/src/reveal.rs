//! Reveal-side types: per-participant reveal state and recipient metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::UserId;

/// Whether a participant has seen their recipient in the current cycle.
///
/// `Revealed` is terminal until the group is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RevealState {
    #[default]
    Pending,
    Revealed,
}

impl fmt::Display for RevealState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Revealed => write!(f, "REVEALED"),
        }
    }
}

/// What a giver learns about their recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMetadata {
    pub display_name: String,
    pub wishlist: Option<String>,
}

impl DisplayMetadata {
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            wishlist: None,
        }
    }

    #[must_use]
    pub fn with_wishlist(mut self, wishlist: impl Into<String>) -> Self {
        self.wishlist = Some(wishlist.into());
        self
    }
}

/// Recipient shown to a giver once their reveal is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientCard {
    pub recipient: UserId,
    pub display_name: String,
    pub wishlist: Option<String>,
}

impl RecipientCard {
    #[must_use]
    pub fn new(recipient: UserId, metadata: DisplayMetadata) -> Self {
        Self {
            recipient,
            display_name: metadata.display_name,
            wishlist: metadata.wishlist,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_state_defaults_to_pending() {
        assert_eq!(RevealState::default(), RevealState::Pending);
        assert_eq!(RevealState::Revealed.to_string(), "REVEALED");
    }

    #[test]
    fn card_from_metadata() {
        let user = UserId::new();
        let card = RecipientCard::new(user, DisplayMetadata::new("Bob").with_wishlist("socks"));
        assert_eq!(card.recipient, user);
        assert_eq!(card.display_name, "Bob");
        assert_eq!(card.wishlist.as_deref(), Some("socks"));
    }
}
