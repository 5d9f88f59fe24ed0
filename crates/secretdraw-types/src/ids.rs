//! Globally unique identifiers used throughout SecretDraw.
//!
//! Entity IDs use UUIDv7 so that creation order is also sort order. The
//! join code is the only human-facing identifier.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants;

// ---------------------------------------------------------------------------
// GroupId
// ---------------------------------------------------------------------------

/// Unique identifier for a gift-exchange group (one draw cycle at a time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GroupId(pub Uuid);

impl GroupId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// Stable identity of a person. The same user may belong to many groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ParticipationId
// ---------------------------------------------------------------------------

/// Identifier of one membership record (a user inside a group).
///
/// The matcher reports its output keyed by this id so the caller can write
/// each recipient straight onto the membership record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ParticipationId(pub Uuid);

impl ParticipationId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ParticipationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// JoinCode
// ---------------------------------------------------------------------------

/// Six-digit code members type in to join a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct JoinCode(String);

impl JoinCode {
    /// Build a code from its numeric value. Returns `None` outside
    /// `JOIN_CODE_MIN..=JOIN_CODE_MAX`.
    #[must_use]
    pub fn from_number(value: u32) -> Option<Self> {
        (constants::JOIN_CODE_MIN..=constants::JOIN_CODE_MAX)
            .contains(&value)
            .then(|| Self(value.to_string()))
    }

    /// Parse user input. Surrounding whitespace is ignored.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.len() != constants::JOIN_CODE_DIGITS
            || !trimmed.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        trimmed.parse::<u32>().ok().and_then(Self::from_number)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_uniqueness() {
        let a = UserId::new();
        let b = UserId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn participation_id_ordering() {
        let a = ParticipationId::new();
        let b = ParticipationId::new();
        assert!(a < b);
    }

    #[test]
    fn group_id_display_prefix() {
        let id = GroupId::from_bytes([7; 16]);
        assert!(id.to_string().starts_with("group:"));
    }

    #[test]
    fn join_code_bounds() {
        assert!(JoinCode::from_number(99_999).is_none());
        assert!(JoinCode::from_number(1_000_000).is_none());
        assert_eq!(JoinCode::from_number(123_456).unwrap().as_str(), "123456");
    }

    #[test]
    fn join_code_parse() {
        assert_eq!(JoinCode::parse(" 654321 ").unwrap().as_str(), "654321");
        assert!(JoinCode::parse("12345").is_none());
        assert!(JoinCode::parse("12a456").is_none());
        assert!(JoinCode::parse("012345").is_none());
        assert!(JoinCode::parse("+12345").is_none());
    }

    #[test]
    fn serde_roundtrips() {
        let uid = UserId::new();
        let json = serde_json::to_string(&uid).unwrap();
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(uid, back);

        let code = JoinCode::from_number(424_242).unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"424242\"");
    }
}
