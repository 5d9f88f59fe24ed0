//! # secretdraw-lobby
//!
//! **Lobby Plane**: everything that happens to a group while it is OPEN.
//!
//! ## Architecture
//!
//! The lobby sits between the application and MatchCore:
//! 1. **Join codes**: six-digit codes, allocated collision-free per store
//! 2. **Membership**: create a group (host auto-joins), join by code,
//!    edit one's own wishlist
//! 3. **Constraints**: host-only edits to exclusion groups, strict pools,
//!    specific exclusions and spectator status; frozen once LOCKED
//! 4. **Review**: per-member dead-end report so a host sees an undrawable
//!    roster before pressing "start"
//!
//! ## Flow
//!
//! ```text
//! create_group → join_group* → apply_constraints* → review_constraints
//!     → secretdraw_reveal::start_draw
//! ```

pub mod constraints;
pub mod join_code;
pub mod membership;

pub use constraints::{ConstraintPatch, ConstraintReview, apply_constraints, review_constraints};
pub use join_code::{allocate_join_code, generate_join_code};
pub use membership::{Membership, create_group, join_group, update_wishlist};
