//! # secretdraw-types
//!
//! Shared types, errors, and configuration for the **SecretDraw** gift
//! exchange engine.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`GroupId`], [`UserId`], [`ParticipationId`], [`JoinCode`]
//! - **Constraint model**: [`Participant`], [`is_admissible`], [`Inadmissible`]
//! - **Assignment model**: [`Assignment`], [`AssignmentEntry`]
//! - **Group model**: [`Group`], [`GroupPhase`], [`PhaseStamp`], [`Actor`], [`Role`]
//! - **Reveal model**: [`RevealState`], [`DisplayMetadata`], [`RecipientCard`]
//! - **Storage contract**: [`DrawStore`], [`ChangeNotice`]
//! - **Configuration**: [`DrawConfig`], [`LobbyConfig`]
//! - **Errors**: [`DrawError`] with `DRAW_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod assignment;
pub mod config;
pub mod constants;
pub mod error;
pub mod group;
pub mod ids;
pub mod participant;
pub mod reveal;
pub mod store;

// Re-export all primary types at crate root for ergonomic imports:
//   use secretdraw_types::{Participant, Assignment, GroupPhase, ...};

pub use assignment::*;
pub use config::*;
pub use error::*;
pub use group::*;
pub use ids::*;
pub use participant::*;
pub use reveal::*;
pub use store::*;

// Constants are accessed via `secretdraw_types::constants::FOO`
// (not re-exported to avoid name collisions).
