//! # secretdraw-reveal
//!
//! **Reveal Plane**: locking a draw, resetting it, and disclosing each
//! giver's recipient exactly once per cycle.
//!
//! ## Architecture
//!
//! Every operation reads and writes through a [`DrawStore`] and re-checks
//! the group's [`PhaseStamp`] before it writes:
//! 1. **Lifecycle**: `start_draw` runs MatchCore and locks the group with the
//!    assignment in one conditional write; `reset_draw` undoes it
//! 2. **Individual mode**: `load_my_reveal` → `commit_my_reveal`, idempotent
//! 3. **Kiosk mode**: a host cycles every pending giver through one device
//! 4. **PhaseGuard**: detects resets and re-locks under a running flow
//!
//! ## Cycle
//!
//! ```text
//! OPEN --start_draw--> LOCKED --reveals...--> LOCKED --reset_draw--> OPEN
//! ```
//!
//! [`DrawStore`]: secretdraw_types::DrawStore
//! [`PhaseStamp`]: secretdraw_types::PhaseStamp

pub mod individual;
pub mod kiosk;
pub mod lifecycle;
pub mod lookup;
pub mod memory_store;
pub mod phase_guard;

pub use individual::{MyReveal, RevealTicket, commit_my_reveal, load_my_reveal};
pub use kiosk::{KioskAction, KioskSession, KioskStep, QueueEntry, load_kiosk_queue};
pub use lifecycle::{DrawReceipt, reset_draw, start_draw, start_draw_with_rng};
pub use memory_store::MemoryStore;
pub use phase_guard::PhaseGuard;
