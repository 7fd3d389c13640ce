//! `puntoventa-inventory` — inventory movement domain.
//!
//! Movements are the append-only audit trail of stock changes: sale
//! deductions, restocks, and manual corrections.

pub mod movement;

pub use movement::{apply_delta, Movement, NewMovement};
