//! # Store Module
//!
//! In-memory bookkeeping for the relying party:
//! - `models`: records (User, StoredPasskey, PendingChallenge)
//! - `users`: the user store
//! - `challenges`: the one-slot-per-user challenge store
//!
//! Both stores sit behind traits so the handler layer only sees `Arc<dyn ...>`.
//! The in-memory implementations guard a `HashMap` with an async mutex, which
//! makes every individual store operation atomic.

pub mod challenges;
pub mod models;
pub mod users;
