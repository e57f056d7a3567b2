#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod drivers;
pub mod error;
pub mod tasks;

pub use drivers::*;
pub use error::{Error, Result};
pub use tasks::*;

use embedded_hal::digital::PinState;

/// Time between two samples of an accept line in milliseconds
pub const SAMPLE_INTERVAL_MS: u64 = 10;

/// Consecutive matching samples needed before a line counts as settled. At the default interval
/// this is 50 ms, half of the 100 ms pulse the validator produces for an accepted note.
pub const REQUIRED_RUN_LENGTH: u16 = 5;

/// Mismatching samples tolerated in bounded mode before giving up (10 s at the default interval)
pub const TIMEOUT_BUDGET: u32 = 1000;

/// The number of note channels on the validator
pub const CHANNEL_COUNT: usize = 4;

/// Level of an accept line while the validator reports an accepted note
pub const ACCEPTED_LEVEL: PinState = PinState::Low;

/// Inhibit level that lets the validator take notes on a channel
pub const ALLOW_LEVEL: PinState = PinState::Low;

/// Inhibit level that stops the validator taking notes on a channel. Also the power-up level.
pub const DENY_LEVEL: PinState = PinState::High;
