//! # Protocol Constants
//!
//! Every magic number in the ledger lives here. If you're hardcoding a
//! constant somewhere else, you're doing it wrong and you owe the team
//! coffee.

// ---------------------------------------------------------------------------
// Base Types
// ---------------------------------------------------------------------------

/// Ledger amounts in smallest-unit denomination. No floating point,
/// no decimals in arithmetic — the protocol never divides amounts.
pub type Amount = u64;

/// A fixed-point interest rate: interest accrued per unit of logical
/// time, scaled by [`PRECISION`].
///
/// Rates are `u128` so that `rate * elapsed` stays comfortably inside
/// native arithmetic for any realistic rate and time span. Negative
/// rates do not exist in this protocol.
pub type Rate = u128;

/// A point on the caller-supplied logical clock.
///
/// The core never reads system time. Callers inject `now` into every
/// time-sensitive operation and guarantee it is monotonic non-decreasing.
pub type Timestamp = u64;

// ---------------------------------------------------------------------------
// Fixed-Point Scale
// ---------------------------------------------------------------------------

/// The fixed-point scale factor for rates: 10^18.
///
/// A rate of `PRECISION` means principal doubles every time unit, which
/// nobody should ever configure. A realistic per-second rate like
/// `50_000_000_000` (5e10) works out to roughly 0.43% per day.
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Sentinels & Defaults
// ---------------------------------------------------------------------------

/// Reserved amount value meaning "the caller's entire settled balance
/// at the time of the call."
///
/// Honored by [`Ledger::transfer`](crate::ledger::Ledger::transfer) and
/// [`Vault::redeem`](crate::vault::Vault::redeem). `u64::MAX` smallest
/// units is not a representable real position, so the sentinel can never
/// collide with a legitimate amount.
pub const AMOUNT_ALL: Amount = Amount::MAX;

/// Default initial global rate, scaled by [`PRECISION`]: 5e10 per time
/// unit. Used by tooling when a scenario doesn't pin its own rate.
pub const DEFAULT_INITIAL_RATE: Rate = 50_000_000_000;
