//! # Accrual Engine
//!
//! Pure settlement arithmetic. Given a principal, a locked rate, and the
//! elapsed logical time since the last settlement, the engine computes
//! the accrued balance:
//!
//! ```text
//! balance = principal * (PRECISION + rate * elapsed) / PRECISION
//! ```
//!
//! using integer (floor) division. [`settle`] is the *only* place in the
//! crate where principal grows from interest — every ledger operation
//! funnels through it before reading or mutating an account, so reads
//! always reflect time-accrued value and writes always start from a
//! fresh base.
//!
//! All intermediate arithmetic is checked `u128`. An overflow aborts the
//! enclosing operation with [`AccrualError::Overflow`]; nothing wraps,
//! nothing saturates.

use thiserror::Error;

use crate::account::Account;
use crate::config::{Amount, Rate, Timestamp, PRECISION};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while computing accrual.
#[derive(Debug, Error)]
pub enum AccrualError {
    /// The accrued balance does not fit the protocol's arithmetic.
    ///
    /// If you're hitting this, either the rate is absurd or the elapsed
    /// span is geological. Both are caller bugs — the engine refuses to
    /// guess.
    #[error(
        "accrual overflow: principal {principal} at rate {rate} over {elapsed} time units \
         exceeds the representable balance"
    )]
    Overflow {
        /// Principal before settlement.
        principal: Amount,
        /// The account's locked rate, scaled by `PRECISION`.
        rate: Rate,
        /// Elapsed logical time units.
        elapsed: u64,
    },
}

// ---------------------------------------------------------------------------
// Accrual
// ---------------------------------------------------------------------------

/// Computes the balance of `principal` after `elapsed` time units at
/// `rate`, floor-rounded.
///
/// Zero principal, zero rate, or zero elapsed time all yield the
/// principal unchanged.
///
/// # Errors
///
/// Returns [`AccrualError::Overflow`] if any intermediate product
/// exceeds `u128` or the result exceeds [`Amount`] range.
pub fn accrued_balance(
    principal: Amount,
    rate: Rate,
    elapsed: u64,
) -> Result<Amount, AccrualError> {
    if principal == 0 || rate == 0 || elapsed == 0 {
        return Ok(principal);
    }

    let overflow = || AccrualError::Overflow {
        principal,
        rate,
        elapsed,
    };

    let growth = rate
        .checked_mul(elapsed as u128)
        .and_then(|interest| PRECISION.checked_add(interest))
        .ok_or_else(overflow)?;

    let scaled = (principal as u128).checked_mul(growth).ok_or_else(overflow)?;

    // Floor division is part of the protocol: accrued interest rounds
    // down, and the at-most-one-unit rounding artifact is accepted.
    Amount::try_from(scaled / PRECISION).map_err(|_| overflow())
}

/// Settles an account in place: materializes the interest owed up to
/// `now` into principal and advances the accrual clock.
///
/// Returns the interest minted (zero when nothing accrued). `elapsed`
/// is clamped at zero — the caller guarantees `now` is monotonic
/// non-decreasing, and a replayed equal timestamp settles to the same
/// principal.
///
/// # Errors
///
/// Returns [`AccrualError::Overflow`] if the accrued balance is not
/// representable. The account is left untouched on failure.
pub fn settle(account: &mut Account, now: Timestamp) -> Result<Amount, AccrualError> {
    let elapsed = now.saturating_sub(account.last_settled);
    let accrued = accrued_balance(account.principal, account.rate, elapsed)?;

    // rate >= 0 and elapsed >= 0, so accrued >= principal always holds.
    let interest = accrued - account.principal;
    account.principal = accrued;
    account.last_settled = now;

    Ok(interest)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
