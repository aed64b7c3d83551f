//! # Meridian Ledger — Core Library
//!
//! An interest-accruing balance ledger coupled to a custody vault that
//! mints ledger balance 1:1 against a deposited external asset and burns
//! it on redemption.
//!
//! The interesting part is the accrual protocol. Every account locks in
//! an interest rate at deposit time, the global rate only ever moves
//! downward, and every balance-affecting operation settles the interest
//! owed *before* touching principal. That discipline is what keeps reads
//! and writes from ever observing a stale or double-counted balance.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the actual concerns:
//!
//! - **config** — Protocol constants: precision, sentinels, type aliases.
//! - **account** — Per-holder state: principal, locked rate, accrual clock.
//! - **accrual** — Pure settlement arithmetic. No state, no surprises.
//! - **ledger** — Mint, burn, transfer, and the monotonic rate policy.
//! - **vault** — 1:1 custody against an external asset: deposit mints,
//!   redeem burns then pays, and nothing is ever left half-applied.
//!
//! ## Design Philosophy
//!
//! 1. Time is a caller-supplied logical clock, never a wall-clock read.
//!    Accrual is fully deterministic and replayable.
//! 2. All arithmetic is checked. Overflow is an error, not a panic and
//!    never a silent wrap.
//! 3. Every operation is all-or-nothing. A failed operation leaves the
//!    ledger exactly as it found it.
//! 4. If it touches money, it has tests. Plural.

pub mod account;
pub mod accrual;
pub mod config;
pub mod ledger;
pub mod vault;

pub use account::{Account, AccountId};
pub use accrual::AccrualError;
pub use config::{Amount, Rate, Timestamp, AMOUNT_ALL, PRECISION};
pub use ledger::{Ledger, LedgerError};
pub use vault::{AssetTransfer, AssetTransferError, InMemoryAsset, Vault, VaultError};
