//! # Ledger — Balances, Rates, and the Monotonic Rate Policy
//!
//! The [`Ledger`] owns all per-account state and the global interest
//! rate. Every balance-affecting operation settles accrued interest
//! *before* touching principal, so no operation ever observes a stale
//! or double-counted balance.
//!
//! ## Rate Policy
//!
//! The global rate only moves down. [`Ledger::set_global_rate`] rejects
//! any value that is not strictly below the current rate — equal values
//! included. An account locks in the global rate at the moment principal
//! is minted to it, and keeps that rate until the next mint rebases it.
//!
//! ## Atomicity
//!
//! Operations mutate working copies of account records and commit them
//! only on success. A failed mint, burn, or transfer leaves the ledger
//! byte-for-byte as it was before the call.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::{Account, AccountId};
use crate::accrual::{self, AccrualError};
use crate::config::{Amount, Rate, Timestamp, AMOUNT_ALL};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A burn or transfer amount exceeds the settled principal.
    #[error(
        "insufficient balance: account {account} has {available} settled, requested {requested}"
    )]
    InsufficientBalance {
        /// The account that came up short.
        account: AccountId,
        /// Settled principal available at the time of the call.
        available: Amount,
        /// The amount that was rejected.
        requested: Amount,
    },

    /// `set_global_rate` was called with a value not strictly below the
    /// current rate. The rate is monotonic non-increasing for the
    /// lifetime of the system.
    #[error("rate increase rejected: proposed {proposed} is not strictly below current {current}")]
    RateIncreaseRejected {
        /// The rate in force when the call was made.
        current: Rate,
        /// The rate that was rejected.
        proposed: Rate,
    },

    /// A mint or transfer would push an account's principal past
    /// `u64::MAX`. That's either a bug or an attack.
    #[error("balance overflow: account {account} holds {current}, credit {credit}")]
    BalanceOverflow {
        /// The account that was being credited.
        account: AccountId,
        /// Principal before the failed credit.
        current: Amount,
        /// The amount that caused the overflow.
        credit: Amount,
    },

    /// Accrual arithmetic overflowed while settling an account.
    #[error(transparent)]
    Accrual(#[from] AccrualError),
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The interest-accruing balance ledger.
///
/// Owns every account record and the global rate. There is no ambient
/// singleton — the runtime context owns a `Ledger` value and threads it
/// through every operation call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ledger {
    /// Per-account state, created lazily on first mint.
    accounts: HashMap<AccountId, Account>,
    /// The global rate newly minted principal locks in, scaled by
    /// [`crate::config::PRECISION`]. Non-increasing over time.
    current_rate: Rate,
}

impl Ledger {
    /// Creates an empty ledger with the given initial global rate.
    pub fn new(initial_rate: Rate) -> Self {
        Self {
            accounts: HashMap::new(),
            current_rate: initial_rate,
        }
    }

    // -- Reads ---------------------------------------------------------

    /// Projects the accrued balance of `id` at logical time `now`
    /// without settling — state, including the accrual clock, is
    /// untouched. Unknown accounts read as zero.
    pub fn balance_of(&self, id: &AccountId, now: Timestamp) -> Result<Amount, LedgerError> {
        match self.accounts.get(id) {
            None => Ok(0),
            Some(account) => {
                let elapsed = now.saturating_sub(account.last_settled);
                Ok(accrual::accrued_balance(
                    account.principal,
                    account.rate,
                    elapsed,
                )?)
            }
        }
    }

    /// Returns stored principal verbatim, ignoring unsettled interest.
    ///
    /// Constant over time absent an explicit mint, burn, or transfer
    /// touching `id`.
    pub fn principal_balance_of(&self, id: &AccountId) -> Amount {
        self.accounts.get(id).map(|a| a.principal).unwrap_or(0)
    }

    /// Returns the rate locked in by `id`, or zero for an untouched
    /// account.
    pub fn rate_of(&self, id: &AccountId) -> Rate {
        self.accounts.get(id).map(|a| a.rate).unwrap_or(0)
    }

    /// Returns the global rate currently in force.
    pub fn current_rate(&self) -> Rate {
        self.current_rate
    }

    /// Returns the stored account record, if the account has ever been
    /// touched.
    pub fn account(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    /// Iterates over every account record ever created.
    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &Account)> {
        self.accounts.iter()
    }

    /// Sums stored principal across all accounts.
    ///
    /// Transfers are principal-neutral under this sum; mint and settled
    /// interest increase it, burn decreases it.
    pub fn total_principal(&self) -> u128 {
        self.accounts.values().map(|a| a.principal as u128).sum()
    }

    // -- Writes --------------------------------------------------------

    /// Mints `amount` to `id`: settles the account, locks in the global
    /// rate in force right now, then credits principal.
    ///
    /// The rate lock is unconditional — a second mint to an already
    /// active account rebases its locked rate to the then-current
    /// global rate, even when the previously locked rate was higher.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BalanceOverflow`] if the credit would
    /// exceed `u64::MAX`, and [`LedgerError::Accrual`] if settlement
    /// arithmetic overflows. No state changes on failure.
    pub fn mint(&mut self, id: &AccountId, amount: Amount, now: Timestamp) -> Result<(), LedgerError> {
        let mut account = self.accounts.get(id).cloned().unwrap_or_default();
        let interest = accrual::settle(&mut account, now)?;

        account.rate = self.current_rate;
        account.principal =
            account
                .principal
                .checked_add(amount)
                .ok_or(LedgerError::BalanceOverflow {
                    account: id.clone(),
                    current: account.principal,
                    credit: amount,
                })?;

        self.accounts.insert(id.clone(), account);
        tracing::debug!(account = %id, amount, interest, now, "minted");
        Ok(())
    }

    /// Burns `amount` from `id` after settling accrued interest.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientBalance`] if `amount` exceeds
    /// the settled principal. No state changes on failure.
    pub fn burn(&mut self, id: &AccountId, amount: Amount, now: Timestamp) -> Result<(), LedgerError> {
        let mut account = self.accounts.get(id).cloned().unwrap_or_default();
        accrual::settle(&mut account, now)?;

        if amount > account.principal {
            return Err(LedgerError::InsufficientBalance {
                account: id.clone(),
                available: account.principal,
                requested: amount,
            });
        }

        account.principal -= amount;
        self.accounts.insert(id.clone(), account);
        tracing::debug!(account = %id, amount, now, "burned");
        Ok(())
    }

    /// Moves `amount` of principal from `from` to `to`, settling both
    /// sides first.
    ///
    /// [`AMOUNT_ALL`] resolves to the sender's entire settled balance.
    /// If the receiver's settled balance is exactly zero it inherits the
    /// sender's locked rate; otherwise the receiver's rate is untouched
    /// — rates are never merged or averaged.
    ///
    /// Returns the amount actually moved (the resolved sentinel).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientBalance`] if `amount` exceeds
    /// the sender's settled principal. No state changes on failure.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        let mut sender = self.accounts.get(from).cloned().unwrap_or_default();
        accrual::settle(&mut sender, now)?;

        let amount = if amount == AMOUNT_ALL {
            sender.principal
        } else {
            amount
        };

        if amount > sender.principal {
            return Err(LedgerError::InsufficientBalance {
                account: from.clone(),
                available: sender.principal,
                requested: amount,
            });
        }

        if from == to {
            // A self-transfer settles the account and moves nothing.
            self.accounts.insert(from.clone(), sender);
            return Ok(amount);
        }

        let mut receiver = self.accounts.get(to).cloned().unwrap_or_default();
        accrual::settle(&mut receiver, now)?;

        // Rate inheritance applies only to an empty receiving account.
        if receiver.principal == 0 {
            receiver.rate = sender.rate;
        }

        sender.principal -= amount;
        receiver.principal =
            receiver
                .principal
                .checked_add(amount)
                .ok_or(LedgerError::BalanceOverflow {
                    account: to.clone(),
                    current: receiver.principal,
                    credit: amount,
                })?;

        self.accounts.insert(from.clone(), sender);
        self.accounts.insert(to.clone(), receiver);
        tracing::debug!(from = %from, to = %to, amount, now, "transferred");
        Ok(amount)
    }

    /// Lowers the global rate.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::RateIncreaseRejected`] unless `new_rate`
    /// is strictly below the current rate — equal values are rejected
    /// too. The current rate is unchanged on failure.
    pub fn set_global_rate(&mut self, new_rate: Rate) -> Result<(), LedgerError> {
        if new_rate >= self.current_rate {
            return Err(LedgerError::RateIncreaseRejected {
                current: self.current_rate,
                proposed: new_rate,
            });
        }

        let old_rate = self.current_rate;
        self.current_rate = new_rate;
        tracing::info!(old_rate, new_rate, "global rate lowered");
        Ok(())
    }

    // -- Vault support -------------------------------------------------

    /// Captures the stored record for `id`, for rollback by the vault's
    /// all-or-nothing deposit/redeem paths.
    pub(crate) fn snapshot(&self, id: &AccountId) -> Option<Account> {
        self.accounts.get(id).cloned()
    }

    /// Restores a record captured by [`snapshot`](Self::snapshot),
    /// erasing the account entirely when the snapshot predates its
    /// creation.
    pub(crate) fn restore(&mut self, id: &AccountId, snapshot: Option<Account>) {
        match snapshot {
            Some(account) => {
                self.accounts.insert(id.clone(), account);
            }
            None => {
                self.accounts.remove(id);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PRECISION;

    const RATE: Rate = 50_000_000_000; // 5e10, the documented example rate

    fn alice() -> AccountId {
        AccountId::new("alice")
    }

    fn bob() -> AccountId {
        AccountId::new("bob")
    }

    #[test]
    fn mint_creates_account_lazily() {
        let mut ledger = Ledger::new(RATE);
        assert!(ledger.account(&alice()).is_none());

        ledger.mint(&alice(), 100_000, 0).unwrap();

        let account = ledger.account(&alice()).unwrap();
        assert_eq!(account.principal, 100_000);
        assert_eq!(account.rate, RATE);
        assert_eq!(account.last_settled, 0);
    }

    #[test]
    fn balance_accrues_without_mutating_state() {
        let mut ledger = Ledger::new(RATE);
        ledger.mint(&alice(), 100_000, 0).unwrap();

        assert_eq!(ledger.balance_of(&alice(), 3_600).unwrap(), 100_018);
        // The pure projection must not advance the accrual clock.
        assert_eq!(ledger.account(&alice()).unwrap().last_settled, 0);
        assert_eq!(ledger.principal_balance_of(&alice()), 100_000);
    }

    #[test]
    fn balance_of_unknown_account_is_zero() {
        let ledger = Ledger::new(RATE);
        assert_eq!(ledger.balance_of(&alice(), 10_000).unwrap(), 0);
        assert_eq!(ledger.principal_balance_of(&alice()), 0);
        assert_eq!(ledger.rate_of(&alice()), 0);
    }

    #[test]
    fn second_mint_settles_then_rebases_rate() {
        let mut ledger = Ledger::new(RATE);
        ledger.mint(&alice(), 100_000, 0).unwrap();
        ledger.set_global_rate(RATE / 2).unwrap();

        ledger.mint(&alice(), 50_000, 3_600).unwrap();

        let account = ledger.account(&alice()).unwrap();
        // 18 units of interest settled at the old rate, then 50_000 minted.
        assert_eq!(account.principal, 150_018);
        // The locked rate rebases to the current global rate, even though
        // the previously locked rate was more favorable.
        assert_eq!(account.rate, RATE / 2);
        assert_eq!(account.last_settled, 3_600);
    }

    #[test]
    fn burn_settles_before_checking_balance() {
        let mut ledger = Ledger::new(RATE);
        ledger.mint(&alice(), 100_000, 0).unwrap();

        // 100_018 is only available because settlement runs first.
        ledger.burn(&alice(), 100_018, 3_600).unwrap();
        assert_eq!(ledger.principal_balance_of(&alice()), 0);
    }

    #[test]
    fn burn_beyond_settled_balance_rejected() {
        let mut ledger = Ledger::new(RATE);
        ledger.mint(&alice(), 100_000, 0).unwrap();

        let result = ledger.burn(&alice(), 100_019, 3_600);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance {
                available: 100_018,
                requested: 100_019,
                ..
            })
        ));
        // Failure leaves the account untouched, including its clock.
        assert_eq!(ledger.principal_balance_of(&alice()), 100_000);
        assert_eq!(ledger.account(&alice()).unwrap().last_settled, 0);
    }

    #[test]
    fn failed_burn_on_unknown_account_creates_nothing() {
        let mut ledger = Ledger::new(RATE);
        let result = ledger.burn(&alice(), 1, 100);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance { available: 0, .. })
        ));
        assert!(ledger.account(&alice()).is_none());
    }

    #[test]
    fn drained_account_retains_rate_until_next_mint() {
        let mut ledger = Ledger::new(RATE);
        ledger.mint(&alice(), 100_000, 0).unwrap();
        ledger.burn(&alice(), 100_000, 0).unwrap();

        assert_eq!(ledger.principal_balance_of(&alice()), 0);
        assert_eq!(ledger.rate_of(&alice()), RATE);

        ledger.set_global_rate(RATE / 10).unwrap();
        ledger.mint(&alice(), 1_000, 500).unwrap();
        assert_eq!(ledger.rate_of(&alice()), RATE / 10);
    }

    #[test]
    fn transfer_moves_settled_principal() {
        let mut ledger = Ledger::new(RATE);
        ledger.mint(&alice(), 100_000, 0).unwrap();

        let moved = ledger.transfer(&alice(), &bob(), 40_000, 3_600).unwrap();
        assert_eq!(moved, 40_000);
        // Sender settled to 100_018 before the move.
        assert_eq!(ledger.principal_balance_of(&alice()), 60_018);
        assert_eq!(ledger.principal_balance_of(&bob()), 40_000);
    }

    #[test]
    fn transfer_is_principal_neutral() {
        let mut ledger = Ledger::new(RATE);
        ledger.mint(&alice(), 100_000, 0).unwrap();
        let before = ledger.total_principal();

        // Settlement at transfer time mints interest; measure against
        // the settled total.
        ledger.transfer(&alice(), &bob(), 25_000, 3_600).unwrap();
        assert_eq!(ledger.total_principal(), before + 18);
    }

    #[test]
    fn transfer_all_sentinel_resolves_to_settled_balance() {
        let mut ledger = Ledger::new(RATE);
        ledger.mint(&alice(), 100_000, 0).unwrap();

        let moved = ledger.transfer(&alice(), &bob(), AMOUNT_ALL, 3_600).unwrap();
        assert_eq!(moved, 100_018);
        assert_eq!(ledger.principal_balance_of(&alice()), 0);
        assert_eq!(ledger.principal_balance_of(&bob()), 100_018);
    }

    #[test]
    fn transfer_to_empty_account_inherits_sender_rate() {
        let mut ledger = Ledger::new(RATE);
        ledger.mint(&alice(), 100_000, 0).unwrap();
        ledger.set_global_rate(RATE / 4).unwrap();

        ledger.transfer(&alice(), &bob(), AMOUNT_ALL, 3_600).unwrap();

        // Bob was empty, so he inherits Alice's locked rate — not the
        // since-lowered global rate.
        assert_eq!(ledger.rate_of(&bob()), RATE);
    }

    #[test]
    fn transfer_to_active_account_keeps_receiver_rate() {
        let mut ledger = Ledger::new(RATE);
        ledger.mint(&bob(), 10_000, 0).unwrap();
        ledger.set_global_rate(RATE / 4).unwrap();
        ledger.mint(&alice(), 100_000, 100).unwrap();

        ledger.transfer(&alice(), &bob(), 5_000, 200).unwrap();

        // Bob held a balance; his rate is neither replaced nor averaged.
        assert_eq!(ledger.rate_of(&bob()), RATE);
        assert_eq!(ledger.rate_of(&alice()), RATE / 4);
    }

    #[test]
    fn transfer_beyond_settled_balance_rejected() {
        let mut ledger = Ledger::new(RATE);
        ledger.mint(&alice(), 100, 0).unwrap();

        let result = ledger.transfer(&alice(), &bob(), 101, 0);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.principal_balance_of(&alice()), 100);
        assert!(ledger.account(&bob()).is_none());
    }

    #[test]
    fn self_transfer_settles_and_moves_nothing() {
        let mut ledger = Ledger::new(RATE);
        ledger.mint(&alice(), 100_000, 0).unwrap();

        let moved = ledger.transfer(&alice(), &alice(), AMOUNT_ALL, 3_600).unwrap();
        assert_eq!(moved, 100_018);
        assert_eq!(ledger.principal_balance_of(&alice()), 100_018);
    }

    #[test]
    fn rate_can_only_move_down() {
        let mut ledger = Ledger::new(RATE);

        ledger.set_global_rate(RATE - 1).unwrap();
        assert_eq!(ledger.current_rate(), RATE - 1);

        // Equal is rejected, not just greater.
        let equal = ledger.set_global_rate(RATE - 1);
        assert!(matches!(
            equal,
            Err(LedgerError::RateIncreaseRejected {
                current,
                proposed,
            }) if current == RATE - 1 && proposed == RATE - 1
        ));

        let higher = ledger.set_global_rate(RATE);
        assert!(matches!(
            higher,
            Err(LedgerError::RateIncreaseRejected { .. })
        ));
        assert_eq!(ledger.current_rate(), RATE - 1);
    }

    #[test]
    fn rate_can_reach_zero() {
        let mut ledger = Ledger::new(RATE);
        ledger.set_global_rate(0).unwrap();
        assert_eq!(ledger.current_rate(), 0);

        // Zero is the floor; nothing is strictly below it.
        assert!(ledger.set_global_rate(0).is_err());
    }

    #[test]
    fn mint_overflow_rejected_without_state_change() {
        let mut ledger = Ledger::new(0);
        ledger.mint(&alice(), Amount::MAX, 0).unwrap();

        let result = ledger.mint(&alice(), 1, 0);
        assert!(matches!(result, Err(LedgerError::BalanceOverflow { .. })));
        assert_eq!(ledger.principal_balance_of(&alice()), Amount::MAX);
    }

    #[test]
    fn balance_projection_overflow_surfaces_accrual_error() {
        let mut ledger = Ledger::new(PRECISION);
        ledger.mint(&alice(), Amount::MAX, 0).unwrap();

        let result = ledger.balance_of(&alice(), u64::MAX);
        assert!(matches!(result, Err(LedgerError::Accrual(_))));
    }

    #[test]
    fn ledger_serialization_roundtrip() {
        let mut ledger = Ledger::new(RATE);
        ledger.mint(&alice(), 100_000, 0).unwrap();
        ledger.set_global_rate(RATE / 2).unwrap();

        let json = serde_json::to_string(&ledger).expect("serialize");
        let recovered: Ledger = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(recovered.current_rate(), RATE / 2);
        assert_eq!(recovered.principal_balance_of(&alice()), 100_000);
        assert_eq!(recovered.rate_of(&alice()), RATE);
    }
}
