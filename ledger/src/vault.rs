//! # Custody Vault
//!
//! The vault pegs ledger units 1:1 to an external asset: a deposit
//! collects the asset into custody and mints the same amount of ledger
//! balance; a redemption burns ledger balance and pays the asset back
//! out. One vault is bound to exactly one ledger for its lifetime.
//!
//! Interest settled by the ledger is newly issued — it has no matching
//! deposit. Whoever operates the vault must fund custody with reward
//! assets before holders can redeem accrued interest; that funding is an
//! external collaborator operation ([`InMemoryAsset::fund_custody`] in
//! this repo's reference implementation).
//!
//! ## All-or-Nothing
//!
//! Both deposit and redeem pair a ledger mutation with an external asset
//! movement. If the asset side fails, the ledger side is rolled back via
//! a pre-captured account snapshot. No operation leaves state
//! half-applied.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountId;
use crate::config::{Amount, Timestamp, AMOUNT_ALL};
use crate::ledger::{Ledger, LedgerError};

// ---------------------------------------------------------------------------
// Asset Seam
// ---------------------------------------------------------------------------

/// Errors produced by the external asset-transfer primitive.
#[derive(Debug, Error)]
pub enum AssetTransferError {
    /// The holder doesn't have the asset they're trying to deposit.
    #[error("insufficient asset: {holder} holds {available}, needs {requested}")]
    InsufficientAsset {
        /// The holder being debited.
        holder: AccountId,
        /// The holder's current asset balance.
        available: Amount,
        /// The amount that was requested.
        requested: Amount,
    },

    /// Custody can't cover the payout. The vault was not funded with
    /// enough reward asset to back accrued interest.
    #[error("insufficient custody: vault holds {custody}, payout requires {requested}")]
    InsufficientCustody {
        /// Asset currently held in custody.
        custody: Amount,
        /// The payout that was requested.
        requested: Amount,
    },

    /// An asset balance would exceed `u64::MAX`.
    #[error("asset overflow: crediting {amount} to {holder}")]
    Overflow {
        /// The holder being credited.
        holder: AccountId,
        /// The amount that caused the overflow.
        amount: Amount,
    },
}

/// The external asset-movement primitive the vault custodies against.
///
/// Implementations move real value — an on-chain token, a bank rail, a
/// test fixture. The vault only ever calls these two methods and treats
/// any error as grounds for rolling back the paired ledger mutation.
pub trait AssetTransfer {
    /// Moves `amount` of the asset from `from` into vault custody.
    fn transfer_in(&mut self, from: &AccountId, amount: Amount) -> Result<(), AssetTransferError>;

    /// Pays `amount` of the asset out of vault custody to `to`.
    fn transfer_out(&mut self, to: &AccountId, amount: Amount) -> Result<(), AssetTransferError>;

    /// Asset currently held in vault custody.
    fn custody(&self) -> Amount;
}

/// In-memory reference implementation of [`AssetTransfer`].
///
/// Tracks per-holder asset balances plus the vault's custody pool.
/// Used by tests and the scenario driver; a production deployment
/// would implement the trait over a real settlement rail.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InMemoryAsset {
    balances: HashMap<AccountId, Amount>,
    custody: Amount,
}

impl InMemoryAsset {
    /// Creates an asset pool with no holders and empty custody.
    pub fn new() -> Self {
        Self::default()
    }

    /// Endows a holder with external asset, as if acquired out-of-band.
    pub fn endow(&mut self, holder: &AccountId, amount: Amount) -> Result<(), AssetTransferError> {
        let balance = self.balances.entry(holder.clone()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(AssetTransferError::Overflow {
                holder: holder.clone(),
                amount,
            })?;
        Ok(())
    }

    /// Deposits reward asset straight into custody, backing interest
    /// that the ledger has issued (or will issue).
    pub fn fund_custody(&mut self, amount: Amount) -> Result<(), AssetTransferError> {
        self.custody = self
            .custody
            .checked_add(amount)
            .ok_or(AssetTransferError::Overflow {
                holder: AccountId::new("custody"),
                amount,
            })?;
        Ok(())
    }

    /// Returns a holder's external asset balance.
    pub fn balance_of(&self, holder: &AccountId) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Iterates over all holder balances.
    pub fn balances(&self) -> impl Iterator<Item = (&AccountId, &Amount)> {
        self.balances.iter()
    }
}

impl AssetTransfer for InMemoryAsset {
    fn transfer_in(&mut self, from: &AccountId, amount: Amount) -> Result<(), AssetTransferError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(AssetTransferError::InsufficientAsset {
                holder: from.clone(),
                available,
                requested: amount,
            });
        }

        let custody = self
            .custody
            .checked_add(amount)
            .ok_or(AssetTransferError::Overflow {
                holder: from.clone(),
                amount,
            })?;

        self.balances.insert(from.clone(), available - amount);
        self.custody = custody;
        Ok(())
    }

    fn transfer_out(&mut self, to: &AccountId, amount: Amount) -> Result<(), AssetTransferError> {
        if self.custody < amount {
            return Err(AssetTransferError::InsufficientCustody {
                custody: self.custody,
                requested: amount,
            });
        }

        let balance = self.balance_of(to);
        let credited = balance
            .checked_add(amount)
            .ok_or(AssetTransferError::Overflow {
                holder: to.clone(),
                amount,
            })?;

        self.custody -= amount;
        self.balances.insert(to.clone(), credited);
        Ok(())
    }

    fn custody(&self) -> Amount {
        self.custody
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Deposits must move a positive amount.
    #[error("deposit amount must be positive")]
    ZeroDeposit,

    /// Collecting the deposited asset failed; the paired mint was
    /// rolled back as if it never happened.
    #[error("deposit asset collection failed, mint rolled back")]
    DepositTransferFailed(#[source] AssetTransferError),

    /// The asset payout failed during redeem; the preceding burn was
    /// rolled back as if it never happened.
    #[error("redeem payout failed, burn rolled back")]
    RedeemTransferFailed(#[source] AssetTransferError),

    /// The underlying ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// Custodies an external asset 1:1 against ledger balance.
///
/// The vault owns its [`Ledger`] — the binding is fixed at construction
/// and immutable for the vault's lifetime. Rate governance and holder
/// transfers go through [`ledger_mut`](Self::ledger_mut); the vault
/// itself only mints on deposit and burns on redeem.
#[derive(Debug)]
pub struct Vault<A: AssetTransfer> {
    ledger: Ledger,
    asset: A,
}

impl<A: AssetTransfer> Vault<A> {
    /// Binds a vault to a ledger and an asset rail.
    pub fn new(ledger: Ledger, asset: A) -> Self {
        Self { ledger, asset }
    }

    /// The bound ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Mutable access to the bound ledger, for operations that don't
    /// move the external asset: transfers, rate governance, reads.
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// The asset rail this vault custodies against.
    pub fn asset(&self) -> &A {
        &self.asset
    }

    /// Mutable access to the asset rail, for out-of-band operations
    /// such as reward funding.
    pub fn asset_mut(&mut self) -> &mut A {
        &mut self.asset
    }

    /// Deposits `amount` of the external asset and mints the same
    /// amount of ledger balance to `caller`, pegged 1:1 at mint time.
    ///
    /// Atomic: if collecting the asset fails after the mint, the mint
    /// is rolled back and the error is reported as
    /// [`VaultError::DepositTransferFailed`].
    ///
    /// # Errors
    ///
    /// [`VaultError::ZeroDeposit`] for `amount == 0`; ledger errors
    /// propagate via [`VaultError::Ledger`].
    pub fn deposit(
        &mut self,
        caller: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), VaultError> {
        if amount == 0 {
            return Err(VaultError::ZeroDeposit);
        }

        let snapshot = self.ledger.snapshot(caller);
        self.ledger.mint(caller, amount, now)?;

        if let Err(err) = self.asset.transfer_in(caller, amount) {
            self.ledger.restore(caller, snapshot);
            return Err(VaultError::DepositTransferFailed(err));
        }

        tracing::info!(account = %caller, amount, now, "deposited");
        Ok(())
    }

    /// Burns `amount` of `caller`'s ledger balance and pays out the
    /// same amount of the external asset.
    ///
    /// [`AMOUNT_ALL`] redeems the caller's entire settled balance at
    /// `now`. Returns the amount actually paid out.
    ///
    /// Atomic: if the payout fails, the burn is rolled back and the
    /// error is reported as [`VaultError::RedeemTransferFailed`].
    pub fn redeem(
        &mut self,
        caller: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Amount, VaultError> {
        // The burn needs a concrete value, so the sentinel resolves
        // against the pure balance projection; the burn's own settlement
        // at the same `now` lands on the identical figure.
        let amount = if amount == AMOUNT_ALL {
            self.ledger.balance_of(caller, now)?
        } else {
            amount
        };

        let snapshot = self.ledger.snapshot(caller);
        self.ledger.burn(caller, amount, now)?;

        if let Err(err) = self.asset.transfer_out(caller, amount) {
            self.ledger.restore(caller, snapshot);
            return Err(VaultError::RedeemTransferFailed(err));
        }

        tracing::info!(account = %caller, amount, now, "redeemed");
        Ok(amount)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
