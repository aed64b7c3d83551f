//! # Scenario Replay
//!
//! A scenario is a JSON document: initial conditions plus an ordered
//! list of timestamped steps. The driver executes it against a fresh
//! vault and produces a [`ScenarioReport`] of the final state.
//!
//! Because the ledger core takes logical time as an explicit parameter,
//! a scenario is a complete, deterministic description of a run — the
//! same file always yields the same report, byte for byte.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use meridian_ledger::config::DEFAULT_INITIAL_RATE;
use meridian_ledger::{
    Account, AccountId, Amount, AssetTransfer, InMemoryAsset, Ledger, Rate, Timestamp, Vault,
    AMOUNT_ALL,
};

// ---------------------------------------------------------------------------
// Scenario Input
// ---------------------------------------------------------------------------

/// A complete scenario: initial conditions and the steps to replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// The global rate the ledger starts with, scaled by 10^18.
    #[serde(default = "default_initial_rate")]
    pub initial_rate: Rate,

    /// External asset each holder starts with, as if acquired
    /// out-of-band before the scenario begins.
    #[serde(default)]
    pub endowments: BTreeMap<String, Amount>,

    /// The operations to replay, in order. Timestamps must be
    /// monotonic non-decreasing across time-bearing steps.
    pub steps: Vec<Step>,
}

fn default_initial_rate() -> Rate {
    DEFAULT_INITIAL_RATE
}

/// An amount argument that may be the reserved "all" keyword.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountArg {
    /// A concrete amount in smallest units.
    Exact(Amount),
    /// The caller's entire settled balance at the step's timestamp.
    Keyword(AllKeyword),
}

/// The only recognized amount keyword.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllKeyword {
    /// "all"
    All,
}

impl AmountArg {
    fn resolve(self) -> Amount {
        match self {
            AmountArg::Exact(amount) => amount,
            AmountArg::Keyword(AllKeyword::All) => AMOUNT_ALL,
        }
    }
}

/// A single replay step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Deposit external asset, minting ledger balance 1:1.
    Deposit {
        /// The depositing holder.
        account: String,
        /// Asset amount to deposit.
        amount: Amount,
        /// Logical timestamp of the operation.
        at: Timestamp,
    },
    /// Redeem ledger balance for external asset.
    Redeem {
        /// The redeeming holder.
        account: String,
        /// Amount to redeem, or "all".
        amount: AmountArg,
        /// Logical timestamp of the operation.
        at: Timestamp,
    },
    /// Move ledger balance between holders.
    Transfer {
        /// Sending holder.
        from: String,
        /// Receiving holder.
        to: String,
        /// Amount to move, or "all".
        amount: AmountArg,
        /// Logical timestamp of the operation.
        at: Timestamp,
    },
    /// Lower the global rate.
    SetRate {
        /// The new rate, scaled by 10^18. Must be strictly below the
        /// rate in force.
        rate: Rate,
    },
    /// Deposit reward asset into vault custody to back accrued
    /// interest.
    FundCustody {
        /// Asset amount to add to custody.
        amount: Amount,
    },
    /// Assert a holder's accrued balance at an instant. Fails the run
    /// on mismatch.
    AssertBalance {
        /// The holder to check.
        account: String,
        /// Expected accrued balance.
        expected: Amount,
        /// Logical timestamp of the projection.
        at: Timestamp,
    },
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Final state of a completed scenario run.
///
/// Maps are `BTreeMap` so the serialized report is deterministically
/// ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Global rate in force at the end of the run.
    pub final_rate: Rate,
    /// Asset remaining in vault custody.
    pub custody: Amount,
    /// Every ledger account ever touched, with its stored state.
    pub accounts: BTreeMap<String, Account>,
    /// External asset balances per holder.
    pub asset_balances: BTreeMap<String, Amount>,
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Replays `scenario` against a fresh vault and returns the final
/// state.
///
/// Any failing step — a ledger rejection, a vault rollback, or a
/// balance assertion mismatch — aborts the run with context naming the
/// step.
pub fn run(scenario: &Scenario) -> Result<ScenarioReport> {
    let mut asset = InMemoryAsset::new();
    for (holder, amount) in &scenario.endowments {
        asset
            .endow(&AccountId::new(holder.clone()), *amount)
            .with_context(|| format!("endowing {holder}"))?;
    }

    let mut vault = Vault::new(Ledger::new(scenario.initial_rate), asset);

    for (index, step) in scenario.steps.iter().enumerate() {
        execute_step(&mut vault, step).with_context(|| format!("step {index} ({step:?})"))?;
    }

    let accounts = vault
        .ledger()
        .accounts()
        .map(|(id, account)| (id.to_string(), account.clone()))
        .collect();
    let asset_balances = vault
        .asset()
        .balances()
        .map(|(id, amount)| (id.to_string(), *amount))
        .collect();

    Ok(ScenarioReport {
        final_rate: vault.ledger().current_rate(),
        custody: vault.asset().custody(),
        accounts,
        asset_balances,
    })
}

fn execute_step(vault: &mut Vault<InMemoryAsset>, step: &Step) -> Result<()> {
    match step {
        Step::Deposit { account, amount, at } => {
            vault.deposit(&AccountId::new(account.clone()), *amount, *at)?;
        }
        Step::Redeem { account, amount, at } => {
            let paid = vault.redeem(&AccountId::new(account.clone()), amount.resolve(), *at)?;
            tracing::debug!(account = %account, paid, at, "redeem step complete");
        }
        Step::Transfer {
            from,
            to,
            amount,
            at,
        } => {
            vault.ledger_mut().transfer(
                &AccountId::new(from.clone()),
                &AccountId::new(to.clone()),
                amount.resolve(),
                *at,
            )?;
        }
        Step::SetRate { rate } => {
            vault.ledger_mut().set_global_rate(*rate)?;
        }
        Step::FundCustody { amount } => {
            vault.asset_mut().fund_custody(*amount)?;
        }
        Step::AssertBalance {
            account,
            expected,
            at,
        } => {
            let actual = vault
                .ledger()
                .balance_of(&AccountId::new(account.clone()), *at)?;
            if actual != *expected {
                bail!("balance assertion failed: {account} has {actual} at t={at}, expected {expected}");
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
