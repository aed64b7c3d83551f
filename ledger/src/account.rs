//! # Account Model
//!
//! A holder's entire relationship with the ledger is three numbers:
//! how much principal they hold, the rate they locked in when it was
//! minted, and when interest was last settled into principal.
//!
//! Account records are created lazily on first mint and never deleted —
//! a fully drained account keeps its `rate` and `last_settled` until the
//! next mint overwrites them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{Amount, Rate, Timestamp};

/// Opaque holder identity.
///
/// The ledger doesn't interpret the contents — authorization and
/// identity derivation live with external collaborators. A newtype
/// keeps account ids from being confused with other strings at
/// call sites.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Creates an account id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Per-account ledger state.
///
/// `Default` yields the pre-settlement state of a brand-new account:
/// zero principal, zero rate, accrual clock at zero. Settling such a
/// record produces zero growth, so lazy creation is safe.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Tokens actually issued to this account. Excludes interest that
    /// has accrued but not yet been settled.
    pub principal: Amount,

    /// The interest rate locked in the last time principal was minted
    /// to this account, scaled by [`crate::config::PRECISION`].
    pub rate: Rate,

    /// Logical timestamp of the last settlement for this account.
    pub last_settled: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_account_is_all_zeros() {
        let account = Account::default();
        assert_eq!(account.principal, 0);
        assert_eq!(account.rate, 0);
        assert_eq!(account.last_settled, 0);
    }

    #[test]
    fn account_id_display_matches_raw() {
        let id = AccountId::new("alice");
        assert_eq!(id.to_string(), "alice");
        assert_eq!(id.as_str(), "alice");
    }

    #[test]
    fn account_id_serializes_transparently() {
        let id = AccountId::new("alice");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"alice\"");

        let recovered: AccountId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(recovered, id);
    }

    #[test]
    fn account_serialization_roundtrip() {
        let account = Account {
            principal: 100_000,
            rate: 50_000_000_000,
            last_settled: 3_600,
        };

        let json = serde_json::to_string(&account).expect("serialize");
        let recovered: Account = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(recovered, account);
    }
}
