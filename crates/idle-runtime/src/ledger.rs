//! Currency balances with an atomic earn/spend contract.

use crate::sync::lock;
use idle_core::{Balance, CurrencyKind, EconError};
use std::sync::Mutex;
use tracing::debug;

/// Authoritative owner of a player's balances.
///
/// Each currency is an independent cell; every operation on a cell is a
/// single critical section, so concurrent earns never lose an update and a
/// rejected spend leaves the balance untouched.
#[derive(Debug, Default)]
pub struct CurrencyLedger {
    gold: Mutex<u64>,
    diamond: Mutex<u64>,
}

impl CurrencyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger seeded from saved balances; later entries for a currency win.
    pub fn with_balances<I: IntoIterator<Item = Balance>>(balances: I) -> Self {
        let ledger = Self::new();
        for b in balances {
            *lock(ledger.cell(b.currency_kind)) = b.amount;
        }
        ledger
    }

    fn cell(&self, kind: CurrencyKind) -> &Mutex<u64> {
        match kind {
            CurrencyKind::Gold => &self.gold,
            CurrencyKind::Diamond => &self.diamond,
        }
    }

    pub fn balance(&self, kind: CurrencyKind) -> u64 {
        *lock(self.cell(kind))
    }

    pub fn balances(&self) -> Vec<Balance> {
        CurrencyKind::all()
            .iter()
            .map(|k| Balance::new(*k, self.balance(*k)))
            .collect()
    }

    /// Adds `amount` and returns the new balance. Saturates at `u64::MAX`.
    pub fn earn(&self, kind: CurrencyKind, amount: u64) -> u64 {
        let mut cell = lock(self.cell(kind));
        *cell = cell.saturating_add(amount);
        debug!(?kind, amount, balance = *cell, "earn");
        *cell
    }

    /// Removes `amount` if the balance covers it and returns the new balance.
    pub fn spend(&self, kind: CurrencyKind, amount: u64) -> Result<u64, EconError> {
        let mut cell = lock(self.cell(kind));
        if *cell < amount {
            return Err(EconError::InsufficientFunds {
                currency: kind,
                balance: *cell,
                requested: amount,
            });
        }
        *cell -= amount;
        debug!(?kind, amount, balance = *cell, "spend");
        Ok(*cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::thread;

    #[test]
    fn concurrent_earns_are_not_lost() {
        const N: u64 = 10_000;
        let ledger = CurrencyLedger::new();
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..N / 8 {
                        ledger.earn(CurrencyKind::Gold, 1);
                        ledger.earn(CurrencyKind::Diamond, 1);
                    }
                });
            }
        });
        assert_eq!(ledger.balance(CurrencyKind::Gold), N);
        assert_eq!(ledger.balance(CurrencyKind::Diamond), N);
    }

    #[test]
    fn concurrent_spends_never_overdraw() {
        let ledger = CurrencyLedger::with_balances([Balance::new(CurrencyKind::Gold, 100)]);
        let successes = std::sync::atomic::AtomicU64::new(0);
        thread::scope(|s| {
            for _ in 0..16 {
                s.spawn(|| {
                    for _ in 0..20 {
                        if ledger.spend(CurrencyKind::Gold, 1).is_ok() {
                            successes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                        }
                    }
                });
            }
        });
        assert_eq!(successes.into_inner(), 100);
        assert_eq!(ledger.balance(CurrencyKind::Gold), 0);
    }

    #[test]
    fn failed_spend_reports_and_keeps_balance() {
        let ledger = CurrencyLedger::with_balances([Balance::new(CurrencyKind::Diamond, 5)]);
        let err = ledger.spend(CurrencyKind::Diamond, 6).unwrap_err();
        assert_eq!(
            err,
            EconError::InsufficientFunds {
                currency: CurrencyKind::Diamond,
                balance: 5,
                requested: 6
            }
        );
        assert_eq!(ledger.balance(CurrencyKind::Diamond), 5);
    }

    #[test]
    fn currencies_are_independent() {
        let ledger = CurrencyLedger::new();
        ledger.earn(CurrencyKind::Gold, 10);
        assert_eq!(ledger.balance(CurrencyKind::Diamond), 0);
        assert_eq!(
            ledger.balances(),
            vec![
                Balance::new(CurrencyKind::Gold, 10),
                Balance::new(CurrencyKind::Diamond, 0)
            ]
        );
    }

    proptest! {
        #[test]
        fn spend_succeeds_iff_covered(balance in 0u64..1_000_000, amount in 0u64..1_000_000) {
            let ledger = CurrencyLedger::with_balances([Balance::new(CurrencyKind::Gold, balance)]);
            let res = ledger.spend(CurrencyKind::Gold, amount);
            if amount <= balance {
                prop_assert_eq!(res, Ok(balance - amount));
                prop_assert_eq!(ledger.balance(CurrencyKind::Gold), balance - amount);
            } else {
                prop_assert!(res.is_err());
                prop_assert_eq!(ledger.balance(CurrencyKind::Gold), balance);
            }
        }
    }
}
