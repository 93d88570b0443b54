use serde::{Deserialize, Serialize};

/// Currencies held by a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyKind {
    /// Soft currency earned by actions and spent in the shop.
    Gold,
    /// Hard currency earned from missions, spent on unlocks.
    Diamond,
}

impl CurrencyKind {
    /// All currencies in display order.
    pub fn all() -> &'static [CurrencyKind] {
        &[CurrencyKind::Gold, CurrencyKind::Diamond]
    }
}

/// Amount held of one currency. Never negative by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub currency_kind: CurrencyKind,
    pub amount: u64,
}

impl Balance {
    pub fn new(currency_kind: CurrencyKind, amount: u64) -> Self {
        Self {
            currency_kind,
            amount,
        }
    }
}
