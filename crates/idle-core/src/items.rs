use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Consumables that grant a timed buff when used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumableKind {
    Coffee,
    EnergyDrink,
    Vacation,
}

/// Buff granted by one consumable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsumableSpec {
    /// Yield multiplier while the buff runs.
    pub multiplier: Decimal,
    /// Buff length in buff ticks.
    pub duration_ticks: u32,
    /// Shop price in gold.
    pub price: u64,
}

/// Equipment producing passive yield every second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    Keyboard,
    Monitor,
    Chair,
    Server,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSpec {
    /// Gold produced per auto-gain tick.
    pub per_second: u64,
    /// Shop price in gold.
    pub price: u64,
}

/// Items owned by a player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Consumable stock per kind; kinds at zero are removed.
    #[serde(default)]
    pub consumables: BTreeMap<ConsumableKind, u32>,
    /// Owned equipment (at most one of each kind).
    #[serde(default)]
    pub equipment: BTreeSet<EquipmentKind>,
}

impl Inventory {
    pub fn consumable_count(&self, kind: ConsumableKind) -> u32 {
        self.consumables.get(&kind).copied().unwrap_or(0)
    }

    pub fn add_consumable(&mut self, kind: ConsumableKind, count: u32) {
        if count == 0 {
            return;
        }
        let slot = self.consumables.entry(kind).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    /// Removes one item; returns false (no change) when out of stock.
    pub fn take_consumable(&mut self, kind: ConsumableKind) -> bool {
        let Some(n) = self.consumables.get_mut(&kind) else {
            return false;
        };
        let had_stock = *n > 0;
        *n = n.saturating_sub(1);
        if *n == 0 {
            self.consumables.remove(&kind);
        }
        had_stock
    }

    /// Adds equipment; returns false if it was already owned.
    pub fn add_equipment(&mut self, kind: EquipmentKind) -> bool {
        self.equipment.insert(kind)
    }

    pub fn owns(&self, kind: EquipmentKind) -> bool {
        self.equipment.contains(&kind)
    }
}
