#![deny(warnings)]

//! Stateful owners of the idle economy and the player aggregate.
//!
//! Each owner (currency ledger, skill registry, fever meter, buff timer and
//! the statistics record) is its own mutation domain guarded by a mutex. No
//! owner calls into another while holding its lock; the use cases on
//! [`Player`] sequence them.

mod buff;
mod fever;
mod ledger;
mod player;
mod record;
mod skills;
mod sync;
mod ticker;

pub use buff::BuffTimer;
pub use fever::FeverMeter;
pub use ledger::CurrencyLedger;
pub use player::{ActionOutcome, Player};
pub use record::{MissionProgress, Record};
pub use skills::SkillRegistry;
pub use ticker::{TaskLiveness, TickFlow, Ticker};
