//! The player aggregate and the use cases that drive it.
//!
//! Use cases sequence the owners one after another: a yield is computed from
//! the skill registry, fever and buff, credited on the ledger, and only then
//! recorded. No owner lock is held across a call into another owner.

use crate::buff::BuffTimer;
use crate::fever::FeverMeter;
use crate::ledger::CurrencyLedger;
use crate::record::Record;
use crate::skills::SkillRegistry;
use crate::sync::lock;
use crate::ticker::{TickFlow, Ticker};
use idle_core::{
    Balance, Career, ConsumableKind, CurrencyKind, EconConfig, EconError, EquipmentKind,
    GameEvent, GameKind, Inventory, MissionId, Reward, Skill, SkillKey, StatisticKey,
};
use persistence::{PlayerRepository, PlayerSnapshot, SkillLevel, SNAPSHOT_VERSION};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tracing::{debug, info};

/// Result of one gameplay action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Gold credited for the action.
    pub earned: u64,
    /// Fever level after the action's gain.
    pub fever_level: u32,
    /// Missions that became claimable as a consequence.
    pub newly_claimable: Vec<MissionId>,
}

#[derive(Debug, Default)]
struct Session {
    running: bool,
    epoch: u64,
    auto_gain: Option<Ticker>,
}

/// One player: identity, balances, items, skills, bonuses and record.
#[derive(Debug)]
pub struct Player {
    id: String,
    nickname: String,
    config: Arc<EconConfig>,
    career: Mutex<Career>,
    ledger: CurrencyLedger,
    inventory: Mutex<Inventory>,
    skills: SkillRegistry,
    fever: FeverMeter,
    buff: BuffTimer,
    record: Record,
    session: Mutex<Session>,
}

impl Player {
    /// Fresh player with the configured starting balances.
    pub fn new(id: impl Into<String>, nickname: impl Into<String>, config: Arc<EconConfig>) -> Self {
        let ledger = CurrencyLedger::with_balances([
            Balance::new(CurrencyKind::Gold, config.starting_gold),
            Balance::new(CurrencyKind::Diamond, config.starting_diamond),
        ]);
        let skills = SkillRegistry::new(Arc::clone(&config));
        let record = Record::new(config.missions.clone());
        Self::assemble(
            id.into(),
            nickname.into(),
            config,
            Career::default(),
            ledger,
            Inventory::default(),
            skills,
            record,
        )
    }

    /// Rebuilds a player from a saved snapshot.
    pub fn from_snapshot(config: Arc<EconConfig>, snapshot: PlayerSnapshot) -> Self {
        let ledger = CurrencyLedger::with_balances(snapshot.balances);
        let skills = SkillRegistry::from_skills(
            Arc::clone(&config),
            snapshot
                .skills
                .into_iter()
                .map(|s| Skill::new(s.key, s.level)),
        );
        let record = Record::restore(
            config.missions.clone(),
            snapshot.statistics,
            &snapshot.claimed_missions,
        );
        Self::assemble(
            snapshot.id,
            snapshot.nickname,
            config,
            snapshot.career,
            ledger,
            snapshot.inventory,
            skills,
            record,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        id: String,
        nickname: String,
        config: Arc<EconConfig>,
        career: Career,
        ledger: CurrencyLedger,
        inventory: Inventory,
        skills: SkillRegistry,
        record: Record,
    ) -> Self {
        let fever = FeverMeter::new(config.fever.clone());
        let buff = BuffTimer::new(Duration::from_millis(config.buff.tick_interval_ms));
        Self {
            id,
            nickname,
            career: Mutex::new(career),
            ledger,
            inventory: Mutex::new(inventory),
            skills,
            fever,
            buff,
            record,
            session: Mutex::new(Session::default()),
            config,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn config(&self) -> &EconConfig {
        &self.config
    }

    pub fn career(&self) -> Career {
        *lock(&self.career)
    }

    pub fn balance(&self, kind: CurrencyKind) -> u64 {
        self.ledger.balance(kind)
    }

    pub fn ledger(&self) -> &CurrencyLedger {
        &self.ledger
    }

    pub fn skills(&self) -> &SkillRegistry {
        &self.skills
    }

    pub fn fever(&self) -> &FeverMeter {
        &self.fever
    }

    pub fn buff(&self) -> &BuffTimer {
        &self.buff
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn inventory(&self) -> Inventory {
        lock(&self.inventory).clone()
    }

    pub fn is_running(&self) -> bool {
        lock(&self.session).running
    }

    /// One correct answer in `game`.
    ///
    /// The yield uses the fever level from before this action's gain.
    pub fn perform_action(&self, game: GameKind) -> ActionOutcome {
        let skills = self.skills.skills_for(game);
        let earned = idle_econ::action_yield(
            &skills,
            game,
            &self.config,
            self.fever.current_multiplier(),
            self.buff.current_multiplier(),
        );
        if earned > 0 {
            self.ledger.earn(CurrencyKind::Gold, earned);
        }
        let fever_level = self.fever.gain(self.config.fever.gain_per_action);

        let mut newly_claimable = self.record.record(&GameEvent::ActionPerformed { game });
        newly_claimable.extend(self.record.record(&GameEvent::CurrencyEarned {
            currency: CurrencyKind::Gold,
            amount: earned,
        }));
        self.refresh_career();
        debug!(game = game.name(), earned, fever_level, "action");
        ActionOutcome {
            earned,
            fever_level,
            newly_claimable,
        }
    }

    /// Credits one tick of passive yield from owned equipment.
    pub fn auto_gain_tick(&self) -> u64 {
        let amount = {
            let inventory = lock(&self.inventory);
            idle_econ::passive_yield(inventory.equipment.iter(), &self.config)
        };
        if amount == 0 {
            return 0;
        }
        self.ledger.earn(CurrencyKind::Gold, amount);
        self.record.record(&GameEvent::CurrencyEarned {
            currency: CurrencyKind::Gold,
            amount,
        });
        self.refresh_career();
        amount
    }

    /// Starts a play session: fever decay and passive auto-gain. Idempotent.
    pub fn start_game(self: &Arc<Self>) {
        let mut session = lock(&self.session);
        if session.running {
            return;
        }
        session.running = true;
        session.epoch += 1;
        let epoch = session.epoch;
        let weak: Weak<Player> = Arc::downgrade(self);
        session.auto_gain = Ticker::spawn(
            "auto-gain",
            Duration::from_millis(self.config.auto_gain_interval_ms),
            move || match weak.upgrade() {
                Some(player) => player.scheduled_auto_gain(epoch),
                None => TickFlow::Stop,
            },
        );
        self.fever.start();
        info!(player = %self.id, "game started");
    }

    /// Ends the session: auto-gain stops and fever resets. Active buffs keep
    /// running.
    pub fn stop_game(&self) {
        let mut session = lock(&self.session);
        session.running = false;
        session.epoch += 1;
        session.auto_gain = None;
        self.fever.stop();
        info!(player = %self.id, "game stopped");
    }

    fn scheduled_auto_gain(&self, epoch: u64) -> TickFlow {
        // held while crediting so a concurrent stop cannot interleave
        let session = lock(&self.session);
        if !session.running || session.epoch != epoch {
            return TickFlow::Stop;
        }
        self.auto_gain_tick();
        drop(session);
        TickFlow::Continue
    }

    /// Consumes one item from the inventory and activates its buff.
    ///
    /// On `AlreadyActive` or `OutOfStock` nothing changes.
    pub fn use_consumable(&self, kind: ConsumableKind) -> Result<(), EconError> {
        let spec = self
            .config
            .consumables
            .get(&kind)
            .ok_or_else(|| EconError::NotForSale(format!("{kind:?}")))?;
        if self.buff.is_active() {
            return Err(EconError::AlreadyActive);
        }
        if !lock(&self.inventory).take_consumable(kind) {
            return Err(EconError::OutOfStock(kind));
        }
        if let Err(e) = self.buff.activate(kind, spec) {
            lock(&self.inventory).add_consumable(kind, 1);
            return Err(e);
        }
        self.record.record(&GameEvent::ConsumableUsed { kind });
        Ok(())
    }

    /// Pays for and applies one level of `key`.
    ///
    /// Nothing is spent when the skill is locked or maxed out. If another
    /// upgrade of the same skill lands between pricing and applying, the
    /// payment is refunded and the upgrade re-priced.
    ///
    /// The payment leaves the ledger before the level is applied, so until a
    /// refund lands other spends see the lower balance and may fail with
    /// `InsufficientFunds`. Refunds are not recorded as earnings, and
    /// lifetime spending only counts upgrades that were applied.
    pub fn upgrade_skill(&self, key: SkillKey) -> Result<Skill, EconError> {
        loop {
            let (level, cost) = self.skills.quote_upgrade(key)?;
            self.ledger.spend(CurrencyKind::Gold, cost)?;
            match self.skills.upgrade_from(key, level) {
                Ok(Some(skill)) => {
                    self.record.record(&GameEvent::CurrencySpent {
                        currency: CurrencyKind::Gold,
                        amount: cost,
                    });
                    self.record.record(&GameEvent::SkillUpgraded { key });
                    return Ok(skill);
                }
                Ok(None) => {
                    self.ledger.earn(CurrencyKind::Gold, cost);
                }
                Err(e) => {
                    self.ledger.earn(CurrencyKind::Gold, cost);
                    return Err(e);
                }
            }
        }
    }

    /// Buys access to a new skill with diamonds.
    pub fn unlock_skill(&self, key: SkillKey) -> Result<Skill, EconError> {
        if self.skills.is_unlocked(key) {
            return Err(EconError::AlreadyUnlocked(key));
        }
        let cost = self
            .config
            .tier(key.tier)
            .ok_or_else(|| EconError::NotForSale(key.to_string()))?
            .unlock_cost;
        self.ledger.spend(CurrencyKind::Diamond, cost)?;
        match self.skills.unlock(key) {
            Ok(skill) => {
                self.record.record(&GameEvent::CurrencySpent {
                    currency: CurrencyKind::Diamond,
                    amount: cost,
                });
                info!(%key, "skill unlocked");
                Ok(skill)
            }
            Err(e) => {
                self.ledger.earn(CurrencyKind::Diamond, cost);
                Err(e)
            }
        }
    }

    /// Buys one consumable; returns the new stock.
    pub fn buy_consumable(&self, kind: ConsumableKind) -> Result<u32, EconError> {
        let price = self
            .config
            .consumables
            .get(&kind)
            .ok_or_else(|| EconError::NotForSale(format!("{kind:?}")))?
            .price;
        self.ledger.spend(CurrencyKind::Gold, price)?;
        let stock = {
            let mut inventory = lock(&self.inventory);
            inventory.add_consumable(kind, 1);
            inventory.consumable_count(kind)
        };
        self.record.record(&GameEvent::CurrencySpent {
            currency: CurrencyKind::Gold,
            amount: price,
        });
        Ok(stock)
    }

    /// Buys a piece of equipment. Each kind can be owned once.
    pub fn buy_equipment(&self, kind: EquipmentKind) -> Result<(), EconError> {
        let price = self
            .config
            .equipment
            .get(&kind)
            .ok_or_else(|| EconError::NotForSale(format!("{kind:?}")))?
            .price;
        if lock(&self.inventory).owns(kind) {
            return Err(EconError::AlreadyOwned(kind));
        }
        self.ledger.spend(CurrencyKind::Gold, price)?;
        if !lock(&self.inventory).add_equipment(kind) {
            self.ledger.earn(CurrencyKind::Gold, price);
            return Err(EconError::AlreadyOwned(kind));
        }
        self.record.record(&GameEvent::CurrencySpent {
            currency: CurrencyKind::Gold,
            amount: price,
        });
        Ok(())
    }

    /// Claims a completed mission and credits its reward exactly once.
    pub fn claim_mission(&self, id: MissionId) -> Result<Reward, EconError> {
        let reward = self.record.claim(id)?;
        self.ledger.earn(reward.currency, reward.amount);
        self.record.record(&GameEvent::CurrencyEarned {
            currency: reward.currency,
            amount: reward.amount,
        });
        self.refresh_career();
        Ok(reward)
    }

    /// Promotes the career to match lifetime earnings. Never demotes.
    pub fn refresh_career(&self) -> Career {
        let earned = self.record.statistic(StatisticKey::TotalEarnedMoney);
        let target = self.config.career_for(earned);
        let mut career = lock(&self.career);
        if target > *career {
            let from = *career;
            info!(player = %self.id, ?from, to = ?target, "career promotion");
            *career = target;
        }
        *career
    }

    /// Serializable state. Fever and buff are session-scoped and left out.
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            version: SNAPSHOT_VERSION,
            id: self.id.clone(),
            nickname: self.nickname.clone(),
            career: self.career(),
            balances: self.ledger.balances(),
            inventory: self.inventory(),
            statistics: self.record.statistics(),
            skills: self
                .skills
                .skills()
                .into_iter()
                .map(|s| SkillLevel {
                    key: s.key,
                    level: s.level,
                })
                .collect(),
            claimed_missions: self.record.claimed(),
            saved_at: None,
        }
    }

    pub fn save(&self, repo: &dyn PlayerRepository) -> Result<(), EconError> {
        repo.save(&self.snapshot().stamped())?;
        info!(player = %self.id, "saved");
        Ok(())
    }

    /// Loads the saved player, `None` when the repository is empty.
    pub fn load(
        repo: &dyn PlayerRepository,
        config: Arc<EconConfig>,
    ) -> Result<Option<Self>, EconError> {
        let Some(snapshot) = repo.load()? else {
            return Ok(None);
        };
        info!(player = %snapshot.id, "loaded");
        Ok(Some(Self::from_snapshot(config, snapshot)))
    }
}
