#![deny(warnings)]

//! Headless CLI: runs a scripted play session against the idle economy,
//! saves and reloads the player, and prints KPIs.

use anyhow::{bail, Context, Result};
use idle_core::*;
use idle_runtime::Player;
use persistence::JsonFileRepository;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    actions: Option<u32>,
    idle_secs: Option<u64>,
    save: Option<PathBuf>,
    db: Option<String>,
    version: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next().map(PathBuf::from),
            "--actions" => args.actions = it.next().and_then(|s| s.parse().ok()),
            "--idle" => args.idle_secs = it.next().and_then(|s| s.parse().ok()),
            "--save" => args.save = it.next().map(PathBuf::from),
            "--db" => args.db = it.next(),
            "--version" => args.version = true,
            _ => {}
        }
    }
    args
}

fn load_config(path: Option<&PathBuf>) -> Result<EconConfig> {
    let cfg = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("reading config {}", p.display()))?;
            serde_yaml::from_str(&text).with_context(|| format!("parsing {}", p.display()))?
        }
        None => EconConfig::default(),
    };
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Cycles through the games, spending gold as it comes in.
fn play(player: &Player, actions: u32) {
    let games = GameKind::all();
    for i in 0..actions {
        let game = games[i as usize % games.len()];
        let outcome = player.perform_action(game);
        for id in outcome.newly_claimable {
            info!(%id, "mission completed");
        }
        if i % 25 == 24 {
            let key = SkillKey::new(game, SkillTier::Beginner);
            if let Err(e) = player.upgrade_skill(key) {
                debug!(%key, error = %e, "upgrade skipped");
            }
        }
        if !player.inventory().owns(EquipmentKind::Keyboard) {
            if let Err(e) = player.buy_equipment(EquipmentKind::Keyboard) {
                debug!(error = %e, "keyboard not bought");
            }
        }
        if !player.buff().is_active() && player.buy_consumable(ConsumableKind::Coffee).is_ok() {
            if let Err(e) = player.use_consumable(ConsumableKind::Coffee) {
                debug!(error = %e, "coffee not used");
            }
        }
    }
}

fn claim_all(player: &Player) -> usize {
    player
        .record()
        .missions()
        .into_iter()
        .filter(|m| m.state == MissionState::Claimable)
        .filter(|m| player.claim_mission(m.id).is_ok())
        .count()
}

fn verify_round_trip(player: &Player, loaded: Option<Player>, target: &str) -> Result<()> {
    let Some(loaded) = loaded else {
        bail!("nothing loaded back from {target}");
    };
    if loaded.snapshot() != player.snapshot() {
        bail!("round trip through {target} changed the player");
    }
    info!(via = target, "round trip OK");
    Ok(())
}

fn version_line() -> String {
    format!(
        "{} {} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("IDLE_CLI_REVISION")
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args();
    if args.version {
        println!("{}", version_line());
        return Ok(());
    }

    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();
    info!(?args, "starting CLI");

    let config = Arc::new(load_config(args.config.as_ref())?);
    let player = Arc::new(Player::new("local", "player", Arc::clone(&config)));

    player.start_game();
    play(&player, args.actions.unwrap_or(200));
    if let Some(secs) = args.idle_secs {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }
    player.stop_game();
    let claimed = claim_all(&player);

    if let Some(path) = &args.save {
        let repo = JsonFileRepository::new(path);
        player.save(&repo)?;
        let loaded = Player::load(&repo, Arc::clone(&config))?;
        verify_round_trip(&player, loaded, &path.display().to_string())?;
    }

    if let Some(url) = &args.db {
        let pool = persistence::init_db(url).await?;
        let slot = persistence::create_save(&pool, "default", None).await?;
        persistence::write_snapshot(&pool, "default", &player.snapshot().stamped()).await?;
        let loaded = persistence::read_snapshot(&pool, "default")
            .await?
            .map(|s| Player::from_snapshot(Arc::clone(&config), s));
        verify_round_trip(&player, loaded, url)?;
        info!(slot, "saved to database");
    }

    let stats = player.record().statistics();
    println!(
        "Player OK | career: {:?} | skills: {} | equipment: {}",
        player.career(),
        player.skills().skills().len(),
        player.inventory().equipment.len()
    );
    println!(
        "KPI | gold: {} | diamonds: {} | earned: {} | spent: {} | upgrades: {} | missions claimed: {} (this run {}) | claimable: {}",
        player.balance(CurrencyKind::Gold),
        player.balance(CurrencyKind::Diamond),
        stats.get(StatisticKey::TotalEarnedMoney),
        stats.get(StatisticKey::TotalSpentMoney),
        stats.get(StatisticKey::SkillUpgrades),
        stats.get(StatisticKey::MissionsClaimed),
        claimed,
        player.record().claimable_count()
    );

    Ok(())
}
