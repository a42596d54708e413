use crate::types::{Coins, SessionTime};
use serde::{Deserialize, Serialize};

/// What happens to the login-day index after the last reward of the cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StreakPolicy {
    /// Day 7 is followed by day 1 again.
    #[default]
    Wrap,
    /// Stay on the last day; every further claim pays the top reward.
    Clamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EconomyConfig {
    /// Balance of a freshly created economy document.
    pub starting_coins: Coins,
    /// Cost of a new set of attempts once the current set is used up.
    pub entry_fee: Coins,
    pub max_attempts: u32,
    pub refill_amount: Coins,
    pub refill_interval_secs: i64,
    /// Reward per login day, indexed by `loginDayIndex`.
    pub daily_rewards: Vec<Coins>,
    pub streak_policy: StreakPolicy,
    pub win_reward: Coins,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_coins: 500,
            entry_fee: 100,
            max_attempts: 3,
            refill_amount: 100,
            refill_interval_secs: 3600,
            daily_rewards: vec![100, 200, 300, 300, 300, 300, 300],
            streak_policy: StreakPolicy::Wrap,
            win_reward: 200,
        }
    }
}

impl EconomyConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.daily_rewards.is_empty() {
            anyhow::bail!("daily_rewards must not be empty");
        }
        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be at least 1");
        }
        if self.refill_interval_secs <= 0 {
            anyhow::bail!("refill_interval_secs must be positive");
        }
        Ok(())
    }
}

/// One kind of target the spawner can launch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetKind {
    pub name: String,
    /// Points added by a successful hit. Negative for hazards.
    pub points: i64,
    /// Hazards (bombs) never end the session when they leave the field.
    #[serde(default)]
    pub hazard: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Score needed to leave each level; the last entry is the win score.
    pub level_thresholds: Vec<i64>,
    pub base_spawn_interval: SessionTime,
    /// Spawn interval reduction on every level-up.
    pub spawn_interval_step: SessionTime,
    pub spawn_interval_floor: SessionTime,
    /// First number shown by the start countdown.
    pub countdown_from: u32,
    pub countdown_step: SessionTime,
    pub level_banner_duration: SessionTime,
    pub lobby_return_delay: SessionTime,
    pub targets: Vec<TargetKind>,
}

impl SessionConfig {
    /// Highest reachable level (one per threshold).
    pub fn max_level(&self) -> u32 {
        self.level_thresholds.len() as u32
    }

    pub fn win_score(&self) -> i64 {
        self.level_thresholds.last().copied().unwrap_or(0)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.level_thresholds.len() < 3 {
            anyhow::bail!("level_thresholds needs at least 3 entries");
        }
        if self.level_thresholds.windows(2).any(|w| w[0] >= w[1]) {
            anyhow::bail!("level_thresholds must be strictly ascending");
        }
        for (name, value) in [
            ("base_spawn_interval", self.base_spawn_interval),
            ("spawn_interval_floor", self.spawn_interval_floor),
            ("countdown_step", self.countdown_step),
            ("level_banner_duration", self.level_banner_duration),
            ("lobby_return_delay", self.lobby_return_delay),
        ] {
            if !(value.is_finite() && value > 0.0) {
                anyhow::bail!("{name} must be a positive number, got {value}");
            }
        }
        if self.spawn_interval_step < 0.0 {
            anyhow::bail!("spawn_interval_step must not be negative");
        }
        if self.targets.is_empty() {
            anyhow::bail!("targets must list at least one target kind");
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            level_thresholds: vec![50, 150, 200],
            base_spawn_interval: 3.0,
            spawn_interval_step: 0.2,
            spawn_interval_floor: 0.5,
            countdown_from: 3,
            countdown_step: 1.0,
            level_banner_duration: 1.5,
            lobby_return_delay: 2.0,
            targets: vec![
                TargetKind { name: "good".into(), points: 5, hazard: false },
                TargetKind { name: "better".into(), points: 10, hazard: false },
                TargetKind { name: "best".into(), points: 15, hazard: false },
                TargetKind { name: "bomb".into(), points: -10, hazard: true },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ArcadeConfig {
    pub economy: EconomyConfig,
    pub session: SessionConfig,
}

impl ArcadeConfig {
    /// Load from a JSON file. Missing fields fall back to the defaults.
    /// In tests, use ArcadeConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: ArcadeConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        log::info!("Loaded arcade config from {path}");
        Ok(config)
    }

    /// Config with hardcoded defaults for use in tests.
    pub fn default_test() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.economy.validate()?;
        self.session.validate()
    }
}
