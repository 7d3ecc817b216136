use crate::{
    clock::ClockSettings,
    error::{HourglassError, HourglassResult},
    progression::{HourEntry, HourTable},
    rate::AccrualRate,
    types::{Grains, ABSOLUTE_MAX_SAND, DEFAULT_INITIAL_SAND, DEFAULT_MAX_SAND},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CombatantConfig {
    pub max_sand:     Grains,
    pub initial_sand: Grains,
    pub accrual_rate: AccrualRate,
}

impl Default for CombatantConfig {
    fn default() -> Self {
        Self {
            max_sand:     DEFAULT_MAX_SAND,
            initial_sand: DEFAULT_INITIAL_SAND,
            accrual_rate: AccrualRate::ONE_PER_SECOND,
        }
    }
}

impl CombatantConfig {
    fn validate(&self, who: &str) -> HourglassResult<()> {
        if self.max_sand == 0 || self.max_sand > ABSOLUTE_MAX_SAND {
            return Err(HourglassError::invalid(format!(
                "{who}.max_sand must be 1..={ABSOLUTE_MAX_SAND}, got {}",
                self.max_sand
            )));
        }
        if self.initial_sand > self.max_sand {
            return Err(HourglassError::invalid(format!(
                "{who}.initial_sand {} exceeds max_sand {}",
                self.initial_sand, self.max_sand
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct HourglassFile {
    player: CombatantConfig,
    enemy:  CombatantConfig,
    #[serde(default)]
    clock:  ClockSettings,
}

#[derive(Debug, Clone, Deserialize)]
struct HoursFile {
    hours: Vec<HourEntry>,
}

#[derive(Debug, Clone)]
pub struct HourglassConfig {
    pub player: CombatantConfig,
    pub enemy:  CombatantConfig,
    pub clock:  ClockSettings,
    pub hours:  HourTable,
}

impl HourglassConfig {
    /// Load from the data/ directory.
    /// In tests, use HourglassConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/hourglass.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: HourglassFile = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;

        let hours_path = format!("{data_dir}/hours.json");
        let hours_content = std::fs::read_to_string(&hours_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {hours_path}: {e}"))?;
        let hours_file: HoursFile = serde_json::from_str(&hours_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {hours_path}: {e}"))?;

        let config = Self {
            player: file.player,
            enemy:  file.enemy,
            clock:  file.clock,
            hours:  HourTable::from_entries(hours_file.hours)?,
        };
        config.validate()?;
        log::info!("config: loaded from {data_dir}");
        Ok(config)
    }

    /// Built-in defaults: 6-grain pools starting at 3, one grain per second,
    /// no frame clamp, the standard hour table.
    pub fn default_test() -> Self {
        Self {
            player: CombatantConfig::default(),
            enemy:  CombatantConfig::default(),
            clock:  ClockSettings::default(),
            hours:  HourTable::standard(),
        }
    }

    pub fn validate(&self) -> HourglassResult<()> {
        self.player.validate("player")?;
        self.enemy.validate("enemy")?;
        self.hours.check_base_rate(self.player.accrual_rate)?;
        if let Some(max) = self.clock.max_frame_delta {
            if !max.is_finite() || max <= 0.0 {
                return Err(HourglassError::invalid(format!(
                    "clock.max_frame_delta must be positive, got {max}"
                )));
            }
        }
        if !self.clock.time_scale.is_finite() || self.clock.time_scale <= 0.0 {
            return Err(HourglassError::invalid(format!(
                "clock.time_scale must be positive, got {}",
                self.clock.time_scale
            )));
        }
        Ok(())
    }
}

impl Default for HourglassConfig {
    fn default() -> Self { Self::default_test() }
}
