//! Configuration for the rewards engine.
//!
//! Game rules, quota tiers, and jackpot economics live here with sensible
//! defaults, can be loaded from a TOML file, and can be overridden through
//! `SCRAPYARD_*` environment variables. The final configuration is
//! validated before the engine starts.

use crate::errors::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Complete engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub saw: SawRules,
    #[serde(default)]
    pub mines: MinesRules,
    #[serde(default)]
    pub daily: DailyRules,
    #[serde(default)]
    pub quota: QuotaRules,
    #[serde(default)]
    pub jackpot: JackpotRules,
    #[serde(default)]
    pub wallet: WalletRules,
}

/// Saw spin economics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SawRules {
    /// Cost of a paid spin.
    pub cost: u64,
}

impl Default for SawRules {
    fn default() -> Self {
        Self { cost: 20 }
    }
}

/// Job Site economics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinesRules {
    /// Cost of a paid board, charged once at creation.
    pub cost: u64,
}

impl Default for MinesRules {
    fn default() -> Self {
        Self { cost: 25 }
    }
}

/// Daily spin prize wheel. Each slot is equally likely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRules {
    pub prizes: Vec<u64>,
}

impl Default for DailyRules {
    fn default() -> Self {
        Self {
            prizes: vec![0, 10, 10, 10, 50, 50, 100],
        }
    }
}

/// Daily free plays by account tier; tiers past the end of the table get
/// the last entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaRules {
    pub tier_limits: Vec<u32>,
}

impl Default for QuotaRules {
    fn default() -> Self {
        Self {
            tier_limits: vec![1, 3, 5],
        }
    }
}

/// Jackpot pool economics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JackpotRules {
    /// Value the pool resets to after a payout.
    pub base_value: u64,
    /// Contribution added to the pool per non-jackpot Saw spin.
    pub spin_tax: u64,
}

impl Default for JackpotRules {
    fn default() -> Self {
        Self {
            base_value: 10_000,
            spin_tax: 1,
        }
    }
}

/// Wallet lifecycle amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletRules {
    /// Balance granted at registration.
    pub opening_balance: u64,
    /// Coins credited per confirmed crate purchase.
    pub crate_amount: u64,
}

impl Default for WalletRules {
    fn default() -> Self {
        Self {
            opening_balance: 0,
            crate_amount: 5_000,
        }
    }
}

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> LedgerResult<EngineConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            EngineConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        self.validate(&config)?;
        Ok(config)
    }

    /// Load configuration from TOML file
    fn load_from_file(&self, path: &str) -> LedgerResult<EngineConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::InvalidState(format!("failed to read config {path}: {e}"))
        })?;

        toml::from_str(&content)
            .map_err(|e| LedgerError::InvalidState(format!("failed to parse config TOML: {e}")))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, config: &mut EngineConfig) -> LedgerResult<()> {
        if let Ok(cost) = env::var("SCRAPYARD_SAW_COST") {
            config.saw.cost = parse_override("SCRAPYARD_SAW_COST", &cost)?;
        }
        if let Ok(cost) = env::var("SCRAPYARD_MINES_COST") {
            config.mines.cost = parse_override("SCRAPYARD_MINES_COST", &cost)?;
        }
        if let Ok(base) = env::var("SCRAPYARD_JACKPOT_BASE") {
            config.jackpot.base_value = parse_override("SCRAPYARD_JACKPOT_BASE", &base)?;
        }
        if let Ok(tax) = env::var("SCRAPYARD_JACKPOT_SPIN_TAX") {
            config.jackpot.spin_tax = parse_override("SCRAPYARD_JACKPOT_SPIN_TAX", &tax)?;
        }
        if let Ok(amount) = env::var("SCRAPYARD_CRATE_AMOUNT") {
            config.wallet.crate_amount = parse_override("SCRAPYARD_CRATE_AMOUNT", &amount)?;
        }
        if let Ok(balance) = env::var("SCRAPYARD_OPENING_BALANCE") {
            config.wallet.opening_balance = parse_override("SCRAPYARD_OPENING_BALANCE", &balance)?;
        }
        Ok(())
    }

    /// Validate configuration values
    fn validate(&self, config: &EngineConfig) -> LedgerResult<()> {
        if config.quota.tier_limits.is_empty() {
            return Err(LedgerError::InvalidState(
                "quota.tier_limits must name at least one tier".to_string(),
            ));
        }
        if config.daily.prizes.is_empty() {
            return Err(LedgerError::InvalidState(
                "daily.prizes must name at least one slot".to_string(),
            ));
        }
        if config.jackpot.base_value == 0 {
            return Err(LedgerError::InvalidState(
                "jackpot.base_value cannot be zero".to_string(),
            ));
        }
        if config.saw.cost == 0 || config.mines.cost == 0 {
            return Err(LedgerError::InvalidState(
                "paid plays must cost at least one coin".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &EngineConfig, path: &str) -> LedgerResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| LedgerError::InvalidState(format!("failed to serialize config: {e}")))?;

        std::fs::write(path, toml_string)
            .map_err(|e| LedgerError::InvalidState(format!("failed to write {path}: {e}")))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_override(field: &str, value: &str) -> LedgerResult<u64> {
    value
        .parse()
        .map_err(|_| LedgerError::InvalidState(format!("invalid value for {field}: '{value}'")))
}
