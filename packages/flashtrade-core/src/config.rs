//! Session presets and simulator settings.
//!
//! Configuration is read from a TOML file. Every field has a default, so a
//! missing file or a partial file both yield a usable configuration.

use crate::market::ALL_ASSETS;
use crate::types::SessionType;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Balance restored by a reset, whatever the previous session type was.
pub const DEFAULT_BALANCE: f64 = 10000.0;

/// Risk appetite advertised for a preset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Parameters of one session type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Session length in minutes
    pub duration_minutes: u32,
    /// Virtual balance at session start
    pub starting_balance: f64,
    /// Symbols that may be traded
    pub allowed_assets: Vec<String>,
    /// Maximum fraction of the balance a single trade may use
    pub max_position_size: f64,
    /// Advertised risk level
    pub risk_level: RiskLevel,
}

impl SessionConfig {
    /// Session length as a chrono duration.
    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Whether `symbol` may be traded under this preset.
    pub fn allows(&self, symbol: &str) -> bool {
        self.allowed_assets
            .iter()
            .any(|a| a.eq_ignore_ascii_case(symbol))
    }

    /// Check that the preset can back a session.
    pub fn validate(&self, name: &str) -> Result<()> {
        if !(self.starting_balance.is_finite() && self.starting_balance > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "sessions.{}.starting_balance must be positive, got {}",
                name, self.starting_balance
            )));
        }
        if !(self.max_position_size > 0.0 && self.max_position_size <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "sessions.{}.max_position_size must be in (0, 1], got {}",
                name, self.max_position_size
            )));
        }
        Ok(())
    }

    fn practice() -> Self {
        Self {
            duration_minutes: 15,
            starting_balance: 10000.0,
            allowed_assets: ALL_ASSETS.iter().map(|a| a.to_string()).collect(),
            max_position_size: 0.1,
            risk_level: RiskLevel::Medium,
        }
    }

    fn tutorial() -> Self {
        Self {
            duration_minutes: 10,
            starting_balance: 5000.0,
            allowed_assets: vec!["BTC".to_string(), "ETH".to_string()],
            max_position_size: 0.05,
            risk_level: RiskLevel::Low,
        }
    }

    fn challenge() -> Self {
        Self {
            duration_minutes: 30,
            starting_balance: 25000.0,
            allowed_assets: ALL_ASSETS.iter().map(|a| a.to_string()).collect(),
            max_position_size: 0.2,
            risk_level: RiskLevel::High,
        }
    }
}

/// One preset per session type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionPresets {
    pub practice: SessionConfig,
    pub tutorial: SessionConfig,
    pub challenge: SessionConfig,
}

impl Default for SessionPresets {
    fn default() -> Self {
        Self {
            practice: SessionConfig::practice(),
            tutorial: SessionConfig::tutorial(),
            challenge: SessionConfig::challenge(),
        }
    }
}

impl SessionPresets {
    /// Preset for a session type.
    pub fn get(&self, session_type: SessionType) -> &SessionConfig {
        match session_type {
            SessionType::Practice => &self.practice,
            SessionType::Tutorial => &self.tutorial,
            SessionType::Challenge => &self.challenge,
        }
    }
}

/// Market simulator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Maximum relative price move per tick
    pub volatility: f64,
    /// Tick cadence in milliseconds
    pub tick_interval_ms: u64,
    /// Seed for reproducible price paths
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Ticks of price history kept per symbol
    pub history_len: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            volatility: 0.01,
            tick_interval_ms: 2000,
            seed: None,
            history_len: 300,
        }
    }
}

impl SimulatorConfig {
    /// Check that ticks keep every price positive.
    ///
    /// A move of ±volatility must stay above -100%, so volatility is in [0, 1).
    pub fn validate(&self) -> Result<()> {
        if !(self.volatility >= 0.0 && self.volatility < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "simulator.volatility must be in [0, 1), got {}",
                self.volatility
            )));
        }
        Ok(())
    }

    /// Tick cadence as a duration.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlashConfig {
    /// User recorded on new sessions
    pub user_id: String,
    pub simulator: SimulatorConfig,
    pub sessions: SessionPresets,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            user_id: "demo_user".to_string(),
            simulator: SimulatorConfig::default(),
            sessions: SessionPresets::default(),
        }
    }
}

impl FlashConfig {
    /// Get the default config file path.
    ///
    /// Default path: `~/.flashtrade/config.toml`
    /// Can be overridden with `FLASHTRADE_CONFIG_FILE` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("FLASHTRADE_CONFIG_FILE") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".flashtrade/config.toml"))
            .unwrap_or_else(|| PathBuf::from("flashtrade.toml"))
    }

    /// Reject values that would break the simulator or the validator.
    pub fn validate(&self) -> Result<()> {
        self.simulator.validate()?;
        self.sessions.practice.validate("practice")?;
        self.sessions.tutorial.validate("tutorial")?;
        self.sessions.challenge.validate("challenge")
    }

    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_presets() {
        let presets = SessionPresets::default();

        assert_eq!(presets.get(SessionType::Practice).starting_balance, 10000.0);
        assert_eq!(presets.get(SessionType::Tutorial).starting_balance, 5000.0);
        assert_eq!(presets.get(SessionType::Challenge).starting_balance, 25000.0);
        assert_eq!(presets.get(SessionType::Practice).max_position_size, 0.1);
        assert_eq!(presets.get(SessionType::Tutorial).risk_level, RiskLevel::Low);
        assert_eq!(presets.get(SessionType::Challenge).duration_minutes, 30);
    }

    #[test]
    fn test_allowed_assets() {
        let presets = SessionPresets::default();

        assert!(presets.tutorial.allows("btc"));
        assert!(!presets.tutorial.allows("SOL"));
        assert!(presets.practice.allows("LINK"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FlashConfig::load_from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, FlashConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "user_id = \"alice\"\n\n[simulator]\nvolatility = 0.05\nseed = 7\n\n[sessions.practice]\nduration_minutes = 5\nstarting_balance = 2000.0\nallowed_assets = [\"BTC\"]\nmax_position_size = 0.5\nrisk_level = \"high\""
        )
        .unwrap();

        let config = FlashConfig::load_from_path(file.path()).unwrap();

        assert_eq!(config.user_id, "alice");
        assert_eq!(config.simulator.volatility, 0.05);
        assert_eq!(config.simulator.seed, Some(7));
        assert_eq!(config.simulator.tick_interval_ms, 2000);
        assert_eq!(config.sessions.practice.starting_balance, 2000.0);
        assert_eq!(config.sessions.tutorial, SessionConfig::tutorial());
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[simulator]\nvolatility = \"fast\"").unwrap();

        let result = FlashConfig::load_from_path(file.path());
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    fn load_str(content: &str) -> Result<FlashConfig> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        FlashConfig::load_from_path(file.path())
    }

    #[test]
    fn test_volatility_out_of_range() {
        for volatility in ["3.0", "1.0", "-0.01", "nan", "inf"] {
            let result = load_str(&format!("[simulator]\nvolatility = {}", volatility));
            assert!(
                matches!(result, Err(Error::InvalidConfig(_))),
                "volatility {} accepted",
                volatility
            );
        }

        let config = load_str("[simulator]\nvolatility = 0.0").unwrap();
        assert_eq!(config.simulator.volatility, 0.0);
    }

    #[test]
    fn test_bad_preset_values() {
        let preset = |balance: &str, max: &str| {
            format!(
                "[sessions.challenge]\nduration_minutes = 30\nstarting_balance = {}\nallowed_assets = [\"BTC\"]\nmax_position_size = {}\nrisk_level = \"high\"",
                balance, max
            )
        };

        let cases = [
            ("-100.0", "0.2"),
            ("0.0", "0.2"),
            ("nan", "0.2"),
            ("25000.0", "-0.1"),
            ("25000.0", "0.0"),
            ("25000.0", "1.5"),
            ("25000.0", "nan"),
        ];
        for (balance, max) in cases {
            let result = load_str(&preset(balance, max));
            match result {
                Err(Error::InvalidConfig(msg)) => assert!(msg.starts_with("sessions.challenge.")),
                other => panic!("{} / {} accepted: {:?}", balance, max, other),
            }
        }

        let config = load_str(&preset("25000.0", "1.0")).unwrap();
        assert_eq!(config.sessions.challenge.max_position_size, 1.0);
    }

    #[test]
    fn test_validated_volatility_keeps_prices_positive() {
        let config = load_str("[simulator]\nvolatility = 0.99\nseed = 1").unwrap();
        let mut sim = crate::MarketSimulator::from_config(&config.simulator);
        for _ in 0..50 {
            sim.tick(chrono::Utc::now());
        }
        assert!(sim.quotes().values().all(|q| q.price > 0.0));
    }
}
