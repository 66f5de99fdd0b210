use serde::{Deserialize, Serialize};
use std::path::Path;

use presale_types::config::{BasePrices, LedgerConfig, ReferralPolicy, StakeLimits};
use presale_types::constants::*;
use presale_types::stake::StakePlan;

use crate::error::NodeError;
use crate::format::{parse_address, parse_tokens};

/// Name of the file written by `presale init`.
pub const CONFIG_FILE_NAME: &str = "presale.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub ledger: LedgerSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Storage backend: "memory" or "sqlite"
    pub db_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Genesis parameters. Only used when the store is empty; afterwards the
/// persisted configuration wins and changes go through admin commands.
///
/// Amounts are decimal token strings since TOML integers stop at 64 bits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSection {
    pub owner: String,
    pub launch_time: u64,
    /// Defaults to `launch_time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u64>,
    pub native_price: String,
    pub stable_price: String,
    pub hardcap: String,
    pub apy_bps: [u32; PLAN_COUNT],
    pub lock_weeks: [u64; PLAN_COUNT],
    pub tier_minimums: [String; PLAN_COUNT],
    pub max_stake: String,
    #[serde(default = "default_zero")]
    pub min_qualifying_stake: String,
    #[serde(default)]
    pub require_qualified_referrer: bool,
}

fn default_zero() -> String {
    "0".to_string()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: dirs::home_dir()
                    .map(|h| h.join(".presale").join("data").to_string_lossy().into_owned())
                    .unwrap_or_else(|| "./presale-data".to_string()),
                db_type: "sqlite".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            ledger: LedgerSection::default(),
        }
    }
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            owner: "0x1111111111111111111111111111111111111111".to_string(),
            // 2025-01-01T00:00:00Z
            launch_time: 1_735_689_600,
            start_time: None,
            native_price: "0.0001".to_string(),
            stable_price: "0.05".to_string(),
            hardcap: "100000000".to_string(),
            apy_bps: DEFAULT_APY_BPS,
            lock_weeks: DEFAULT_LOCK_WEEKS,
            tier_minimums: DEFAULT_TIER_MINIMUM_TOKENS.map(|t| t.to_string()),
            max_stake: DEFAULT_MAX_STAKE_TOKENS.to_string(),
            min_qualifying_stake: default_zero(),
            require_qualified_referrer: false,
        }
    }
}

impl LedgerSection {
    /// Build the genesis ledger configuration. Plan-table consistency is
    /// checked by the engine when the ledger is created.
    pub fn to_genesis(&self) -> Result<LedgerConfig, NodeError> {
        let field = |name: &str, value: &str| {
            parse_tokens(value).map_err(|e| NodeError::ConfigError {
                reason: format!("ledger.{}: {}", name, e),
            })
        };
        let owner = parse_address(&self.owner).map_err(|e| NodeError::ConfigError {
            reason: format!("ledger.owner: {}", e),
        })?;

        let mut minimums = [0; PLAN_COUNT];
        for (slot, value) in minimums.iter_mut().zip(&self.tier_minimums) {
            *slot = field("tier_minimums", value)?;
        }
        let plans = std::array::from_fn(|i| StakePlan {
            apy_bps: self.apy_bps[i],
            lock_duration: self.lock_weeks[i].saturating_mul(WEEK),
            min_stake_amount: minimums[i],
        });

        let mut config = LedgerConfig::new(
            owner,
            self.launch_time,
            BasePrices {
                native: field("native_price", &self.native_price)?,
                stable: field("stable_price", &self.stable_price)?,
            },
        );
        config.start_time = self.start_time.unwrap_or(self.launch_time);
        config.hardcap = field("hardcap", &self.hardcap)?;
        config.plans = plans;
        config.limits = StakeLimits {
            global_minimum: minimums[0],
            maximum: field("max_stake", &self.max_stake)?,
        };
        config.referral = ReferralPolicy {
            min_qualifying_stake: field("min_qualifying_stake", &self.min_qualifying_stake)?,
            require_qualified_referrer: self.require_qualified_referrer,
        };
        Ok(config)
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, NodeError> {
        let contents = std::fs::read_to_string(path).map_err(|e| NodeError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path, e),
        })?;
        let config: NodeConfig = toml::from_str(&contents).map_err(|e| NodeError::ConfigError {
            reason: format!("failed to parse config file '{}': {}", path, e),
        })?;
        Ok(config)
    }

    /// Write a default configuration file into `dir`.
    pub fn init(dir: &str) -> Result<std::path::PathBuf, NodeError> {
        let dir_path = Path::new(dir);
        if !dir_path.exists() {
            std::fs::create_dir_all(dir_path)?;
        }

        let config = NodeConfig::default();
        let toml_str = toml::to_string_pretty(&config).map_err(|e| NodeError::ConfigError {
            reason: format!("failed to serialize default config: {}", e),
        })?;

        let config_path = dir_path.join(CONFIG_FILE_NAME);
        std::fs::write(&config_path, toml_str)?;
        Ok(config_path)
    }

    /// Path of the SQLite database inside `data_dir`.
    pub fn database_path(&self) -> std::path::PathBuf {
        Path::new(&self.storage.data_dir).join("ledger.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert_eq!(config.storage.db_type, "sqlite");
        assert_eq!(config.logging.level, "info");
        assert!(config.ledger.start_time.is_none());
    }

    #[test]
    fn test_default_genesis_matches_constants() {
        let genesis = NodeConfig::default().ledger.to_genesis().unwrap();
        assert_eq!(genesis.plans[0].lock_duration, 26 * WEEK);
        assert_eq!(genesis.plans[1].min_stake_amount, 30_000 * ONE_TOKEN);
        assert_eq!(genesis.limits.global_minimum, 3_000 * ONE_TOKEN);
        assert_eq!(genesis.limits.maximum, 1_000_000 * ONE_TOKEN);
        assert_eq!(genesis.base_prices.stable, ONE_TOKEN / 20);
        assert_eq!(genesis.start_time, genesis.launch_time);
        assert_eq!(genesis.hardcap, 100_000_000 * ONE_TOKEN);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = NodeConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let deserialized: NodeConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.storage.data_dir, config.storage.data_dir);
        assert_eq!(deserialized.ledger.tier_minimums, config.ledger.tier_minimums);
        assert_eq!(deserialized.ledger.apy_bps, config.ledger.apy_bps);
    }

    #[test]
    fn test_init_creates_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_str().unwrap();
        let path = NodeConfig::init(dir).unwrap();
        assert_eq!(path, tmp.path().join(CONFIG_FILE_NAME));

        let config = NodeConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.ledger.launch_time, 1_735_689_600);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = NodeConfig::load("/nonexistent/path/presale.toml");
        assert!(matches!(result, Err(NodeError::ConfigError { .. })));
    }

    #[test]
    fn test_bad_owner_rejected() {
        let mut section = LedgerSection::default();
        section.owner = "0x12".to_string();
        let err = section.to_genesis().unwrap_err();
        assert!(err.to_string().contains("ledger.owner"));
    }

    #[test]
    fn test_optional_fields_default() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("minimal.toml");
        std::fs::write(
            &path,
            r#"
[storage]
data_dir = "/tmp/presale"
db_type = "memory"

[logging]
level = "debug"

[ledger]
owner = "0x2222222222222222222222222222222222222222"
launch_time = 1700000000
start_time = 1700000500
native_price = "0.01"
stable_price = "1"
hardcap = "5000000"
apy_bps = [8000, 10000, 12000]
lock_weeks = [26, 52, 104]
tier_minimums = ["3000", "30000", "300000"]
max_stake = "1000000"
"#,
        )
        .unwrap();
        let config = NodeConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.ledger.min_qualifying_stake, "0");
        let genesis = config.ledger.to_genesis().unwrap();
        assert_eq!(genesis.start_time, 1_700_000_500);
        assert_eq!(genesis.base_prices.native, ONE_TOKEN / 100);
        assert!(!genesis.referral.require_qualified_referrer);
    }
}
