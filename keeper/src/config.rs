//! Keeper configuration

use crate::amount::Amount;
use anyhow::{Context, Result};
use bookkeeper::{rad, ray, Address, Ledger, PoolId, Role};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "keeper-config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Account acting as liquidation engine and collateral recipient
    pub keeper: Address,

    /// Recipient of bad debt recognised by confiscation
    pub system_debt_engine: Address,

    /// Scenario replayed before the health scan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_path: Option<String>,

    /// Ledger snapshot restored on start and written on exit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_path: Option<String>,

    /// Maximum liquidations per pass
    pub max_liquidations_per_batch: usize,

    /// Initial ledger when no snapshot exists
    pub genesis: Genesis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genesis {
    pub owner: Address,
    pub total_debt_ceiling: Amount,
    #[serde(default)]
    pub pools: Vec<PoolConfig>,
    #[serde(default)]
    pub roles: Vec<RoleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub id: PoolId,
    pub debt_ceiling: Amount,
    #[serde(default)]
    pub debt_floor: Amount,
    pub price_with_safety_margin: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleConfig {
    pub role: Role,
    pub members: Vec<Address>,
}

impl Config {
    /// Load configuration from TOML file
    ///
    /// The path comes from `BOOKKEEPER_CONFIG`, else the first CLI argument,
    /// else `keeper-config.toml`.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("BOOKKEEPER_CONFIG")
            .ok()
            .or_else(|| std::env::args().nth(1))
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(path);
        let config_str = std::fs::read_to_string(expanded_path.as_ref())
            .context(format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config TOML")?;

        Ok(config)
    }

    /// Single-pool local setup where the keeper holds every operational role
    pub fn default_local() -> Self {
        let owner = Address::new([1; 32]);
        let keeper = Address::new([2; 32]);
        let roles = [
            Role::Adapter,
            Role::PositionManager,
            Role::PriceOracle,
            Role::LiquidationEngine,
            Role::StabilityFeeCollector,
            Role::Mintable,
        ]
        .into_iter()
        .map(|role| RoleConfig { role, members: vec![keeper] })
        .collect();

        Self {
            keeper,
            system_debt_engine: Address::new([3; 32]),
            scenario_path: None,
            state_path: None,
            max_liquidations_per_batch: 5,
            genesis: Genesis {
                owner,
                total_debt_ceiling: Amount(rad(10_000_000)),
                pools: vec![PoolConfig {
                    id: PoolId::from_label("ETH-A").unwrap_or_default(),
                    debt_ceiling: Amount(rad(1_000_000)),
                    debt_floor: Amount(rad(100)),
                    price_with_safety_margin: Amount(ray(1_500)),
                }],
                roles,
            },
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_local();
        let toml_str = toml::to_string_pretty(&config)
            .context("Failed to serialize config")?;

        std::fs::write(path, toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }
}

impl Genesis {
    /// Fresh ledger with the configured roles, pools and ceilings
    pub fn build(&self) -> Result<Ledger> {
        let owner = self.owner;
        let mut ledger = Ledger::new(owner);

        for entry in &self.roles {
            for member in &entry.members {
                ledger
                    .grant_role(owner, entry.role, *member)
                    .context(format!("Failed to grant {} to {}", entry.role, member))?;
            }
        }

        ledger.set_total_debt_ceiling(owner, self.total_debt_ceiling.0)?;
        for pool in &self.pools {
            ledger
                .init_pool(owner, pool.id)
                .context(format!("Failed to initialize pool {}", pool.id))?;
            ledger.set_debt_ceiling(owner, pool.id, pool.debt_ceiling.0)?;
            ledger.set_debt_floor(owner, pool.id, pool.debt_floor.0)?;

            // Prices are oracle-only; borrow the role for the initial quote
            let had_oracle = ledger.has_role(Role::PriceOracle, &owner);
            ledger.grant_role(owner, Role::PriceOracle, owner)?;
            ledger.set_price_with_safety_margin(owner, pool.id, pool.price_with_safety_margin.0)?;
            if !had_oracle {
                ledger.revoke_role(owner, Role::PriceOracle, owner)?;
            }
        }

        log::info!(
            "Genesis ledger: {} pools, {} role assignments",
            self.pools.len(),
            self.roles.iter().map(|r| r.members.len()).sum::<usize>()
        );
        Ok(ledger)
    }
}
