use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Engine configuration. Every protocol knob lives here with a working
/// default; nothing is hard-coded inside the models.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// On-chain program id the engine talks to.
    pub program_id: String,
    /// Base URL of the explorer REST API used for mapping reads.
    pub explorer_api_url: String,
    /// Flat fee attached to every protocol call, in microcredits.
    pub transaction_fee: u64,
    /// Maximum allowed leverage, 10^6 scale (20_000_000 == 20x).
    pub max_leverage: u64,
    /// Margin ratio below which a position is liquidatable, in basis points.
    pub liquidation_threshold_bps: i64,
    /// Divisor of the linear borrow-fee accrual (size * blocks / divisor).
    pub borrow_fee_divisor: u64,
    /// Percentage of the computed payout a close call pre-commits to.
    pub safety_buffer_pct: u64,
    /// Default price slippage tolerance for close calls, in basis points.
    pub default_slippage_bps: u64,
    /// Positions below this size are treated as dust and hidden.
    pub min_position_size: u64,
    /// Smallest accepted liquidity deposit.
    pub min_liquidity: u64,
    /// Delay before the first status poll, in milliseconds.
    pub poll_initial_delay_ms: u64,
    /// Interval between status polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Hard ceiling on status polls per submission.
    pub max_polls: u32,
    /// Consecutive poll failures after which polling gives up.
    pub max_poll_failures: u32,
    /// Bounded concurrency of batch record decryption.
    pub decrypt_concurrency: usize,
    /// Magnitude at or above which an untagged integer token is classified
    /// as a price by the heuristic record decoder.
    pub heuristic_price_floor: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            program_id: "zkperp_v4.aleo".to_string(),
            explorer_api_url: "https://api.explorer.provable.com/v1/testnet".to_string(),
            transaction_fee: 5_000_000,
            max_leverage: 20_000_000,
            liquidation_threshold_bps: 100,
            borrow_fee_divisor: 100_000_000,
            safety_buffer_pct: 90,
            default_slippage_bps: 100,
            min_position_size: 10_000,
            min_liquidity: 1_000_000,
            poll_initial_delay_ms: 1_000,
            poll_interval_ms: 2_000,
            max_polls: 120,
            max_poll_failures: 5,
            decrypt_concurrency: 4,
            heuristic_price_floor: 10_000_000_000,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = EngineConfig::default();

        let program_id = env_map
            .get("ZKPERP_PROGRAM_ID")
            .cloned()
            .unwrap_or(defaults.program_id);
        let explorer_api_url = env_map
            .get("EXPLORER_API_URL")
            .cloned()
            .unwrap_or(defaults.explorer_api_url);

        let config = EngineConfig {
            program_id,
            explorer_api_url,
            transaction_fee: parse_var(&env_map, "TRANSACTION_FEE", defaults.transaction_fee)?,
            max_leverage: parse_var(&env_map, "MAX_LEVERAGE", defaults.max_leverage)?,
            liquidation_threshold_bps: parse_var(
                &env_map,
                "LIQUIDATION_THRESHOLD_BPS",
                defaults.liquidation_threshold_bps,
            )?,
            borrow_fee_divisor: parse_var(
                &env_map,
                "BORROW_FEE_DIVISOR",
                defaults.borrow_fee_divisor,
            )?,
            safety_buffer_pct: parse_var(&env_map, "SAFETY_BUFFER_PCT", defaults.safety_buffer_pct)?,
            default_slippage_bps: parse_var(
                &env_map,
                "DEFAULT_SLIPPAGE_BPS",
                defaults.default_slippage_bps,
            )?,
            min_position_size: parse_var(&env_map, "MIN_POSITION_SIZE", defaults.min_position_size)?,
            min_liquidity: parse_var(&env_map, "MIN_LIQUIDITY", defaults.min_liquidity)?,
            poll_initial_delay_ms: parse_var(
                &env_map,
                "POLL_INITIAL_DELAY_MS",
                defaults.poll_initial_delay_ms,
            )?,
            poll_interval_ms: parse_var(&env_map, "POLL_INTERVAL_MS", defaults.poll_interval_ms)?,
            max_polls: parse_var(&env_map, "MAX_POLLS", defaults.max_polls)?,
            max_poll_failures: parse_var(&env_map, "MAX_POLL_FAILURES", defaults.max_poll_failures)?,
            decrypt_concurrency: parse_var(
                &env_map,
                "DECRYPT_CONCURRENCY",
                defaults.decrypt_concurrency,
            )?,
            heuristic_price_floor: parse_var(
                &env_map,
                "HEURISTIC_PRICE_FLOOR",
                defaults.heuristic_price_floor,
            )?,
        };

        if config.safety_buffer_pct == 0 || config.safety_buffer_pct > 100 {
            return Err(ConfigError::InvalidValue(
                "SAFETY_BUFFER_PCT".to_string(),
                "must be between 1 and 100".to_string(),
            ));
        }
        if config.borrow_fee_divisor == 0 {
            return Err(ConfigError::InvalidValue(
                "BORROW_FEE_DIVISOR".to_string(),
                "must be positive".to_string(),
            ));
        }
        if config.decrypt_concurrency == 0 {
            return Err(ConfigError::InvalidValue(
                "DECRYPT_CONCURRENCY".to_string(),
                "must be positive".to_string(),
            ));
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match env_map.get(key) {
        Some(raw) => raw.parse::<T>().map_err(|_| {
            ConfigError::InvalidValue(
                key.to_string(),
                format!("could not parse {:?} as a number", raw),
            )
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_map() {
        let config = EngineConfig::from_env_map(HashMap::new()).unwrap();
        assert_eq!(config.program_id, "zkperp_v4.aleo");
        assert_eq!(config.max_polls, 120);
        assert_eq!(config.max_poll_failures, 5);
        assert_eq!(config.poll_interval_ms, 2_000);
        assert_eq!(config.safety_buffer_pct, 90);
        assert_eq!(config.liquidation_threshold_bps, 100);
    }

    #[test]
    fn test_overrides() {
        let mut env_map = HashMap::new();
        env_map.insert("ZKPERP_PROGRAM_ID".to_string(), "zkperp_v5.aleo".to_string());
        env_map.insert("MAX_POLLS".to_string(), "10".to_string());
        let config = EngineConfig::from_env_map(env_map).unwrap();
        assert_eq!(config.program_id, "zkperp_v5.aleo");
        assert_eq!(config.max_polls, 10);
    }

    #[test]
    fn test_invalid_number() {
        let mut env_map = HashMap::new();
        env_map.insert("MAX_POLLS".to_string(), "not_a_number".to_string());
        let result = EngineConfig::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "MAX_POLLS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_safety_buffer() {
        let mut env_map = HashMap::new();
        env_map.insert("SAFETY_BUFFER_PCT".to_string(), "150".to_string());
        let result = EngineConfig::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "SAFETY_BUFFER_PCT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_zero_divisor() {
        let mut env_map = HashMap::new();
        env_map.insert("BORROW_FEE_DIVISOR".to_string(), "0".to_string());
        assert!(EngineConfig::from_env_map(env_map).is_err());
    }
}
