use anyhow::{bail, Context, Result};
use ethers::types::Address;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub enum Environment {
    Development,
    Testnet,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Public site (frame links, images)
    pub public_url: String,
    pub api_base_url: String,

    // Key-value store
    pub kv_url: String,
    pub kv_token: Option<String>,

    // Base (prompt contract network)
    pub base_rpc_url: String,
    pub base_chain_id: u64,
    pub contract_address: Option<Address>,

    // Frame notifications
    pub notification_url: Option<String>,
    pub notification_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment = Self::parse_environment()?;
        let public_url = std::env::var("PUBLIC_URL")
            .unwrap_or_else(|_| "https://debbiedoes.fun".to_string());

        let config = Self {
            environment: environment.clone(),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            api_base_url: std::env::var("API_BASE_URL").unwrap_or_else(|_| public_url.clone()),
            public_url,

            kv_url: std::env::var("KV_URL")
                .or_else(|_| std::env::var("REDIS_URL"))
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            kv_token: std::env::var("KV_TOKEN").ok().filter(|t| !t.is_empty()),

            base_rpc_url: std::env::var("BASE_RPC_URL")
                .unwrap_or_else(|_| "https://mainnet.base.org".to_string()),
            base_chain_id: std::env::var("BASE_CHAIN_ID")
                .unwrap_or_else(|_| "8453".to_string())
                .parse()
                .context("Invalid BASE_CHAIN_ID")?,
            contract_address: Self::parse_optional_address("CONTRACT_ADDRESS")?,

            notification_url: std::env::var("NOTIFICATION_URL").ok().filter(|u| !u.is_empty()),
            notification_token: std::env::var("NOTIFICATION_TOKEN").ok().filter(|t| !t.is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn require_contract_address(&self) -> Result<Address> {
        self.contract_address.context("CONTRACT_ADDRESS required")
    }

    fn parse_environment() -> Result<Environment> {
        let env = std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string());

        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testnet" | "test" => Ok(Environment::Testnet),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn parse_optional_address(var: &str) -> Result<Option<Address>> {
        match std::env::var(var) {
            Ok(addr_str) if !addr_str.is_empty() => Address::from_str(&addr_str)
                .map(Some)
                .with_context(|| format!("Invalid address for {}", var)),
            _ => Ok(None),
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.public_url.starts_with("http") {
            bail!("PUBLIC_URL must be HTTP(S) URL");
        }
        if !self.api_base_url.starts_with("http") {
            bail!("API_BASE_URL must be HTTP(S) URL");
        }
        if !self.base_rpc_url.starts_with("http") {
            bail!("BASE_RPC_URL must be HTTP(S) URL");
        }
        if !self.kv_url.starts_with("redis") {
            bail!("KV_URL must be a redis:// or rediss:// URL");
        }
        if let Some(url) = &self.notification_url {
            if !url.starts_with("http") {
                bail!("NOTIFICATION_URL must be HTTP(S) URL");
            }
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}
