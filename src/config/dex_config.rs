use crate::constants::{DEFAULT_FACTORY_ADDRESS, DEFAULT_ROUTER_ADDRESS};
use crate::logic::pair_key::default_pair_code_hash;
use crate::utils::config_loader::{
    DexConfigLoader, DexConfigLoaderSync, LoadConfigError, load_dotenv, load_from_file, load_from_file_sync,
};
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Clone, Deserialize, Debug)]
pub struct DexConfigRoot {
    pub dex: DexConfigSection,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DexConfigSection {
    pub factory_address: Address,
    pub router_address: Address,
    /// Falls back to the hash of the built-in pair code tag.
    #[serde(default)]
    pub pair_code_hash: Option<B256>,
}

impl Default for DexConfigSection {
    fn default() -> Self {
        Self { factory_address: DEFAULT_FACTORY_ADDRESS, router_address: DEFAULT_ROUTER_ADDRESS, pair_code_hash: None }
    }
}

impl DexConfigSection {
    pub fn with_pair_code_hash(&self, pair_code_hash: B256) -> Self {
        Self { pair_code_hash: Some(pair_code_hash), ..self.clone() }
    }

    pub fn pair_code_hash(&self) -> B256 {
        self.pair_code_hash.unwrap_or_else(default_pair_code_hash)
    }

    pub fn validate(&self) -> Result<(), LoadConfigError> {
        if self.factory_address.is_zero() || self.router_address.is_zero() {
            return Err(LoadConfigError::Invalid("factory and router addresses must be non-zero".to_string()));
        }
        if self.factory_address == self.router_address {
            return Err(LoadConfigError::Invalid("factory and router must have distinct addresses".to_string()));
        }
        Ok(())
    }

    /// Defaults overridden by `DEX_FACTORY_ADDRESS`, `DEX_ROUTER_ADDRESS` and `DEX_PAIR_CODE_HASH`.
    pub fn from_env() -> eyre::Result<Self> {
        load_dotenv();
        let mut config = Self::default();

        if let Ok(factory_address) = std::env::var("DEX_FACTORY_ADDRESS") {
            config.factory_address =
                factory_address.parse().map_err(|e| eyre::eyre!("Invalid DEX_FACTORY_ADDRESS: {}", e))?;
        }

        if let Ok(router_address) = std::env::var("DEX_ROUTER_ADDRESS") {
            config.router_address = router_address.parse().map_err(|e| eyre::eyre!("Invalid DEX_ROUTER_ADDRESS: {}", e))?;
        }

        if let Ok(pair_code_hash) = std::env::var("DEX_PAIR_CODE_HASH") {
            config.pair_code_hash =
                Some(pair_code_hash.parse().map_err(|e| eyre::eyre!("Invalid DEX_PAIR_CODE_HASH: {}", e))?);
        }

        config.validate()?;
        Ok(config)
    }
}

#[async_trait]
impl DexConfigLoader for DexConfigSection {
    type SectionType = DexConfigSection;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: DexConfigRoot = load_from_file(file_name).await?;
        root.dex.validate()?;
        Ok(root.dex)
    }
}

impl DexConfigLoaderSync for DexConfigSection {
    type SectionType = DexConfigSection;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let root: DexConfigRoot = load_from_file_sync(file_name)?;
        root.dex.validate()?;
        Ok(root.dex)
    }
}
