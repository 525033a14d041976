use crate::engine::fill::RemainderRule;
use crate::engine::session::SessionConfig;
use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

//strategy type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    FairValue,
    MarketMaker,
}

impl StrategyType {
    //parse strategy type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fair" | "fair_value" => Some(StrategyType::FairValue),
            "mm" | "market_maker" => Some(StrategyType::MarketMaker),
            _ => None,
        }
    }
}

//fair value taker parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairValueParams {
    //products to trade, empty means every listed product
    #[serde(default)]
    pub products: Vec<String>,
    pub window: usize,
}

impl Default for FairValueParams {
    fn default() -> Self {
        FairValueParams {
            products: Vec::new(),
            window: 50,
        }
    }
}

//only quote while an observation stays below a threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationGate {
    pub observation: String,
    pub below: f64,
}

//spread market maker parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMakerParams {
    #[serde(default)]
    pub products: Vec<String>,
    pub min_spread: f64,
    pub clip: u32,
    #[serde(default)]
    pub gate: Option<ObservationGate>,
}

impl Default for MarketMakerParams {
    fn default() -> Self {
        MarketMakerParams {
            products: Vec::new(),
            min_spread: 2.0,
            clip: 10,
            gate: None,
        }
    }
}

//complete replay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfiguration {
    //input files
    pub delimiter: char,
    pub observation_products: Vec<String>,

    //fill model
    pub remainder_rule: RemainderRule,

    //strategy
    pub strategy_type: StrategyType,
    pub fair_value: FairValueParams,
    pub market_maker: MarketMakerParams,
    pub position_limits: IndexMap<String, i64>,
    pub default_position_limit: i64,

    //outputs, no artifacts are written when unset
    pub results_dir: Option<PathBuf>,
}

impl Default for ReplayConfiguration {
    fn default() -> Self {
        let mut position_limits = IndexMap::new();
        position_limits.insert("AMETHYSTS".to_string(), 20);
        position_limits.insert("STARFRUIT".to_string(), 20);

        ReplayConfiguration {
            delimiter: ';',
            observation_products: vec!["DOLPHIN_SIGHTINGS".to_string()],
            remainder_rule: RemainderRule::Shrinking,
            strategy_type: StrategyType::FairValue,
            fair_value: FairValueParams::default(),
            market_maker: MarketMakerParams::default(),
            position_limits,
            default_position_limit: 50,
            results_dir: Some(PathBuf::from("results")),
        }
    }
}

impl ReplayConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: ReplayConfiguration = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config file {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.delimiter.is_ascii() {
            anyhow::bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter);
        }
        if self.fair_value.window == 0 {
            anyhow::bail!("fair_value.window must be at least 1");
        }
        if self.default_position_limit < 0 || self.position_limits.values().any(|&l| l < 0) {
            anyhow::bail!("position limits must not be negative");
        }
        Ok(())
    }

    //settings the replay session needs
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            observation_products: self.observation_products.clone(),
            remainder_rule: self.remainder_rule,
        }
    }

    //delimiter as the byte the csv reader expects
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}
