pub mod replay_config;

pub use replay_config::{
    FairValueParams, MarketMakerParams, ObservationGate, ReplayConfiguration, StrategyType,
};
