//a Rust-based order book replay and fill simulation harness for trading competitions

pub mod config;
pub mod data;
pub mod engine;
pub mod metrics;
pub mod portfolio;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        FairValueParams, MarketMakerParams, ObservationGate, ReplayConfiguration, StrategyType,
    };
    pub use crate::data::{
        load_prices, load_trades, pair_paths, BookLevel, Listing, MarketData, OrderDepth,
        PriceRow, ProductBook, Tick, TickState, TradeRow,
    };
    pub use crate::engine::{
        FillSimulator, Order, RemainderRule, ReplayResult, ReplaySession, SessionConfig,
        SessionError, SessionState, SnapshotBuilder, TickSnapshot, Trade,
    };
    pub use crate::metrics::{ArtifactWriter, ProductSummary, ReplaySummary};
    pub use crate::portfolio::{PnlPoint, PositionTracker};
    pub use crate::strategy::{
        build_strategy, fair_value::FairValueTaker, market_maker::SpreadMarketMaker, Strategy,
        StrategyOutput,
    };
}
