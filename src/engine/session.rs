use crate::data::{MarketData, PriceRow, Tick, TradeRow};
use crate::engine::fill::{FillSimulator, RemainderRule};
use crate::engine::order::Trade;
use crate::engine::snapshot::SnapshotBuilder;
use crate::portfolio::{PnlPoint, PositionTracker};
use crate::strategy::Strategy;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session cannot run from state {0:?}, a session replays exactly once")]
    InvalidState(SessionState),
}

//lifecycle of a replay session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Finished,
}

//configuration for a replay session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub observation_products: Vec<String>,
    pub remainder_rule: RemainderRule,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            observation_products: vec!["DOLPHIN_SIGHTINGS".to_string()],
            remainder_rule: RemainderRule::Shrinking,
        }
    }
}

//result of a replay
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub dataset: String,
    pub strategy: String,
    pub ticks: usize,
    pub total_pnl: f64,
    pub final_positions: IndexMap<String, i64>,
    pub pnl_history: IndexMap<String, Vec<PnlPoint>>,
    pub position_history: IndexMap<String, Vec<i64>>,
    pub own_trades: Vec<Trade>,
}

impl ReplayResult {
    //final pnl of each product that has a pnl series
    pub fn product_pnl(&self) -> IndexMap<String, f64> {
        self.pnl_history
            .iter()
            .filter_map(|(product, series)| series.last().map(|p| (product.clone(), p.pnl)))
            .collect()
    }
}

//replays one dataset tick by tick against a strategy
pub struct ReplaySession {
    dataset: String,
    ticks: BTreeMap<Tick, (Vec<PriceRow>, Vec<TradeRow>)>,
    builder: SnapshotBuilder,
    simulator: FillSimulator,
    tracker: PositionTracker,
    state: SessionState,
    trade_log: Vec<Trade>,
}

impl ReplaySession {
    //creates a new session, grouping the dataset by tick
    pub fn new(data: MarketData, config: SessionConfig) -> Self {
        let builder = SnapshotBuilder::new(config.observation_products);
        let tracker = PositionTracker::new(builder.tradable_products(&data.prices));

        //ticks are the unique price timestamps, trades at other timestamps are never replayed
        let mut ticks: BTreeMap<Tick, (Vec<PriceRow>, Vec<TradeRow>)> = BTreeMap::new();
        for row in data.prices {
            ticks.entry(row.timestamp).or_default().0.push(row);
        }
        for row in data.trades {
            if let Some(entry) = ticks.get_mut(&row.timestamp) {
                entry.1.push(row);
            }
        }

        ReplaySession {
            dataset: data.name,
            ticks,
            builder,
            simulator: FillSimulator::new(config.remainder_rule),
            tracker,
            state: SessionState::Idle,
            trade_log: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn tick_count(&self) -> usize {
        self.ticks.len()
    }

    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    //runs the whole replay with the given strategy
    pub fn run(&mut self, strategy: &mut dyn Strategy) -> Result<ReplayResult, SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::InvalidState(self.state));
        }
        self.state = SessionState::Running;

        info!(
            dataset = %self.dataset,
            strategy = strategy.name(),
            ticks = self.ticks.len(),
            "replay started"
        );

        let mut own_trades: IndexMap<String, Vec<Trade>> = IndexMap::new();
        let mut trader_data = String::new();

        for (&tick, (price_rows, trade_rows)) in &self.ticks {
            //market view for this tick, independent of our fills
            let snapshot = self.builder.build(tick, price_rows, trade_rows);

            let output = {
                let state = snapshot.state(&trader_data, &own_trades, self.tracker.positions());
                strategy.run(&state)
            };

            //fills use this tick's book, the strategy learns about them next tick
            own_trades = self.simulator.simulate(tick, &snapshot.books, &output.orders);
            trader_data = output.trader_data;

            let fills: usize = own_trades.values().map(Vec::len).sum();
            debug!(
                tick,
                orders = output.orders.values().map(Vec::len).sum::<usize>(),
                fills,
                conversions = output.conversions,
                "tick processed"
            );

            self.tracker.apply(&own_trades);
            self.tracker.mark_to_market(tick, &snapshot.mid_prices());
            self.trade_log
                .extend(own_trades.values().flatten().cloned());
        }

        self.state = SessionState::Finished;

        let result = self.build_result(strategy.name());
        info!(
            dataset = %self.dataset,
            total_pnl = result.total_pnl,
            own_trades = result.own_trades.len(),
            "replay finished"
        );

        Ok(result)
    }

    fn build_result(&self, strategy: &str) -> ReplayResult {
        ReplayResult {
            dataset: self.dataset.clone(),
            strategy: strategy.to_string(),
            ticks: self.ticks.len(),
            total_pnl: self.tracker.total_pnl(),
            final_positions: self.tracker.positions().clone(),
            pnl_history: self.tracker.pnl_histories().clone(),
            position_history: self.tracker.position_histories().clone(),
            own_trades: self.trade_log.clone(),
        }
    }
}
