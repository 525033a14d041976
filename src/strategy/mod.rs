pub mod fair_value;
pub mod market_maker;

use crate::config::{ReplayConfiguration, StrategyType};
use crate::data::TickState;
use crate::engine::order::Order;
use fair_value::FairValueTaker;
use indexmap::IndexMap;
use market_maker::SpreadMarketMaker;

//what a strategy hands back each tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyOutput {
    //desired orders per product, filled in the order given
    pub orders: IndexMap<String, Vec<Order>>,

    //conversion request, passed through untouched
    pub conversions: i64,

    //opaque state echoed back as trader_data on the next tick
    pub trader_data: String,
}

impl StrategyOutput {
    pub fn with_orders(orders: IndexMap<String, Vec<Order>>) -> Self {
        StrategyOutput {
            orders,
            ..Default::default()
        }
    }

    pub fn order_count(&self) -> usize {
        self.orders.values().map(Vec::len).sum()
    }
}

//strategy interface that all strategies must implement
//called once per tick, strictly in timestamp order
pub trait Strategy: Send {
    fn run(&mut self, state: &TickState) -> StrategyOutput;

    //returns the strategy name
    fn name(&self) -> &str;
}

//creates a fresh strategy instance from configuration
pub fn build_strategy(config: &ReplayConfiguration) -> Box<dyn Strategy> {
    let limits = config.position_limits.clone();
    let default_limit = config.default_position_limit;

    match config.strategy_type {
        StrategyType::FairValue => Box::new(FairValueTaker::new(
            config.fair_value.clone(),
            limits,
            default_limit,
        )),
        StrategyType::MarketMaker => Box::new(SpreadMarketMaker::new(
            config.market_maker.clone(),
            limits,
            default_limit,
        )),
    }
}

//remaining buy and sell capacity under a symmetric position limit
//sell capacity is returned as a positive size
pub fn legal_volumes(position: i64, limit: i64) -> (i64, i64) {
    let buy = (limit - position).clamp(0, limit);
    let sell = (limit + position).clamp(0, limit);
    (buy, sell)
}

//exponential moving average step with window n
pub fn ema(previous: f64, value: f64, window: usize) -> f64 {
    let n = window as f64;
    (2.0 * value + (n - 1.0) * previous) / (n + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_volumes_respect_limit() {
        assert_eq!(legal_volumes(0, 50), (50, 50));
        assert_eq!(legal_volumes(20, 50), (30, 50));
        assert_eq!(legal_volumes(-50, 50), (50, 0));
        assert_eq!(legal_volumes(60, 50), (0, 50));
    }

    #[test]
    fn ema_moves_toward_value() {
        assert_eq!(ema(10.0, 10.0, 5), 10.0);
        let next = ema(10.0, 16.0, 5);
        assert!((next - 12.0).abs() < 1e-12);
    }
}
