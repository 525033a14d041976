use crate::data::Tick;
use crate::engine::order::Trade;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

//mark-to-market value of one product at one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PnlPoint {
    pub tick: Tick,
    pub pnl: f64,
}

//running position and profit per product for a whole replay
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    //live inventory, handed to strategies by reference
    position: IndexMap<String, i64>,

    //accumulated cash from own trades (buying spends, selling earns)
    cash_profit: IndexMap<String, f64>,

    //position after every apply, seeded with the starting flat position
    position_history: IndexMap<String, Vec<i64>>,

    //cash + mid * position at every tick the product was quoted
    pnl_history: IndexMap<String, Vec<PnlPoint>>,
}

impl PositionTracker {
    //creates a tracker with a flat position for each known product
    pub fn new<I, S>(products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tracker = PositionTracker::default();
        for product in products {
            let product = product.into();
            tracker.position.insert(product.clone(), 0);
            tracker.position_history.insert(product, vec![0]);
        }
        tracker
    }

    //folds one tick of own trades into position and cash
    pub fn apply(&mut self, trades_by_product: &IndexMap<String, Vec<Trade>>) {
        for (product, trades) in trades_by_product {
            let position_delta: i64 = trades.iter().map(|t| t.quantity).sum();
            let cash_delta: f64 = trades.iter().map(Trade::cash_flow).sum();

            let position = self.position.entry(product.clone()).or_insert(0);
            *position += position_delta;
            let current = *position;

            self.position_history
                .entry(product.clone())
                .or_default()
                .push(current);

            *self.cash_profit.entry(product.clone()).or_insert(0.0) += cash_delta;
        }
    }

    //records pnl for every quoted product that has a cash entry
    //products without a mid this tick are skipped and leave a gap in their series
    pub fn mark_to_market(&mut self, tick: Tick, mid_prices: &IndexMap<String, f64>) {
        for (product, &mid) in mid_prices {
            let Some(&cash) = self.cash_profit.get(product) else {
                continue;
            };
            let pnl = cash + mid * self.position(product) as f64;

            self.pnl_history
                .entry(product.clone())
                .or_default()
                .push(PnlPoint { tick, pnl });
        }
    }

    pub fn positions(&self) -> &IndexMap<String, i64> {
        &self.position
    }

    pub fn position(&self, product: &str) -> i64 {
        self.position.get(product).copied().unwrap_or(0)
    }

    pub fn cash_profit(&self, product: &str) -> Option<f64> {
        self.cash_profit.get(product).copied()
    }

    pub fn position_history(&self, product: &str) -> &[i64] {
        self.position_history
            .get(product)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn pnl_history(&self, product: &str) -> &[PnlPoint] {
        self.pnl_history
            .get(product)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn position_histories(&self) -> &IndexMap<String, Vec<i64>> {
        &self.position_history
    }

    pub fn pnl_histories(&self) -> &IndexMap<String, Vec<PnlPoint>> {
        &self.pnl_history
    }

    //latest recorded pnl for a product
    pub fn last_pnl(&self, product: &str) -> Option<f64> {
        self.pnl_history(product).last().map(|p| p.pnl)
    }

    //sum of each product's final pnl entry
    pub fn total_pnl(&self) -> f64 {
        self.pnl_history
            .values()
            .filter_map(|series| series.last())
            .map(|p| p.pnl)
            .sum()
    }
}
