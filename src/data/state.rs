use crate::data::book::OrderDepth;
use crate::data::Tick;
use crate::engine::order::Trade;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const DENOMINATION: &str = "SEASHELLS";

//a tradable instrument offered at a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub symbol: String,
    pub product: String,
    pub denomination: String,
}

impl Listing {
    pub fn new(product: &str) -> Self {
        Listing {
            symbol: product.to_string(),
            product: product.to_string(),
            denomination: DENOMINATION.to_string(),
        }
    }
}

//everything a strategy sees for one tick
//own_trades and position borrow the session's live data, strategies must not cache them
#[derive(Debug, Clone)]
pub struct TickState<'a> {
    pub trader_data: &'a str,
    pub timestamp: Tick,
    pub listings: IndexMap<String, Listing>,
    pub order_depths: IndexMap<String, OrderDepth>,
    pub own_trades: &'a IndexMap<String, Vec<Trade>>,
    pub market_trades: &'a IndexMap<String, Vec<Trade>>,
    pub observations: &'a IndexMap<String, f64>,
    pub position: &'a IndexMap<String, i64>,
}

impl<'a> TickState<'a> {
    //current position for a product, zero if never traded
    pub fn position_of(&self, product: &str) -> i64 {
        self.position.get(product).copied().unwrap_or(0)
    }

    pub fn observation(&self, name: &str) -> Option<f64> {
        self.observations.get(name).copied()
    }

    pub fn depth(&self, product: &str) -> Option<&OrderDepth> {
        self.order_depths.get(product)
    }

    //tradable products in first-seen order
    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.listings.keys().map(String::as_str)
    }
}
