use serde::{Deserialize, Serialize};

//number of price levels recorded per side
pub const MAX_LEVELS: usize = 3;

//resting interest at one priority rank, volume is always a positive magnitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: f64,
    pub volume: i64,
}

//normalized book for one product at one tick
//bids are best (highest) first, asks are best (lowest) first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductBook {
    pub bids: [Option<BookLevel>; MAX_LEVELS],
    pub asks: [Option<BookLevel>; MAX_LEVELS],
    pub mid_price: Option<f64>,
}

impl ProductBook {
    //present bid levels in priority order
    pub fn bid_levels(&self) -> impl Iterator<Item = &BookLevel> {
        self.bids.iter().flatten()
    }

    //present ask levels in priority order
    pub fn ask_levels(&self) -> impl Iterator<Item = &BookLevel> {
        self.asks.iter().flatten()
    }

    //strategy-facing view: bids positive, asks negative
    pub fn order_depth(&self) -> OrderDepth {
        OrderDepth {
            buy_orders: self.bid_levels().map(|l| (l.price, l.volume)).collect(),
            sell_orders: self.ask_levels().map(|l| (l.price, -l.volume)).collect(),
        }
    }
}

//order depth as handed to strategies
//buy_orders carry positive volume, sell_orders negative volume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDepth {
    pub buy_orders: Vec<(f64, i64)>,
    pub sell_orders: Vec<(f64, i64)>,
}

impl OrderDepth {
    //highest bid price and its volume
    pub fn best_bid(&self) -> Option<(f64, i64)> {
        self.buy_orders
            .iter()
            .copied()
            .max_by(|a, b| a.0.total_cmp(&b.0))
    }

    //lowest ask price and its (negative) volume
    pub fn best_ask(&self) -> Option<(f64, i64)> {
        self.sell_orders
            .iter()
            .copied()
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }

    //spread between best ask and best bid
    pub fn spread(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => Some(ask - bid),
            _ => None,
        }
    }

    //volume weighted average of both sides of the book
    pub fn weighted_mid(&self) -> Option<f64> {
        let side_avg = |levels: &[(f64, i64)]| {
            let total: i64 = levels.iter().map(|(_, v)| v.abs()).sum();
            if total == 0 {
                return None;
            }
            let notional: f64 = levels.iter().map(|(p, v)| p * v.abs() as f64).sum();
            Some(notional / total as f64)
        };

        let bid = side_avg(&self.buy_orders)?;
        let ask = side_avg(&self.sell_orders)?;
        Some((bid + ask) / 2.0)
    }
}
