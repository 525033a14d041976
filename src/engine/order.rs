use crate::data::Tick;
use serde::{Deserialize, Serialize};

//a strategy's request for one tick
//positive quantity buys, negative quantity sells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    pub price: f64,
    pub quantity: i64,
}

impl Order {
    pub fn new(symbol: impl Into<String>, price: f64, quantity: i64) -> Self {
        Order {
            symbol: symbol.into(),
            price,
            quantity,
        }
    }

    pub fn buy(symbol: impl Into<String>, price: f64, quantity: u32) -> Self {
        Order::new(symbol, price, quantity as i64)
    }

    pub fn sell(symbol: impl Into<String>, price: f64, quantity: u32) -> Self {
        Order::new(symbol, price, -(quantity as i64))
    }

    pub fn is_buy(&self) -> bool {
        self.quantity > 0
    }

    pub fn is_sell(&self) -> bool {
        self.quantity < 0
    }
}

//a realized fill, either our own or replayed from history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub price: f64,
    pub quantity: i64, //signed: positive for bought, negative for sold
    pub buyer: String,
    pub seller: String,
    pub timestamp: Tick,
}

impl Trade {
    //own fill synthesized by the simulator, counterparties are unknown
    pub fn own(symbol: impl Into<String>, price: f64, quantity: i64, timestamp: Tick) -> Self {
        Trade {
            symbol: symbol.into(),
            price,
            quantity,
            buyer: String::new(),
            seller: String::new(),
            timestamp,
        }
    }

    //cash flow of the trade from our side: buying spends, selling earns
    pub fn cash_flow(&self) -> f64 {
        -self.price * self.quantity as f64
    }
}
