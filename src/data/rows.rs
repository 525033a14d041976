use crate::data::book::{BookLevel, ProductBook, MAX_LEVELS};
use serde::{Deserialize, Serialize};

//ordered timestamp of one replay step
pub type Tick = i64;

//one (tick, product) row of the historical prices file
//numeric cells are optional: an empty or nan cell means the level is missing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRow {
    pub timestamp: Tick,
    pub product: String,
    #[serde(default)]
    pub bid_price_1: Option<f64>,
    #[serde(default)]
    pub bid_volume_1: Option<f64>,
    #[serde(default)]
    pub bid_price_2: Option<f64>,
    #[serde(default)]
    pub bid_volume_2: Option<f64>,
    #[serde(default)]
    pub bid_price_3: Option<f64>,
    #[serde(default)]
    pub bid_volume_3: Option<f64>,
    #[serde(default)]
    pub ask_price_1: Option<f64>,
    #[serde(default)]
    pub ask_volume_1: Option<f64>,
    #[serde(default)]
    pub ask_price_2: Option<f64>,
    #[serde(default)]
    pub ask_volume_2: Option<f64>,
    #[serde(default)]
    pub ask_price_3: Option<f64>,
    #[serde(default)]
    pub ask_volume_3: Option<f64>,
    #[serde(default)]
    pub mid_price: Option<f64>,
}

impl PriceRow {
    //creates an empty row for a product, levels are filled in with the builder methods
    pub fn new(timestamp: Tick, product: impl Into<String>) -> Self {
        PriceRow {
            timestamp,
            product: product.into(),
            bid_price_1: None,
            bid_volume_1: None,
            bid_price_2: None,
            bid_volume_2: None,
            bid_price_3: None,
            bid_volume_3: None,
            ask_price_1: None,
            ask_volume_1: None,
            ask_price_2: None,
            ask_volume_2: None,
            ask_price_3: None,
            ask_volume_3: None,
            mid_price: None,
        }
    }

    //sets bid levels in priority order (best first)
    pub fn with_bids(mut self, levels: &[(f64, f64)]) -> Self {
        let slots = [
            (&mut self.bid_price_1, &mut self.bid_volume_1),
            (&mut self.bid_price_2, &mut self.bid_volume_2),
            (&mut self.bid_price_3, &mut self.bid_volume_3),
        ];
        for ((price, volume), &(p, v)) in slots.into_iter().zip(levels) {
            *price = Some(p);
            *volume = Some(v);
        }
        self
    }

    //sets ask levels in priority order (best first)
    pub fn with_asks(mut self, levels: &[(f64, f64)]) -> Self {
        let slots = [
            (&mut self.ask_price_1, &mut self.ask_volume_1),
            (&mut self.ask_price_2, &mut self.ask_volume_2),
            (&mut self.ask_price_3, &mut self.ask_volume_3),
        ];
        for ((price, volume), &(p, v)) in slots.into_iter().zip(levels) {
            *price = Some(p);
            *volume = Some(v);
        }
        self
    }

    pub fn with_mid(mut self, mid_price: f64) -> Self {
        self.mid_price = Some(mid_price);
        self
    }

    //mid price, treating nan as missing
    pub fn mid(&self) -> Option<f64> {
        present(self.mid_price)
    }

    //converts the raw columns into a normalized book
    pub fn to_book(&self) -> ProductBook {
        let bid_cols = [
            (self.bid_price_1, self.bid_volume_1),
            (self.bid_price_2, self.bid_volume_2),
            (self.bid_price_3, self.bid_volume_3),
        ];
        let ask_cols = [
            (self.ask_price_1, self.ask_volume_1),
            (self.ask_price_2, self.ask_volume_2),
            (self.ask_price_3, self.ask_volume_3),
        ];

        let mut bids = [None; MAX_LEVELS];
        let mut asks = [None; MAX_LEVELS];
        for (slot, (price, volume)) in bids.iter_mut().zip(bid_cols) {
            *slot = level(price, volume);
        }
        for (slot, (price, volume)) in asks.iter_mut().zip(ask_cols) {
            *slot = level(price, volume);
        }

        ProductBook {
            bids,
            asks,
            mid_price: self.mid(),
        }
    }
}

//one row of the historical trades file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRow {
    pub timestamp: Tick,
    pub symbol: String,
    pub price: f64,
    pub quantity: i64,
    #[serde(default)]
    pub buyer: Option<String>,
    #[serde(default)]
    pub seller: Option<String>,
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

//a level only exists when both price and a non-zero volume are recorded
fn level(price: Option<f64>, volume: Option<f64>) -> Option<BookLevel> {
    let price = present(price)?;
    let volume = present(volume)?.abs().round() as i64;
    if volume == 0 {
        return None;
    }
    Some(BookLevel { price, volume })
}
