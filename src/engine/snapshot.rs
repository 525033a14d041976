use crate::data::{Listing, PriceRow, ProductBook, Tick, TickState, TradeRow};
use crate::engine::order::Trade;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;

//market view of a single tick, rebuilt from scratch every step
#[derive(Debug, Clone, Default)]
pub struct TickSnapshot {
    pub timestamp: Tick,
    pub books: IndexMap<String, ProductBook>,
    pub listings: IndexMap<String, Listing>,
    pub observations: IndexMap<String, f64>,
    pub market_trades: IndexMap<String, Vec<Trade>>,
}

impl TickSnapshot {
    //mid price per tradable product that recorded one this tick
    pub fn mid_prices(&self) -> IndexMap<String, f64> {
        self.books
            .iter()
            .filter_map(|(product, book)| book.mid_price.map(|mid| (product.clone(), mid)))
            .collect()
    }

    //assembles the strategy input, borrowing the session's live state
    pub fn state<'a>(
        &'a self,
        trader_data: &'a str,
        own_trades: &'a IndexMap<String, Vec<Trade>>,
        position: &'a IndexMap<String, i64>,
    ) -> TickState<'a> {
        TickState {
            trader_data,
            timestamp: self.timestamp,
            listings: self.listings.clone(),
            order_depths: self
                .books
                .iter()
                .map(|(product, book)| (product.clone(), book.order_depth()))
                .collect(),
            own_trades,
            market_trades: &self.market_trades,
            observations: &self.observations,
            position,
        }
    }
}

//builds per-tick snapshots from raw rows
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    observation_products: HashSet<String>,
}

impl SnapshotBuilder {
    pub fn new<I, S>(observation_products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SnapshotBuilder {
            observation_products: observation_products.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_observation(&self, product: &str) -> bool {
        self.observation_products.contains(product)
    }

    //tradable products in first-seen order across a whole dataset
    pub fn tradable_products<'a>(&self, rows: impl IntoIterator<Item = &'a PriceRow>) -> IndexSet<String> {
        rows.into_iter()
            .filter(|row| !self.is_observation(&row.product))
            .map(|row| row.product.clone())
            .collect()
    }

    //builds the snapshot for one tick
    //price_rows and trade_rows must all belong to that tick
    pub fn build(&self, timestamp: Tick, price_rows: &[PriceRow], trade_rows: &[TradeRow]) -> TickSnapshot {
        let mut snapshot = TickSnapshot {
            timestamp,
            ..Default::default()
        };

        for row in price_rows {
            if self.is_observation(&row.product) {
                //observation rows carry their signal in the mid price column
                if let Some(value) = row.mid() {
                    snapshot.observations.insert(row.product.clone(), value);
                }
                continue;
            }

            snapshot
                .listings
                .insert(row.product.clone(), Listing::new(&row.product));
            snapshot.books.insert(row.product.clone(), row.to_book());
        }

        for row in trade_rows {
            snapshot
                .market_trades
                .entry(row.symbol.clone())
                .or_default()
                .push(Trade {
                    symbol: row.symbol.clone(),
                    price: row.price,
                    quantity: row.quantity,
                    buyer: row.buyer.clone().unwrap_or_default(),
                    seller: row.seller.clone().unwrap_or_default(),
                    timestamp,
                });
        }

        snapshot
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        SnapshotBuilder::new(["DOLPHIN_SIGHTINGS"])
    }
}
