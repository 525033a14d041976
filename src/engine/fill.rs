use crate::data::{ProductBook, Tick};
use crate::engine::order::{Order, Trade};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

//how the unfilled remainder of a buy order is carried to the next ask level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderRule {
    //remaining = max(0, remaining - level volume), never fills more than requested
    #[default]
    Shrinking,
    //remaining = max(0, level volume + remaining), reproduces the competition harness
    //this can consume deeper ask levels beyond the requested size
    Legacy,
}

//walks recorded depth to decide which orders would have executed
#[derive(Debug, Clone, Default)]
pub struct FillSimulator {
    rule: RemainderRule,
}

impl FillSimulator {
    pub fn new(rule: RemainderRule) -> Self {
        FillSimulator { rule }
    }

    //realizes this tick's own trades
    //every product the strategy sent orders for gets an entry, possibly empty
    pub fn simulate(
        &self,
        timestamp: Tick,
        books: &IndexMap<String, ProductBook>,
        orders: &IndexMap<String, Vec<Order>>,
    ) -> IndexMap<String, Vec<Trade>> {
        let mut own_trades = IndexMap::with_capacity(orders.len());

        for (product, product_orders) in orders {
            let mut trades = Vec::new();

            match books.get(product) {
                Some(book) => {
                    for order in product_orders {
                        self.fill_order(timestamp, product, book, order, &mut trades);
                    }
                }
                None if !product_orders.is_empty() => {
                    warn!(%product, timestamp, "orders for product without a book, nothing filled");
                }
                None => {}
            }

            own_trades.insert(product.clone(), trades);
        }

        own_trades
    }

    //fills a single order against a book, appending trades in level order
    pub fn fill_order(
        &self,
        timestamp: Tick,
        product: &str,
        book: &ProductBook,
        order: &Order,
        trades: &mut Vec<Trade>,
    ) {
        let mut remaining = order.quantity;

        if order.is_sell() {
            //hit bids from the highest price down
            for level in book.bid_levels() {
                if remaining == 0 {
                    break;
                }
                let acceptable = level.price >= order.price;
                if !acceptable {
                    continue;
                }
                let sold = remaining.max(-level.volume);
                trades.push(Trade::own(product, level.price, sold, timestamp));
                remaining = (level.volume + remaining).min(0);
            }
        } else if order.is_buy() {
            //lift asks from the lowest price up
            for level in book.ask_levels() {
                if remaining == 0 {
                    break;
                }
                let acceptable = level.price <= order.price;
                if !acceptable {
                    continue;
                }
                let bought = remaining.min(level.volume);
                trades.push(Trade::own(product, level.price, bought, timestamp));
                remaining = match self.rule {
                    RemainderRule::Shrinking => (remaining - level.volume).max(0),
                    RemainderRule::Legacy => (level.volume + remaining).max(0),
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BookLevel;

    fn lvl(price: f64, volume: i64) -> Option<BookLevel> {
        Some(BookLevel { price, volume })
    }

    fn book() -> ProductBook {
        ProductBook {
            bids: [lvl(101.0, 5), lvl(100.0, 4), lvl(99.0, 10)],
            asks: [lvl(102.0, 3), lvl(103.0, 4), lvl(104.0, 8)],
            mid_price: Some(101.5),
        }
    }

    fn run(sim: &FillSimulator, book: ProductBook, order: Order) -> Vec<Trade> {
        let mut books = IndexMap::new();
        books.insert("X".to_string(), book);
        let mut orders = IndexMap::new();
        orders.insert("X".to_string(), vec![order]);
        sim.simulate(0, &books, &orders).swap_remove("X").unwrap()
    }

    fn fills(trades: &[Trade]) -> Vec<(f64, i64)> {
        trades.iter().map(|t| (t.price, t.quantity)).collect()
    }

    #[test]
    fn sell_sweeps_levels_in_priority_order() {
        let trades = run(&FillSimulator::default(), book(), Order::new("X", 99.0, -7));
        assert_eq!(fills(&trades), vec![(101.0, -5), (100.0, -2)]);
    }

    #[test]
    fn sell_stops_at_limit() {
        let trades = run(&FillSimulator::default(), book(), Order::new("X", 100.5, -20));
        assert_eq!(fills(&trades), vec![(101.0, -5)]);
    }

    #[test]
    fn buy_sweeps_asks_without_overfill() {
        let trades = run(&FillSimulator::default(), book(), Order::new("X", 104.0, 5));
        assert_eq!(fills(&trades), vec![(102.0, 3), (103.0, 2)]);
        let total: i64 = trades.iter().map(|t| t.quantity).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn legacy_rule_overconsumes_deeper_asks() {
        let sim = FillSimulator::new(RemainderRule::Legacy);
        let trades = run(&sim, book(), Order::new("X", 104.0, 5));
        //remaining after level 1 becomes 3 + 5 = 8
        assert_eq!(fills(&trades), vec![(102.0, 3), (103.0, 4), (104.0, 8)]);
    }

    #[test]
    fn legacy_rule_keeps_sell_side() {
        let sim = FillSimulator::new(RemainderRule::Legacy);
        let trades = run(&sim, book(), Order::new("X", 99.0, -7));
        assert_eq!(fills(&trades), vec![(101.0, -5), (100.0, -2)]);
    }

    #[test]
    fn missing_level_matches_absent_level() {
        let mut with_gap = book();
        with_gap.bids[1] = None;
        let mut truncated = book();
        truncated.bids = [lvl(101.0, 5), lvl(99.0, 10), None];

        let sim = FillSimulator::default();
        let a = run(&sim, with_gap, Order::new("X", 99.0, -8));
        let b = run(&sim, truncated, Order::new("X", 99.0, -8));
        assert_eq!(fills(&a), fills(&b));
        assert_eq!(fills(&a), vec![(101.0, -5), (99.0, -3)]);
    }

    #[test]
    fn no_acceptable_level_is_no_fill() {
        let trades = run(&FillSimulator::default(), book(), Order::new("X", 101.0, 5));
        assert!(trades.is_empty());
        let trades = run(&FillSimulator::default(), book(), Order::new("X", 0.0, 0));
        assert!(trades.is_empty());
    }

    #[test]
    fn nan_limit_never_fills() {
        let mut books = IndexMap::new();
        books.insert("X".to_string(), book());
        let mut orders = IndexMap::new();
        orders.insert(
            "X".to_string(),
            vec![Order::new("X", f64::NAN, 3), Order::new("X", f64::NAN, -2)],
        );

        for rule in [RemainderRule::Shrinking, RemainderRule::Legacy] {
            let trades = FillSimulator::new(rule).simulate(0, &books, &orders);
            assert!(trades["X"].is_empty());
        }
    }

    #[test]
    fn never_overfills_for_any_size_or_limit() {
        let sim = FillSimulator::default();
        for quantity in -25..=25 {
            for limit in [98.0, 100.0, 101.0, 102.0, 103.5, 110.0] {
                let trades = run(&sim, book(), Order::new("X", limit, quantity));
                let filled: i64 = trades.iter().map(|t| t.quantity).sum();
                assert!(filled.abs() <= quantity.abs());
                assert!(trades.iter().all(|t| t.quantity.signum() == quantity.signum()));
            }
        }
    }

    #[test]
    fn orders_are_processed_in_emitted_order() {
        let mut books = IndexMap::new();
        books.insert("X".to_string(), book());
        let mut orders = IndexMap::new();
        orders.insert(
            "X".to_string(),
            vec![Order::new("X", 103.0, 2), Order::new("X", 101.0, -1)],
        );
        orders.insert("Y".to_string(), vec![Order::new("Y", 1.0, 1)]);

        let trades = FillSimulator::default().simulate(42, &books, &orders);
        assert_eq!(fills(&trades["X"]), vec![(102.0, 2), (101.0, -1)]);
        assert!(trades["Y"].is_empty());
        assert!(trades["X"].iter().all(|t| t.timestamp == 42 && t.buyer.is_empty()));
    }
}
