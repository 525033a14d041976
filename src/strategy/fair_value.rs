use crate::config::FairValueParams;
use crate::data::TickState;
use crate::engine::order::Order;
use crate::strategy::{ema, legal_volumes, Strategy, StrategyOutput};
use indexmap::IndexMap;

//fair value taker
//tracks an ema of the volume weighted mid and trades whenever the touch is
//on the right side of it, also improving the touch by one tick when there is room
#[derive(Debug, Clone)]
pub struct FairValueTaker {
    params: FairValueParams,
    limits: IndexMap<String, i64>,
    default_limit: i64,

    //state
    fair_value: IndexMap<String, f64>,
}

impl FairValueTaker {
    pub fn new(params: FairValueParams, limits: IndexMap<String, i64>, default_limit: i64) -> Self {
        FairValueTaker {
            params,
            limits,
            default_limit,
            fair_value: IndexMap::new(),
        }
    }

    fn limit(&self, product: &str) -> i64 {
        self.limits.get(product).copied().unwrap_or(self.default_limit)
    }

    fn trades(&self, product: &str) -> bool {
        self.params.products.is_empty() || self.params.products.iter().any(|p| p == product)
    }

    pub fn fair_value(&self, product: &str) -> Option<f64> {
        self.fair_value.get(product).copied()
    }

    //picks up values echoed back through trader_data when starting cold
    fn restore(&mut self, trader_data: &str) {
        if !self.fair_value.is_empty() || trader_data.is_empty() {
            return;
        }
        if let Ok(saved) = serde_json::from_str::<IndexMap<String, f64>>(trader_data) {
            self.fair_value = saved;
        }
    }

    fn quote(&mut self, product: &str, state: &TickState) -> Vec<Order> {
        let mut orders = Vec::new();
        let Some(depth) = state.depth(product) else {
            return orders;
        };

        let previous = self.fair_value(product);
        let fair = match (depth.weighted_mid(), previous) {
            (Some(mid), Some(prev)) => ema(prev, mid, self.params.window),
            (Some(mid), None) => mid,
            (None, Some(prev)) => prev,
            (None, None) => return orders,
        };
        self.fair_value.insert(product.to_string(), fair);

        let (mut buy_room, mut sell_room) =
            legal_volumes(state.position_of(product), self.limit(product));
        let best_bid = depth.best_bid();
        let best_ask = depth.best_ask();

        if let Some((ask, ask_volume)) = best_ask {
            //take cheap offers
            if ask <= fair && buy_room > 0 {
                let size = (-ask_volume).min(buy_room);
                orders.push(Order::new(product, ask, size));
                buy_room -= size;
            }
            //join one tick above the bid
            if let Some((bid, _)) = best_bid {
                let price = bid + 1.0;
                if price <= fair && price < ask && buy_room > 0 {
                    let size = (-ask_volume).min(buy_room);
                    orders.push(Order::new(product, price, size));
                }
            }
        }

        if let Some((bid, bid_volume)) = best_bid {
            //hit rich bids
            if bid >= fair && sell_room > 0 {
                let size = bid_volume.min(sell_room);
                orders.push(Order::new(product, bid, -size));
                sell_room -= size;
            }
            //join one tick below the ask
            if let Some((ask, _)) = best_ask {
                let price = ask - 1.0;
                if price >= fair && price > bid && sell_room > 0 {
                    let size = bid_volume.min(sell_room);
                    orders.push(Order::new(product, price, -size));
                }
            }
        }

        orders
    }
}

impl Strategy for FairValueTaker {
    fn run(&mut self, state: &TickState) -> StrategyOutput {
        self.restore(state.trader_data);

        let products: Vec<String> = state
            .products()
            .filter(|p| self.trades(p))
            .map(str::to_string)
            .collect();

        let mut orders = IndexMap::new();
        for product in products {
            let product_orders = self.quote(&product, state);
            orders.insert(product, product_orders);
        }

        StrategyOutput {
            orders,
            conversions: 0,
            trader_data: serde_json::to_string(&self.fair_value).unwrap_or_default(),
        }
    }

    fn name(&self) -> &str {
        "Fair Value Taker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PriceRow;
    use crate::engine::snapshot::SnapshotBuilder;

    fn taker(window: usize) -> FairValueTaker {
        FairValueTaker::new(
            FairValueParams {
                products: vec!["X".into()],
                window,
            },
            IndexMap::new(),
            10,
        )
    }

    #[test]
    fn buys_offer_below_fair_value() {
        let rows = vec![
            PriceRow::new(0, "X")
                .with_bids(&[(100.0, 5.0)])
                .with_asks(&[(102.0, 5.0)])
                .with_mid(101.0),
            PriceRow::new(0, "Y")
                .with_bids(&[(1.0, 1.0)])
                .with_asks(&[(2.0, 1.0)])
                .with_mid(1.5),
        ];
        let snapshot = SnapshotBuilder::default().build(0, &rows, &[]);
        let own = IndexMap::new();
        let position = IndexMap::new();

        let mut strategy = taker(5);
        strategy.fair_value.insert("X".into(), 110.0);
        let out = strategy.run(&snapshot.state("", &own, &position));

        assert!(!out.orders.contains_key("Y"));
        let x = &out.orders["X"];
        assert_eq!(x[0], Order::new("X", 102.0, 5));
        //second buy only gets what is left under the limit
        assert_eq!(x[1], Order::new("X", 101.0, 5));
        assert_eq!(x.len(), 2);
    }

    #[test]
    fn respects_position_limit() {
        let rows = vec![PriceRow::new(0, "X")
            .with_bids(&[(100.0, 20.0)])
            .with_asks(&[(101.0, 20.0)])
            .with_mid(100.5)];
        let snapshot = SnapshotBuilder::default().build(0, &rows, &[]);
        let own = IndexMap::new();
        let mut position = IndexMap::new();
        position.insert("X".to_string(), -4);

        let mut strategy = taker(5);
        strategy.fair_value.insert("X".into(), 90.0);
        let out = strategy.run(&snapshot.state("", &own, &position));

        let sold: i64 = out.orders["X"].iter().map(|o| o.quantity).sum();
        assert_eq!(sold, -6);
    }

    #[test]
    fn trader_data_roundtrips_fair_values() {
        let rows = vec![PriceRow::new(0, "X")
            .with_bids(&[(100.0, 1.0)])
            .with_asks(&[(102.0, 1.0)])
            .with_mid(101.0)];
        let snapshot = SnapshotBuilder::default().build(0, &rows, &[]);
        let own = IndexMap::new();
        let position = IndexMap::new();

        let mut first = taker(5);
        let out = first.run(&snapshot.state("", &own, &position));
        assert_eq!(first.fair_value("X"), Some(101.0));

        let mut resumed = taker(5);
        resumed.restore(&out.trader_data);
        assert_eq!(resumed.fair_value("X"), Some(101.0));
    }
}
