use crate::config::MarketMakerParams;
use crate::data::TickState;
use crate::engine::order::Order;
use crate::strategy::{legal_volumes, Strategy, StrategyOutput};
use indexmap::IndexMap;

//spread market maker
//quotes one tick inside the touch whenever the spread is wide enough,
//optionally only while an observation signal stays under a threshold
#[derive(Debug, Clone)]
pub struct SpreadMarketMaker {
    params: MarketMakerParams,
    limits: IndexMap<String, i64>,
    default_limit: i64,
}

impl SpreadMarketMaker {
    pub fn new(params: MarketMakerParams, limits: IndexMap<String, i64>, default_limit: i64) -> Self {
        SpreadMarketMaker {
            params,
            limits,
            default_limit,
        }
    }

    fn limit(&self, product: &str) -> i64 {
        self.limits.get(product).copied().unwrap_or(self.default_limit)
    }

    //true when quoting is allowed this tick
    fn gate_open(&self, state: &TickState) -> bool {
        match &self.params.gate {
            None => true,
            Some(gate) => state
                .observation(&gate.observation)
                .map(|value| value < gate.below)
                .unwrap_or(false),
        }
    }

    fn quote(&self, product: &str, state: &TickState) -> Vec<Order> {
        let Some(depth) = state.depth(product) else {
            return Vec::new();
        };
        let (Some((bid, _)), Some((ask, _))) = (depth.best_bid(), depth.best_ask()) else {
            return Vec::new();
        };
        if ask - bid < self.params.min_spread {
            return Vec::new();
        }

        let (buy_room, sell_room) = legal_volumes(state.position_of(product), self.limit(product));
        let clip = self.params.clip as i64;

        let mut orders = Vec::with_capacity(2);
        let bid_size = clip.min(buy_room);
        if bid_size > 0 {
            orders.push(Order::new(product, bid + 1.0, bid_size));
        }
        let ask_size = clip.min(sell_room);
        if ask_size > 0 {
            orders.push(Order::new(product, ask - 1.0, -ask_size));
        }
        orders
    }
}

impl Strategy for SpreadMarketMaker {
    fn run(&mut self, state: &TickState) -> StrategyOutput {
        let mut orders = IndexMap::new();

        if self.gate_open(state) {
            for product in state.products() {
                if !self.params.products.is_empty()
                    && !self.params.products.iter().any(|p| p == product)
                {
                    continue;
                }
                orders.insert(product.to_string(), self.quote(product, state));
            }
        }

        StrategyOutput::with_orders(orders)
    }

    fn name(&self) -> &str {
        "Spread Market Maker"
    }
}
