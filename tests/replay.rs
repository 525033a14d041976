use indexmap::IndexMap;
use shellsim::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};

const PRICES: &str = "\
day;timestamp;product;bid_price_1;bid_volume_1;bid_price_2;bid_volume_2;bid_price_3;bid_volume_3;ask_price_1;ask_volume_1;ask_price_2;ask_volume_2;ask_price_3;ask_volume_3;mid_price;profit_and_loss
0;0;X;10;5;9;3;;;11;4;12;6;;;10.5;0.0
0;0;Y;101;5;100;4;99;10;103;2;104;2;105;2;102.0;0.0
0;0;DOLPHIN_SIGHTINGS;;;;;;;;;;;;;3000.0;0.0
0;100;X;10;5;9;3;;;11;4;12;6;;;11.0;0.0
0;100;DOLPHIN_SIGHTINGS;;;;;;;;;;;;;3001.0;0.0
0;200;X;12;2;;;;;13;2;;;;;12.5;0.0
0;200;Y;100;5;;;;;102;1;;;;;101.0;0.0
";

const TRADES: &str = "\
timestamp;buyer;seller;symbol;currency;price;quantity
0;;;X;SEASHELLS;10.0;2
200;;;Y;SEASHELLS;101.0;1
";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn load(dir: &Path) -> MarketData {
    let prices = write(dir, "prices.csv", PRICES);
    let trades = write(dir, "trades.csv", TRADES);
    MarketData::load(&prices, &trades, b';').unwrap()
}

//sends a fixed script of orders keyed by tick
struct Scripted {
    script: IndexMap<Tick, Vec<Order>>,
    market_trades_seen: usize,
    observations_seen: Vec<f64>,
}

impl Scripted {
    fn new(script: Vec<(Tick, Order)>) -> Self {
        let mut by_tick: IndexMap<Tick, Vec<Order>> = IndexMap::new();
        for (tick, order) in script {
            by_tick.entry(tick).or_default().push(order);
        }
        Scripted {
            script: by_tick,
            market_trades_seen: 0,
            observations_seen: Vec::new(),
        }
    }
}

impl Strategy for Scripted {
    fn run(&mut self, state: &TickState) -> StrategyOutput {
        self.market_trades_seen += state.market_trades.values().map(Vec::len).sum::<usize>();
        if let Some(value) = state.observation("DOLPHIN_SIGHTINGS") {
            self.observations_seen.push(value);
        }

        let mut orders: IndexMap<String, Vec<Order>> = IndexMap::new();
        for order in self.script.get(&state.timestamp).cloned().unwrap_or_default() {
            orders.entry(order.symbol.clone()).or_default().push(order);
        }
        StrategyOutput::with_orders(orders)
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}

#[test]
fn buy_fills_at_touch_and_marks_to_mid() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ReplaySession::new(load(dir.path()), SessionConfig::default());
    let mut strategy = Scripted::new(vec![(0, Order::new("X", 11.0, 4))]);

    let result = session.run(&mut strategy).unwrap();

    assert_eq!(result.own_trades, vec![Trade::own("X", 11.0, 4, 0)]);
    assert_eq!(session.tracker().position("X"), 4);
    assert_eq!(session.tracker().cash_profit("X"), Some(-44.0));
    assert_eq!(result.pnl_history["X"][0], PnlPoint { tick: 0, pnl: -2.0 });
    //marked at 11.0 then 12.5
    assert_eq!(result.pnl_history["X"].len(), 3);
    assert_eq!(result.total_pnl, -44.0 + 12.5 * 4.0);
}

#[test]
fn sell_sweeps_two_levels_and_leaves_the_third() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ReplaySession::new(load(dir.path()), SessionConfig::default());
    let mut strategy = Scripted::new(vec![(0, Order::new("Y", 99.0, -7))]);

    let result = session.run(&mut strategy).unwrap();

    let fills: Vec<(f64, i64)> = result.own_trades.iter().map(|t| (t.price, t.quantity)).collect();
    assert_eq!(fills, vec![(101.0, -5), (100.0, -2)]);
    assert_eq!(result.final_positions["Y"], -7);
}

#[test]
fn product_missing_from_a_tick_leaves_a_gap() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ReplaySession::new(load(dir.path()), SessionConfig::default());
    let mut strategy = Scripted::new(vec![(0, Order::new("Y", 103.0, 1))]);

    let result = session.run(&mut strategy).unwrap();

    //y is not quoted at tick 100
    let ticks: Vec<Tick> = result.pnl_history["Y"].iter().map(|p| p.tick).collect();
    assert_eq!(ticks, vec![0, 200]);
    assert_eq!(result.pnl_history["Y"][1].pnl, -103.0 + 101.0);
}

#[test]
fn observations_and_market_trades_reach_the_strategy() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ReplaySession::new(load(dir.path()), SessionConfig::default());
    let mut strategy = Scripted::new(Vec::new());

    let result = session.run(&mut strategy).unwrap();

    assert_eq!(strategy.observations_seen, vec![3000.0, 3001.0]);
    assert_eq!(strategy.market_trades_seen, 2);
    assert!(result.own_trades.is_empty());
    assert_eq!(result.total_pnl, 0.0);
    assert!(!result.position_history.contains_key("DOLPHIN_SIGHTINGS"));
}

#[test]
fn legacy_fills_overconsume_the_book() {
    let dir = tempfile::tempdir().unwrap();
    let config = SessionConfig {
        remainder_rule: RemainderRule::Legacy,
        ..Default::default()
    };
    let mut session = ReplaySession::new(load(dir.path()), config);
    let mut strategy = Scripted::new(vec![(0, Order::new("Y", 105.0, 3))]);

    let result = session.run(&mut strategy).unwrap();

    let bought: i64 = result.own_trades.iter().map(|t| t.quantity).sum();
    assert_eq!(bought, 6);
}

#[test]
fn identical_replays_give_identical_pnl() {
    let dir = tempfile::tempdir().unwrap();
    let data = load(dir.path());

    let config = ReplayConfiguration {
        strategy_type: StrategyType::MarketMaker,
        ..Default::default()
    };

    let run = |data: MarketData| {
        let mut strategy = build_strategy(&config);
        let mut session = ReplaySession::new(data, config.session_config());
        session.run(strategy.as_mut()).unwrap()
    };

    let first = run(data.clone());
    let second = run(data);
    assert_eq!(first.total_pnl, second.total_pnl);
    assert_eq!(first.own_trades, second.own_trades);
    assert_eq!(first.pnl_history, second.pnl_history);
}

#[test]
fn summary_and_artifacts_from_a_replay() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ReplaySession::new(load(dir.path()), SessionConfig::default());
    let mut strategy = Scripted::new(vec![(0, Order::new("X", 11.0, 4))]);
    let result = session.run(&mut strategy).unwrap();

    let summary = ReplaySummary::from_result(&result);
    assert_eq!(summary.total_pnl, result.total_pnl);
    assert_eq!(summary.products[0].product, "X");
    assert_eq!(summary.products[0].final_position, 4);

    let out = dir.path().join("results");
    let files = ArtifactWriter::with_stamp(&out, "stamp").write(&result).unwrap();
    assert!(files.iter().all(|f| f.exists()));
    assert!(out.join("pnl").is_dir());
    assert!(out.join("positions").is_dir());
}
