use crate::engine::session::ReplayResult;
use crate::portfolio::PnlPoint;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary metrics for one product over a replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product: String,
    pub final_pnl: f64,
    pub final_position: i64,
    pub num_trades: usize,
    pub volume_traded: i64,
    pub max_drawdown: f64,
    pub mean_pnl_change: f64,
    pub pnl_change_std: f64,
}

//summary metrics for a replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub dataset: String,
    pub strategy: String,
    pub ticks: usize,
    pub total_pnl: f64,
    pub products: Vec<ProductSummary>,
}

impl ReplaySummary {
    //calculate summary metrics from a finished replay
    pub fn from_result(result: &ReplayResult) -> Self {
        let final_pnl = result.product_pnl();
        let products = result
            .final_positions
            .iter()
            .map(|(product, &final_position)| {
                let series = result
                    .pnl_history
                    .get(product)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let changes = pnl_changes(series);

                let (num_trades, volume_traded) = result
                    .own_trades
                    .iter()
                    .filter(|t| &t.symbol == product)
                    .fold((0, 0), |(n, v), t| (n + 1, v + t.quantity.abs()));

                ProductSummary {
                    product: product.clone(),
                    final_pnl: final_pnl.get(product).copied().unwrap_or(0.0),
                    final_position,
                    num_trades,
                    volume_traded,
                    max_drawdown: max_drawdown(series),
                    mean_pnl_change: if changes.is_empty() { 0.0 } else { changes.iter().mean() },
                    pnl_change_std: if changes.len() < 2 { 0.0 } else { changes.iter().std_dev() },
                }
            })
            .collect();

        ReplaySummary {
            dataset: result.dataset.clone(),
            strategy: result.strategy.clone(),
            ticks: result.ticks,
            total_pnl: result.total_pnl,
            products,
        }
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![
            Cell::new("Product"),
            Cell::new("PnL"),
            Cell::new("Position"),
            Cell::new("Trades"),
            Cell::new("Volume"),
            Cell::new("Max Drawdown"),
            Cell::new("Mean dPnL"),
            Cell::new("Std dPnL"),
        ]));

        for p in &self.products {
            table.add_row(Row::new(vec![
                Cell::new(&p.product),
                Cell::new(&format!("{:.2}", p.final_pnl)),
                Cell::new(&format!("{}", p.final_position)),
                Cell::new(&format!("{}", p.num_trades)),
                Cell::new(&format!("{}", p.volume_traded)),
                Cell::new(&format!("{:.2}", p.max_drawdown)),
                Cell::new(&format!("{:.3}", p.mean_pnl_change)),
                Cell::new(&format!("{:.3}", p.pnl_change_std)),
            ]));
        }

        table.add_row(Row::new(vec![
            Cell::new("Total"),
            Cell::new(&format!("{:.2}", self.total_pnl)),
        ]));

        table.printstd();
    }
}

//tick to tick differences of a pnl series
pub fn pnl_changes(series: &[PnlPoint]) -> Vec<f64> {
    series.windows(2).map(|w| w[1].pnl - w[0].pnl).collect()
}

//largest peak to trough fall of a pnl series, in currency units
pub fn max_drawdown(series: &[PnlPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0f64;
    for point in series {
        peak = peak.max(point.pnl);
        worst = worst.max(peak - point.pnl);
    }
    worst
}
