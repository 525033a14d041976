use crate::data::rows::{PriceRow, TradeRow};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

//historical prices and trades for one replay day
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    //dataset name used in artifact file names
    pub name: String,
    pub prices: Vec<PriceRow>,
    pub trades: Vec<TradeRow>,
}

impl MarketData {
    pub fn new(name: impl Into<String>, prices: Vec<PriceRow>, trades: Vec<TradeRow>) -> Self {
        MarketData {
            name: name.into(),
            prices,
            trades,
        }
    }

    //loads a prices file and its matching trades file
    pub fn load(prices_path: &Path, trades_path: &Path, delimiter: u8) -> Result<Self> {
        let prices = load_prices(prices_path, delimiter)?;
        let trades = load_trades(trades_path, delimiter)?;
        Ok(MarketData::new(dataset_name(prices_path), prices, trades))
    }
}

//artifact-safe name for a dataset path
pub fn dataset_name(path: &Path) -> String {
    path.to_string_lossy().replace(['/', '\\'], "_")
}

//loads price rows from a delimited file
pub fn load_prices<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Vec<PriceRow>> {
    let mut rows: Vec<PriceRow> = load_rows(path.as_ref(), delimiter)?;

    //stable sort keeps the file's product order within a tick
    rows.sort_by_key(|row| row.timestamp);
    Ok(rows)
}

//loads observed market trades from a delimited file
pub fn load_trades<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Vec<TradeRow>> {
    let mut rows: Vec<TradeRow> = load_rows(path.as_ref(), delimiter)?;
    rows.sort_by_key(|row| row.timestamp);
    Ok(rows)
}

fn load_rows<T: DeserializeOwned>(path: &Path, delimiter: u8) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize().enumerate() {
        let row: T = result.context(format!(
            "Failed to parse CSV record at line {} of {:?}",
            index + 2,
            path
        ))?;
        rows.push(row);
    }

    Ok(rows)
}

//pairs of prices/trades files given on the command line
pub fn pair_paths(prices: &[PathBuf], trades: &[PathBuf]) -> Result<Vec<(PathBuf, PathBuf)>> {
    if prices.len() != trades.len() {
        anyhow::bail!(
            "Got {} prices files but {} trades files, they must pair up",
            prices.len(),
            trades.len()
        );
    }
    Ok(prices.iter().cloned().zip(trades.iter().cloned()).collect())
}
