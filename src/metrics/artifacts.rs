use crate::engine::session::ReplayResult;
use anyhow::{Context, Result};
use chrono::Local;
use csv::Writer;
use std::path::{Path, PathBuf};
use tracing::debug;

//file name stamp for generated series
pub const STAMP_FORMAT: &str = "%d_%m_%Y_%H_%M_%S";

//writes per-product pnl and position series under a results directory
pub struct ArtifactWriter {
    root: PathBuf,
    stamp: String,
}

impl ArtifactWriter {
    //creates a writer stamped with the current local time
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ArtifactWriter::with_stamp(root, Local::now().format(STAMP_FORMAT).to_string())
    }

    pub fn with_stamp(root: impl Into<PathBuf>, stamp: impl Into<String>) -> Self {
        ArtifactWriter {
            root: root.into(),
            stamp: stamp.into(),
        }
    }

    //writes every series of a replay, returns the files created
    pub fn write(&self, result: &ReplayResult) -> Result<Vec<PathBuf>> {
        let pnl_dir = self.root.join("pnl");
        let positions_dir = self.root.join("positions");
        for dir in [&pnl_dir, &positions_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create results directory {:?}", dir))?;
        }

        let mut written = Vec::new();

        for (product, series) in &result.pnl_history {
            let path = pnl_dir.join(format!(
                "pnl_{}_{}_{}.csv",
                product, result.dataset, self.stamp
            ));
            write_series(
                &path,
                ["tick", "pnl"],
                series
                    .iter()
                    .map(|p| (p.tick.to_string(), p.pnl.to_string())),
            )?;
            written.push(path);
        }

        for (product, series) in &result.position_history {
            let path = positions_dir.join(format!(
                "positions_{}_{}_{}.csv",
                product, result.dataset, self.stamp
            ));
            write_series(
                &path,
                ["step", "position"],
                series
                    .iter()
                    .enumerate()
                    .map(|(step, position)| (step.to_string(), position.to_string())),
            )?;
            written.push(path);
        }

        debug!(files = written.len(), root = ?self.root, "artifacts written");
        Ok(written)
    }
}

fn write_series(
    path: &Path,
    header: [&str; 2],
    rows: impl Iterator<Item = (String, String)>,
) -> Result<()> {
    let mut writer =
        Writer::from_path(path).with_context(|| format!("Failed to create {:?}", path))?;
    writer.write_record(header)?;
    for (x, y) in rows {
        writer.write_record([x, y])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::PnlPoint;
    use indexmap::IndexMap;

    #[test]
    fn writes_pnl_and_position_series() {
        let dir = tempfile::tempdir().unwrap();

        let mut pnl_history = IndexMap::new();
        pnl_history.insert(
            "X".to_string(),
            vec![PnlPoint { tick: 0, pnl: -2.0 }, PnlPoint { tick: 100, pnl: 4.0 }],
        );
        let mut position_history = IndexMap::new();
        position_history.insert("X".to_string(), vec![0, 4]);
        position_history.insert("Y".to_string(), vec![0]);

        let result = ReplayResult {
            dataset: "prices_day_0.csv".into(),
            strategy: "test".into(),
            ticks: 2,
            total_pnl: 4.0,
            final_positions: IndexMap::new(),
            pnl_history,
            position_history,
            own_trades: Vec::new(),
        };

        let writer = ArtifactWriter::with_stamp(dir.path(), "01_01_2024_00_00_00");
        let files = writer.write(&result).unwrap();
        assert_eq!(files.len(), 3);

        let pnl = std::fs::read_to_string(
            dir.path()
                .join("pnl")
                .join("pnl_X_prices_day_0.csv_01_01_2024_00_00_00.csv"),
        )
        .unwrap();
        assert_eq!(pnl, "tick,pnl\n0,-2\n100,4\n");

        let positions = std::fs::read_to_string(
            dir.path()
                .join("positions")
                .join("positions_X_prices_day_0.csv_01_01_2024_00_00_00.csv"),
        )
        .unwrap();
        assert_eq!(positions, "step,position\n0,0\n1,4\n");
    }
}
