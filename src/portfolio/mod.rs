pub mod tracker;

pub use tracker::{PnlPoint, PositionTracker};
