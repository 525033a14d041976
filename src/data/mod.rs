pub mod book;
pub mod loader;
pub mod rows;
pub mod state;

pub use book::{BookLevel, OrderDepth, ProductBook, MAX_LEVELS};
pub use loader::{dataset_name, load_prices, load_trades, pair_paths, MarketData};
pub use rows::{PriceRow, Tick, TradeRow};
pub use state::{Listing, TickState};
