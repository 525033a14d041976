pub mod fill;
pub mod order;
pub mod session;
pub mod snapshot;

pub use fill::{FillSimulator, RemainderRule};
pub use order::{Order, Trade};
pub use session::{ReplayResult, ReplaySession, SessionConfig, SessionError, SessionState};
pub use snapshot::{SnapshotBuilder, TickSnapshot};
