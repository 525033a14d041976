pub mod artifacts;
pub mod summary;

pub use artifacts::ArtifactWriter;
pub use summary::{ProductSummary, ReplaySummary};
