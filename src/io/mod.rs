//! Input/output helpers.
//!
//! - CSV sample ingest (`ingest`)
//! - residual CSV export (`export`)
//! - fit JSON read/write and dense curve grids (`curve`)

pub mod curve;
pub mod export;
pub mod ingest;

pub use curve::*;
pub use export::*;
pub use ingest::*;
