pub mod aggregate;
mod index;
mod loader;
pub mod record;

pub use index::{Catalog, IdentityKey, ResultIndex};
pub use loader::{load_record, load_records};
pub use record::{
    EvaluationRecord, FileStats, MetricValue, RawMetrics, Signature, Structure, ToolMeta,
};
