pub mod decode;
pub mod ingest;
pub mod summarize;
pub mod validate;

pub use ingest::{extract_summary, ingest};
