//! Collaborator contracts the core depends on.
//!
//! All four are external services from the pipeline's point of view:
//! implemented over HTTP by `redline-remote` and in memory by
//! `test-fixtures`. Every trait is object-safe; components hold them as
//! `Arc<dyn ...>`.

mod catalog;
mod generative;
mod ranker;
mod vector_index;

pub use catalog::IRuleCatalog;
pub use generative::IGenerativeModel;
pub use ranker::{ISemanticRanker, RankRecord, RankedRecord};
pub use vector_index::IVectorIndex;
