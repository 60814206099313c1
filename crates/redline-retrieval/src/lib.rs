//! # redline-retrieval
//!
//! Candidate gathering for the audit pipeline: the three source types
//! (vector / trigger / pattern) behind one capability trait, reciprocal
//! rank fusion for heterogeneous query results, and the best-effort
//! rerank stage.

pub mod gather;
pub mod ranking;
pub mod search;
pub mod sources;

pub use gather::{GatherOutcome, RuleGatherer};
pub use ranking::RerankStage;
pub use search::retriever::VectorRetriever;
pub use sources::RuleSource;
