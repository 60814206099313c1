//! Vector retrieval: baseline hybrid search, query fusion, RRF.

pub mod fusion;
pub mod retriever;
pub mod rrf;
