//! # redline-remote
//!
//! reqwest-backed implementations of the collaborator contracts:
//! vector-index query, generative completion, semantic rank, and rule
//! catalog. Every call goes through one shared [`http::HttpClient`]
//! carrying the versioned request envelope, optional bearer auth, and
//! the per-call timeout.

pub mod catalog;
pub mod generative;
pub mod http;
pub mod ranker;
pub mod vector_index;

pub use catalog::RemoteRuleCatalog;
pub use generative::RemoteGenerativeModel;
pub use ranker::RemoteSemanticRanker;
pub use vector_index::RemoteVectorIndex;
