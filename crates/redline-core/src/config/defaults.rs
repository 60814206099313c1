//! Default values for tunable parameters.

pub const DEFAULT_MODEL_NAME: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f64 = 0.0;

pub const DEFAULT_INITIAL_RETRIEVAL_COUNT: usize = 75;
pub const DEFAULT_FINAL_TOP_K: usize = 15;
pub const DEFAULT_SPARSE_TOP_K: usize = 10;
pub const DEFAULT_RERANK_SCORE_THRESHOLD: f64 = 0.10;
pub const DEFAULT_AGGREGATED_RULE_LIMIT: usize = 40;
pub const DEFAULT_MAX_AGENT_ITERATIONS: usize = 3;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 15;

/// RRF damping constant. Flattens rank-position impact across
/// heterogeneous queries.
pub const DEFAULT_RRF_K: u32 = 60;

pub const DEFAULT_NUM_FUSION_QUERIES: usize = 3;
pub const DEFAULT_MAX_VIOLATION_TERMS: usize = 5;

/// Retrieval-result cache capacity (entries).
pub const DEFAULT_QUERY_CACHE_CAPACITY: u64 = 2_048;

/// Per-call timeout applied by the remote HTTP client.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
