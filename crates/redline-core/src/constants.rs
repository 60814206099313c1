/// Redline system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Truncated hex length of content-addressed rule ids.
pub const RULE_ID_HEX_LEN: usize = 16;

/// Prefix for content-addressed rule ids.
pub const RULE_ID_PREFIX: &str = "rule-";

/// Maximum number of additional-context queries honored per agent iteration.
pub const MAX_ADDITIONAL_QUERIES: usize = 5;

/// Maximum keyword queries derived when the confidence floor overrides the model.
pub const MAX_KEYWORD_QUERIES: usize = 3;
