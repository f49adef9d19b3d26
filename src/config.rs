use std::time::Duration;

/// Chrome 86 on Linux, a common desktop identity that most stream servers accept
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/86.0.4240.198 Safari/537.36";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_PARALLELISM: usize = 64;

/// Knobs for a [`crate::M3uParser`]
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Per-probe timeout for liveness checks
    pub timeout: Duration,
    /// `User-Agent` header sent with every request
    pub user_agent: String,
    /// Probe every network location and record whether it answered
    pub check_live: bool,
    /// Keep every field in the output, using `null` for empty values
    pub enforce_schema: bool,
    /// Upper bound of liveness probes in flight at once
    pub parallelism: usize,
    /// Draw progress bars on stderr
    pub show_progress: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            check_live: false,
            enforce_schema: false,
            parallelism: DEFAULT_PARALLELISM,
            show_progress: false,
        }
    }
}
