use tracing::Level;

/// How log lines are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// Human readable lines, colored when stdout is a terminal.
    #[default]
    Plain,
    /// One JSON object per event.
    Json,
}

impl Format {
    pub fn json(enabled: bool) -> Self {
        if enabled { Self::Json } else { Self::Plain }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Filter directives, see
    /// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
    pub(crate) env_filter: String,
    /// Events at or above this level go to stderr instead of stdout. Only
    /// errors do when unset.
    pub(crate) stderr_threshold: Option<Level>,
    pub(crate) format: Format,
}

impl Config {
    pub fn new(env_filter: &str, stderr_threshold: Option<Level>, format: Format) -> Self {
        Self {
            env_filter: env_filter.to_owned(),
            stderr_threshold,
            format,
        }
    }

    /// Plain output to stdout filtered by `env_filter`.
    pub fn plain(env_filter: &str) -> Self {
        Self::new(env_filter, None, Format::Plain)
    }
}
