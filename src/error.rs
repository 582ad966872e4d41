//! Error types for the LMFDB web layer

use thiserror::Error;

/// Result type alias for LMFDB web operations
pub type Result<T> = std::result::Result<T, LmfdbError>;

/// Error types that can occur while serving a request
#[derive(Error, Debug, Clone)]
pub enum LmfdbError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{label} is not a valid label: {reason}")]
    InvalidLabel { label: String, reason: String },

    #[error("Search input error: {0}")]
    SearchInput(String),

    #[error("{0} is not in the database")]
    NotInDatabase(String),

    #[error("Unable to construct L-function: {0}")]
    Construction(#[from] BuildError),

    #[error("Plot store miss: {0}")]
    PlotStoreMiss(String),

    #[error("Plot rendering error: {0}")]
    PlotError(String),

    #[error("Document store error: {0}")]
    StoreError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for LmfdbError {
    fn from(err: std::io::Error) -> Self {
        LmfdbError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for LmfdbError {
    fn from(err: serde_json::Error) -> Self {
        LmfdbError::ParseError(err.to_string())
    }
}

impl LmfdbError {
    /// Convert error to HTTP status code
    ///
    /// Input and lookup problems are shown to the user as ordinary pages, so
    /// they map to 200. Only defects and infrastructure failures become 5xx.
    pub fn to_http_status(&self) -> u16 {
        match self {
            LmfdbError::InvalidLabel { .. } => 200,
            LmfdbError::SearchInput(_) => 200,
            LmfdbError::NotInDatabase(_) => 200,
            LmfdbError::Construction(err) if err.is_recoverable() => 200,
            LmfdbError::Construction(_) => 500,

            // Never surfaced directly: the renderer falls back first
            LmfdbError::PlotStoreMiss(_) => 404,

            LmfdbError::ParseError(_) => 400,
            LmfdbError::ConfigError(_) => 500,
            LmfdbError::PlotError(_) => 500,
            LmfdbError::StoreError(_) => 500,
            LmfdbError::IoError(_) => 500,
            LmfdbError::InternalError(_) => 500,
        }
    }

    /// Whether this error means "use the directly computed plot instead"
    ///
    /// A missing plot store file, a missing row or a malformed row are all
    /// normal conditions for the cached plot path.
    pub fn falls_back_to_direct_plot(&self) -> bool {
        matches!(self, LmfdbError::PlotStoreMiss(_))
    }

    /// Messages to flash on the search-input-error page
    pub fn flash_message(&self) -> String {
        match self {
            LmfdbError::InvalidLabel { label, reason } => format!(
                "Error: <span style='color:black'>{}</span> is not a valid label: {}.",
                label, reason
            ),
            LmfdbError::NotInDatabase(label) => format!(
                "Error: <span style='color:black'>{}</span> is not in the database.",
                label
            ),
            other => format!("Error: {}", other),
        }
    }

    /// Create an InvalidLabel error
    pub fn invalid_label(label: impl Into<String>, reason: impl Into<String>) -> Self {
        LmfdbError::InvalidLabel {
            label: label.into(),
            reason: reason.into(),
        }
    }
}

/// Failure raised while constructing an L-function descriptor
///
/// `Value`, `Key` and `Type` are input problems and are rendered to the user
/// as a list of messages. `Defect` is a programming error and propagates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("value error: {}", .0.join("; "))]
    Value(Vec<String>),

    #[error("key error: {}", .0.join("; "))]
    Key(Vec<String>),

    #[error("type error: {}", .0.join("; "))]
    Type(Vec<String>),

    #[error("defect: {0}")]
    Defect(String),
}

impl BuildError {
    pub fn value(msg: impl Into<String>) -> Self {
        BuildError::Value(vec![msg.into()])
    }

    pub fn key(msg: impl Into<String>) -> Self {
        BuildError::Key(vec![msg.into()])
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        BuildError::Type(vec![msg.into()])
    }

    /// Whether the route boundary should turn this into an error page
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, BuildError::Defect(_))
    }

    /// The messages carried by this error, one per bullet item
    pub fn args(&self) -> &[String] {
        match self {
            BuildError::Value(args) | BuildError::Key(args) | BuildError::Type(args) => args,
            BuildError::Defect(msg) => std::slice::from_ref(msg),
        }
    }

    /// Render the user-facing HTML explanation
    pub fn render_html(&self) -> String {
        let args = self.args();
        if args.is_empty() {
            return format!(
                "Unable to render L-function page due to the following problem:<br><ul><li>{}</li></ul>",
                self
            );
        }
        let items: String = args.iter().map(|msg| format!("<li>{}</li>", msg)).collect();
        format!(
            "Unable to render L-function page due to the following problem(s):<br><ul>{}</ul>",
            items
        )
    }
}
