//! Error types for scene parsing and registry management.

// std
use std::fmt;
use std::path::PathBuf;
// others
use thiserror::Error;

/// Position of a token inside a scene source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// Scene file the token was read from, `<string>` for in-memory
    /// sources.
    pub file: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub col: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, col: usize) -> Self {
        Location {
            file: file.into(),
            line,
            col,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

/// Errors that can occur while building or parsing a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    /// A directive has no factory in either registry.
    #[error("{location}: unknown directive '{directive}'")]
    UnknownDirective {
        directive: String,
        location: Location,
    },

    /// Token stream exhausted early, or a token could not be read as
    /// the expected value.
    #[error("{location}: malformed '{directive}': {message}")]
    MalformedScene {
        directive: String,
        location: Location,
        message: String,
    },

    /// A referenced scene file could not be opened or parsed.
    #[error("{location}: '{directive}' cannot load {}", path.display())]
    MissingReference {
        directive: String,
        location: Location,
        path: PathBuf,
        #[source]
        source: Box<SceneError>,
    },

    /// A referenced scene file (transitively) references itself.
    #[error("{location}: '{directive}' references {} which is already being parsed", path.display())]
    CyclicReference {
        directive: String,
        location: Location,
        path: PathBuf,
        /// Files being parsed when the cycle was found, outermost first.
        chain: Vec<PathBuf>,
    },

    /// Second registration of a directive in the same family.
    #[error("{family} directive '{directive}' is already registered")]
    DuplicateDirective {
        family: &'static str,
        directive: String,
    },

    #[error("directive registries have not been initialized")]
    RegistryUninitialized,

    #[error("directive registries have been torn down")]
    RegistryTornDown,

    /// I/O error reading a scene file.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SceneError {
    pub fn malformed(
        directive: impl Into<String>,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        SceneError::MalformedScene {
            directive: directive.into(),
            location,
            message: message.into(),
        }
    }

    /// The location the error was reported at, if it stems from a
    /// scene source.
    pub fn location(&self) -> Option<&Location> {
        match self {
            SceneError::UnknownDirective { location, .. }
            | SceneError::MalformedScene { location, .. }
            | SceneError::MissingReference { location, .. }
            | SceneError::CyclicReference { location, .. } => Some(location),
            _ => None,
        }
    }
}

/// Result alias for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;
