use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = ItmlError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ItmlError {
    /// A zero-indent line that is neither a comment, an import nor `id: type`.
    #[error("line {line}: expected `identifier: type`, found {text:?}")]
    MalformedIdentifierLine { line: usize, text: String },

    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("import cycle: {} is already being imported", path.display())]
    ImportCycle { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid render context: {0}")]
    Context(#[from] serde_json::Error),

    /// Error raised by the rendering collaborator, passed through unchanged.
    #[error(transparent)]
    TemplateRender(Box<dyn StdError + Send + Sync + 'static>),
}

impl ItmlError {
    pub(crate) fn read(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => ItmlError::FileNotFound { path },
            _ => ItmlError::Io { path, source },
        }
    }

    pub fn render<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ItmlError::TemplateRender(Box::new(error))
    }
}

impl From<minijinja::Error> for ItmlError {
    fn from(error: minijinja::Error) -> Self {
        ItmlError::render(error)
    }
}
