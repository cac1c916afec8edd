/*!
 * Error types for the ezdrama pipeline.
 *
 * Recoverable problems (a single malformed line, a heading without a valid
 * ancestor) are logged and absorbed inside their stage. The types here cover
 * the failures that abort a stage and surface to the caller.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a PAGE-XML document
#[derive(Error, Debug)]
pub enum PageError {
    /// The file could not be read
    #[error("Failed to read PAGE file {path:?}: {source}")]
    Io {
        /// Offending file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not well-formed XML
    #[error("Failed to parse PAGE XML {path:?}: {message}")]
    Xml {
        /// Offending file
        path: PathBuf,
        /// Parser message
        message: String,
    },
}

/// Errors raised while rendering the TEI document
#[derive(Error, Debug)]
pub enum SerializeError {
    /// The rendered text no longer parses as XML.
    /// The full rendering is kept for diagnosis.
    #[error("Rendered TEI is not well-formed: {reason}")]
    MalformedOutput {
        /// Parser message
        reason: String,
        /// The rendering that failed to parse
        content: String,
    },
}

impl SerializeError {
    /// The rendering that failed verification
    pub fn content(&self) -> &str {
        match self {
            Self::MalformedOutput { content, .. } => content,
        }
    }
}
