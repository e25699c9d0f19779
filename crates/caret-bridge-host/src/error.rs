//! Error types for the host side.

use std::path::PathBuf;

use miette::Diagnostic;

/// Errors raised while setting up the host.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum HostError {
    /// Config file could not be read
    #[error("failed to read {}", path.display())]
    #[diagnostic(code(caret_bridge::host::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid KDL
    #[error("invalid KDL: {0}")]
    #[diagnostic(code(caret_bridge::host::kdl))]
    Kdl(#[from] kdl::KdlError),

    /// A config node holds a value of the wrong type
    #[error("config node `{node}` expects {expected}")]
    #[diagnostic(
        code(caret_bridge::host::config),
        help("see HostConfig for the supported nodes and their types")
    )]
    InvalidValue {
        node: String,
        expected: &'static str,
    },
}
