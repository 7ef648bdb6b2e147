//! Error types.
//!
//! Gating itself never fails: every error here either describes why a
//! request was redirected or comes from loading configuration.

use thiserror::Error;

/// Failure of the external session lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The auth backend could not be reached or answered with an error.
    #[error("session backend unavailable: {0}")]
    Unavailable(String),

    /// The credential could not be decoded.
    #[error("malformed credential: {0}")]
    MalformedCredential(String),
}

/// Why a request did not get the subtree it asked for.
///
/// None of these reach the end user; each ends in a defined redirect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No session, or a session the auth collaborator marked invalid.
    #[error("no valid session")]
    Unauthenticated,

    /// The session is valid but its role is outside the enumeration.
    #[error("unrecognized role {0:?}")]
    UnknownRole(Option<String>),

    /// The session lookup itself errored; gating treats it as
    /// `Unauthenticated`.
    #[error("session lookup failed: {0}")]
    ResolverFailure(#[from] SessionError),
}

/// Errors from loading a gate layout.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// The layout file could not be read.
    #[error("failed to read layout: {0}")]
    Io(#[from] std::io::Error),

    /// The layout is not valid YAML or has the wrong shape.
    #[error("failed to parse layout: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A declared subtree path does not start with `/`.
    #[error("subtree path must be absolute: {0:?}")]
    RelativePath(String),

    /// The same subtree is declared twice.
    #[error("subtree declared more than once: {0}")]
    DuplicateSubtree(String),
}

/// Errors from reading environment configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable holds a value that does not parse.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// The variable name.
        key: &'static str,
        /// Parser message.
        message: String,
    },

    /// The configured layout file failed to load.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}
