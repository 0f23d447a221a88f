use std::{io, path::PathBuf};

use crate::types::{Method, Platform};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad or missing arguments. The driver prints the usage text for these.
    #[error("{0}")]
    Usage(String),

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` failed ({})", describe_exit(.code))]
    CommandFailed { program: String, code: Option<i32> },

    #[error("No build for Xcode version {xcode_version} found in {version} release package")]
    MissingXcodeBuild {
        xcode_version: String,
        version: String,
    },

    #[error("Missing XCFramework to test in {}", .0.display())]
    MissingXcframework(PathBuf),

    #[error("Static build configuration has {0} embedded framework(s)")]
    StaticHasFrameworks(usize),

    #[error("Dynamic build configuration is missing embedded frameworks")]
    DynamicMissingFrameworks,

    #[error("invalid release version {value:?} returned by {url}")]
    InvalidReleaseVersion { value: String, url: String },

    #[error("no Swift package requirement found in {}", .0.display())]
    PackageRequirementNotFound(PathBuf),

    #[error("{method} does not support platform {platform}")]
    UnsupportedPlatform { method: Method, platform: Platform },

    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Glob(#[from] glob::PatternError),

    #[error("failed to scan archive: {0}")]
    GlobScan(#[from] glob::GlobError),
}

impl Error {
    pub(crate) fn file(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Error {
        let path = path.into();
        move |source| Error::File { path, source }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".into(),
    }
}
