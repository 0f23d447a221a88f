//! Archiving the example app and checking how the library was linked.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    cmd::Runner,
    driver::Driver,
    error::Error,
    net::Network,
    package::PACKAGE_PROJECT,
    types::{Case, Method},
};

const CODE_SIGNING_ARGS: &[&str] = &[
    "CODE_SIGN_IDENTITY=",
    "CODE_SIGNING_REQUIRED=NO",
    "AD_HOC_CODE_SIGNING_ALLOWED=YES",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Project {
    Workspace(&'static str),
    Project(&'static str),
}

impl Project {
    fn args(&self) -> [&'static str; 2] {
        match self {
            Project::Workspace(path) => ["-workspace", *path],
            Project::Project(path) => ["-project", *path],
        }
    }
}

/// Project and scheme that consume the library for `case`.
pub fn project_and_scheme(case: &Case) -> (Project, &'static str) {
    match case.method {
        Method::Cocoapods => (Project::Workspace("CocoaPods.xcworkspace"), "App"),
        Method::Carthage => (Project::Project("Carthage.xcodeproj"), "App"),
        Method::Spm => (Project::Project(PACKAGE_PROJECT), "App"),
        Method::Xcframework if case.is_static() => (
            Project::Project("Static/StaticExample.xcodeproj"),
            "StaticExample",
        ),
        Method::Xcframework => (Project::Project("XCFramework.xcodeproj"), "App"),
    }
}

impl<R: Runner, N: Network> Driver<R, N> {
    /// Archives the example app for `case` into a fresh `out.xcarchive`.
    pub fn build_app(&self, case: &Case) -> Result<(), Error> {
        let archive = self.layout.archive_path();
        remove_if_exists(&archive)?;

        let (project, scheme) = project_and_scheme(case);

        let mut cmd = self
            .command("xcodebuild", case)
            .args(project.args())
            .args(["-scheme", scheme, "clean", "archive", "-archivePath"])
            .arg(&archive);
        if let Some((sdk, destination)) = case.platform.sdk_and_destination() {
            if let Some(sdk) = sdk {
                cmd = cmd.args(["-sdk", sdk]);
            }
            cmd = cmd.args(["-destination", destination]);
        }
        let cmd = cmd.args(CODE_SIGNING_ARGS);

        self.runner.status(&cmd)
    }
}

/// Removes `path` whether it is a directory, a file or a dangling symlink.
pub(crate) fn remove_if_exists(path: &Path) -> Result<(), Error> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::file(path)(e)),
    };
    log::debug!("Deleting {}", path.display());
    if metadata.is_dir() {
        fs::remove_dir_all(path).map_err(Error::file(path))
    } else {
        fs::remove_file(path).map_err(Error::file(path))
    }
}

/// Framework bundles embedded in the archived applications.
pub fn embedded_frameworks(archive: &Path) -> Result<Vec<PathBuf>, Error> {
    let pattern = format!(
        "{}/Products/Applications/**/Frameworks/*.framework",
        glob::Pattern::escape(&archive.to_string_lossy())
    );
    let frameworks = glob::glob(&pattern)?.collect::<Result<Vec<_>, _>>()?;
    Ok(frameworks)
}

/// Static builds must not embed any framework, dynamic builds must embed at
/// least one.
pub fn validate_build(archive: &Path, is_static: bool) -> Result<(), Error> {
    let frameworks = embedded_frameworks(archive)?;
    log::debug!("Embedded frameworks: {:?}", frameworks);

    match (is_static, frameworks.len()) {
        (true, 0) | (false, 1..) => Ok(()),
        (true, count) => Err(Error::StaticHasFrameworks(count)),
        (false, _) => Err(Error::DynamicMissingFrameworks),
    }
}
