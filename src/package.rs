//! The SwiftPM example project.
//!
//! The real project lives in `SwiftPackageManager.notxcodeproj` so that
//! Carthage does not discover it (and fetch its package dependencies) while
//! scanning the checkout. The `spm` method exposes it through a symlinked
//! `SwiftPackageManager.xcodeproj` and repins its remote package reference.

use std::{
    fs,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use regex::{Captures, NoExpand, Regex};

use crate::error::Error;

pub const PACKAGE_PROJECT: &str = "SwiftPackageManager.xcodeproj";
const HIDDEN_PROJECT_FILE: &str = "../SwiftPackageManager.notxcodeproj/project.pbxproj";

static REQUIREMENT_RE: Lazy<Regex> = regex_static::lazy_regex!(r"requirement = \{[^}]*\};");
static PIN_RE: Lazy<Regex> = regex_static::lazy_regex!(r"\b(?:branch|version) = [^;\n]*;");
static KIND_RE: Lazy<Regex> = regex_static::lazy_regex!(r"\bkind = [^;\n]*;");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagePin<'a> {
    Version(&'a str),
    Branch(&'a str),
}

impl<'a> PackagePin<'a> {
    /// Pin for the release or branch under test. The release wins when both are set.
    pub fn select(release: Option<&'a str>, branch: Option<&'a str>) -> Option<Self> {
        release
            .map(PackagePin::Version)
            .or_else(|| branch.map(PackagePin::Branch))
    }

    fn assignment(&self) -> String {
        match self {
            PackagePin::Version(v) => format!("version = {v};"),
            PackagePin::Branch(b) => format!("branch = {b};"),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            PackagePin::Version(_) => "kind = exactVersion;",
            PackagePin::Branch(_) => "kind = branch;",
        }
    }
}

/// Creates the `SwiftPackageManager.xcodeproj/project.pbxproj` symlink if it
/// is not already there. Returns the path of the link.
pub fn ensure_package_project(example_dir: &Path) -> Result<PathBuf, Error> {
    let project = example_dir.join(PACKAGE_PROJECT);
    let link = project.join("project.pbxproj");

    let is_link = fs::symlink_metadata(&link)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);
    if !is_link {
        log::debug!("Linking {} -> {}", link.display(), HIDDEN_PROJECT_FILE);
        fs::create_dir_all(&project).map_err(Error::file(&project))?;
        std::os::unix::fs::symlink(HIDDEN_PROJECT_FILE, &link).map_err(Error::file(&link))?;
    }

    Ok(link)
}

/// Rewrites the pin of every remote package requirement block. Assignments
/// outside `requirement = { ... };` are left alone. Returns `None` when the
/// project has no requirement block.
pub fn rewrite_package_pin(text: &str, pin: PackagePin<'_>) -> Option<String> {
    let assignment = pin.assignment();
    let mut found = false;

    let rewritten = REQUIREMENT_RE.replace_all(text, |caps: &Captures| {
        found = true;
        let block = PIN_RE.replace(&caps[0], NoExpand(&assignment));
        KIND_RE.replace(&block, NoExpand(pin.kind())).into_owned()
    });

    if found {
        Some(rewritten.into_owned())
    } else {
        None
    }
}

/// Applies [`rewrite_package_pin`] to the project file at `path` in place.
pub fn pin_package_project(path: &Path, pin: PackagePin<'_>) -> Result<(), Error> {
    let text = fs::read_to_string(path).map_err(Error::file(path))?;
    let rewritten = rewrite_package_pin(&text, pin)
        .ok_or_else(|| Error::PackageRequirementNotFound(path.to_path_buf()))?;
    fs::write(path, rewritten).map_err(Error::file(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"/* Begin XCRemoteSwiftPackageReference section */
		3FA8A6AC2638C0B300A1A0F5 /* XCRemoteSwiftPackageReference "realm-swift" */ = {
			isa = XCRemoteSwiftPackageReference;
			repositoryURL = "https://github.com/realm/realm-swift";
			requirement = {
				branch = master;
				kind = branch;
			};
		};
/* End XCRemoteSwiftPackageReference section */
		3F1A5E7A2638C0B300A1A0F5 /* Debug */ = {
			isa = XCBuildConfiguration;
			buildSettings = {
				MARKETING_VERSION = 1.0;
				version = 7;
			};
		};
"#;

    #[test]
    fn test_pin_to_release() {
        let out = rewrite_package_pin(PROJECT, PackagePin::Version("10.45.2")).unwrap();
        assert!(out.contains("\t\t\t\tversion = 10.45.2;\n\t\t\t\tkind = exactVersion;\n"));
        assert!(!out.contains("branch = master;"));
        // Outside the requirement block.
        assert!(out.contains("version = 7;"));
    }

    #[test]
    fn test_pin_to_branch() {
        let pinned = rewrite_package_pin(PROJECT, PackagePin::Version("10.45.2")).unwrap();
        let out = rewrite_package_pin(&pinned, PackagePin::Branch("release/11")).unwrap();
        assert!(out.contains("branch = release/11;"));
        assert!(out.contains("kind = branch;"));
        assert!(!out.contains("exactVersion"));
        assert!(out.contains("version = 7;"));
    }

    #[test]
    fn test_dollar_signs_are_literal() {
        let out = rewrite_package_pin(PROJECT, PackagePin::Branch("feature/$1")).unwrap();
        assert!(out.contains("branch = feature/$1;"));
    }

    #[test]
    fn test_missing_requirement_block() {
        assert_eq!(
            rewrite_package_pin("// !$*UTF8*$!\n{}\n", PackagePin::Branch("master")),
            None
        );
    }

    #[test]
    fn test_select_prefers_release() {
        assert_eq!(
            PackagePin::select(Some("10.1.0"), Some("master")),
            Some(PackagePin::Version("10.1.0"))
        );
        assert_eq!(
            PackagePin::select(None, Some("master")),
            Some(PackagePin::Branch("master"))
        );
        assert_eq!(PackagePin::select(None, None), None);
    }

    #[test]
    fn test_ensure_package_project_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let first = ensure_package_project(dir.path()).unwrap();
        let second = ensure_package_project(dir.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            fs::read_link(&first).unwrap(),
            Path::new(HIDDEN_PROJECT_FILE)
        );
    }

    #[test]
    fn test_pin_package_project_writes_through_link() {
        let dir = tempfile::tempdir().unwrap();
        let hidden = dir.path().join("SwiftPackageManager.notxcodeproj");
        fs::create_dir_all(&hidden).unwrap();
        fs::write(hidden.join("project.pbxproj"), PROJECT).unwrap();

        let link = ensure_package_project(dir.path()).unwrap();
        pin_package_project(&link, PackagePin::Version("10.45.2")).unwrap();

        let text = fs::read_to_string(hidden.join("project.pbxproj")).unwrap();
        assert!(text.contains("kind = exactVersion;"));
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    }

    #[test]
    fn test_pin_package_project_without_requirement() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.pbxproj");
        fs::write(&path, "{}\n").unwrap();

        let result = pin_package_project(&path, PackagePin::Branch("master"));
        assert!(matches!(result, Err(Error::PackageRequirementNotFound(_))));
    }
}
