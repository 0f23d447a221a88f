//! Resolved settings for a driver run.
//!
//! The process environment is read once into an [`Env`] snapshot. Tool
//! versions come from the repository's `scripts/swift-version.sh` helper and
//! everything handed to child processes is derived from [`Settings`].

use std::path::PathBuf;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    cmd::{Cmd, Runner},
    error::Error,
    net::{Network, LATEST_RELEASE_URL},
    types::Language,
};

pub const DEVELOPER_DIR_VAR: &str = "DEVELOPER_DIR";
pub const XCODE_VERSION_VAR: &str = "REALM_XCODE_VERSION";
pub const TEST_RELEASE_VAR: &str = "REALM_TEST_RELEASE";
pub const TEST_BRANCH_VAR: &str = "REALM_TEST_BRANCH";
pub const BUILD_STATIC_VAR: &str = "REALM_BUILD_STATIC";
pub const PLATFORM_VAR: &str = "REALM_PLATFORM";

/// Sentinel accepted in `REALM_TEST_RELEASE`.
pub const LATEST: &str = "latest";

pub type Env = IndexMap<String, String>;

static RELEASE_VERSION_RE: Lazy<Regex> =
    regex_static::lazy_regex!(r"^\d+\.\d+\.\d+(?:-[0-9A-Za-z.]+)?$");

pub fn process_env() -> Env {
    std::env::vars().collect()
}

/// Where the example projects and the library checkout live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub example_dir: PathBuf,
    pub repo_root: PathBuf,
}

impl Layout {
    pub fn new(example_dir: PathBuf, repo_root: Option<PathBuf>) -> Self {
        let repo_root = repo_root.unwrap_or_else(|| example_dir.join("..").join(".."));
        Layout {
            example_dir,
            repo_root,
        }
    }

    pub fn archive_path(&self) -> PathBuf {
        self.example_dir.join("out.xcarchive")
    }

    pub fn cartfile(&self) -> PathBuf {
        self.example_dir.join("Cartfile")
    }

    pub fn build_dir(&self) -> PathBuf {
        self.repo_root.join("build")
    }

    /// Directory the prebuilt frameworks for `language` are copied into.
    pub fn framework_dir(&self, language: Language) -> PathBuf {
        match language {
            Language::Swift => self.build_dir(),
            Language::Objc => self.build_dir().join("ios-static"),
        }
    }

    pub fn installed_framework(&self, language: Language) -> PathBuf {
        self.framework_dir(language).join("Realm.xcframework")
    }

    pub fn script(&self, name: &str) -> PathBuf {
        self.repo_root.join("scripts").join(name)
    }

    pub fn dependencies_list(&self) -> PathBuf {
        self.repo_root.join("dependencies.list")
    }

    pub fn read_dependencies(&self) -> Result<IndexMap<String, String>, Error> {
        let path = self.dependencies_list();
        let text = std::fs::read_to_string(&path).map_err(Error::file(&path))?;
        Ok(parse_dependencies(&text))
    }
}

/// Parses the `KEY=VALUE` dependency manifest. Lines without `=` are ignored.
pub fn parse_dependencies(text: &str) -> IndexMap<String, String> {
    text.lines()
        .filter_map(|line| line.trim().split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub developer_dir: String,
    pub xcode_version: String,
    pub test_release: Option<String>,
    pub test_branch: Option<String>,
}

impl Settings {
    /// `DEVELOPER_DIR` always comes from the helper script. An Xcode version
    /// already present in `env` wins over the helper's default, and a release
    /// of `latest` is replaced by the newest published version.
    pub async fn resolve<R: Runner, N: Network>(
        runner: &R,
        network: &N,
        layout: &Layout,
        env: &Env,
    ) -> Result<Settings, Error> {
        let xcode_override = lookup(env, XCODE_VERSION_VAR);

        let developer_dir = read_setting(runner, layout, xcode_override, DEVELOPER_DIR_VAR)?;
        let xcode_version = match xcode_override {
            Some(version) => version.to_string(),
            None => read_setting(runner, layout, None, XCODE_VERSION_VAR)?,
        };

        let test_release = match lookup(env, TEST_RELEASE_VAR) {
            Some(LATEST) => Some(latest_release(network).await?),
            Some(version) => Some(version.to_string()),
            None => None,
        };
        let test_branch = lookup(env, TEST_BRANCH_VAR).map(str::to_string);

        log::debug!(
            "Resolved DEVELOPER_DIR={} REALM_XCODE_VERSION={} release={:?} branch={:?}",
            developer_dir,
            xcode_version,
            test_release,
            test_branch
        );

        Ok(Settings {
            developer_dir,
            xcode_version,
            test_release,
            test_branch,
        })
    }

    pub fn xcode_major(&self) -> Option<u32> {
        self.xcode_version.split('.').next()?.trim().parse().ok()
    }

    /// Variables exported to every child process.
    pub fn child_env(&self) -> IndexMap<String, Option<String>> {
        let mut envs = IndexMap::new();
        envs.insert(
            DEVELOPER_DIR_VAR.to_string(),
            Some(self.developer_dir.clone()),
        );
        envs.insert(
            XCODE_VERSION_VAR.to_string(),
            Some(self.xcode_version.clone()),
        );
        envs.insert(TEST_RELEASE_VAR.to_string(), self.test_release.clone());
        envs.insert(TEST_BRANCH_VAR.to_string(), self.test_branch.clone());
        envs
    }
}

fn lookup<'a>(env: &'a Env, key: &str) -> Option<&'a str> {
    env.get(key)
        .map(|value| value.as_str())
        .filter(|value| !value.is_empty())
}

fn read_setting<R: Runner>(
    runner: &R,
    layout: &Layout,
    xcode_override: Option<&str>,
    name: &str,
) -> Result<String, Error> {
    let script = format!(r#". "$1"; set_xcode_and_swift_versions; echo "${name}""#);
    let mut cmd = Cmd::new("sh")
        .args(["-c", script.as_str(), "sh"])
        .arg(layout.script("swift-version.sh"))
        .current_dir(&layout.example_dir);
    if let Some(version) = xcode_override {
        cmd = cmd.env(XCODE_VERSION_VAR, version);
    }
    Ok(runner.output(&cmd)?.trim_end().to_string())
}

async fn latest_release<N: Network>(network: &N) -> Result<String, Error> {
    let body = network.get_text(LATEST_RELEASE_URL).await?;
    let version = body.trim();
    if !RELEASE_VERSION_RE.is_match(version) {
        return Err(Error::InvalidReleaseVersion {
            value: version.chars().take(64).collect(),
            url: LATEST_RELEASE_URL.to_string(),
        });
    }
    log::info!("Latest release is {}", version);
    Ok(version.to_string())
}
