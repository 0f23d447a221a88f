use std::fs;

use crate::{
    cmd::Runner,
    config::PLATFORM_VAR,
    driver::Driver,
    error::Error,
    net::Network,
    package::{ensure_package_project, pin_package_project, PackagePin, PACKAGE_PROJECT},
    types::{Case, Language, Method},
};

/// Contents of the Cartfile for the release or branch under test.
pub fn cartfile_line(release: Option<&str>, branch: Option<&str>) -> String {
    let requirement = match (release, branch) {
        (Some(release), _) => format!(" == {release}"),
        (None, Some(branch)) => format!(" \"{branch}\""),
        (None, None) => String::new(),
    };
    format!("github \"realm/realm-swift\"{requirement}")
}

impl<R: Runner, N: Network> Driver<R, N> {
    /// Makes the library available to the example project for `case.method`.
    pub async fn fetch(&self, case: &Case) -> Result<(), Error> {
        match case.method {
            Method::Cocoapods => self.pod_install(case),
            Method::Carthage => self.carthage_update(case),
            Method::Spm => self.resolve_package(case),
            Method::Xcframework => self.install_prebuilt(case).await,
        }
    }

    // The Podfile reads the environment and picks the right pod itself.
    fn pod_install(&self, case: &Case) -> Result<(), Error> {
        let cmd = self
            .command("pod", case)
            .env(PLATFORM_VAR, case.platform.as_str())
            .arg("install");
        self.runner.status(&cmd)
    }

    fn carthage_update(&self, case: &Case) -> Result<(), Error> {
        let platform_name = case
            .platform
            .carthage_name()
            .ok_or(Error::UnsupportedPlatform {
                method: case.method,
                platform: case.platform,
            })?;

        let cartfile = self.layout.cartfile();
        let line = cartfile_line(
            self.settings.test_release.as_deref(),
            self.settings.test_branch.as_deref(),
        );
        log::debug!("Writing {}: {}", cartfile.display(), line);
        fs::write(&cartfile, line).map_err(Error::file(&cartfile))?;

        // Carthage needs a simulator to exist, but `xcodebuild -list` gets very
        // slow with many of them, so keep only one per platform.
        let reset = self.layout.script("reset-simulators.rb");
        self.runner
            .status(&self.command(reset.to_string_lossy(), case).arg("-firstOnly"))?;

        let cmd = self.command("carthage", case).args([
            "update",
            "--use-xcframeworks",
            "--platform",
            platform_name,
        ]);
        self.runner.status(&cmd)
    }

    fn resolve_package(&self, case: &Case) -> Result<(), Error> {
        let project_file = ensure_package_project(&self.layout.example_dir)?;

        if let Some(pin) = PackagePin::select(
            self.settings.test_release.as_deref(),
            self.settings.test_branch.as_deref(),
        ) {
            log::debug!("Pinning {} to {:?}", project_file.display(), pin);
            pin_package_project(&project_file, pin)?;
        }

        let cmd = self
            .command("xcodebuild", case)
            .args(["-project", PACKAGE_PROJECT, "-resolvePackageDependencies"]);
        self.runner.status(&cmd)
    }

    async fn install_prebuilt(&self, case: &Case) -> Result<(), Error> {
        let language = if case.is_static() {
            Language::Objc
        } else {
            Language::Swift
        };

        match self.prebuilt_version()? {
            Some(version) => self.download_release(&version, language, case).await,
            None => {
                let existing = self.layout.installed_framework(language);
                if existing.is_dir() {
                    log::info!("Using existing {}", existing.display());
                    Ok(())
                } else {
                    Err(Error::MissingXcframework(self.layout.build_dir()))
                }
            }
        }
    }

    /// Branch runs test the version the branch is about to release, taken
    /// from `dependencies.list`. Otherwise the requested release is used.
    fn prebuilt_version(&self) -> Result<Option<String>, Error> {
        if self.settings.test_branch.is_some() {
            let mut deps = self.layout.read_dependencies()?;
            return Ok(deps.swap_remove("VERSION"));
        }
        Ok(self.settings.test_release.clone())
    }
}
