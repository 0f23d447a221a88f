//! Installing a published release package into the build directory.

use std::{fs, path::Path};

use crate::{
    archive::remove_if_exists,
    cmd::Runner,
    driver::Driver,
    error::Error,
    net::{release_archive_name, release_url, Network},
    types::{Case, Language},
};

const SWIFT_FRAMEWORKS: &[&str] = &["Realm.xcframework", "RealmSwift.xcframework"];
const OBJC_FRAMEWORKS: &[&str] = &["Realm.xcframework"];

impl<R: Runner, N: Network> Driver<R, N> {
    /// Downloads and unpacks `realm-<language>-<version>` next to the example
    /// projects, then copies its frameworks into the build directory. Work
    /// already done by a previous run (download, unzip) is reused.
    pub(crate) async fn download_release(
        &self,
        version: &str,
        language: Language,
        case: &Case,
    ) -> Result<(), Error> {
        let example_dir = &self.layout.example_dir;
        let package_dir = example_dir.join(format!("realm-{language}-{version}"));

        if !package_dir.is_dir() {
            let zip_name = release_archive_name(language, version);
            let zip = example_dir.join(&zip_name);
            if !zip.is_file() {
                self.network
                    .download(&release_url(language, version), &zip)
                    .await?;
            }
            self.runner
                .status(&self.command("unzip", case).arg(&zip_name))?;
            fs::remove_file(&zip).map_err(Error::file(&zip))?;
        }

        let (source, frameworks) = match language {
            Language::Swift => (
                package_dir.join(&self.settings.xcode_version),
                SWIFT_FRAMEWORKS,
            ),
            Language::Objc => (package_dir.join("ios-static"), OBJC_FRAMEWORKS),
        };

        if language == Language::Swift && !source.is_dir() {
            return Err(Error::MissingXcodeBuild {
                xcode_version: self.settings.xcode_version.clone(),
                version: version.to_string(),
            });
        }

        let build_dir = self.layout.build_dir();
        remove_if_exists(&build_dir.join("Realm.xcframework"))?;
        remove_if_exists(&build_dir.join("RealmSwift.xcframework"))?;

        let dest = self.layout.framework_dir(language);
        fs::create_dir_all(&dest).map_err(Error::file(&dest))?;
        for name in frameworks {
            copy_framework(&source.join(name), &dest.join(name))?;
        }

        Ok(())
    }
}

fn copy_framework(from: &Path, to: &Path) -> Result<(), Error> {
    log::info!("Copying {} -> {}", from.display(), to.display());
    remove_if_exists(to)?;
    dircpy::copy_dir(from, to).map_err(Error::file(from))
}
