use std::{io::Write, path::Path};

use crate::{error::Error, types::Language};

pub const LATEST_RELEASE_URL: &str = "https://static.realm.io/update/cocoa";

pub fn release_archive_name(language: Language, version: &str) -> String {
    format!("realm-{language}-{version}.zip")
}

pub fn release_url(language: Language, version: &str) -> String {
    format!(
        "https://github.com/realm/realm-swift/releases/download/v{version}/{}",
        release_archive_name(language, version)
    )
}

/// HTTP access used by the driver.
#[allow(async_fn_in_trait)]
pub trait Network {
    async fn get_text(&self, url: &str) -> Result<String, Error>;

    /// Downloads `url` to `dest`. A partial download never appears at `dest`.
    async fn download(&self, url: &str, dest: &Path) -> Result<(), Error>;
}

pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, Error> {
        let mut header_map = reqwest::header::HeaderMap::new();
        header_map.insert(
            "user-agent",
            reqwest::header::HeaderValue::from_static("install-matrix"),
        );
        let client = reqwest::Client::builder()
            .default_headers(header_map)
            .build()?;
        Ok(HttpClient { client })
    }
}

impl Network for HttpClient {
    async fn get_text(&self, url: &str) -> Result<String, Error> {
        log::debug!("GET {}", url);
        let text = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<(), Error> {
        log::info!("Downloading {}...", url);
        let mut response = self.client.get(url).send().await?.error_for_status()?;

        let dir = match dest.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(Error::file(dir))?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).map_err(Error::file(file.path()))?;
        }
        file.persist(dest)
            .map_err(|e| Error::file(dest)(e.error))?;
        Ok(())
    }
}
