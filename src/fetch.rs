use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::device::{Device, parse_details};
use crate::error::{Error, Result};

/// Path the gateway serves its device details on.
pub const DETAILS_PATH: &str = "/-/lightify/details";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Http(Url),
    File(PathBuf),
}

impl Source {
    pub fn describe(&self) -> String {
        match self {
            Source::Http(url) => url.to_string(),
            Source::File(path) => path.display().to_string(),
        }
    }
}

/// Turn `host[:port]` or a full URL into the details endpoint. A URL that
/// already names a path is used as given.
pub fn details_url(base: &str) -> Result<Url> {
    let base = base.trim();
    let with_scheme = if base.contains("://") {
        base.to_string()
    } else {
        format!("http://{base}")
    };
    let mut url = Url::parse(&with_scheme).map_err(|_| Error::InvalidUrl(base.to_string()))?;
    if url.path().is_empty() || url.path() == "/" {
        url.set_path(DETAILS_PATH);
    }
    Ok(url)
}

pub struct Loader {
    client: reqwest::Client,
}

impl Loader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Client)?;
        Ok(Self { client })
    }

    #[instrument(skip_all, fields(source = %source.describe()))]
    pub async fn load(&self, source: &Source) -> Result<Vec<Device>> {
        let body = match source {
            Source::Http(url) => self.get(url).await?,
            Source::File(path) => tokio::fs::read_to_string(path).await?,
        };
        let devices = parse_details(&body)?;
        debug!(count = devices.len(), "loaded devices");
        Ok(devices)
    }

    async fn get(&self, url: &Url) -> Result<String> {
        let http = |source| Error::Http {
            url: url.to_string(),
            source,
        };
        let resp = self.client.get(url.clone()).send().await.map_err(http)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status,
            });
        }
        resp.text().await.map_err(http)
    }
}
