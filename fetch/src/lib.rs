use std::{
    io::Read,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use url::Url;

mod cache;
pub use cache::MediaType;
use cache::ObjectCache;

/// Blocking page retrieval backed by a sqlite response cache.
#[derive(Clone)]
pub struct FetchContext {
    cache: Arc<Mutex<ObjectCache>>,
    agent: ureq::Agent,
    offline: bool,
}

impl FetchContext {
    /// with `offline` set, only `file://` urls and cached entries can be fetched
    pub fn new_cfg(
        conn: rusqlite::Connection,
        agent: ureq::Agent,
        offline: bool,
    ) -> rusqlite::Result<Self> {
        Ok(FetchContext {
            cache: Arc::new(Mutex::new(ObjectCache::new(conn)?)),
            agent,
            offline,
        })
    }

    fn cache(&self) -> Result<MutexGuard<'_, ObjectCache>> {
        self.cache.lock().map_err(|_| anyhow!("response cache lock poisoned"))
    }

    pub fn fetch(&self, url: &Url) -> Result<(MediaType, Vec<u8>)> {
        if url.scheme() == "file" {
            return fetch_file(url);
        }
        if let Some(entry) = self.cache()?.get(url.as_str()).context("db access failed")? {
            debug!("{url} found in cache");
            return Ok(entry);
        }
        if self.offline {
            bail!("{url} is not cached and network access is disabled")
        }

        info!(target: "progress", "fetching {url}");
        let resp = match self.agent.get(url.as_str()).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                bail!("{url} returned HTTP {code} {}", resp.status_text())
            }
            Err(e) => return Err(e).with_context(|| format!("request to {url} failed")),
        };
        let ty = MediaType::from_mime(resp.content_type())
            .with_context(|| format!("unsupported content type {:?}", resp.content_type()))?;
        let mut body = Vec::new();
        resp.into_reader()
            .read_to_end(&mut body)
            .with_context(|| format!("failed reading body of {url}"))?;
        self.cache()?
            .set(url.as_str(), &body, ty)
            .context("failed to store response")?;
        debug!("fetched {} bytes from {url}", body.len());

        Ok((ty, body))
    }

    /// drops the cached copy so the next [`fetch`](Self::fetch) goes to the network
    pub fn invalidate(&self, url: &Url) -> Result<bool> {
        Ok(self.cache()?.remove(url.as_str())?)
    }
}

fn fetch_file(url: &Url) -> Result<(MediaType, Vec<u8>)> {
    let path = url
        .to_file_path()
        .map_err(|()| anyhow!("{url} is not a local path"))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let ty = MediaType::from_extension(&ext.to_ascii_lowercase())
        .with_context(|| format!("unknown file type for {}", path.display()))?;
    let body =
        std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok((ty, body))
}
