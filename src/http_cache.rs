//! On-disk page cache, one JSON file per URL.
//!
//! Files are named by the SHA-256 of the URL so a scrape only ever rewrites the
//! page it just fetched. Entries younger than the caller's freshness window are
//! served without a request; older ones are revalidated with ETag /
//! Last-Modified until they pass `PAGE_RETAIN_FOR`, after which they are deleted.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{
    ETAG, HeaderMap, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const CACHE_DIR: &str = "pl_predictor";
const PAGES_DIR: &str = "pages";

/// Entries not refreshed for this long are dropped instead of revalidated.
pub const PAGE_RETAIN_FOR: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CacheEntry {
    url: String,
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

#[derive(Debug, PartialEq)]
enum Lookup {
    Fresh(String),
    Revalidate(CacheEntry),
    Miss,
}

#[derive(Debug, Clone)]
pub struct PageCache {
    dir: Option<PathBuf>,
}

impl PageCache {
    /// Cache under `app_cache_dir()`; disabled when no cache dir can be resolved.
    pub fn open_default() -> Self {
        Self {
            dir: app_cache_dir().map(|dir| dir.join(PAGES_DIR)),
        }
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    fn path_for(&self, url: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(cache_file_name(url)))
    }

    /// Reads the entry for `url`. Unreadable, mismatched or expired files are
    /// removed and count as a miss.
    fn load(&self, url: &str, now: u64) -> Option<CacheEntry> {
        let path = self.path_for(url)?;
        let raw = fs::read_to_string(&path).ok()?;
        let entry = serde_json::from_str::<CacheEntry>(&raw)
            .ok()
            .filter(|e| e.url == url && !is_expired(e.fetched_at, now, PAGE_RETAIN_FOR));
        if entry.is_none() {
            let _ = fs::remove_file(&path);
        }
        entry
    }

    fn store(&self, entry: &CacheEntry) -> Result<()> {
        let Some(path) = self.path_for(&entry.url) else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string(entry).context("serialize page cache entry")?;
        fs::write(&tmp, json).context("write page cache entry")?;
        fs::rename(&tmp, &path).context("swap page cache entry")?;
        Ok(())
    }

    /// Deletes entries older than `retain_for`. Returns how many were removed.
    pub fn prune(&self, retain_for: Duration) -> usize {
        let Some(dir) = self.dir.as_ref() else {
            return 0;
        };
        prune_dir(dir, now_secs(), retain_for)
    }
}

fn prune_dir(dir: &Path, now: u64, retain_for: Duration) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    let mut removed = 0;
    for file in entries.flatten() {
        let path = file.path();
        if path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        let expired = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<CacheEntry>(&raw).ok())
            .is_none_or(|entry| is_expired(entry.fetched_at, now, retain_for));
        if expired && fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    removed
}

/// Fetches a page body, reusing the cached copy when it is younger than `fresh_for`
/// and revalidating with ETag / Last-Modified otherwise.
pub fn fetch_page_cached(
    client: &Client,
    cache: &PageCache,
    url: &str,
    fresh_for: Duration,
) -> Result<String> {
    let now = now_secs();
    let cached = match lookup(cache.load(url, now), now, fresh_for) {
        Lookup::Fresh(body) => {
            log::debug!("page cache hit for {url}");
            return Ok(body);
        }
        Lookup::Revalidate(entry) => Some(entry),
        Lookup::Miss => None,
    };

    let mut req = client.get(url);
    if let Some(entry) = cached.as_ref() {
        if let Some(etag) = entry.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = entry.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = req.send().with_context(|| format!("request failed: {url}"))?;
    let status = resp.status();
    let entry = if status == StatusCode::NOT_MODIFIED {
        log::debug!("page not modified: {url}");
        revalidated(cached, now, url)?
    } else {
        let headers = resp.headers().clone();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {status} for {url}"));
        }
        entry_from_response(url, body, &headers, now)
    };

    if let Err(err) = cache.store(&entry) {
        log::warn!("page cache not saved for {url}: {err:#}");
    }
    Ok(entry.body)
}

fn lookup(entry: Option<CacheEntry>, now: u64, fresh_for: Duration) -> Lookup {
    match entry {
        Some(entry) if is_fresh(entry.fetched_at, now, fresh_for) => Lookup::Fresh(entry.body),
        Some(entry) => Lookup::Revalidate(entry),
        None => Lookup::Miss,
    }
}

/// A 304 refreshes the cached copy; without one there is nothing to serve.
fn revalidated(cached: Option<CacheEntry>, now: u64, url: &str) -> Result<CacheEntry> {
    let mut entry = cached.ok_or_else(|| anyhow!("received 304 without cached body for {url}"))?;
    entry.fetched_at = now;
    Ok(entry)
}

fn entry_from_response(url: &str, body: String, headers: &HeaderMap, now: u64) -> CacheEntry {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    CacheEntry {
        url: url.to_string(),
        body,
        etag: header(ETAG),
        last_modified: header(LAST_MODIFIED),
        fetched_at: now,
    }
}

fn is_fresh(fetched_at: u64, now: u64, fresh_for: Duration) -> bool {
    now.saturating_sub(fetched_at) < fresh_for.as_secs()
}

fn is_expired(fetched_at: u64, now: u64, retain_for: Duration) -> bool {
    now.saturating_sub(fetched_at) >= retain_for.as_secs()
}

fn cache_file_name(url: &str) -> String {
    format!("{:x}.json", Sha256::digest(url.as_bytes()))
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
