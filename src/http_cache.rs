use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};
use tracing::debug;

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "defense_impact";
const ENTRIES_DIR: &str = "provider";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    version: u32,
    url: String,
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
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

/// GETs `url`, revalidating any cached body with ETag / Last-Modified.
/// Completed games never change, so a 304 is the common case on re-runs.
/// Header values (API keys) are not part of the cache key.
pub fn get_json_cached(client: &Client, url: &str, headers: &[(&str, &str)]) -> Result<String> {
    let cached = load_entry(url);

    let mut req = client.get(url);
    for (name, value) in headers {
        req = req.header(*name, *value);
    }
    if let Some(entry) = cached.as_ref() {
        if let Some(etag) = entry.etag.as_ref() {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(last_modified) = entry.last_modified.as_ref() {
            req = req.header(IF_MODIFIED_SINCE, last_modified);
        }
    }

    let resp = req.send().context("request failed")?;
    let status = resp.status();
    if status == StatusCode::NOT_MODIFIED {
        let Some(entry) = cached else {
            return Err(anyhow!("received 304 without cache body"));
        };
        debug!(url, "provider cache hit");
        return Ok(entry.body);
    }

    let etag = header_string(resp.headers(), ETAG);
    let last_modified = header_string(resp.headers(), LAST_MODIFIED);
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, truncate(&body, 200)));
    }

    let entry = CacheEntry {
        version: CACHE_VERSION,
        url: url.to_string(),
        body: body.clone(),
        etag,
        last_modified,
        fetched_at: now_secs(),
    };
    if let Err(err) = save_entry(&entry) {
        debug!(error = %err, "provider cache entry not persisted");
    }
    Ok(body)
}

fn load_entry(url: &str) -> Option<CacheEntry> {
    let raw = fs::read_to_string(entry_path(url)?).ok()?;
    let entry = serde_json::from_str::<CacheEntry>(&raw).ok()?;
    (entry.version == CACHE_VERSION && entry.url == url).then_some(entry)
}

fn save_entry(entry: &CacheEntry) -> Result<()> {
    let Some(path) = entry_path(&entry.url) else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(entry).context("serialize provider cache entry")?;
    fs::write(&tmp, json).context("write provider cache entry")?;
    fs::rename(&tmp, &path).context("swap provider cache entry")?;
    Ok(())
}

// One file per URL; the file name is the URL with separators flattened.
fn entry_path(url: &str) -> Option<PathBuf> {
    let stem = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect::<String>();
    app_cache_dir().map(|dir| dir.join(ENTRIES_DIR).join(format!("{stem}.json")))
}

fn header_string(
    headers: &reqwest::header::HeaderMap,
    name: reqwest::header::HeaderName,
) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
