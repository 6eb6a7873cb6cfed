//! Cover art retrieval.
//!
//! Bytes come from a URL-keyed cache first and from HTTP on a miss. Animated
//! GIF placeholders served by the catalog are never embedded.

use rustc_hash::FxHashMap;
use std::io::Read;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::models::{Artwork, PictureKind};

/// How long downloaded cover bytes stay cached.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Signature of the catalog's "no image available" placeholder.
pub const GIF_SIGNATURE: &[u8; 6] = b"GIF89a";

/// Covers are stored as JPEG regardless of what the server sent.
pub const COVER_MIME_TYPE: &str = "image/jpeg";

/// Largest cover body read from the network.
const MAX_COVER_BYTES: u64 = 16 * 1024 * 1024;

// ============================================================================
// Collaborators
// ============================================================================

/// Key/value byte cache with per-entry expiry.
/// Implementations shared between threads handle their own locking.
pub trait ArtworkCache {
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration);
}

/// Blocking HTTP GET returning the response body.
pub trait HttpFetch {
    fn get(&self, url: &str) -> anyhow::Result<Vec<u8>>;
}

impl HttpFetch for ureq::Agent {
    fn get(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let response = ureq::Agent::get(self, url).call()?;
        read_capped(response.into_reader(), MAX_COVER_BYTES)
    }
}

/// Read a whole body, failing instead of truncating when it exceeds `limit`.
fn read_capped(reader: impl Read, limit: u64) -> anyhow::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.take(limit + 1).read_to_end(&mut bytes)?;
    anyhow::ensure!(
        bytes.len() as u64 <= limit,
        "cover art larger than {limit} bytes"
    );
    Ok(bytes)
}

/// HTTP agent with conservative timeouts for cover downloads.
pub fn http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(5))
        .timeout_read(Duration::from_secs(10))
        .timeout_write(Duration::from_secs(10))
        .build()
}

struct CacheEntry {
    expires_at: Instant,
    data: Vec<u8>,
}

/// In-process cache with time-based expiry and no size bound.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<FxHashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtworkCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.data.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        let entry = CacheEntry {
            expires_at: Instant::now() + ttl,
            data: value,
        };
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), entry);
    }
}

// ============================================================================
// Resolver
// ============================================================================

pub fn is_gif(bytes: &[u8]) -> bool {
    bytes.starts_with(GIF_SIGNATURE)
}

/// Fetches cover art through a cache and an HTTP client.
pub struct CoverArtResolver<'a> {
    cache: &'a dyn ArtworkCache,
    http: &'a dyn HttpFetch,
    ttl: Duration,
}

impl<'a> CoverArtResolver<'a> {
    pub fn new(cache: &'a dyn ArtworkCache, http: &'a dyn HttpFetch) -> Self {
        Self {
            cache,
            http,
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Front cover for `url`, or None when it can't be downloaded or is a GIF.
    pub fn fetch(&self, url: &str) -> Option<Artwork> {
        let bytes = match self.cache.get(url) {
            Some(bytes) => bytes,
            None => {
                let bytes = match self.http.get(url) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(url, error = %format!("{e:#}"), "cover art download failed");
                        return None;
                    }
                };
                self.cache.set(url, bytes.clone(), self.ttl);
                bytes
            }
        };

        if bytes.is_empty() {
            return None;
        }
        if is_gif(&bytes) {
            debug!(url, "rejecting GIF cover art");
            return None;
        }

        Some(Artwork {
            kind: PictureKind::FrontCover,
            mime_type: COVER_MIME_TYPE.to_string(),
            data: bytes,
        })
    }
}
