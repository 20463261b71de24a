//! Three-tier memoization of generated stylesheet text.
//!
//! | Tier        | Holds                              | Default cap | Cleared on          |
//! |-------------|------------------------------------|-------------|---------------------|
//! | `Base`      | neutralized source stylesheets     | 10          | source theme change |
//! | `Component` | rendered component fragments       | 100         | never (keys cover every input) |
//! | `Accent`    | detected accents, JSON encoded     | unbounded   | theme change, teardown |
//!
//! Eviction is first-in first-out: lookups never refresh an entry, and each
//! insert past the cap drops exactly one entry, the oldest.
//!
//! Invalidation is the caller's decision; the cache never clears a tier on
//! its own.

use std::fmt;
use std::num::NonZeroUsize;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// One of the three caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheTier {
    Base,
    Component,
    Accent,
}

impl CacheTier {
    pub const ALL: [CacheTier; 3] = [CacheTier::Base, CacheTier::Component, CacheTier::Accent];
}

impl fmt::Display for CacheTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheTier::Base => write!(f, "base"),
            CacheTier::Component => write!(f, "component"),
            CacheTier::Accent => write!(f, "accent"),
        }
    }
}

/// Maximum entry count per tier. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheLimits {
    pub base: Option<usize>,
    pub component: Option<usize>,
    pub accent: Option<usize>,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            base: Some(10),
            component: Some(100),
            accent: None,
        }
    }
}

impl CacheLimits {
    pub fn for_tier(&self, tier: CacheTier) -> Option<usize> {
        match tier {
            CacheTier::Base => self.base,
            CacheTier::Component => self.component,
            CacheTier::Accent => self.accent,
        }
    }
}

/// Counters and sizes for one tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    /// Sum of stored value lengths.
    pub bytes: usize,
}

impl CacheStats {
    /// Fraction of lookups that hit, 0.0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Stats of all three tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheReport {
    pub base: CacheStats,
    pub component: CacheStats,
    pub accent: CacheStats,
}

impl CacheReport {
    pub fn tier(&self, tier: CacheTier) -> &CacheStats {
        match tier {
            CacheTier::Base => &self.base,
            CacheTier::Component => &self.component,
            CacheTier::Accent => &self.accent,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    size_bytes: usize,
}

struct Tier {
    tier: CacheTier,
    entries: LruCache<String, CacheEntry>,
    hits: u64,
    misses: u64,
    bytes: usize,
}

impl Tier {
    fn new(tier: CacheTier, limit: Option<usize>) -> Self {
        let entries = match limit {
            Some(limit) => {
                let cap = NonZeroUsize::new(limit).unwrap_or_else(|| {
                    tracing::warn!(%tier, "cache limit of 0 raised to 1");
                    NonZeroUsize::MIN
                });
                LruCache::new(cap)
            }
            None => LruCache::unbounded(),
        };
        Self {
            tier,
            entries,
            hits: 0,
            misses: 0,
            bytes: 0,
        }
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
            bytes: self.bytes,
        }
    }

    fn insert(&mut self, key: String, value: String) {
        let size_bytes = value.len();
        self.bytes += size_bytes;
        if let Some((evicted_key, evicted)) = self.entries.push(key, CacheEntry { value, size_bytes }) {
            self.bytes -= evicted.size_bytes;
            tracing::trace!(tier = %self.tier, key = %evicted_key, "evicted cache entry");
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
        self.bytes = 0;
    }
}

/// Owner of the three tiers.
pub struct CacheManager {
    base: Tier,
    component: Tier,
    accent: Tier,
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new(CacheLimits::default())
    }
}

impl fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheManager")
            .field("report", &self.report())
            .finish()
    }
}

impl CacheManager {
    pub fn new(limits: CacheLimits) -> Self {
        Self {
            base: Tier::new(CacheTier::Base, limits.base),
            component: Tier::new(CacheTier::Component, limits.component),
            accent: Tier::new(CacheTier::Accent, limits.accent),
        }
    }

    fn tier(&self, tier: CacheTier) -> &Tier {
        match tier {
            CacheTier::Base => &self.base,
            CacheTier::Component => &self.component,
            CacheTier::Accent => &self.accent,
        }
    }

    fn tier_mut(&mut self, tier: CacheTier) -> &mut Tier {
        match tier {
            CacheTier::Base => &mut self.base,
            CacheTier::Component => &mut self.component,
            CacheTier::Accent => &mut self.accent,
        }
    }

    /// Returns the cached value for `key`, computing and storing it on a miss.
    ///
    /// A hit returns the stored text unmodified. A failed `compute` stores
    /// nothing but still counts as a miss.
    pub fn get_or_compute<E, F>(&mut self, tier: CacheTier, key: &str, compute: F) -> std::result::Result<String, E>
    where
        F: FnOnce() -> std::result::Result<String, E>,
    {
        let slot = self.tier_mut(tier);

        if let Some(entry) = slot.entries.peek(key) {
            slot.hits += 1;
            return Ok(entry.value.clone());
        }

        slot.misses += 1;
        tracing::debug!(%tier, key, "cache miss");
        let value = compute()?;
        slot.insert(key.to_string(), value.clone());
        Ok(value)
    }

    /// Looks at an entry without touching stats.
    pub fn peek(&self, tier: CacheTier, key: &str) -> Option<&str> {
        self.tier(tier)
            .entries
            .peek(key)
            .map(|entry| entry.value.as_str())
    }

    pub fn contains(&self, tier: CacheTier, key: &str) -> bool {
        self.tier(tier).entries.contains(key)
    }

    pub fn len(&self, tier: CacheTier) -> usize {
        self.tier(tier).entries.len()
    }

    pub fn is_empty(&self, tier: CacheTier) -> bool {
        self.tier(tier).entries.is_empty()
    }

    /// Empties `tier` and resets its stats.
    pub fn invalidate(&mut self, tier: CacheTier) {
        let slot = self.tier_mut(tier);
        let dropped = slot.entries.len();
        slot.clear();
        tracing::debug!(%tier, dropped, "cache tier invalidated");
    }

    pub fn stats(&self, tier: CacheTier) -> CacheStats {
        self.tier(tier).stats()
    }

    pub fn report(&self) -> CacheReport {
        CacheReport {
            base: self.base.stats(),
            component: self.component.stats(),
            accent: self.accent.stats(),
        }
    }
}

/// SHA-256 hex digest of the JSON encoding of `value`.
///
/// Field order is the declaration order of `value`'s type, so equal inputs
/// always produce equal keys.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(format!("{:x}", hasher.finalize()))
}
