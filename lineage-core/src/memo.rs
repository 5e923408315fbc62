//! Memoization boundary around the builder.
//!
//! The builder is a pure function, so a graph built from identical input can
//! be reused. [`LineageCache`] keeps the most recent graph together with the
//! input it was built from, and rebuilds only when the input changes.
//!
//! # Fingerprint
//!
//! `xxh3` over the JSON encoding of the record slice and the build options.
//! The encoding is field-ordered by the struct definitions, so equal inputs
//! always hash equally. A matching fingerprint is only a candidate: the stored
//! records are compared before the graph is handed out, so a 64-bit collision
//! costs a rebuild instead of returning the wrong graph.

use serde::Serialize;
use std::sync::{Arc, Mutex, RwLock};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::{LineageError, Result};
use crate::lineage::{build_with, BuildOptions, LineageGraph};
use crate::types::DistroRecord;

/// Compute the cache key for a build.
pub fn fingerprint(records: &[DistroRecord], options: &BuildOptions) -> Result<u64> {
    #[derive(Serialize)]
    struct KeyInput<'a> {
        options: &'a BuildOptions,
        records: &'a [DistroRecord],
    }

    let bytes =
        serde_json::to_vec(&KeyInput { options, records }).map_err(LineageError::Encode)?;
    Ok(xxh3_64(&bytes))
}

#[derive(Debug)]
struct CacheEntry {
    key: u64,
    records: Vec<DistroRecord>,
    graph: Arc<LineageGraph>,
}

impl CacheEntry {
    fn matches(&self, key: u64, records: &[DistroRecord]) -> bool {
        self.key == key && self.records.as_slice() == records
    }
}

/// Hit/miss counters for a [`LineageCache`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups answered from the cache.
    pub hits: usize,
    /// Number of lookups that ran the builder.
    pub misses: usize,
    /// Number of explicit invalidations.
    pub invalidations: usize,
}

impl CacheStats {
    /// Calculate hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Single-slot cache of the last built graph.
///
/// Shareable between threads; concurrent misses on the same input may build
/// twice, and the last writer wins.
#[derive(Debug, Default)]
pub struct LineageCache {
    options: BuildOptions,
    entry: RwLock<Option<CacheEntry>>,
    stats: Mutex<CacheStats>,
}

impl LineageCache {
    /// Create an empty cache that builds with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache that builds with `options`.
    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Return the cached graph for `records`, building it on a miss.
    ///
    /// Build errors are returned as-is and leave the cache untouched.
    pub fn get_or_build(&self, records: &[DistroRecord]) -> Result<Arc<LineageGraph>> {
        let key = fingerprint(records, &self.options)?;

        if let Some(graph) = self.lookup(key, records) {
            self.record(|stats| stats.hits += 1);
            tracing::debug!("Lineage cache hit ({:016x})", key);
            return Ok(graph);
        }

        self.record(|stats| stats.misses += 1);
        tracing::debug!("Lineage cache miss ({:016x}), rebuilding", key);

        let graph = Arc::new(build_with(records, &self.options)?);
        let mut slot = self.entry.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(CacheEntry {
            key,
            records: records.to_vec(),
            graph: Arc::clone(&graph),
        });

        Ok(graph)
    }

    /// Drop the cached graph so the next lookup rebuilds.
    pub fn invalidate(&self) {
        let mut slot = self.entry.write().unwrap_or_else(|e| e.into_inner());
        if slot.take().is_some() {
            tracing::debug!("Lineage cache invalidated");
        }
        self.record(|stats| stats.invalidations += 1);
    }

    /// Check whether a graph for `records` is currently cached.
    pub fn is_cached(&self, records: &[DistroRecord]) -> bool {
        fingerprint(records, &self.options)
            .map(|key| self.lookup(key, records).is_some())
            .unwrap_or(false)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn lookup(&self, key: u64, records: &[DistroRecord]) -> Option<Arc<LineageGraph>> {
        let slot = self.entry.read().unwrap_or_else(|e| e.into_inner());
        slot.as_ref()
            .filter(|entry| entry.matches(key, records))
            .map(|entry| Arc::clone(&entry.graph))
    }

    fn record(&self, update: impl FnOnce(&mut CacheStats)) {
        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        update(&mut stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::CyclePolicy;
    use std::thread;

    fn catalog() -> Vec<DistroRecord> {
        vec![
            DistroRecord::new("Debian").with_description("The universal operating system"),
            DistroRecord::new("Ubuntu").derived_from("Debian"),
            DistroRecord::new("Linux Mint").derived_from("Ubuntu"),
        ]
    }

    #[test]
    fn test_second_lookup_hits() {
        let cache = LineageCache::new();
        let records = catalog();

        let first = cache.get_or_build(&records).unwrap();
        let second = cache.get_or_build(&records).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                invalidations: 0
            }
        );
    }

    #[test]
    fn test_changed_input_rebuilds() {
        let cache = LineageCache::new();
        let mut records = catalog();

        let first = cache.get_or_build(&records).unwrap();
        records.push(DistroRecord::new("Kubuntu").derived_from("Ubuntu"));
        let second = cache.get_or_build(&records).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.node_count(), 4);
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_colliding_key_is_a_miss() {
        let cache = LineageCache::new();
        let records = catalog();
        let first = cache.get_or_build(&records).unwrap();

        // Plant a different input under the key of `records`.
        let key = fingerprint(&records, cache.options()).unwrap();
        {
            let mut slot = cache.entry.write().unwrap();
            *slot = Some(CacheEntry {
                key,
                records: vec![DistroRecord::new("Gentoo")],
                graph: Arc::new(build_with(&[DistroRecord::new("Gentoo")], cache.options()).unwrap()),
            });
        }

        assert!(!cache.is_cached(&records));
        let second = cache.get_or_build(&records).unwrap();
        assert_eq!(*second, *first);
        assert_eq!(second.node_count(), 3);
        assert_eq!(cache.stats().misses, 2);
        assert!(cache.is_cached(&records));
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let cache = LineageCache::new();
        let records = catalog();

        let first = cache.get_or_build(&records).unwrap();
        assert!(cache.is_cached(&records));

        cache.invalidate();
        assert!(!cache.is_cached(&records));

        let second = cache.get_or_build(&records).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = LineageCache::with_options(
            BuildOptions::default().with_cycle_policy(CyclePolicy::Reject),
        );
        let records = vec![DistroRecord::new("X").derived_from("X")];

        assert!(cache.get_or_build(&records).is_err());
        assert!(!cache.is_cached(&records));
        assert!(cache.get_or_build(&records).is_err());
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_fingerprint_depends_on_options() {
        let records = catalog();
        let strict = fingerprint(&records, &BuildOptions::default()).unwrap();
        let folded = fingerprint(&records, &BuildOptions::default().case_insensitive()).unwrap();

        assert_ne!(strict, folded);
        assert_eq!(strict, fingerprint(&catalog(), &BuildOptions::default()).unwrap());
    }

    #[test]
    fn test_shared_between_threads() {
        let cache = Arc::new(LineageCache::new());
        let records = Arc::new(catalog());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let records = Arc::clone(&records);
                thread::spawn(move || cache.get_or_build(&records).unwrap().node_count())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 3);
        }

        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 4);
        assert!(stats.misses >= 1);
    }

    #[test]
    fn test_cache_stats_hit_rate() {
        let mut stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);

        stats.hits = 7;
        stats.misses = 3;
        assert!((stats.hit_rate() - 70.0).abs() < 0.01);
    }
}
