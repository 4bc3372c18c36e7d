use crate::Result;
use crate::font::FontKey;
use crate::metrics::FontMetrics;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

type Slot = Arc<Mutex<Option<FontMetrics>>>;

/// Memoized metrics per font identity with single-flight computation.
///
/// Each key owns a slot mutex. The first caller computes while holding it; concurrent callers
/// for the same key block on the slot and then read the stored record. Failed computations
/// leave the slot empty, so the next caller retries.
#[derive(Debug, Default)]
pub struct MetricsCache {
    slots: Mutex<FxHashMap<FontKey, Slot>>,
}

impl MetricsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> Arc<MetricsCache> {
        static CACHE: OnceLock<Arc<MetricsCache>> = OnceLock::new();
        Arc::clone(CACHE.get_or_init(|| Arc::new(MetricsCache::new())))
    }

    fn slot(&self, key: &FontKey) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    pub fn get(&self, key: &FontKey) -> Option<FontMetrics> {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.get(key).cloned()
        }?;
        let value = *slot.lock().unwrap_or_else(PoisonError::into_inner);
        value
    }

    pub fn get_or_compute<F>(&self, key: &FontKey, compute: F) -> Result<FontMetrics>
    where
        F: FnOnce() -> Result<FontMetrics>,
    {
        let slot = self.slot(key);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(metrics) = *guard {
            tracing::trace!(%key, "font metrics cache hit");
            return Ok(metrics);
        }
        tracing::debug!(%key, "font metrics cache miss");
        let metrics = compute()?;
        *guard = Some(metrics);
        Ok(metrics)
    }

    /// Stores a known record without measuring, replacing any existing entry.
    pub fn seed(&self, key: FontKey, metrics: FontMetrics) {
        let slot = self.slot(&key);
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(metrics);
    }

    pub fn invalidate(&self, key: &FontKey) -> bool {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.clear();
    }

    /// Number of keys holding a computed record.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.values().cloned().collect()
        };
        slots.iter().filter(|slot| is_filled(slot)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_filled(slot: &Slot) -> bool {
    let value = slot.lock().unwrap_or_else(PoisonError::into_inner);
    value.is_some()
}
