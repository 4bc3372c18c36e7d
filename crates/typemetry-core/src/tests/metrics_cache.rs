use super::support::SyntheticRasterizer;
use crate::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

fn sample_metrics(x_height: f64) -> FontMetrics {
    FontMetrics {
        x_height: Some(x_height),
        ..FontMetrics::default()
    }
}

#[test]
fn get_or_compute_runs_once_per_key() {
    let cache = MetricsCache::new();
    let calls = AtomicUsize::new(0);
    let key = FontSpec::new("Georgia").key();

    for _ in 0..3 {
        let m = cache
            .get_or_compute(&key, || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(sample_metrics(0.482))
            })
            .unwrap();
        assert_eq!(m.x_height, Some(0.482));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn keys_are_case_and_quote_insensitive() {
    let cache = MetricsCache::new();
    cache.seed(FontSpec::new("Georgia").key(), sample_metrics(0.482));

    let quoted = FontSpec::new("\"GEORGIA\"").with_size(12.0);
    assert_eq!(cache.get(&quoted.key()), Some(sample_metrics(0.482)));
    let spaced = FontKey::new("  georgia ", FontWeight::NORMAL, FontStyle::Normal);
    assert_eq!(cache.get(&spaced), Some(sample_metrics(0.482)));
}

#[test]
fn weight_and_style_are_part_of_the_key() {
    let cache = MetricsCache::new();
    cache.seed(FontSpec::new("Georgia").key(), sample_metrics(0.482));
    let bold = FontSpec::new("Georgia").with_weight(FontWeight::BOLD);
    let italic = FontSpec::new("Georgia").with_style(FontStyle::Italic);
    assert_eq!(cache.get(&bold.key()), None);
    assert_eq!(cache.get(&italic.key()), None);
}

#[test]
fn multi_word_families_do_not_collide_with_concatenated_keys() {
    // A string key like "{family} {weight} {style}" would make these two identical.
    let a = FontKey::new("Foo 400", FontWeight::new(700).unwrap(), FontStyle::Normal);
    let b = FontKey::new("Foo", FontWeight::new(400).unwrap(), FontStyle::Normal);
    assert_ne!(a, b);
}

#[test]
fn failed_computation_is_not_cached() {
    let cache = MetricsCache::new();
    let key = FontSpec::new("Broken").key();
    let err = cache
        .get_or_compute(&key, || Err(Error::backend("offline")))
        .unwrap_err();
    assert!(matches!(err, Error::BackendUnavailable { .. }));
    assert!(cache.is_empty());

    let m = cache
        .get_or_compute(&key, || Ok(sample_metrics(0.5)))
        .unwrap();
    assert_eq!(m.x_height, Some(0.5));
}

#[test]
fn invalidate_and_clear_drop_entries() {
    let cache = MetricsCache::new();
    let a = FontSpec::new("A").key();
    let b = FontSpec::new("B").key();
    cache.seed(a.clone(), sample_metrics(0.4));
    cache.seed(b.clone(), sample_metrics(0.6));

    assert!(cache.invalidate(&a));
    assert!(!cache.invalidate(&a));
    assert_eq!(cache.get(&a), None);
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.get(&b), None);
}

#[test]
fn seeded_entries_short_circuit_measurement() {
    let backend = Arc::new(SyntheticRasterizer::reference());
    let tm = Typemetry::new(backend.clone());
    let font = FontSpec::new("Georgia");
    tm.cache().seed(font.key(), sample_metrics(0.482));

    let m = tm.measure_font(&font).unwrap();
    assert_eq!(m.x_height, Some(0.482));
    assert_eq!(backend.rasterize_calls(), 0);
}

#[test]
fn concurrent_callers_share_one_rasterization_pass() {
    let slow = SyntheticRasterizer::reference().with_delay(Duration::from_millis(50));
    let backend = Arc::new(slow);
    let tm = Typemetry::new(backend.clone());
    let font = FontSpec::new("Synthetic");
    let threads = 4;
    let barrier = Barrier::new(threads);

    let results: Vec<FontMetrics> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    tm.measure_font(&font).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(backend.native_bbox_calls(), 1);
    assert_eq!(backend.rasterize_calls(), Trial::BATTERY.len());
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn different_keys_compute_independently() {
    let backend = Arc::new(SyntheticRasterizer::reference());
    let tm = Typemetry::new(backend.clone());
    tm.measure_font(&FontSpec::new("A")).unwrap();
    tm.measure_font(&FontSpec::new("B")).unwrap();
    let lower = FontSpec::new("a").with_size(48.0);
    tm.measure_font(&lower).unwrap();
    assert_eq!(backend.native_bbox_calls(), 2);
    assert_eq!(tm.cache().len(), 2);
}

#[test]
fn global_cache_is_shared() {
    let a = MetricsCache::global();
    let b = MetricsCache::global();
    assert!(Arc::ptr_eq(&a, &b));
}
