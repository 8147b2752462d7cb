// tests/cache_test.rs
use extended_lattice::cache::{Cache, SyncCache, TimeKey};
use extended_lattice::instrumentation::{OperationCounts, TrackedOps};
use extended_lattice::lattice::{BinomialLattice, MemoizedGeometry, TreeConfig, TreeKind};
use extended_lattice::models::BlackScholesProcess;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_cache_evaluates_at_most_once_per_key() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let cache = Cache::with_function(move |x: &i64| {
        counter.fetch_add(1, Ordering::SeqCst);
        x * x
    });

    let keys = [3, 4, 3, 3, -4, 4, 3];
    let results: Vec<i64> = keys.iter().map(|k| cache.invoke(k).unwrap()).collect();
    assert_eq!(results, vec![9, 16, 9, 9, 16, 16, 9]);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(cache.len(), 3);

    // idempotent: repeated hits return the stored value untouched
    for _ in 0..10 {
        assert_eq!(cache.invoke(&-4).unwrap(), 16);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_rebinding_discards_previous_results() {
    let mut cache = Cache::with_function(|t: &TimeKey| t.time() + 1.0);
    let key = TimeKey::new(0.25).unwrap();
    assert_eq!(cache.invoke(&key).unwrap(), 1.25);

    cache.set_function(|t: &TimeKey| t.time() * 4.0);
    assert!(!cache.contains(&key));
    assert_eq!(cache.invoke(&key).unwrap(), 1.0);
}

#[test]
fn test_sync_cache_under_contention() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let cache = SyncCache::with_function(move |k: &u64| {
        counter.fetch_add(1, Ordering::SeqCst);
        k.wrapping_mul(0x9E37_79B9_7F4A_7C15)
    });

    let distinct = 64u64;
    let sum: u64 = (0..20_000u64)
        .into_par_iter()
        .map(|i| cache.invoke(&(i % distinct)).unwrap() % 1000)
        .sum();
    println!("checksum {}", sum);

    assert_eq!(calls.load(Ordering::SeqCst), distinct as usize);
    assert_eq!(cache.len(), distinct as usize);
    for k in 0..distinct {
        assert_eq!(cache.invoke(&k).unwrap(), k.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    }
    assert_eq!(calls.load(Ordering::SeqCst), distinct as usize);
}

#[test]
fn test_memoized_lattice_counts_geometry_per_layer() {
    let process = Arc::new(BlackScholesProcess::flat(36.0, 0.06, 0.0, 0.2).unwrap());
    let counts = Arc::new(OperationCounts::new(TrackedOps::GEOMETRY | TrackedOps::UNDERLYING));
    let config = TreeConfig::new(1.0, 100).with_counts(Arc::clone(&counts));
    let inner: Arc<dyn BinomialLattice> = Arc::from(TreeKind::AdditiveEqp.build(process, &config).unwrap());
    let lattice = Arc::new(MemoizedGeometry::new(inner));

    let steps = lattice.steps();
    let total: f64 = (0..=steps)
        .into_par_iter()
        .map(|i| {
            (0..lattice.size(i))
                .map(|j| lattice.underlying(i, j).unwrap())
                .sum::<f64>()
        })
        .sum();
    assert!(total.is_finite());

    let nodes = ((steps + 1) * (steps + 2) / 2) as u64;
    assert_eq!(counts.count(TrackedOps::UNDERLYING), nodes);
    assert_eq!(counts.count(TrackedOps::GEOMETRY), (steps + 1) as u64);
    assert_eq!(lattice.cached_layers(), steps + 1);
}
