use lca_core::{ImpactResult, ProjectId};
use lca_store::{
    JsonFileBackend, MemoryBackend, ResultStore, Snapshot, StorageBackend, StoreError, Tier,
};
use lca_test_utils::{sample_result, sample_result_with_id};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Backend whose writes can be switched off
#[derive(Default)]
struct FlakyBackend {
    inner: MemoryBackend,
    broken: AtomicBool,
}

impl StorageBackend for FlakyBackend {
    fn load(&self) -> Result<Snapshot, StoreError> {
        self.inner.load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: "flaky".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        self.inner.save(snapshot)
    }
}

#[test]
fn overwrite_keeps_last_writer() {
    let store = ResultStore::open(MemoryBackend::new()).unwrap();
    let id = ProjectId::from_millis(1_000);
    let r1 = sample_result_with_id(1, id.clone());
    let mut r2 = sample_result_with_id(2, id.clone());
    r2.recommendations.push("second writer".to_string());

    store.put(r1.clone()).unwrap();
    store.put(r2.clone()).unwrap();

    let got = store.get(&id).unwrap();
    assert_eq!(got, r2);
    assert_ne!(got, r1);
    assert_eq!(store.len(), 1);
}

#[test]
fn overwrite_of_older_entry_refreshes_hot_slot() {
    let store = ResultStore::open(MemoryBackend::new()).unwrap();
    let old = sample_result_with_id(1, ProjectId::from_millis(1));
    let other = sample_result_with_id(2, ProjectId::from_millis(2));
    let mut replacement = sample_result_with_id(3, ProjectId::from_millis(1));
    replacement.recommendations.clear();

    store.put(old).unwrap();
    store.put(other).unwrap();
    store.put(replacement.clone()).unwrap();

    let (got, tier) = store.lookup(&replacement.project_id).unwrap();
    assert_eq!(got, replacement);
    assert_eq!(tier, Tier::Hot);
    assert_eq!(store.latest(), Some(replacement));
}

#[test]
fn results_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lca-storage.json");
    let first = sample_result_with_id(1, ProjectId::from_millis(10));
    let second = sample_result_with_id(2, ProjectId::from_millis(20));

    {
        let store = ResultStore::open(JsonFileBackend::new(&path)).unwrap();
        store.put(first.clone()).unwrap();
        store.put(second.clone()).unwrap();
    }

    let reopened = ResultStore::open(JsonFileBackend::new(&path)).unwrap();
    assert_eq!(reopened.get(&first.project_id).unwrap(), first);
    assert_eq!(reopened.get(&second.project_id).unwrap(), second);
    assert_eq!(reopened.latest(), Some(second));
    assert_eq!(reopened.newest_id_millis(), Some(20));
}

#[test]
fn clear_empties_both_tiers_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lca-storage.json");
    let r = sample_result(4);

    let store = ResultStore::open(JsonFileBackend::new(&path)).unwrap();
    store.put(r.clone()).unwrap();
    store.clear().unwrap();
    assert!(store.get(&r.project_id).unwrap_err().is_not_found());
    assert!(store.latest().is_none());

    let reopened = ResultStore::open(JsonFileBackend::new(&path)).unwrap();
    assert!(reopened.is_empty());
}

#[test]
fn failed_persist_changes_nothing() {
    let backend = std::sync::Arc::new(FlakyBackend::default());
    let store = ResultStore::open_shared(backend.clone()).unwrap();
    let kept = sample_result_with_id(1, ProjectId::from_millis(1));
    store.put(kept.clone()).unwrap();

    backend.broken.store(true, Ordering::SeqCst);
    let lost = sample_result_with_id(2, ProjectId::from_millis(2));
    assert!(store.put(lost.clone()).is_err());

    assert!(store.get(&lost.project_id).unwrap_err().is_not_found());
    assert_eq!(store.latest(), Some(kept));
    assert_eq!(store.len(), 1);
}

fn distinct_results(max: usize) -> impl Strategy<Value = Vec<ImpactResult>> {
    prop::collection::btree_set(0i64..1_000_000, 1..max).prop_map(|ids| {
        ids.into_iter()
            .enumerate()
            .map(|(i, millis)| sample_result_with_id(i as u64, ProjectId::from_millis(millis)))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip_after_unrelated_puts(results in distinct_results(12)) {
        let store = ResultStore::open(MemoryBackend::new()).unwrap();
        let target = results[0].clone();
        store.put(target.clone()).unwrap();
        for other in &results[1..] {
            store.put(other.clone()).unwrap();
        }
        prop_assert_eq!(store.get(&target.project_id).unwrap(), target);
        prop_assert_eq!(store.len(), results.len());
    }

    #[test]
    fn prop_file_round_trip(results in distinct_results(6)) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        {
            let store = ResultStore::open(JsonFileBackend::new(&path)).unwrap();
            for r in &results {
                store.put(r.clone()).unwrap();
            }
        }
        let reopened = ResultStore::open(JsonFileBackend::new(&path)).unwrap();
        for r in &results {
            prop_assert_eq!(&reopened.get(&r.project_id).unwrap(), r);
        }
    }
}
