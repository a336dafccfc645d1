//! End-to-end fetch and cache behavior through the `Codex` facade
//!
//! Uses the in-memory provider so every flow is deterministic and offline.

use codex_cache::{CacheEntry, CacheStore, Freshness, STALE_WINDOW_SECS};
use codex_core::{Codex, CodexConfig};
use codex_refs::{ProjectContext, Resolver};
use codex_storage::{FetchOptions, FetchResult, StorageManager};
use codex_test_utils::MemoryStorage;
use pretty_assertions::assert_eq;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("codex_cache=debug,codex_storage=debug")
        .with_test_writer()
        .try_init();
}

fn codex_over_memory(dir: &std::path::Path) -> (Codex, MemoryStorage) {
    let provider = MemoryStorage::new();
    let storage = StorageManager::new().with_provider(Box::new(provider.clone()));
    let config = CodexConfig {
        cache_root: Some(dir.to_path_buf()),
        ..CodexConfig::default()
    };
    let codex = Codex::with_storage(config, storage, None).unwrap();
    (codex, provider)
}

#[tokio::test]
async fn fetch_miss_then_hit_round_trip() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let (codex, provider) = codex_over_memory(dir.path());
    provider.insert("codex://acme/handbook/docs/guide.md", b"# Guide".as_slice());

    let first = codex.fetch("codex://acme/handbook/docs/guide.md").await.unwrap();
    assert!(!first.from_cache);
    assert_eq!(first.text(), "# Guide");
    assert_eq!(first.source, "memory");

    let second = codex.fetch("codex://acme/handbook/docs/guide.md").await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.text(), "# Guide");
    assert_eq!(provider.fetch_count(), 1);

    // The entry landed at the documented persistence layout.
    assert!(
        dir.path()
            .join("acme/handbook/docs/guide.md")
            .is_file()
    );
    assert!(
        dir.path()
            .join("acme/handbook/docs/guide.md.meta")
            .is_file()
    );
}

#[tokio::test]
async fn local_provider_wins_for_current_project() {
    init_tracing();
    let checkout = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(checkout.path().join("docs")).unwrap();
    std::fs::write(checkout.path().join("docs/local.md"), "from checkout").unwrap();

    let cache_dir = tempfile::tempdir().unwrap();
    let context = ProjectContext {
        organization: "acme".to_string(),
        project: "handbook".to_string(),
        root_path: checkout.path().to_path_buf(),
        remote_url: None,
    };

    let remote = MemoryStorage::new();
    remote.insert("codex://acme/handbook/docs/local.md", b"from remote".as_slice());
    let storage = StorageManager::new()
        .with_provider(Box::new(codex_storage::LocalStorage::new()))
        .with_provider(Box::new(remote));

    let config = CodexConfig {
        cache_root: Some(cache_dir.path().to_path_buf()),
        ..CodexConfig::default()
    };
    let codex = Codex::with_storage(config, storage, Some(context)).unwrap();

    let result = codex.fetch("codex://acme/handbook/docs/local.md").await.unwrap();
    assert_eq!(result.text(), "from checkout");
    assert_eq!(result.source, "local");
}

#[tokio::test]
async fn invalidate_pattern_removes_matching_entries() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let (codex, provider) = codex_over_memory(dir.path());

    let uris = [
        "codex://acme/handbook/docs/a.md",
        "codex://acme/handbook/docs/b.md",
        "codex://acme/handbook/src/lib.rs",
        "codex://acme/handbook/README.md",
        "codex://acme/tools/notes.md",
    ];
    for uri in uris {
        provider.insert(uri, b"content".as_slice());
        codex.fetch(uri).await.unwrap();
    }

    // Two of the five URIs contain "docs".
    assert_eq!(codex.invalidate_pattern("docs").await.unwrap(), 2);

    // Both invalidated entries miss and refetch; an untouched one hits.
    let before = provider.fetch_count();
    codex.fetch("codex://acme/handbook/docs/a.md").await.unwrap();
    codex.fetch("codex://acme/handbook/docs/b.md").await.unwrap();
    codex.fetch("codex://acme/handbook/README.md").await.unwrap();
    assert_eq!(provider.fetch_count(), before + 2);
}

#[tokio::test]
async fn invalid_invalidation_pattern_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (codex, _provider) = codex_over_memory(dir.path());

    let err = codex.invalidate_pattern("(unclosed").await.unwrap_err();
    assert!(matches!(
        err,
        codex_core::Error::Cache(codex_cache::Error::InvalidPattern { .. })
    ));
}

#[tokio::test]
async fn stats_reflect_freshness_ladder() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let (codex, provider) = codex_over_memory(dir.path());
    provider.insert("codex://acme/handbook/docs/a.md", b"aaaa".as_slice());
    codex.fetch("codex://acme/handbook/docs/a.md").await.unwrap();

    let stats = codex.stats().await.unwrap();
    assert_eq!(stats.entry_count, 1);
    assert_eq!(stats.fresh_count, 1);
    assert_eq!(stats.stale_count, 0);
    assert_eq!(stats.expired_count, 0);
    assert_eq!(stats.total_size, 4);
    assert_eq!(stats.memory_entries, 1);
}

#[tokio::test]
async fn freshness_never_reverses_without_a_new_set() {
    // Walk one entry forward through its whole lifetime.
    let result = FetchResult::new(b"body".to_vec(), "text/markdown", "memory");
    let entry = CacheEntry::from_fetch("codex://acme/handbook/a.md", &result, 60);
    let t0 = entry.metadata.cached_at;

    let checkpoints = [
        (0, Freshness::Fresh),
        (59, Freshness::Fresh),
        (60, Freshness::Stale),
        (60 + STALE_WINDOW_SECS - 1, Freshness::Stale),
        (60 + STALE_WINDOW_SECS, Freshness::Expired),
        (60 + 10 * STALE_WINDOW_SECS, Freshness::Expired),
    ];

    let mut last = Freshness::Fresh;
    for (offset, expected) in checkpoints {
        let status = entry.status_at(t0 + chrono::Duration::seconds(offset));
        assert_eq!(status, expected, "at +{offset}s");
        let rank = |s: Freshness| match s {
            Freshness::Fresh => 0,
            Freshness::Stale => 1,
            Freshness::Expired => 2,
        };
        assert!(rank(status) >= rank(last), "ladder reversed at +{offset}s");
        last = status;
    }
}

#[tokio::test]
async fn persisted_entries_survive_a_new_manager() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    {
        let (codex, provider) = codex_over_memory(dir.path());
        provider.insert("codex://acme/handbook/docs/a.md", b"persisted".as_slice());
        codex.fetch("codex://acme/handbook/docs/a.md").await.unwrap();
    }

    // A fresh manager over the same root serves from disk without a fetch.
    let (codex, provider) = codex_over_memory(dir.path());
    let result = codex.fetch("codex://acme/handbook/docs/a.md").await.unwrap();
    assert!(result.from_cache);
    assert_eq!(result.text(), "persisted");
    assert_eq!(provider.fetch_count(), 0);
}

#[tokio::test]
async fn store_is_shared_ground_truth_for_resolver_cache_paths() {
    // The resolver's cache path and the store's entry location agree.
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::open(dir.path()).unwrap();
    let resolver = Resolver::new(store.root());

    let result = FetchResult::new(b"x".to_vec(), "text/markdown", "memory");
    let entry = CacheEntry::from_fetch("codex://acme/handbook/docs/a.md", &result, 60);
    store.put(&entry).await.unwrap();

    let resolved = resolver
        .resolve("codex://acme/handbook/docs/a.md", None)
        .unwrap();
    assert!(resolved.cache_path.is_file());
}

#[tokio::test]
async fn fetch_honors_byte_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let (codex, provider) = codex_over_memory(dir.path());
    provider.insert("codex://acme/handbook/big.bin", vec![0u8; 1024]);

    // MemoryStorage ignores the ceiling; the local provider enforces it.
    // Exercise the ceiling end-to-end through a real file instead.
    let checkout = tempfile::tempdir().unwrap();
    std::fs::write(checkout.path().join("big.bin"), vec![0u8; 1024]).unwrap();
    let context = ProjectContext {
        organization: "acme".to_string(),
        project: "handbook".to_string(),
        root_path: checkout.path().to_path_buf(),
        remote_url: None,
    };
    let storage =
        StorageManager::new().with_provider(Box::new(codex_storage::LocalStorage::new()));
    let config = CodexConfig {
        cache_root: Some(dir.path().join("ceiling-cache")),
        ..CodexConfig::default()
    };
    let codex_local = Codex::with_storage(config, storage, Some(context)).unwrap();

    let options = FetchOptions {
        max_bytes: 100,
        ..FetchOptions::default()
    };
    let err = codex_local
        .fetch_with("codex://acme/handbook/big.bin", &options)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        codex_core::Error::Cache(codex_cache::Error::Storage(
            codex_storage::Error::TooLarge { .. }
        ))
    ));

    // And the unrestricted fetch through the memory provider succeeds.
    let ok = codex.fetch("codex://acme/handbook/big.bin").await.unwrap();
    assert_eq!(ok.size, 1024);
}
