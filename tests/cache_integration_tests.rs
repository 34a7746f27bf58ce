//! Integration Tests for the Cache Engine
//!
//! Exercises the public API end to end, including shared use across threads.

use std::sync::Arc;
use std::thread::{self, sleep};
use std::time::Duration;

use mini_kv::cache::{parse_size, DEFAULT_MAX_MEMORY};
use mini_kv::{CacheEngine, CacheError, Command, Config};

// == Helper Functions ==

fn create_test_cache(max_memory: u64) -> CacheEngine {
    CacheEngine::new(max_memory, Duration::ZERO)
}

// == Basic Operations ==

#[test]
fn test_set_a_key() {
    let cache = CacheEngine::default();
    assert!(cache.set("name", "helbing", None).is_ok());
    assert_eq!(cache.get("name"), Some("helbing".to_string()));
}

#[test]
fn test_memory_size_tracks_key_and_value() {
    let cache = CacheEngine::default();
    cache.set("name", "helbing", None).unwrap();
    assert_eq!(cache.current_memory(), ("name".len() + "helbing".len()) as u64);

    cache.delete("name");
    assert_eq!(cache.current_memory(), 0);
}

#[test]
fn test_exists_and_count() {
    let cache = CacheEngine::default();
    cache.set("a", "1", None).unwrap();
    cache.set("b", "2", None).unwrap();

    assert!(cache.exists("a"));
    assert!(!cache.exists("c"));
    assert_eq!(cache.count(), 2);
}

// == Size Limits ==

#[test]
fn test_key_invalid() {
    let cache = CacheEngine::default();
    let result = cache.set("k".repeat(65), "helbing", None);
    assert_eq!(result, Err(CacheError::KeyInvalid(65)));
    assert_eq!(cache.count(), 0);
    assert_eq!(cache.current_memory(), 0);
}

#[test]
fn test_value_invalid() {
    let cache = CacheEngine::default();
    let result = cache.set("helbing", "v".repeat(1025), None);
    assert_eq!(result, Err(CacheError::ValueInvalid(1025)));
    assert_eq!(cache.count(), 0);
    assert_eq!(cache.current_memory(), 0);
}

// == Expiration ==

#[test]
fn test_key_expire() {
    let cache = CacheEngine::default();
    cache
        .set("k", "v", Some(Duration::from_millis(100)))
        .unwrap();
    assert_eq!(cache.get("k"), Some("v".to_string()));

    sleep(Duration::from_millis(250));

    assert_eq!(cache.get("k"), None);
}

#[test]
fn test_default_ttl_from_config() {
    let config = Config {
        default_ttl: Duration::from_millis(50),
        ..Config::default()
    };
    let cache = CacheEngine::from_config(&config);
    cache.set("k", "v", None).unwrap();

    sleep(Duration::from_millis(150));

    assert_eq!(cache.get("k"), None);
    assert!(cache.exists("k"), "expired entries are reclaimed lazily");
}

// == Eviction ==

#[test]
fn test_is_lru() {
    let cache = CacheEngine::default();
    for i in 0..1200 {
        cache
            .set(format!("test_{}", i), "test".repeat(256), None)
            .unwrap();
    }

    assert!(
        cache.current_memory() < cache.max_memory(),
        "current memory {} reached max memory {}",
        cache.current_memory(),
        cache.max_memory()
    );
    assert!(!cache.exists("test_0"));
    assert!(cache.exists("test_1199"));
}

#[test]
fn test_eviction_removes_first_key() {
    // Room for two 10-byte entries
    let cache = create_test_cache(25);

    cache.set("k1", "value001", None).unwrap();
    cache.set("k2", "value002", None).unwrap();
    cache.set("k3", "value003", None).unwrap();

    assert!(!cache.exists("k1"));
    assert!(cache.exists("k2"));
    assert!(cache.exists("k3"));
}

#[test]
fn test_recency_order() {
    let cache = CacheEngine::default();
    cache.set("A", "1", None).unwrap();
    cache.set("B", "2", None).unwrap();
    cache.set("C", "3", None).unwrap();
    assert_eq!(cache.keys(), vec!["C", "B", "A"]);

    cache.set("A", "1", None).unwrap();
    assert_eq!(cache.keys(), vec!["A", "C", "B"]);
}

// == Flush ==

#[test]
fn test_flush() {
    let cache = CacheEngine::default();
    cache.set("name", "helbing", None).unwrap();

    assert!(cache.flush());
    assert_eq!(cache.count(), 0);
    assert_eq!(cache.current_memory(), 0);
    assert!(!cache.exists("name"));
}

// == Capacity Configuration ==

#[test]
fn test_parse_size() {
    assert_eq!(parse_size("2GB").unwrap(), 2 * 1024 * 1024 * 1024);
    assert_eq!(parse_size("1kb").unwrap(), 1024);
}

#[test]
fn test_unrecognized_unit_keeps_default() {
    let cache = CacheEngine::default();
    assert!(cache.set_max_memory("12PB").is_ok());
    assert_eq!(cache.max_memory(), DEFAULT_MAX_MEMORY);
}

#[test]
fn test_malformed_size_is_noop() {
    let cache = create_test_cache(4096);
    assert!(matches!(
        cache.set_max_memory("xKB"),
        Err(CacheError::InvalidSize(_))
    ));
    assert_eq!(cache.max_memory(), 4096);
}

// == Concurrency ==

#[test]
fn test_concurrent_writers_keep_accounting() {
    let cache = Arc::new(create_test_cache(4 * 1024));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..500 {
                    let key = format!("t{}_{}", t, i % 50);
                    cache.set(key.clone(), "x".repeat(i % 100), None).unwrap();
                    if i % 7 == 0 {
                        cache.delete(&key);
                    }
                    let _ = cache.get(&key);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.current_memory() < cache.max_memory());

    // Deleting everything must bring the counter back to exactly zero.
    for key in cache.keys() {
        assert!(cache.delete(&key));
    }
    assert_eq!(cache.count(), 0);
    assert_eq!(cache.current_memory(), 0);
}

// == Console Commands ==

#[test]
fn test_console_roundtrip() {
    let cache = CacheEngine::default();
    let run = |line: &str| line.parse::<Command>().and_then(|c| c.execute(&cache));

    assert_eq!(run("SET greeting hello 60000").unwrap(), "OK");
    assert_eq!(run("GET greeting").unwrap(), "hello");
    assert_eq!(run("KEYS").unwrap(), "1");
    assert!(run("MAXMEMORY nope").is_err());
}
