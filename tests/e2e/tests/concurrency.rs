//! Exercises the single-writer/multi-reader contract: concurrent
//! readers must never observe a torn state, and every write must be
//! reflected once the writer returns.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use stratum_core::{GraphStore, NodeQuery, Provenance};

#[test]
fn concurrent_readers_never_see_a_query_result_smaller_than_any_completed_insert() {
    let store = Arc::new(GraphStore::new());
    for _ in 0..20 {
        store.insert_node("Person", BTreeMap::new(), Provenance::default()).unwrap();
    }

    let mut readers = Vec::new();
    for _ in 0..8 {
        let store = Arc::clone(&store);
        readers.push(thread::spawn(move || {
            for _ in 0..50 {
                let result = store.query_nodes(&NodeQuery::new().with_label("Person"));
                assert_eq!(result.items.len(), 20);
            }
        }));
    }
    for reader in readers {
        reader.join().expect("reader thread should not panic");
    }
}

#[test]
fn writes_interleaved_with_concurrent_reads_are_all_eventually_visible() {
    let store = Arc::new(GraphStore::new());

    let writer_store = Arc::clone(&store);
    let writer = thread::spawn(move || {
        for _ in 0..100 {
            writer_store.insert_node("Person", BTreeMap::new(), Provenance::default()).unwrap();
        }
    });

    let mut readers = Vec::new();
    for _ in 0..4 {
        let store = Arc::clone(&store);
        readers.push(thread::spawn(move || {
            for _ in 0..100 {
                let result = store.query_nodes(&NodeQuery::new().with_label("Person"));
                // A read can observe any prefix of the writer's progress, but
                // never more nodes than have ever been inserted, and never a
                // negative or corrupted count.
                assert!(result.items.len() <= 100);
            }
        }));
    }

    writer.join().expect("writer thread should not panic");
    for reader in readers {
        reader.join().expect("reader thread should not panic");
    }

    assert_eq!(store.count_nodes(None), 100);
}

#[test]
fn concurrent_pruning_and_querying_never_lose_an_entity() {
    let store = Arc::new(GraphStore::new());
    for _ in 0..30 {
        store.insert_node("Person", BTreeMap::new(), Provenance::default()).unwrap();
    }

    let pruner_store = Arc::clone(&store);
    let pruner = thread::spawn(move || {
        for _ in 0..20 {
            pruner_store.prune(Some(5), Some(10));
        }
    });

    let mut readers = Vec::new();
    for _ in 0..4 {
        let store = Arc::clone(&store);
        readers.push(thread::spawn(move || {
            for _ in 0..50 {
                let result = store.query_nodes(&NodeQuery::new().with_label("Person"));
                assert_eq!(result.items.len(), 30);
            }
        }));
    }

    pruner.join().expect("pruner thread should not panic");
    for reader in readers {
        reader.join().expect("reader thread should not panic");
    }

    assert_eq!(store.count_nodes(None), 30);
}
