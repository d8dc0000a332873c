//! Integration tests for the two keyword backends.

use kwd_db::sidecar::{read_sidecar, sidecar_path, write_sidecar};
use kwd_db::{hash_of, DbError, KeywordCache, KeywordMap, PutOutcome};
use std::thread;
use tempfile::TempDir;

fn dict(pairs: &[(&str, &str)]) -> KeywordMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_cache_survives_reopening() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("keywords.db");
    let hash = hash_of("dbname='osm' host=localhost port=5432");
    let keywords = dict(&[("category", "exposure"), ("datatype", "osm")]);

    {
        let cache = KeywordCache::new(&db_path);
        assert_eq!(cache.put(&hash, &keywords).unwrap(), PutOutcome::Inserted);
    }

    let reopened = KeywordCache::new(&db_path);
    assert_eq!(reopened.get(&hash).unwrap(), keywords);
    assert_eq!(reopened.count().unwrap(), 1);
}

#[test]
fn test_concurrent_writers_last_one_wins() {
    const WRITERS: usize = 8;
    const ROUNDS: usize = 50;

    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("keywords.db");
    KeywordCache::new(&db_path).ensure_schema().unwrap();
    let shared = hash_of("dbname='osm' host=localhost table=roads");

    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let db_path = &db_path;
            let shared = &shared;
            scope.spawn(move || {
                let cache = KeywordCache::new(db_path);
                let own = hash_of(&format!("dbname='osm' table=layer_{writer}"));
                let writer = writer.to_string();
                for round in 0..ROUNDS {
                    let round = round.to_string();
                    let keywords = dict(&[("writer", writer.as_str()), ("round", round.as_str())]);
                    cache.put(shared, &keywords).unwrap();
                    cache.put(&own, &keywords).unwrap();
                }
            });
        }
    });

    let cache = KeywordCache::new(&db_path);
    assert_eq!(cache.count().unwrap(), WRITERS as u64 + 1);

    // The final record is the last put of whichever writer committed last.
    let last = cache.get(&shared).unwrap();
    assert_eq!(last["round"], (ROUNDS - 1).to_string());
    let writer: usize = last["writer"].parse().unwrap();
    assert!(writer < WRITERS);

    for writer in 0..WRITERS {
        let own = hash_of(&format!("dbname='osm' table=layer_{writer}"));
        let record = cache.get(&own).unwrap();
        assert_eq!(record["writer"], writer.to_string());
        assert_eq!(record["round"], (ROUNDS - 1).to_string());
    }
}

#[test]
fn test_caches_on_different_files_are_independent() {
    let temp = TempDir::new().unwrap();
    let a = KeywordCache::new(temp.path().join("a.db"));
    let b = KeywordCache::new(temp.path().join("b.db"));
    let hash = hash_of("url=http://example.com/wms");

    a.put(&hash, &dict(&[("title", "WMS")])).unwrap();
    assert!(a.contains(&hash).unwrap());
    assert!(b.get(&hash).unwrap_err().is_not_found());
}

#[test]
fn test_hand_edited_sidecar_is_read() {
    let temp = TempDir::new().unwrap();
    let dataset = temp.path().join("flood.tif");
    std::fs::write(
        sidecar_path(&dataset),
        "# edited by hand\ncategory: hazard\nsubcategory: flood\nunit: m\n",
    )
    .unwrap();

    let keywords = read_sidecar(&dataset).unwrap();
    assert_eq!(
        keywords,
        dict(&[("category", "hazard"), ("subcategory", "flood"), ("unit", "m")])
    );
}

#[test]
fn test_sidecar_write_is_deterministic() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("a.shp");
    let second = temp.path().join("b.shp");
    let keywords = dict(&[("z", "last"), ("a", "first"), ("m", "middle")]);

    write_sidecar(&first, &keywords).unwrap();
    write_sidecar(&second, &keywords).unwrap();

    let a = std::fs::read_to_string(sidecar_path(&first)).unwrap();
    let b = std::fs::read_to_string(sidecar_path(&second)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, "a: first\nm: middle\nz: last\n");
}

#[test]
fn test_malformed_sidecar_reports_line() {
    let temp = TempDir::new().unwrap();
    let dataset = temp.path().join("roads.shp");
    std::fs::write(sidecar_path(&dataset), "category: exposure\n\ngarbage\n").unwrap();

    match read_sidecar(&dataset).unwrap_err() {
        DbError::SidecarParse { line, path, .. } => {
            assert_eq!(line, 3);
            assert_eq!(path, sidecar_path(&dataset));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
