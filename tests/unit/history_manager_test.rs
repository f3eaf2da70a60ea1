//! Unit tests for the SQLite-backed history log.

use driftwood::database::Database;
use driftwood::managers::history_manager::{HistoryManager, DEFAULT_RETENTION_DAYS};
use driftwood::types::errors::HistoryError;
use rstest::rstest;

const DAY: i64 = 86_400;
// 2024-03-10 12:00:00 UTC
const NOON_MAR_10: i64 = 1_710_072_000;

fn setup() -> Database {
    Database::open_in_memory().expect("in-memory db")
}

#[test]
fn test_empty_history() {
    let db = setup();
    let mgr = HistoryManager::new(db.connection());
    assert!(mgr.list_history(None).unwrap().is_empty());
    assert_eq!(mgr.count().unwrap(), 0);
    assert_eq!(mgr.retention_days(), DEFAULT_RETENTION_DAYS);
}

#[test]
fn test_list_is_newest_first() {
    let db = setup();
    let mut mgr = HistoryManager::new(db.connection());
    mgr.record_visit_at("https://a.com", "A", 100).unwrap();
    mgr.record_visit_at("https://c.com", "C", 300).unwrap();
    mgr.record_visit_at("https://b.com", "B", 200).unwrap();

    let urls: Vec<String> = mgr
        .list_history(None)
        .unwrap()
        .into_iter()
        .map(|e| e.url)
        .collect();
    assert_eq!(urls, vec!["https://c.com", "https://b.com", "https://a.com"]);
}

#[test]
fn test_same_second_visits_keep_insertion_order() {
    let db = setup();
    let mut mgr = HistoryManager::new(db.connection());
    let first = mgr.record_visit_at("https://a.com", "A", 500).unwrap();
    let second = mgr.record_visit_at("https://a.com", "A", 500).unwrap();

    let ids: Vec<i64> = mgr.list_history(None).unwrap().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![second, first]);
}

#[test]
fn test_list_limit() {
    let db = setup();
    let mut mgr = HistoryManager::new(db.connection());
    for i in 0..5 {
        mgr.record_visit_at(&format!("https://{}.com", i), "", i).unwrap();
    }
    let limited = mgr.list_history(Some(2)).unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].url, "https://4.com");
}

#[test]
fn test_record_visit_stamps_now() {
    let db = setup();
    let mut mgr = HistoryManager::new(db.connection());
    let before = HistoryManager::now();
    mgr.record_visit("https://now.com", "Now").unwrap();
    let after = HistoryManager::now();

    let entry = &mgr.list_history(None).unwrap()[0];
    assert!(entry.visit_time >= before && entry.visit_time <= after);
    assert_eq!(entry.title, "Now");
}

#[test]
fn test_list_for_date_uses_utc_day() {
    let db = setup();
    let mut mgr = HistoryManager::new(db.connection());
    let midnight = NOON_MAR_10 - DAY / 2;
    mgr.record_visit_at("https://before.com", "", midnight - 1).unwrap();
    mgr.record_visit_at("https://start.com", "", midnight).unwrap();
    mgr.record_visit_at("https://noon.com", "", NOON_MAR_10).unwrap();
    mgr.record_visit_at("https://next.com", "", midnight + DAY).unwrap();

    let urls: Vec<String> = mgr
        .list_history_for_date("2024-03-10")
        .unwrap()
        .into_iter()
        .map(|e| e.url)
        .collect();
    assert_eq!(urls, vec!["https://noon.com", "https://start.com"]);
}

#[rstest]
#[case("2024-13-01")]
#[case("yesterday")]
#[case("")]
fn test_list_for_date_rejects_bad_dates(#[case] date: &str) {
    let db = setup();
    let mgr = HistoryManager::new(db.connection());
    assert!(matches!(
        mgr.list_history_for_date(date),
        Err(HistoryError::InvalidDate(_))
    ));
}

#[test]
fn test_search_matches_title_or_url() {
    let db = setup();
    let mut mgr = HistoryManager::new(db.connection());
    mgr.record_visit_at("https://rust-lang.org", "Rust", 1).unwrap();
    mgr.record_visit_at("https://example.com/rusty", "Example", 2).unwrap();
    mgr.record_visit_at("https://python.org", "Python", 3).unwrap();

    assert_eq!(mgr.search_history("rust").unwrap().len(), 2);
    assert_eq!(mgr.search_history("Python").unwrap().len(), 1);
    assert!(mgr.search_history("haskell").unwrap().is_empty());
}

#[rstest]
#[case("100%", vec!["Save 100% now"])]
#[case("a_b", vec!["a_b notes"])]
#[case("%", vec!["Save 100% now"])]
#[case("_", vec!["a_b notes"])]
fn test_search_treats_wildcards_literally(#[case] query: &str, #[case] expected: Vec<&str>) {
    let db = setup();
    let mut mgr = HistoryManager::new(db.connection());
    mgr.record_visit_at("https://shop.com", "Save 100% now", 1).unwrap();
    mgr.record_visit_at("https://notes.com", "a_b notes", 2).unwrap();
    mgr.record_visit_at("https://plain.com", "aXb 1000 plain", 3).unwrap();

    let titles: Vec<String> = mgr
        .search_history(query)
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, expected);
}

#[test]
fn test_search_matches_backslash() {
    let db = setup();
    let mut mgr = HistoryManager::new(db.connection());
    mgr.record_visit_at("file:///C:\\docs", "Docs", 1).unwrap();
    mgr.record_visit_at("https://docs.com", "Docs", 2).unwrap();
    assert_eq!(mgr.search_history("C:\\docs").unwrap().len(), 1);
}

#[test]
fn test_update_title_rewrites_recorded_visit() {
    let db = setup();
    let mut mgr = HistoryManager::new(db.connection());
    let id = mgr.record_visit_at("https://a.com", "a.com", 1).unwrap();
    mgr.update_title(id, "Site A").unwrap();
    assert_eq!(mgr.list_history(None).unwrap()[0].title, "Site A");
    assert!(matches!(
        mgr.update_title(id + 1, "missing"),
        Err(HistoryError::NotFound(_))
    ));
}

#[test]
fn test_delete_entry() {
    let db = setup();
    let mut mgr = HistoryManager::new(db.connection());
    let keep = mgr.record_visit_at("https://keep.com", "", 1).unwrap();
    let gone = mgr.record_visit_at("https://gone.com", "", 2).unwrap();

    mgr.delete_entry(gone).unwrap();
    let left = mgr.list_history(None).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, keep);

    assert!(matches!(mgr.delete_entry(gone), Err(HistoryError::NotFound(id)) if id == gone));
}

#[test]
fn test_clear_all() {
    let db = setup();
    let mut mgr = HistoryManager::new(db.connection());
    mgr.record_visit_at("https://a.com", "", 1).unwrap();
    mgr.record_visit_at("https://b.com", "", 2).unwrap();
    mgr.clear_all().unwrap();
    assert_eq!(mgr.count().unwrap(), 0);
}

#[test]
fn test_cleanup_respects_retention_window() {
    let db = setup();
    let mut mgr = HistoryManager::new(db.connection()).with_retention_days(7);
    let now = NOON_MAR_10;
    mgr.record_visit_at("https://fresh.com", "", now - DAY).unwrap();
    mgr.record_visit_at("https://edge.com", "", now - 7 * DAY).unwrap();
    mgr.record_visit_at("https://stale.com", "", now - 7 * DAY - 1).unwrap();
    mgr.record_visit_at("https://ancient.com", "", now - 400 * DAY).unwrap();

    assert_eq!(mgr.cleanup_at(now).unwrap(), 2);
    let urls: Vec<String> = mgr
        .list_history(None)
        .unwrap()
        .into_iter()
        .map(|e| e.url)
        .collect();
    assert_eq!(urls, vec!["https://fresh.com", "https://edge.com"]);
}

#[test]
fn test_cleanup_on_empty_log() {
    let db = setup();
    let mut mgr = HistoryManager::new(db.connection());
    assert_eq!(mgr.cleanup().unwrap(), 0);
}
