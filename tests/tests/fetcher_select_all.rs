use pretty_assertions::assert_eq;
use tablelink::{Fetcher, RecordCache};
use tests::{fixtures, FaultyDriver, LoggingDriver};

fn ids(records: &[std::sync::Arc<tablelink::Record>]) -> Vec<&str> {
    records.iter().map(|record| record.id()).collect()
}

#[tokio::test]
async fn pages_flatten_in_source_order() {
    let single = LoggingDriver::new(fixtures::memory(100));
    let paged = LoggingDriver::new(fixtures::memory(1));
    let cache = RecordCache::new();

    let all_at_once = Fetcher::new(&single, &cache)
        .select_all(&fixtures::table("People"), false)
        .await
        .unwrap();
    let one_by_one = Fetcher::new(&paged, &cache)
        .select_all(&fixtures::table("People"), false)
        .await
        .unwrap();

    assert_eq!(ids(&all_at_once), ["recAda", "recGrace", "recLinus", "recKen"]);
    assert_eq!(ids(&all_at_once), ids(&one_by_one));

    assert_eq!(single.exec_log().select_pages("People"), 1);
    assert_eq!(paged.exec_log().select_pages("People"), 4);
}

#[tokio::test]
async fn paginated_select_counts_one_request() {
    let driver = LoggingDriver::new(fixtures::memory(2));
    let cache = RecordCache::new();

    Fetcher::new(&driver, &cache)
        .select_all(&fixtures::table("People"), false)
        .await
        .unwrap();

    assert_eq!(driver.exec_log().select_pages("People"), 2);
    assert_eq!(cache.requests(), 1);
    assert_eq!(cache.cache_hits(), 0);
}

#[tokio::test]
async fn select_without_caching_leaves_cache_empty() {
    let driver = LoggingDriver::new(fixtures::memory(2));
    let cache = RecordCache::new();

    Fetcher::new(&driver, &cache)
        .select_all(&fixtures::table("People"), false)
        .await
        .unwrap();

    assert!(cache.is_empty());
}

#[tokio::test]
async fn cached_select_serves_lookups() {
    let driver = LoggingDriver::new(fixtures::memory(3));
    let log = driver.exec_log();
    let cache = RecordCache::new();
    let fetcher = Fetcher::new(&driver, &cache);
    let people = fixtures::table("People");

    let records = fetcher.select_all(&people, true).await.unwrap();
    assert_eq!(cache.len(), records.len());

    for record in &records {
        let found = fetcher.select_one(record.id(), &people).await.unwrap();
        assert_eq!(found, *record);
    }

    assert_eq!(log.num_finds(), 0);
    assert_eq!(cache.requests(), 1);
    assert_eq!(cache.cache_hits(), records.len() as u64);
}

#[tokio::test]
async fn cached_records_are_scoped_to_their_table() {
    let driver = LoggingDriver::new(
        fixtures::memory(10).table("appOther", "People", fixtures::people()),
    );
    let log = driver.exec_log();
    let cache = RecordCache::new();
    let fetcher = Fetcher::new(&driver, &cache);

    fetcher
        .select_all(&fixtures::table("People"), true)
        .await
        .unwrap();
    fetcher
        .select_one("recAda", &tablelink::TableRef::new("appOther", "People"))
        .await
        .unwrap();

    assert_eq!(log.num_finds(), 1);
    assert_eq!(cache.cache_hits(), 0);
}

#[tokio::test]
async fn max_records_truncates() {
    let driver = LoggingDriver::new(fixtures::memory(1));
    let cache = RecordCache::new();

    let records = Fetcher::new(&driver, &cache)
        .select_all(&fixtures::table("People").max_records(2), false)
        .await
        .unwrap();

    assert_eq!(ids(&records), ["recAda", "recGrace"]);
    assert_eq!(driver.exec_log().select_pages("People"), 2);
}

#[tokio::test]
async fn failed_page_discards_partial_results() {
    let driver = FaultyDriver::new(fixtures::memory(1)).fail_select_after("People", 2);
    let cache = RecordCache::new();

    let err = Fetcher::new(&driver, &cache)
        .select_all(&fixtures::table("People"), false)
        .await
        .unwrap_err();

    assert!(err.is_driver());
    assert_eq!(
        err.to_string(),
        "selecting records from appCompany/People: injected fault: select page 2 of appCompany/People"
    );
    assert_eq!(cache.requests(), 1);
}

#[tokio::test]
async fn unknown_table_fails() {
    let driver = fixtures::memory(10);
    let cache = RecordCache::new();

    let err = Fetcher::new(&driver, &cache)
        .select_all(&fixtures::table("Nope"), true)
        .await
        .unwrap_err();

    assert!(err.is_driver());
}
