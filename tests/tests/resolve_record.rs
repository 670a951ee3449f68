use pretty_assertions::assert_eq;
use tablelink::{
    Config, Fetcher, Field, FieldSpec, Fields, Record, RecordCache, RecordKey, Resolver, Row,
    TableOptions, Value, Warning,
};
use tablelink_driver_memory::Memory;
use tests::{fixtures, FaultyDriver, LoggingDriver};

fn row<const N: usize>(fields: [(&str, Field); N]) -> Row {
    fields.into_iter().collect()
}

fn value(v: impl Into<Value>) -> Field {
    Field::Value(v.into())
}

fn person(name: &str) -> Row {
    row([("Name", value(name))])
}

fn people_with_manager() -> TableOptions {
    TableOptions::new(fixtures::BASE, "People")
        .field(FieldSpec::direct("Name"))
        .field(FieldSpec::resolved("Manager", fixtures::people_names()))
}

// ---------------------------------------------------------------------------
// Direct fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn direct_fields_in_declared_order() {
    let driver = LoggingDriver::new(fixtures::memory(10));
    let log = driver.exec_log();
    let cache = RecordCache::new();
    let config = Config::default();
    let resolver = Resolver::new(Fetcher::new(&driver, &cache), &config);

    let options = TableOptions::new(fixtures::BASE, "Teams")
        .field(FieldSpec::direct("Headcount").map_to("size"))
        .field(FieldSpec::direct("Name"))
        .field(FieldSpec::direct("Active").map_to(""))
        .field(FieldSpec::direct("Missing"));

    let teams = fixtures::teams();
    let output = resolver.resolve_record(&teams[0], &options).await.unwrap();

    assert_eq!(output.keys().collect::<Vec<_>>(), ["size", "Name", "Active", "Missing"]);
    assert_eq!(
        output,
        row([
            ("size", value(3i64)),
            ("Name", value("Compilers")),
            ("Active", value(true)),
            ("Missing", Field::Value(Value::Null)),
        ])
    );
    assert!(log.is_empty());
    assert!(resolver.take_warnings().is_empty());
}

#[tokio::test]
async fn list_values_pass_through_unresolved() {
    let driver = fixtures::memory(10);
    let cache = RecordCache::new();
    let config = Config::default();
    let resolver = Resolver::new(Fetcher::new(&driver, &cache), &config);

    let options = TableOptions::new(fixtures::BASE, "Teams").field(FieldSpec::direct("Members"));
    let output = resolver
        .resolve_record(&fixtures::teams()[0], &options)
        .await
        .unwrap();

    assert_eq!(
        output.get("Members"),
        Some(&value(vec!["recGrace", "recLinus", "recGrace"]))
    );
    assert_eq!(cache.requests(), 0);
}

// ---------------------------------------------------------------------------
// Reference fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolves_references_in_id_order() {
    let driver = LoggingDriver::new(fixtures::memory(10));
    let log = driver.exec_log();
    let cache = RecordCache::new();
    let config = Config::default();
    let resolver = Resolver::new(Fetcher::new(&driver, &cache), &config);

    let options = TableOptions::new(fixtures::BASE, "Teams")
        .field(FieldSpec::direct("Name"))
        .field(FieldSpec::resolved("Members", fixtures::people_names()).map_to("members"));

    let output = resolver
        .resolve_record(&fixtures::teams()[0], &options)
        .await
        .unwrap();

    assert_eq!(
        output,
        row([
            ("Name", value("Compilers")),
            (
                "members",
                Field::Rows(vec![person("Grace"), person("Linus"), person("Grace")])
            ),
        ])
    );
    assert_eq!(log.finds("People"), ["recGrace", "recLinus"]);
    assert_eq!(cache.requests(), 2);
    assert_eq!(cache.cache_hits(), 1);
}

#[tokio::test]
async fn resolves_nested_references() {
    let driver = fixtures::memory(10);
    let cache = RecordCache::new();
    let config = Config::default();
    let resolver = Resolver::new(Fetcher::new(&driver, &cache), &config);

    let options = TableOptions::new(fixtures::BASE, "Teams")
        .field(FieldSpec::resolved("Members", people_with_manager()));

    let output = resolver
        .resolve_record(&fixtures::teams()[2], &options)
        .await
        .unwrap();

    // Tools -> Ken -> Linus -> (Linus' manager resolved with names only)
    let linus = row([("Name", value("Linus"))]);
    let ken = row([("Name", value("Ken")), ("Manager", Field::Rows(vec![linus]))]);

    assert_eq!(output, row([("Members", Field::Rows(vec![ken]))]));
}

#[tokio::test]
async fn empty_and_absent_references_resolve_to_no_rows() {
    let driver = LoggingDriver::new(fixtures::memory(10));
    let log = driver.exec_log();
    let cache = RecordCache::new();
    let config = Config::default();
    let resolver = Resolver::new(Fetcher::new(&driver, &cache), &config);

    let members = TableOptions::new(fixtures::BASE, "Teams")
        .field(FieldSpec::resolved("Members", fixtures::people_names()));
    let lead = TableOptions::new(fixtures::BASE, "Teams")
        .field(FieldSpec::resolved("Lead", fixtures::people_names()));

    // Kernels has an empty member list; Tools has no lead at all.
    let kernels = resolver
        .resolve_record(&fixtures::teams()[1], &members)
        .await
        .unwrap();
    let tools = resolver
        .resolve_record(&fixtures::teams()[2], &lead)
        .await
        .unwrap();

    assert_eq!(kernels, row([("Members", Field::Rows(vec![]))]));
    assert_eq!(tools, row([("Lead", Field::Rows(vec![]))]));
    assert!(log.is_empty());
    assert!(resolver.take_warnings().is_empty());
}

#[tokio::test]
async fn scalar_reference_warns_and_keeps_record() {
    let driver = LoggingDriver::new(fixtures::memory(10));
    let log = driver.exec_log();
    let cache = RecordCache::new();
    let config = Config::default();
    let resolver = Resolver::new(Fetcher::new(&driver, &cache), &config);

    let options = TableOptions::new(fixtures::BASE, "Teams")
        .field(FieldSpec::direct("Name"))
        .field(FieldSpec::resolved("Lead", fixtures::people_names()))
        .field(FieldSpec::direct("Active"));

    let output = resolver
        .resolve_record(&fixtures::teams()[1], &options)
        .await
        .unwrap();

    assert_eq!(
        output,
        row([
            ("Name", value("Kernels")),
            ("Lead", Field::Rows(vec![])),
            ("Active", value(false)),
        ])
    );
    assert!(log.is_empty());

    let warnings = resolver.take_warnings();
    assert_eq!(
        warnings,
        [Warning::NotAList {
            record: RecordKey::new(&fixtures::table("Teams"), "recKernels"),
            field: "Lead".to_string(),
            found: "string",
        }]
    );
    assert_eq!(
        warnings[0].to_string(),
        "field `Lead` of base=appCompany table=Teams id=recKernels should be a list of record ids, found string; resolved as empty"
    );

    // Warnings are handed out once
    assert!(resolver.take_warnings().is_empty());
}

#[tokio::test]
async fn list_of_non_ids_warns() {
    let driver = Memory::new();
    let cache = RecordCache::new();
    let config = Config::default();
    let resolver = Resolver::new(Fetcher::new(&driver, &cache), &config);

    let options = TableOptions::new("app1", "Things")
        .field(FieldSpec::resolved("Refs", TableOptions::new("app1", "Things")));

    let record = Record::new("rec1").with("Refs", vec![1i64, 2]);
    let output = resolver.resolve_record(&record, &options).await.unwrap();

    assert_eq!(output, row([("Refs", Field::Rows(vec![]))]));
    assert!(matches!(
        resolver.take_warnings().as_slice(),
        [Warning::NotAList { found: "list", .. }]
    ));
}

#[tokio::test]
async fn malformed_fields_yield_empty_row() {
    let driver = fixtures::memory(10);
    let cache = RecordCache::new();
    let config = Config::default();
    let resolver = Resolver::new(Fetcher::new(&driver, &cache), &config);

    let options = TableOptions::new(fixtures::BASE, "People").fields(Fields::Malformed);
    let output = resolver
        .resolve_record(&fixtures::people()[0], &options)
        .await
        .unwrap();

    assert_eq!(output, Row::new());
    assert_eq!(
        resolver.take_warnings(),
        [Warning::MalformedFields {
            record: RecordKey::new(&fixtures::table("People"), "recAda"),
        }]
    );
}

#[tokio::test]
async fn missing_reference_fails_record() {
    let driver = Memory::new()
        .table(fixtures::BASE, "People", fixtures::people())
        .table(
            fixtures::BASE,
            "Teams",
            [Record::new("recGhosts").with("Members", vec!["recAda", "recCasper"])],
        );
    let cache = RecordCache::new();
    let config = Config::default();
    let resolver = Resolver::new(Fetcher::new(&driver, &cache), &config);

    let options = TableOptions::new(fixtures::BASE, "Teams")
        .field(FieldSpec::resolved("Members", fixtures::people_names()));

    let record = Record::new("recGhosts").with("Members", vec!["recAda", "recCasper"]);
    let err = resolver.resolve_record(&record, &options).await.unwrap_err();

    assert!(err.is_record_not_found());
    assert!(err
        .to_string()
        .starts_with("resolving field `Members` of record `recGhosts` in appCompany/Teams: "));
}

#[tokio::test]
async fn failed_lookup_fails_record() {
    let driver = FaultyDriver::new(fixtures::memory(10)).fail_find("recLinus");
    let cache = RecordCache::new();
    let config = Config::default();
    let resolver = Resolver::new(Fetcher::new(&driver, &cache), &config);

    let options = TableOptions::new(fixtures::BASE, "Teams")
        .field(FieldSpec::resolved("Members", fixtures::people_names()));

    let err = resolver
        .resolve_record(&fixtures::teams()[0], &options)
        .await
        .unwrap_err();

    assert!(err.is_driver());
}

// ---------------------------------------------------------------------------
// Cycles and depth
// ---------------------------------------------------------------------------

fn mutual_friends() -> Memory {
    Memory::new().table(
        "app1",
        "People",
        [
            Record::new("recA").with("Name", "A").with("Friends", vec!["recB"]),
            Record::new("recB").with("Name", "B").with("Friends", vec!["recA", "recC"]),
            Record::new("recC").with("Name", "C"),
        ],
    )
}

/// People whose friends resolve into people, nested `depth` levels deep.
fn friends(depth: usize) -> TableOptions {
    let options = TableOptions::new("app1", "People").field(FieldSpec::direct("Name"));
    if depth == 0 {
        options
    } else {
        options.field(FieldSpec::resolved("Friends", friends(depth - 1)))
    }
}

#[tokio::test]
async fn reference_cycle_is_skipped() {
    let driver = mutual_friends();
    let cache = RecordCache::new();
    let config = Config::default();
    let resolver = Resolver::new(Fetcher::new(&driver, &cache), &config);

    let record = Record::new("recA").with("Name", "A").with("Friends", vec!["recB"]);
    let output = resolver
        .resolve_record(&record, &friends(5))
        .await
        .unwrap();

    // A -> B -> (A skipped), C
    let c = row([("Name", value("C")), ("Friends", Field::Rows(vec![]))]);
    let b = row([("Name", value("B")), ("Friends", Field::Rows(vec![c]))]);
    assert_eq!(output, row([("Name", value("A")), ("Friends", Field::Rows(vec![b]))]));

    let people = tablelink::TableRef::new("app1", "People");
    assert_eq!(
        resolver.take_warnings(),
        [Warning::Cycle {
            record: RecordKey::new(&people, "recB"),
            field: "Friends".to_string(),
            target: RecordKey::new(&people, "recA"),
        }]
    );
}

#[tokio::test]
async fn depth_limit_stops_resolution() {
    let driver = mutual_friends();
    let cache = RecordCache::new();
    let config = Config::default().max_depth(1);
    let resolver = Resolver::new(Fetcher::new(&driver, &cache), &config);

    let record = Record::new("recA").with("Name", "A").with("Friends", vec!["recB"]);
    let output = resolver
        .resolve_record(&record, &friends(5))
        .await
        .unwrap();

    let b = row([("Name", value("B")), ("Friends", Field::Rows(vec![]))]);
    assert_eq!(output, row([("Name", value("A")), ("Friends", Field::Rows(vec![b]))]));

    assert!(matches!(
        resolver.take_warnings().as_slice(),
        [Warning::DepthExceeded { depth: 2, .. }]
    ));
}

#[tokio::test]
async fn zero_depth_disables_resolution() {
    let driver = LoggingDriver::new(fixtures::memory(10));
    let log = driver.exec_log();
    let cache = RecordCache::new();
    let config = Config::default().max_depth(0);
    let resolver = Resolver::new(Fetcher::new(&driver, &cache), &config);

    let output = resolver
        .resolve_record(&fixtures::people()[1], &people_with_manager())
        .await
        .unwrap();

    assert_eq!(
        output,
        row([("Name", value("Grace")), ("Manager", Field::Rows(vec![]))])
    );
    assert!(log.is_empty());
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolve_all_keeps_record_order() {
    for concurrency in [1, 2, 8] {
        let driver = fixtures::memory(10);
        let cache = RecordCache::new();
        let config = Config::default().record_concurrency(concurrency);
        let fetcher = Fetcher::new(&driver, &cache);
        let resolver = Resolver::new(fetcher, &config);

        let records = fetcher
            .select_all(&fixtures::table("People"), false)
            .await
            .unwrap();
        let rows = resolver
            .resolve_all(&records, &people_with_manager())
            .await
            .unwrap();

        let names: Vec<_> = rows
            .iter()
            .map(|row| row.get("Name").and_then(Field::as_value).cloned())
            .collect();
        assert_eq!(
            names,
            ["Ada", "Grace", "Linus", "Ken"].map(|name| Some(Value::from(name)))
        );
        assert_eq!(rows[3].get("Manager"), Some(&Field::Rows(vec![person("Linus")])));
    }
}
