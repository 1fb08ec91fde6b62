use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::*;
use crate::model::{FieldRole, FieldSpec};
use crate::source::MemorySource;

fn customers() -> Vec<Record> {
    [(1, "Mario"), (2, "Marco"), (3, "Maria")]
        .into_iter()
        .map(|(id, name)| json!({ "id": id, "name": name }).as_object().cloned().unwrap())
        .collect()
}

fn lookup_config() -> LookupConfig {
    LookupConfig::new(
        "Customer",
        vec![
            FieldSpec::with_role("id", FieldRole::Primary).hidden(),
            FieldSpec::new("name"),
        ],
    )
}

fn filter_for(text: &str) -> Option<String> {
    lookup_config()
        .descriptor(text, &EngineConfig::default())
        .filter
}

fn controller(source: &Arc<MemorySource>) -> LookupController<MemorySource> {
    LookupController::new(Arc::clone(source), lookup_config(), &EngineConfig::default())
}

fn source_with(text: &str, records: Vec<Record>) -> Arc<MemorySource> {
    Arc::new(MemorySource::new().with_records(filter_for(text).as_deref(), records))
}

async fn type_and_settle(lookup: &mut LookupController<MemorySource>, text: &str) {
    lookup.on_text_change(text);
    tokio::time::sleep(Duration::from_secs(1)).await;
    lookup.refresh();
}

#[test]
fn test_hidden_primary_field_is_not_searched() {
    assert_eq!(
        filter_for("mar").as_deref(),
        Some("Customer.name LIKE '%mar%'")
    );
}

#[tokio::test(start_paused = true)]
async fn test_results_open_the_list() {
    let source = source_with("mar", customers());
    let mut lookup = controller(&source);
    lookup.on_focus();
    assert!(!lookup.is_open());

    type_and_settle(&mut lookup, "mar").await;

    assert!(lookup.is_open());
    assert_eq!(lookup.state().items.len(), 3);
    assert_eq!(lookup.text(), "mar");
}

#[tokio::test(start_paused = true)]
async fn test_changed_waits_for_engine() {
    let source = source_with("mar", customers());
    let mut lookup = controller(&source);
    lookup.on_focus();
    lookup.on_text_change("mar");

    while !lookup.is_open() {
        assert!(lookup.changed().await);
    }
    assert_eq!(lookup.state().fetched_count, 3);
}

#[tokio::test(start_paused = true)]
async fn test_commit_reconciles_exact_text() {
    let source = source_with("mario", customers());
    let mut lookup = controller(&source);
    lookup.on_focus();
    type_and_settle(&mut lookup, "mario").await;

    let candidate = lookup.on_commit("MARIO ").expect("unique match");
    assert_eq!(candidate.key, "1");
    assert_eq!(candidate.record["name"], "Mario");
    assert!(!lookup.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_commit_without_match_keeps_free_text() {
    let source = source_with("mar", customers());
    let mut lookup = controller(&source);
    lookup.on_focus();
    type_and_settle(&mut lookup, "mar").await;

    assert_eq!(lookup.on_commit("mar"), None);
    assert!(lookup.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_highlighted_row_bypasses_reconciliation() {
    let source = source_with("mar", customers());
    let mut lookup = controller(&source);
    lookup.on_focus();
    type_and_settle(&mut lookup, "mar").await;

    assert_eq!(lookup.highlight_next(), Some(0));
    assert_eq!(lookup.highlight_next(), Some(1));
    let candidate = lookup.on_commit("mar").expect("highlighted row");
    assert_eq!(candidate.key, "2");
    assert_eq!(candidate.record["name"], "Marco");
    assert!(!lookup.is_open());
    assert_eq!(lookup.highlighted(), None);
}

#[tokio::test(start_paused = true)]
async fn test_highlight_is_clamped() {
    let source = source_with("mar", customers());
    let mut lookup = controller(&source);
    assert_eq!(lookup.highlight_next(), None);

    lookup.on_focus();
    type_and_settle(&mut lookup, "mar").await;

    assert_eq!(lookup.highlight_previous(), Some(2));
    assert_eq!(lookup.highlight_next(), Some(2));
    for _ in 0..5 {
        lookup.highlight_previous();
    }
    assert_eq!(lookup.highlighted(), Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_closes_until_text_changes() {
    let source = Arc::new(
        MemorySource::new()
            .with_records(filter_for("mar").as_deref(), customers())
            .with_records(filter_for("mari").as_deref(), customers()[..1].to_vec()),
    );
    let mut lookup = controller(&source);
    lookup.on_focus();
    type_and_settle(&mut lookup, "mar").await;

    lookup.on_dismiss();
    lookup.refresh();
    assert!(!lookup.is_open());

    type_and_settle(&mut lookup, "mari").await;
    assert!(lookup.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_blur_closes_only_on_success() {
    let source = Arc::new(
        MemorySource::new()
            .with_records(filter_for("mar").as_deref(), customers())
            .with_records(filter_for("maria").as_deref(), customers()[2..].to_vec()),
    );
    let mut lookup = controller(&source);
    lookup.on_focus();
    type_and_settle(&mut lookup, "mar").await;

    assert_eq!(lookup.on_blur("mar"), None);
    assert!(lookup.is_open());

    lookup.on_focus();
    type_and_settle(&mut lookup, "maria").await;
    let candidate = lookup.on_blur("maria").expect("unique match");
    assert_eq!(candidate.key, "3");
    assert!(!lookup.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_fetch_in_flight_keeps_list_open() {
    let source = Arc::new(
        MemorySource::new()
            .with_records(filter_for("mar").as_deref(), customers())
            .with_records(filter_for("marc").as_deref(), customers()[1..2].to_vec()),
    );
    source.set_latency(filter_for("marc").as_deref(), Duration::from_millis(500));
    let mut lookup = controller(&source);
    lookup.on_focus();
    type_and_settle(&mut lookup, "mar").await;

    lookup.on_text_change("marc");
    tokio::time::sleep(Duration::from_millis(200)).await;
    lookup.refresh();

    assert!(lookup.state().loading);
    assert!(lookup.is_open());

    tokio::time::sleep(Duration::from_secs(1)).await;
    lookup.refresh();
    assert_eq!(lookup.state().items.len(), 1);
    assert!(lookup.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_empty_text_clears_window() {
    let source = source_with("mar", customers());
    let mut lookup = controller(&source);
    lookup.on_focus();
    type_and_settle(&mut lookup, "mar").await;

    type_and_settle(&mut lookup, "  ").await;

    assert!(lookup.state().items.is_empty());
    assert_eq!(source.request_count(), 1);
    assert_eq!(lookup.on_commit("mario"), None);
}

#[tokio::test(start_paused = true)]
async fn test_row_pick_selects_and_closes() {
    let source = source_with("mar", customers());
    let mut lookup = controller(&source);
    lookup.on_focus();
    type_and_settle(&mut lookup, "mar").await;

    let record = lookup.state().items[2].clone();
    let candidate = lookup.on_row_pick(record);
    assert_eq!(candidate.key, "3");
    assert!(!lookup.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_highlighting_last_row_loads_more() {
    let mut config = lookup_config();
    config.page_size = Some(2);
    let filter = config.descriptor("mar", &EngineConfig::default()).filter;
    let source = Arc::new(MemorySource::new().with_records(filter.as_deref(), customers()));
    let mut lookup = LookupController::new(Arc::clone(&source), config, &EngineConfig::default());
    lookup.on_focus();
    type_and_settle(&mut lookup, "mar").await;
    assert_eq!(lookup.state().items.len(), 2);

    lookup.highlight_next();
    lookup.highlight_next();
    tokio::time::sleep(Duration::from_secs(1)).await;
    lookup.refresh();

    assert_eq!(lookup.state().items.len(), 3);
    assert!(!lookup.state().has_more);
    assert!(!lookup.on_request_more());
}

#[tokio::test(start_paused = true)]
async fn test_dispose_stops_everything() {
    let source = source_with("mar", customers());
    let mut lookup = controller(&source);
    lookup.on_focus();
    lookup.on_text_change("mar");
    lookup.dispose();
    tokio::time::sleep(Duration::from_secs(1)).await;
    lookup.refresh();

    assert_eq!(source.request_count(), 0);
    assert!(lookup.state().items.is_empty());
    assert!(!lookup.is_open());
}
