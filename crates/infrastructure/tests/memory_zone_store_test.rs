mod helpers;

use chiral_dns_application::ports::ZoneStore;
use chiral_dns_infrastructure::repositories::InMemoryZoneStore;
use helpers::store_contract::{self, add_path, label, resolved};
use std::sync::Arc;

fn memory_store() -> Arc<dyn ZoneStore> {
    Arc::new(InMemoryZoneStore::new())
}

// ── shared store behaviour ──────────────────────────────────────────────────

#[tokio::test]
async fn test_resolves_the_longest_existing_prefix() {
    store_contract::resolves_the_longest_existing_prefix(memory_store()).await;
}

#[tokio::test]
async fn test_resolves_nothing_for_unknown_names() {
    store_contract::resolves_nothing_for_unknown_names(memory_store()).await;
}

#[tokio::test]
async fn test_names_zone_nodes() {
    store_contract::names_zone_nodes(memory_store()).await;
}

#[tokio::test]
async fn test_rejects_duplicate_labels_ignoring_case() {
    store_contract::rejects_duplicate_labels_ignoring_case(memory_store()).await;
}

#[tokio::test]
async fn test_rejects_missing_parent() {
    store_contract::rejects_missing_parent(memory_store()).await;
}

#[tokio::test]
async fn test_lists_children_in_creation_order() {
    store_contract::lists_children_in_creation_order(memory_store()).await;
}

#[tokio::test]
async fn test_toggles_wildcard_flag() {
    store_contract::toggles_wildcard_flag(memory_store()).await;
}

#[tokio::test]
async fn test_stores_every_supported_type() {
    store_contract::stores_every_supported_type(memory_store()).await;
}

#[tokio::test]
async fn test_honours_record_limit() {
    store_contract::honours_record_limit(memory_store()).await;
}

#[tokio::test]
async fn test_rejects_unresolved_targets() {
    store_contract::rejects_unresolved_targets(memory_store()).await;
}

#[tokio::test]
async fn test_deletes_records_of_one_type() {
    store_contract::deletes_records_of_one_type(memory_store()).await;
}

#[tokio::test]
async fn test_refuses_to_delete_parents_and_targets() {
    store_contract::refuses_to_delete_parents_and_targets(memory_store()).await;
}

#[tokio::test]
async fn test_deletes_leaf_with_its_records() {
    store_contract::deletes_leaf_with_its_records(memory_store()).await;
}

#[tokio::test]
async fn test_counts_rows() {
    store_contract::counts_rows(memory_store()).await;
}

// ── memory specifics ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_deleted_label_can_be_reused() {
    let store = memory_store();
    let leaf = add_path(&store, "leaf.test").await;
    let parent = resolved(&store, "test").await.zone_id();

    store.delete_zone_node(leaf).await.unwrap();
    let again = store
        .add_zone_node(parent, &label("LEAF"), false)
        .await
        .unwrap();

    assert_ne!(again, leaf);
    assert_eq!(resolved(&store, "leaf.test").await.zone_id(), again);
}
