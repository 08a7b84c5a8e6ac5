#![allow(dead_code)]

//! Behaviour every `ZoneStore` backend must share. Each backend's test file
//! runs these against a fresh store.

use chiral_dns_application::ports::ZoneStore;
use chiral_dns_domain::{
    DomainError, Label, Name, Rdata, RecordType, Soa, ZoneId, ROOT_ZONE,
};
use std::net::Ipv4Addr;
use std::sync::Arc;

pub fn name(text: &str) -> Name {
    Name::parse(text).unwrap()
}

pub fn label(text: &str) -> Label {
    Label::new(text).unwrap()
}

/// Builds `a.b.c` root-ward and returns the leaf id.
pub async fn add_path(store: &Arc<dyn ZoneStore>, dotted: &str) -> ZoneId {
    let mut parent = ROOT_ZONE;
    for part in dotted.rsplit('.') {
        let existing = store
            .child_nodes(parent)
            .await
            .unwrap()
            .into_iter()
            .find(|child| child.label.as_str().eq_ignore_ascii_case(part));
        parent = match existing {
            Some(child) => child.id,
            None => store.add_zone_node(parent, &label(part), false).await.unwrap(),
        };
    }
    parent
}

pub async fn resolved(store: &Arc<dyn ZoneStore>, text: &str) -> Name {
    store.resolve_name(&name(text)).await.unwrap()
}

fn a(ttl: u32, ip: [u8; 4]) -> Rdata {
    Rdata::A {
        ttl,
        address: Ipv4Addr::from(ip),
    }
}

// ── resolution ──────────────────────────────────────────────────────────────

pub async fn resolves_the_longest_existing_prefix(store: Arc<dyn ZoneStore>) {
    let nic = add_path(&store, "nic.mp").await;

    let found = resolved(&store, "www.NIC.mp").await;

    assert!(found.is_resolved());
    assert_eq!(found.resolved_count(), 2);
    assert!(!found.is_fully_resolved());
    assert_eq!(found.zone_id(), nic);
    assert_eq!(found.to_string(), "www.NIC.mp.");
}

pub async fn resolves_nothing_for_unknown_names(store: Arc<dyn ZoneStore>) {
    add_path(&store, "nic.mp").await;

    let found = resolved(&store, "example.org").await;

    assert_eq!(found.resolved_count(), 0);
    assert_eq!(found.zone_id(), ROOT_ZONE);
}

pub async fn names_zone_nodes(store: Arc<dyn ZoneStore>) {
    let nic = add_path(&store, "nic.mp").await;

    let named = store.name_for_zone_node(nic).await.unwrap().unwrap();
    let root = store.name_for_zone_node(ROOT_ZONE).await.unwrap().unwrap();

    assert_eq!(named, name("nic.mp"));
    assert!(named.is_fully_resolved());
    assert_eq!(named.zones(), resolved(&store, "nic.mp").await.zones());
    assert!(root.is_root());
    assert!(store.name_for_zone_node(9_999).await.unwrap().is_none());
}

// ── zone nodes ──────────────────────────────────────────────────────────────

pub async fn rejects_duplicate_labels_ignoring_case(store: Arc<dyn ZoneStore>) {
    store.add_zone_node(ROOT_ZONE, &label("mp"), false).await.unwrap();

    let result = store.add_zone_node(ROOT_ZONE, &label("MP"), false).await;

    assert!(matches!(result, Err(DomainError::InvalidRecord(_))));
}

pub async fn rejects_missing_parent(store: Arc<dyn ZoneStore>) {
    let result = store.add_zone_node(4_242, &label("orphan"), false).await;

    assert!(matches!(result, Err(DomainError::NotFound(_))));
}

pub async fn lists_children_in_creation_order(store: Arc<dyn ZoneStore>) {
    let mp = add_path(&store, "mp").await;
    store.add_zone_node(mp, &label("nic"), false).await.unwrap();
    store.add_zone_node(mp, &label("foo"), true).await.unwrap();

    let children = store.child_nodes(mp).await.unwrap();

    let labels: Vec<&str> = children.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["nic", "foo"]);
    assert!(!children[0].wildcard);
    assert!(children[1].wildcard);
}

pub async fn toggles_wildcard_flag(store: Arc<dyn ZoneStore>) {
    let foo = add_path(&store, "foo.mp").await;
    assert!(!store.is_wildcard_zone(foo).await.unwrap());

    store.set_wildcard_zone(foo, true).await.unwrap();

    assert!(store.is_wildcard_zone(foo).await.unwrap());
    assert!(resolved(&store, "x.foo.mp").await.is_star());
    assert!(matches!(
        store.set_wildcard_zone(7_777, true).await,
        Err(DomainError::NotFound(_))
    ));
}

// ── records ─────────────────────────────────────────────────────────────────

pub async fn stores_every_supported_type(store: Arc<dyn ZoneStore>) {
    let mp = add_path(&store, "mp").await;
    add_path(&store, "ns1.nic.mp").await;
    add_path(&store, "hostmaster.nic.mp").await;
    let ns1 = resolved(&store, "ns1.nic.mp").await;
    let hostmaster = resolved(&store, "hostmaster.nic.mp").await;

    let records = vec![
        a(3600, [192, 0, 2, 1]),
        Rdata::Ns {
            ttl: 14400,
            server: ns1.clone(),
        },
        Rdata::Cname {
            ttl: 300,
            target: ns1.clone(),
        },
        Rdata::Mx {
            ttl: 3600,
            preference: 10,
            exchange: ns1.clone(),
        },
        Rdata::Soa(Soa {
            mname: ns1.clone(),
            rname: hostmaster.clone(),
            serial: 3,
            refresh: 14400,
            retry: 7200,
            expire: 604800,
            minimum: 43200,
        }),
        Rdata::Txt {
            ttl: 60,
            text: "v=spf1 -all".to_string(),
        },
    ];
    for rdata in &records {
        store.add_record(mp, rdata).await.unwrap();
    }

    for rdata in &records {
        let fetched = store.get_records(mp, rdata.record_type(), 13).await.unwrap();
        assert_eq!(fetched, vec![rdata.clone()], "{}", rdata.record_type());
        for target in fetched[0].names() {
            assert!(target.is_fully_resolved());
        }
    }
    assert!(store
        .get_records(mp, RecordType::AAAA, 13)
        .await
        .unwrap()
        .is_empty());
}

pub async fn honours_record_limit(store: Arc<dyn ZoneStore>) {
    let zone = add_path(&store, "many.test").await;
    for last in 1..=5 {
        store.add_record(zone, &a(60, [10, 0, 0, last])).await.unwrap();
    }

    let fetched = store.get_records(zone, RecordType::A, 3).await.unwrap();

    assert_eq!(fetched, vec![a(60, [10, 0, 0, 1]), a(60, [10, 0, 0, 2]), a(60, [10, 0, 0, 3])]);
}

pub async fn rejects_unresolved_targets(store: Arc<dyn ZoneStore>) {
    let zone = add_path(&store, "mp").await;

    let result = store
        .add_record(
            zone,
            &Rdata::Ns {
                ttl: 60,
                server: name("ns1.nic.mp"),
            },
        )
        .await;

    assert!(matches!(result, Err(DomainError::InvalidRecord(_))));
}

pub async fn deletes_records_of_one_type(store: Arc<dyn ZoneStore>) {
    let zone = add_path(&store, "nic.mp").await;
    store.add_record(zone, &a(60, [192, 0, 2, 1])).await.unwrap();
    store.add_record(zone, &a(60, [192, 0, 2, 2])).await.unwrap();
    store
        .add_record(
            zone,
            &Rdata::Txt {
                ttl: 60,
                text: "keep".to_string(),
            },
        )
        .await
        .unwrap();

    let removed = store.delete_records(zone, RecordType::A).await.unwrap();

    assert_eq!(removed, 2);
    assert!(store.get_records(zone, RecordType::A, 13).await.unwrap().is_empty());
    assert_eq!(store.get_records(zone, RecordType::TXT, 13).await.unwrap().len(), 1);
}

// ── deleting zones ──────────────────────────────────────────────────────────

pub async fn refuses_to_delete_parents_and_targets(store: Arc<dyn ZoneStore>) {
    let mp = add_path(&store, "mp").await;
    let ns1 = add_path(&store, "ns1.mp").await;
    let server = resolved(&store, "ns1.mp").await;
    store
        .add_record(mp, &Rdata::Ns { ttl: 60, server })
        .await
        .unwrap();

    assert!(matches!(
        store.delete_zone_node(mp).await,
        Err(DomainError::ZoneInUse(_))
    ));
    assert!(matches!(
        store.delete_zone_node(ns1).await,
        Err(DomainError::ZoneInUse(_))
    ));
    assert!(matches!(
        store.delete_zone_node(ROOT_ZONE).await,
        Err(DomainError::ZoneInUse(_))
    ));
}

pub async fn deletes_leaf_with_its_records(store: Arc<dyn ZoneStore>) {
    let leaf = add_path(&store, "leaf.test").await;
    store.add_record(leaf, &a(60, [10, 1, 1, 1])).await.unwrap();

    store.delete_zone_node(leaf).await.unwrap();

    assert_eq!(resolved(&store, "leaf.test").await.resolved_count(), 1);
    assert!(store.name_for_zone_node(leaf).await.unwrap().is_none());
    assert_eq!(store.statistics().await.unwrap().a_records, 0);
}

pub async fn counts_rows(store: Arc<dyn ZoneStore>) {
    let zone = add_path(&store, "nic.mp").await;
    store.add_record(zone, &a(60, [192, 0, 2, 1])).await.unwrap();
    store
        .add_record(
            zone,
            &Rdata::Txt {
                ttl: 60,
                text: "hello".to_string(),
            },
        )
        .await
        .unwrap();

    let stats = store.statistics().await.unwrap();

    assert_eq!(stats.zones, 2);
    assert_eq!(stats.a_records, 1);
    assert_eq!(stats.txt_records, 1);
    assert_eq!(stats.total_records(), 2);
}
