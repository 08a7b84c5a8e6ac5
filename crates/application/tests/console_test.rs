mod helpers;

use chiral_dns_application::use_cases::{ConsoleMode, ConsoleSession};
use helpers::{name, TestZone};

async fn run(session: &mut ConsoleSession, line: &str) -> Vec<String> {
    session.execute(line).await.lines
}

// ── main menu ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_blank_line_prints_nothing() {
    let zone = TestZone::empty();
    let mut session = ConsoleSession::new(zone.admin.clone());

    let output = session.execute("   ").await;

    assert!(output.lines.is_empty());
    assert!(!output.quit);
}

#[tokio::test]
async fn test_unknown_command() {
    let zone = TestZone::empty();
    let mut session = ConsoleSession::new(zone.admin.clone());

    assert_eq!(run(&mut session, "frobnicate").await, vec!["Unknown command: frobnicate"]);
}

#[tokio::test]
async fn test_wrong_argument_count() {
    let zone = TestZone::empty();
    let mut session = ConsoleSession::new(zone.admin.clone());

    let lines = run(&mut session, "zone").await;

    assert!(lines[0].starts_with("Wrong arguments for 'zone'"));
}

#[tokio::test]
async fn test_quit_ends_the_session() {
    let zone = TestZone::empty();
    let mut session = ConsoleSession::new(zone.admin.clone());

    assert!(session.execute("quit").await.quit);
    assert!(session.execute("EXIT").await.quit);
}

#[tokio::test]
async fn test_add_enters_the_new_zone() {
    let zone = TestZone::empty();
    let mut session = ConsoleSession::new(zone.admin.clone());

    let lines = run(&mut session, "add example.com").await;

    assert!(lines[0].starts_with("Zone example.com. added"));
    assert_eq!(session.mode(), &ConsoleMode::Zone(name("example.com")));
    assert_eq!(session.prompt(), "example.com.> ");
}

#[tokio::test]
async fn test_add_wildcard_zone() {
    let zone = TestZone::empty();
    let mut session = ConsoleSession::new(zone.admin.clone());

    let lines = run(&mut session, "add *.foo.test").await;

    assert!(lines[0].contains("wildcard"));
    let found = zone.admin.find(&name("bar.foo.test")).await.unwrap();
    assert!(found.is_star());
}

#[tokio::test]
async fn test_zone_command_on_missing_zone_reports_error() {
    let zone = TestZone::mp().await;
    let mut session = ConsoleSession::new(zone.admin.clone());

    let lines = run(&mut session, "zone nowhere.mp").await;

    assert!(lines[0].starts_with("Error: "));
    assert_eq!(session.mode(), &ConsoleMode::Main);
}

#[tokio::test]
async fn test_list_root_children() {
    let zone = TestZone::mp().await;
    let mut session = ConsoleSession::new(zone.admin.clone());

    let lines = run(&mut session, "lz").await;

    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("mp."));
}

#[tokio::test]
async fn test_list_records_by_type() {
    let zone = TestZone::mp().await;
    let mut session = ConsoleSession::new(zone.admin.clone());

    let lines = run(&mut session, "lr nic.mp MX").await;

    assert_eq!(lines, vec!["MX records:", "     3600 MX 10 mail.nic.mp."]);
}

#[tokio::test]
async fn test_find_reports_partial_resolution() {
    let zone = TestZone::mp().await;
    let mut session = ConsoleSession::new(zone.admin.clone());

    let lines = run(&mut session, "find x.foo.mp").await;

    assert!(lines[0].starts_with("x.foo.mp. resolves as far as foo.mp."));
    assert!(lines[0].contains("wildcard"));
}

#[tokio::test]
async fn test_stats_lists_counts() {
    let zone = TestZone::mp().await;
    let mut session = ConsoleSession::new(zone.admin.clone());

    let lines = run(&mut session, "stats").await;

    assert!(lines.contains(&"SOA record count: 1".to_string()));
    assert!(lines.contains(&"A record count: 6".to_string()));
}

// ── zone mode ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_add_and_list_records_in_zone_mode() {
    let zone = TestZone::empty();
    let mut session = ConsoleSession::new(zone.admin.clone());
    run(&mut session, "add example.com").await;

    let added = run(&mut session, "add MX 12h 10 mail.example.com").await;
    let listed = run(&mut session, "lr").await;

    assert_eq!(
        added,
        vec!["Record added: example.com. 43200 IN MX 10 mail.example.com."]
    );
    assert_eq!(listed, vec!["MX records:", "     43200 MX 10 mail.example.com."]);
}

#[tokio::test]
async fn test_bad_record_is_reported() {
    let zone = TestZone::empty();
    let mut session = ConsoleSession::new(zone.admin.clone());
    run(&mut session, "add example.com").await;

    let lines = run(&mut session, "add A 60 not-an-address").await;

    assert!(lines[0].starts_with("Error: "));
    assert_eq!(zone.store.record_count().await, 0);
}

#[tokio::test]
async fn test_delete_records_in_zone_mode() {
    let zone = TestZone::mp().await;
    let mut session = ConsoleSession::new(zone.admin.clone());
    run(&mut session, "zone nic.mp").await;

    let lines = run(&mut session, "del A").await;

    assert_eq!(lines, vec!["1 A record(s) deleted"]);
}

#[tokio::test]
async fn test_back_returns_to_main() {
    let zone = TestZone::mp().await;
    let mut session = ConsoleSession::new(zone.admin.clone());
    run(&mut session, "zone mp").await;

    run(&mut session, "back").await;

    assert_eq!(session.mode(), &ConsoleMode::Main);
    assert_eq!(session.prompt(), "chiral-dns> ");
}

#[tokio::test]
async fn test_delete_zone_from_main_menu() {
    let zone = TestZone::mp().await;
    let mut session = ConsoleSession::new(zone.admin.clone());

    let lines = run(&mut session, "del alias.nic.mp").await;

    assert_eq!(lines, vec!["Zone alias.nic.mp. deleted"]);
}

#[tokio::test]
async fn test_delete_referenced_zone_is_refused() {
    let zone = TestZone::mp().await;
    let mut session = ConsoleSession::new(zone.admin.clone());

    let lines = run(&mut session, "del mail.nic.mp").await;

    assert!(lines[0].starts_with("Error: "));
    assert!(zone.admin.find_zone(&name("mail.nic.mp")).await.is_ok());
}
