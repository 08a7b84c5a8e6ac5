use chiral_dns_application::use_cases::{
    HandleDnsPacketUseCase, ResolveQueryUseCase, ZoneAdminUseCase,
};
use chiral_dns_domain::{Message, Name, Question, RecordType, ResponseCode, ZoneFileEntry};
use chiral_dns_infrastructure::dns::UdpQueryClient;
use chiral_dns_infrastructure::repositories::InMemoryZoneStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;

/// Answers datagrams on a loopback socket until the test ends.
async fn spawn_server(lines: &[&str]) -> SocketAddr {
    let store = Arc::new(InMemoryZoneStore::new());
    let admin = ZoneAdminUseCase::new(store.clone());
    for line in lines {
        let entry = ZoneFileEntry::parse(line).unwrap().unwrap();
        admin.add_entry(entry).await.unwrap();
    }
    let handler = HandleDnsPacketUseCase::new(Arc::new(ResolveQueryUseCase::new(store)));

    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    tokio::spawn(async move {
        let mut buf = [0u8; 512];
        while let Ok((len, peer)) = socket.recv_from(&mut buf).await {
            if let Ok(Some(reply)) = handler.execute(&buf[..len]).await {
                let _ = socket.send_to(&reply, peer).await;
            }
        }
    });
    addr
}

#[tokio::test]
async fn test_query_round_trip_over_loopback() {
    let server = spawn_server(&[
        "mp 43200 SOA ns1.nic.mp hostmaster.nic.mp 3 14400 7200 604800 43200",
        "nic.mp 3600 A 192.0.2.10",
    ])
    .await;
    let client = UdpQueryClient::new(server, Duration::from_secs(2));

    let exchange = client
        .query(Question::new(Name::parse("nic.mp").unwrap(), RecordType::A), true)
        .await
        .unwrap();

    let query = Message::parse(&exchange.query).unwrap();
    let response = Message::parse(&exchange.response).unwrap();
    assert_eq!(query.header().id, response.header().id);
    assert!(response.header().recursion_desired);
    assert!(response.header().authoritative);
    assert_eq!(response.header().rcode, ResponseCode::NoError);
    assert_eq!(response.answer().len(), 1);
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let client = UdpQueryClient::new(silent.local_addr().unwrap(), Duration::from_millis(100));

    let result = client
        .query(Question::new(Name::parse("nic.mp").unwrap(), RecordType::A), false)
        .await;

    assert!(matches!(result, Err(chiral_dns_domain::DomainError::IoError(_))));
}
