use chiral_dns_application::use_cases::HandleDnsPacketUseCase;
use chiral_dns_domain::config::{DnsConfig, ServerConfig};
use chiral_dns_domain::wire::MAX_UDP_PAYLOAD;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

const SOCKET_BUFFER_SIZE: usize = 512 * 1024;

/// Serves UDP queries until Ctrl-C.
pub async fn start_dns_server(
    server: &ServerConfig,
    dns: &DnsConfig,
    handler: Arc<HandleDnsPacketUseCase>,
) -> anyhow::Result<()> {
    let ip: IpAddr = server.bind_address.parse()?;
    let socket_addr = SocketAddr::new(ip, server.dns_port);
    let num_workers = server.workers.max(1);
    let query_timeout = Duration::from_millis(dns.query_timeout_ms);
    let limiter = Arc::new(Semaphore::new(dns.max_concurrent_queries.max(1)));

    info!(bind_address = %socket_addr, num_workers, "Starting DNS server");

    let mut join_set: JoinSet<()> = JoinSet::new();
    for worker_id in 0..num_workers {
        let socket = Arc::new(create_udp_socket(socket_addr, num_workers > 1)?);
        let handler = handler.clone();
        let limiter = limiter.clone();
        join_set.spawn(async move {
            run_udp_worker(socket, handler, limiter, query_timeout, worker_id).await;
        });
    }

    info!("DNS server ready: {} worker(s) on {}", num_workers, socket_addr);

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "Failed to listen for Ctrl-C");
            }
            info!("Shutdown requested");
        }
        _ = async { while join_set.join_next().await.is_some() {} } => {
            warn!("Every DNS worker has stopped");
        }
    }
    join_set.abort_all();

    let counters = handler.counters().snapshot();
    info!(
        received = counters.received,
        answered = counters.answered,
        dropped = counters.dropped,
        cache_hits = counters.cache_hits,
        failures = counters.failures,
        "DNS server stopped"
    );
    Ok(())
}

async fn run_udp_worker(
    socket: Arc<UdpSocket>,
    handler: Arc<HandleDnsPacketUseCase>,
    limiter: Arc<Semaphore>,
    query_timeout: Duration,
    worker_id: usize,
) {
    let mut recv_buf = [0u8; MAX_UDP_PAYLOAD];

    loop {
        let (len, from) = match socket.recv_from(&mut recv_buf).await {
            Ok(received) => received,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                // ICMP errors from earlier replies surface here on some platforms.
                debug!(worker = worker_id, error = %e, "UDP recv error");
                continue;
            }
        };

        let Ok(permit) = limiter.clone().acquire_owned().await else {
            break;
        };

        let packet = recv_buf[..len].to_vec();
        let handler = handler.clone();
        let socket = socket.clone();
        tokio::spawn(async move {
            let _permit = permit;
            match tokio::time::timeout(query_timeout, handler.execute(&packet)).await {
                Ok(Ok(Some(response))) => {
                    if let Err(e) = socket.send_to(&response, from).await {
                        warn!(client = %from, error = %e, "Failed to send response");
                    }
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    debug!(client = %from, error = %e, "Query failed, no reply sent");
                }
                Err(_) => {
                    warn!(
                        client = %from,
                        timeout_ms = query_timeout.as_millis() as u64,
                        "Query timed out, no reply sent"
                    );
                }
            }
        });
    }
}

fn create_udp_socket(socket_addr: SocketAddr, reuse_port: bool) -> anyhow::Result<UdpSocket> {
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    if reuse_port {
        socket.set_reuse_port(true)?;
    }
    #[cfg(not(unix))]
    let _ = reuse_port;
    socket.set_recv_buffer_size(SOCKET_BUFFER_SIZE)?;
    socket.set_send_buffer_size(SOCKET_BUFFER_SIZE)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;

    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}
