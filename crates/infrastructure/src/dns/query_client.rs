//! One-shot UDP client used by the `dig` subcommand.

use chiral_dns_domain::wire::MAX_UDP_PAYLOAD;
use chiral_dns_domain::{DomainError, Header, Message, Question};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// A query as sent and the raw reply.
#[derive(Debug, Clone)]
pub struct QueryExchange {
    pub query: Vec<u8>,
    pub response: Vec<u8>,
}

pub struct UdpQueryClient {
    server_addr: SocketAddr,
    timeout: Duration,
}

impl UdpQueryClient {
    pub fn new(server_addr: SocketAddr, timeout: Duration) -> Self {
        Self {
            server_addr,
            timeout,
        }
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    /// Sends `question` with a random ID and waits for the reply carrying that ID.
    pub async fn query(
        &self,
        question: Question,
        recursion_desired: bool,
    ) -> Result<QueryExchange, DomainError> {
        let mut header = Header::query(fastrand::u16(..));
        header.recursion_desired = recursion_desired;
        let id = header.id;
        let query = Message::new(header, question, Vec::new(), Vec::new(), Vec::new()).to_bytes();

        let bind_addr: SocketAddr = if self.server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| DomainError::IoError(format!("Failed to bind UDP socket: {}", e)))?;

        socket
            .send_to(&query, self.server_addr)
            .await
            .map_err(|e| {
                DomainError::IoError(format!(
                    "Failed to send query to {}: {}",
                    self.server_addr, e
                ))
            })?;
        debug!(server = %self.server_addr, id, bytes = query.len(), "Query sent");

        let response = tokio::time::timeout(self.timeout, self.receive(&socket, id))
            .await
            .map_err(|_| {
                DomainError::IoError(format!(
                    "Timed out after {:?} waiting for {}",
                    self.timeout, self.server_addr
                ))
            })??;

        Ok(QueryExchange { query, response })
    }

    async fn receive(&self, socket: &UdpSocket, id: u16) -> Result<Vec<u8>, DomainError> {
        let mut buf = vec![0u8; MAX_UDP_PAYLOAD];
        loop {
            let (len, from) = socket.recv_from(&mut buf).await.map_err(|e| {
                DomainError::IoError(format!(
                    "Failed to receive from {}: {}",
                    self.server_addr, e
                ))
            })?;

            if from != self.server_addr {
                warn!(
                    expected = %self.server_addr,
                    received_from = %from,
                    "Reply from unexpected source"
                );
                continue;
            }
            if len < 2 || u16::from_be_bytes([buf[0], buf[1]]) != id {
                warn!(len, "Reply with mismatched ID ignored");
                continue;
            }

            buf.truncate(len);
            debug!(server = %self.server_addr, bytes = len, "Reply received");
            return Ok(buf);
        }
    }
}
