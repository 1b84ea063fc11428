use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::address::NetworkAddress;
use super::error::EndpointError;

/// One live TCP connection to a control daemon.
///
/// Every operation is bounded by `deadline`; a link that failed is dropped by
/// its owner and replaced on the next connect.
#[derive(Debug)]
pub struct Link {
    stream: BufReader<TcpStream>,
    deadline: Duration,
}

impl Link {
    pub async fn open(address: &NetworkAddress, deadline: Duration) -> Result<Self, EndpointError> {
        let connect = TcpStream::connect((address.host.as_str(), address.port));
        let stream = match timeout(deadline, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(EndpointError::Connect {
                    endpoint: address.to_string(),
                    source,
                })
            }
            Err(_) => {
                return Err(EndpointError::Connect {
                    endpoint: address.to_string(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("no answer within {:?}", deadline),
                    ),
                })
            }
        };
        stream.set_nodelay(true)?;

        Ok(Self {
            stream: BufReader::new(stream),
            deadline,
        })
    }

    /// Send one command line and return the first reply line, trimmed.
    pub async fn request_line(&mut self, line: &str) -> Result<String, EndpointError> {
        let deadline = self.deadline;
        bounded(deadline, async {
            self.stream.get_mut().write_all(line.as_bytes()).await?;
            let mut reply = String::new();
            if self.stream.read_line(&mut reply).await? == 0 {
                return Err(EndpointError::Closed);
            }
            Ok(reply.trim().to_string())
        })
        .await
    }

    /// Send a raw payload and return whatever the peer answers in one read.
    pub async fn request_raw(
        &mut self,
        payload: &[u8],
        max_reply: usize,
    ) -> Result<String, EndpointError> {
        let deadline = self.deadline;
        bounded(deadline, async {
            self.stream.get_mut().write_all(payload).await?;
            let mut buffer = vec![0u8; max_reply];
            let read = self.stream.read(&mut buffer).await?;
            if read == 0 {
                return Err(EndpointError::Closed);
            }
            Ok(String::from_utf8_lossy(&buffer[..read]).trim().to_string())
        })
        .await
    }
}

async fn bounded<T>(
    deadline: Duration,
    operation: impl Future<Output = Result<T, EndpointError>>,
) -> Result<T, EndpointError> {
    match timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_) => Err(EndpointError::Timeout(deadline)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, NetworkAddress) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (
            listener,
            NetworkAddress {
                host: "127.0.0.1".to_string(),
                port,
            },
        )
    }

    #[tokio::test]
    async fn request_line_round_trips_one_line() {
        let (listener, address) = listener().await;
        let peer = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut socket = BufReader::new(socket);
            let mut line = String::new();
            socket.read_line(&mut line).await.unwrap();
            socket.get_mut().write_all(b"RPRT 0\n").await.unwrap();
            line
        });

        let mut link = Link::open(&address, Duration::from_secs(2)).await.unwrap();
        let reply = link.request_line("F 144000000\n").await.unwrap();
        assert_eq!(reply, "RPRT 0");
        assert_eq!(peer.await.unwrap(), "F 144000000\n");
    }

    #[tokio::test]
    async fn silent_peer_times_out() {
        let (listener, address) = listener().await;
        let _peer = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let mut link = Link::open(&address, Duration::from_millis(100)).await.unwrap();
        let result = link.request_line("P 10.00 20.00\n").await;
        assert!(matches!(result, Err(EndpointError::Timeout(_))));
    }

    #[tokio::test]
    async fn closed_peer_is_reported() {
        let (listener, address) = listener().await;
        let peer = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        let mut link = Link::open(&address, Duration::from_secs(2)).await.unwrap();
        peer.await.unwrap();
        let result = link.request_line("F 1\n").await;
        assert!(result.unwrap_err().is_connection_lost());
    }

    #[tokio::test]
    async fn refused_connection_is_a_connect_error() {
        let (listener, address) = listener().await;
        drop(listener);
        let result = Link::open(&address, Duration::from_secs(2)).await;
        assert!(matches!(result, Err(EndpointError::Connect { .. })));
    }
}
