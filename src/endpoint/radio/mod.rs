mod gqrx;
mod netremote;

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use strum_macros::Display;

pub use gqrx::GqrxClient;
pub use netremote::NetRemoteClient;

use super::address::NetworkAddress;
use super::error::EndpointError;

/// Default gqrx remote-control port, also used for NetRemote when none is given.
pub const DEFAULT_RADIO_PORT: u16 = 7356;

/// Acquisition / loss of signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum PassEvent {
    Aos,
    Los,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RadioProtocol {
    /// gqrx / gpredict-style text commands.
    Gqrx,
    /// SDR# NetRemote plugin JSON commands.
    NetRemote,
}

/// Capability shared by every receiver-control protocol.
pub trait FrequencyControl {
    fn is_connected(&self) -> bool;

    fn connect(&mut self) -> impl Future<Output = Result<(), EndpointError>> + Send;

    fn set_frequency(
        &mut self,
        frequency_hz: f64,
    ) -> impl Future<Output = Result<(), EndpointError>> + Send;

    fn announce(
        &mut self,
        event: PassEvent,
    ) -> impl Future<Output = Result<(), EndpointError>> + Send;

    fn disconnect(&mut self);
}

/// The receiver endpoint chosen for this run.
#[derive(Debug)]
pub enum RadioClient {
    Gqrx(GqrxClient),
    NetRemote(NetRemoteClient),
}

impl RadioClient {
    pub fn new(protocol: RadioProtocol, address: NetworkAddress, deadline: Duration) -> Self {
        match protocol {
            RadioProtocol::Gqrx => RadioClient::Gqrx(GqrxClient::new(address, deadline)),
            RadioProtocol::NetRemote => {
                RadioClient::NetRemote(NetRemoteClient::new(address, deadline))
            }
        }
    }

    pub fn protocol(&self) -> RadioProtocol {
        match self {
            RadioClient::Gqrx(_) => RadioProtocol::Gqrx,
            RadioClient::NetRemote(_) => RadioProtocol::NetRemote,
        }
    }
}

impl FrequencyControl for RadioClient {
    fn is_connected(&self) -> bool {
        match self {
            RadioClient::Gqrx(client) => client.is_connected(),
            RadioClient::NetRemote(client) => client.is_connected(),
        }
    }

    async fn connect(&mut self) -> Result<(), EndpointError> {
        match self {
            RadioClient::Gqrx(client) => client.connect().await,
            RadioClient::NetRemote(client) => client.connect().await,
        }
    }

    async fn set_frequency(&mut self, frequency_hz: f64) -> Result<(), EndpointError> {
        match self {
            RadioClient::Gqrx(client) => client.set_frequency(frequency_hz).await,
            RadioClient::NetRemote(client) => client.set_frequency(frequency_hz).await,
        }
    }

    async fn announce(&mut self, event: PassEvent) -> Result<(), EndpointError> {
        match self {
            RadioClient::Gqrx(client) => client.announce(event).await,
            RadioClient::NetRemote(client) => client.announce(event).await,
        }
    }

    fn disconnect(&mut self) {
        match self {
            RadioClient::Gqrx(client) => client.disconnect(),
            RadioClient::NetRemote(client) => client.disconnect(),
        }
    }
}

/// Receivers tune in whole hertz.
fn whole_hz(frequency_hz: f64) -> i64 {
    frequency_hz.round() as i64
}

#[cfg(test)]
pub(crate) mod testing {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::NetworkAddress;

    /// Fake control daemon: answers each received chunk with the next reply.
    pub async fn peer(replies: Vec<&'static str>) -> (NetworkAddress, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            for reply in replies {
                let mut buffer = [0u8; 512];
                let read = socket.read(&mut buffer).await.unwrap();
                if read == 0 {
                    break;
                }
                received.push(String::from_utf8_lossy(&buffer[..read]).to_string());
                socket.write_all(reply.as_bytes()).await.unwrap();
            }
            received
        });
        (
            NetworkAddress {
                host: "127.0.0.1".to_string(),
                port,
            },
            handle,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_whole_hertz() {
        assert_eq!(whole_hz(144_000_000.0), 144_000_000);
        assert_eq!(whole_hz(143_999_871.6), 143_999_872);
    }

    #[test]
    fn protocol_names() {
        assert_eq!(RadioProtocol::Gqrx.to_string(), "gqrx");
        assert_eq!(RadioProtocol::NetRemote.to_string(), "netremote");
        assert_eq!(PassEvent::Aos.to_string(), "AOS");
        assert_eq!(PassEvent::Los.to_string(), "LOS");
    }

    #[tokio::test]
    async fn client_dispatches_to_selected_protocol() {
        let (address, peer) = testing::peer(vec!["RPRT 0\n"]).await;
        let mut client = RadioClient::new(RadioProtocol::Gqrx, address, Duration::from_secs(2));
        assert_eq!(client.protocol(), RadioProtocol::Gqrx);

        client.connect().await.unwrap();
        client.set_frequency(432_100_000.4).await.unwrap();
        assert_eq!(peer.await.unwrap(), vec!["F 432100000\n".to_string()]);
    }
}
