use std::future::Future;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use super::address::{NetworkAddress, RotorEndpoint, SerialLine};
use super::error::EndpointError;
use super::link::Link;

/// rotctl exits with this code when it cannot open the rotor port.
const ROTCTL_PORT_UNAVAILABLE: i32 = 2;

/// Capability shared by every rotor transport.
pub trait Positioner {
    fn is_connected(&self) -> bool;

    fn connect(&mut self) -> impl Future<Output = Result<(), EndpointError>> + Send;

    /// One positioning attempt. On I/O failure the client drops its handle
    /// and reports disconnected until the next `connect`.
    fn set_position(
        &mut self,
        azimuth_deg: f64,
        elevation_deg: f64,
    ) -> impl Future<Output = Result<(), EndpointError>> + Send;

    fn disconnect(&mut self);
}

#[derive(Debug)]
enum Transport {
    Network {
        address: NetworkAddress,
        link: Option<Link>,
    },
    Serial {
        line: SerialLine,
        ready: bool,
    },
}

/// hamlib-compatible rotor controller: rotctld over TCP or rotctl on a serial line.
#[derive(Debug)]
pub struct RotorClient {
    transport: Transport,
    deadline: Duration,
}

impl RotorClient {
    pub fn new(endpoint: RotorEndpoint, deadline: Duration) -> Self {
        let transport = match endpoint {
            RotorEndpoint::Network(address) => Transport::Network {
                address,
                link: None,
            },
            RotorEndpoint::Serial(line) => Transport::Serial { line, ready: false },
        };
        Self {
            transport,
            deadline,
        }
    }

    pub fn endpoint(&self) -> String {
        match &self.transport {
            Transport::Network { address, .. } => address.to_string(),
            Transport::Serial { line, .. } => line.device.clone(),
        }
    }
}

impl Positioner for RotorClient {
    fn is_connected(&self) -> bool {
        match &self.transport {
            Transport::Network { link, .. } => link.is_some(),
            Transport::Serial { ready, .. } => *ready,
        }
    }

    async fn connect(&mut self) -> Result<(), EndpointError> {
        let deadline = self.deadline;
        match &mut self.transport {
            Transport::Network { address, link } => {
                *link = Some(Link::open(address, deadline).await?);
            }
            Transport::Serial { line, ready } => {
                tokio::fs::metadata(&line.device)
                    .await
                    .map_err(|source| EndpointError::Connect {
                        endpoint: line.device.clone(),
                        source,
                    })?;
                *ready = true;
            }
        }
        Ok(())
    }

    async fn set_position(
        &mut self,
        azimuth_deg: f64,
        elevation_deg: f64,
    ) -> Result<(), EndpointError> {
        let deadline = self.deadline;
        let endpoint = self.endpoint();
        match &mut self.transport {
            Transport::Network { link, .. } => {
                let active = link.as_mut().ok_or(EndpointError::NotConnected)?;
                let command = position_command(azimuth_deg, elevation_deg);
                let result = active.request_line(&command).await.and_then(|reply| {
                    check_rprt(&reply).map_err(|reply| EndpointError::Rejected {
                        endpoint: endpoint.clone(),
                        reply,
                    })
                });
                if matches!(&result, Err(e) if e.is_connection_lost()) {
                    *link = None;
                }
                result
            }
            Transport::Serial { line, ready } => {
                if !*ready {
                    return Err(EndpointError::NotConnected);
                }
                let result = run_rotctl(line, azimuth_deg, elevation_deg, deadline).await;
                if matches!(&result, Err(e) if e.is_connection_lost()) {
                    *ready = false;
                }
                result
            }
        }
    }

    fn disconnect(&mut self) {
        match &mut self.transport {
            Transport::Network { link, .. } => *link = None,
            Transport::Serial { ready, .. } => *ready = false,
        }
    }
}

fn position_command(azimuth_deg: f64, elevation_deg: f64) -> String {
    format!("P {:.2} {:.2}\n", azimuth_deg, elevation_deg)
}

/// Interpret a hamlib `RPRT <code>` reply; anything else is taken as success.
fn check_rprt(reply: &str) -> Result<(), String> {
    match reply.strip_prefix("RPRT") {
        Some(code) => match code.trim().parse::<i32>() {
            Ok(0) => Ok(()),
            _ => Err(reply.to_string()),
        },
        None => Ok(()),
    }
}

fn rotctl_args(line: &SerialLine, azimuth_deg: f64, elevation_deg: f64) -> Vec<String> {
    vec![
        "-m".to_string(),
        line.model.to_string(),
        "-r".to_string(),
        line.device.clone(),
        "-s".to_string(),
        line.baud.to_string(),
        "P".to_string(),
        format!("{:.2}", azimuth_deg),
        format!("{:.2}", elevation_deg),
    ]
}

async fn run_rotctl(
    line: &SerialLine,
    azimuth_deg: f64,
    elevation_deg: f64,
    deadline: Duration,
) -> Result<(), EndpointError> {
    let child = Command::new("rotctl")
        .args(rotctl_args(line, azimuth_deg, elevation_deg))
        .kill_on_drop(true)
        .output();

    let output = match timeout(deadline, child).await {
        Ok(output) => output?,
        Err(_) => return Err(EndpointError::Timeout(deadline)),
    };

    match output.status.code() {
        Some(0) => Ok(()),
        Some(ROTCTL_PORT_UNAVAILABLE) => Err(EndpointError::Io(std::io::Error::new(
            std::io::ErrorKind::NotConnected,
            format!("rotctl could not open {}", line.device),
        ))),
        _ => {
            let mut reply = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if reply.is_empty() {
                reply = String::from_utf8_lossy(&output.stderr).trim().to_string();
            }
            Err(EndpointError::Rejected {
                endpoint: line.device.clone(),
                reply,
            })
        }
    }
}
