use std::time::Duration;

use super::{whole_hz, FrequencyControl, PassEvent};
use crate::endpoint::address::NetworkAddress;
use crate::endpoint::error::EndpointError;
use crate::endpoint::link::Link;

/// gqrx remote control (also spoken by gpredict's radio interface).
#[derive(Debug)]
pub struct GqrxClient {
    address: NetworkAddress,
    link: Option<Link>,
    deadline: Duration,
}

impl GqrxClient {
    pub fn new(address: NetworkAddress, deadline: Duration) -> Self {
        Self {
            address,
            link: None,
            deadline,
        }
    }

    async fn command(&mut self, line: String) -> Result<(), EndpointError> {
        let link = self.link.as_mut().ok_or(EndpointError::NotConnected)?;
        let result = link.request_line(&line).await.and_then(|reply| {
            if reply.contains("RPRT 0") {
                Ok(())
            } else {
                Err(EndpointError::Rejected {
                    endpoint: self.address.to_string(),
                    reply,
                })
            }
        });
        if matches!(&result, Err(e) if e.is_connection_lost()) {
            self.link = None;
        }
        result
    }
}

impl FrequencyControl for GqrxClient {
    fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    async fn connect(&mut self) -> Result<(), EndpointError> {
        self.link = Some(Link::open(&self.address, self.deadline).await?);
        Ok(())
    }

    async fn set_frequency(&mut self, frequency_hz: f64) -> Result<(), EndpointError> {
        self.command(format!("F {}\n", whole_hz(frequency_hz))).await
    }

    async fn announce(&mut self, event: PassEvent) -> Result<(), EndpointError> {
        self.command(format!("{}\n", event)).await
    }

    fn disconnect(&mut self) {
        self.link = None;
    }
}
