use std::time::Duration;

use serde_json::{json, Value};

use super::{whole_hz, FrequencyControl, PassEvent};
use crate::endpoint::address::NetworkAddress;
use crate::endpoint::error::EndpointError;
use crate::endpoint::link::Link;

const MAX_REPLY: usize = 200;

/// SDR# NetRemote plugin.
#[derive(Debug)]
pub struct NetRemoteClient {
    address: NetworkAddress,
    link: Option<Link>,
    deadline: Duration,
}

impl NetRemoteClient {
    pub fn new(address: NetworkAddress, deadline: Duration) -> Self {
        Self {
            address,
            link: None,
            deadline,
        }
    }
}

fn set_frequency_command(frequency_hz: f64) -> String {
    json!({
        "Command": "Set",
        "Method": "Frequency",
        "Value": whole_hz(frequency_hz),
    })
    .to_string()
}

fn check_reply(reply: &str) -> Result<(), String> {
    let accepted = serde_json::from_str::<Value>(reply)
        .map(|value| value.get("Result").and_then(Value::as_str) == Some("OK"))
        .unwrap_or(false);
    if accepted || reply.contains(r#"{"Result":"OK"}"#) {
        Ok(())
    } else if reply.contains("Not tunable") {
        Err("receiver not started; start SDR# receiving, then tuning works".to_string())
    } else {
        Err(reply.to_string())
    }
}

impl FrequencyControl for NetRemoteClient {
    fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    async fn connect(&mut self) -> Result<(), EndpointError> {
        self.link = Some(Link::open(&self.address, self.deadline).await?);
        Ok(())
    }

    async fn set_frequency(&mut self, frequency_hz: f64) -> Result<(), EndpointError> {
        let link = self.link.as_mut().ok_or(EndpointError::NotConnected)?;
        let command = set_frequency_command(frequency_hz);
        let result = link
            .request_raw(command.as_bytes(), MAX_REPLY)
            .await
            .and_then(|reply| {
                check_reply(&reply).map_err(|reply| EndpointError::Rejected {
                    endpoint: self.address.to_string(),
                    reply,
                })
            });
        if matches!(&result, Err(e) if e.is_connection_lost()) {
            self.link = None;
        }
        result
    }

    /// NetRemote has no AOS/LOS vocabulary.
    async fn announce(&mut self, event: PassEvent) -> Result<(), EndpointError> {
        log::debug!("NetRemote ignores {} announcements", event);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.link = None;
    }
}
