use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AddressError {
    #[error("endpoint is empty")]
    Empty,
    #[error("missing host in {0}")]
    MissingHost(String),
    #[error("invalid port in {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkAddress {
    pub host: String,
    pub port: u16,
}

impl NetworkAddress {
    /// Parse `host[:port]`, falling back to `default_port`.
    pub fn parse(value: &str, default_port: u16) -> Result<Self, AddressError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AddressError::Empty);
        }

        let (host, port) = match value.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| AddressError::InvalidPort(value.to_string()))?;
                (host, port)
            }
            None => (value, default_port),
        };

        if host.is_empty() {
            return Err(AddressError::MissingHost(value.to_string()));
        }
        if port == 0 {
            return Err(AddressError::InvalidPort(value.to_string()));
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Serial rotor reached through hamlib's `rotctl`.
///
/// `model` and `baud` are handed to rotctl untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialLine {
    pub device: String,
    pub model: u32,
    pub baud: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotorEndpoint {
    Network(NetworkAddress),
    Serial(SerialLine),
}

impl RotorEndpoint {
    /// `host:port` selects rotctld over TCP, anything else is a serial device.
    pub fn parse(value: &str, model: u32, baud: u32) -> Result<Self, AddressError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AddressError::Empty);
        }

        if value.contains(':') {
            NetworkAddress::parse(value, 0).map(RotorEndpoint::Network)
        } else {
            Ok(RotorEndpoint::Serial(SerialLine {
                device: value.to_string(),
                model,
                baud,
            }))
        }
    }
}

impl fmt::Display for RotorEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotorEndpoint::Network(address) => write!(f, "{}", address),
            RotorEndpoint::Serial(line) => write!(
                f,
                "{} (model {}, {} baud)",
                line.device, line.model, line.baud
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_and_port() {
        let address = NetworkAddress::parse("192.168.1.20:4533", 7356).unwrap();
        assert_eq!(address.host, "192.168.1.20");
        assert_eq!(address.port, 4533);
        assert_eq!(address.to_string(), "192.168.1.20:4533");
    }

    #[test]
    fn missing_port_uses_default() {
        let address = NetworkAddress::parse("localhost", 7356).unwrap();
        assert_eq!(address.port, 7356);
    }

    #[test]
    fn rejects_bad_addresses() {
        assert_eq!(NetworkAddress::parse("", 1), Err(AddressError::Empty));
        assert!(matches!(
            NetworkAddress::parse(":4533", 1),
            Err(AddressError::MissingHost(_))
        ));
        assert!(matches!(
            NetworkAddress::parse("host:rotor", 1),
            Err(AddressError::InvalidPort(_))
        ));
    }

    #[test]
    fn rotor_transport_follows_endpoint_shape() {
        match RotorEndpoint::parse("127.0.0.1:4533", 2, 9600).unwrap() {
            RotorEndpoint::Network(address) => assert_eq!(address.port, 4533),
            other => panic!("expected network rotor, got {:?}", other),
        }
        match RotorEndpoint::parse("/dev/ttyUSB0", 1401, 19200).unwrap() {
            RotorEndpoint::Serial(line) => {
                assert_eq!(line.device, "/dev/ttyUSB0");
                assert_eq!(line.model, 1401);
                assert_eq!(line.baud, 19200);
            }
            other => panic!("expected serial rotor, got {:?}", other),
        }
        assert!(RotorEndpoint::parse("host:", 2, 9600).is_err());
    }
}
