mod address;
pub mod error;
mod link;
pub mod radio;
pub mod rotor;

pub use address::{AddressError, NetworkAddress, RotorEndpoint};
pub use radio::{FrequencyControl, RadioClient, RadioProtocol};
pub use rotor::{Positioner, RotorClient};
