use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("tracker has already run and cannot be restarted")]
    Stopped,
    #[error("neither a rotor nor a radio is configured")]
    NothingToDrive,
}
