pub mod logging;
pub mod verify;
