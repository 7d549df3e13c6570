pub mod domain;
pub mod driven;
pub mod drivers;
