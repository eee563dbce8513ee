pub mod common;
pub mod farmer;
