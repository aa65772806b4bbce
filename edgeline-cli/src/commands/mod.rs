pub mod config;
pub mod pack;
pub mod read;
pub mod send;
