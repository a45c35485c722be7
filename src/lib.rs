pub mod anchor;
pub mod config;
pub mod contact;
pub mod counter;
pub mod error;
pub mod filter;
pub mod log;
pub mod scroll;
pub mod timer;
pub mod typewriter;
