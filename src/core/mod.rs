pub mod client;
pub mod controller;
pub mod events;
pub mod progress;
pub mod retry;
pub mod sink;
pub mod stages;
