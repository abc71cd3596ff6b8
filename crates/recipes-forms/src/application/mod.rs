//! Application layer
//!
//! Drives a draft from user events and talks to the outbound ports.

pub mod controller;

pub use controller::{FormController, FormPorts};
