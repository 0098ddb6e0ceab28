//! Adapters binding the core's ports to real transports.

pub mod monobank;

#[cfg(feature = "telegram")]
pub mod telegram;
