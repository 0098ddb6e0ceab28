//! Ports: the two seams between the core and the outside world.

pub mod sink;
pub mod source;

pub use sink::{LogSink, Sink};
pub use source::RateSource;
