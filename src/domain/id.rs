//! Subscriber identity and cache scoping.

use std::fmt;

/// Opaque recipient handle.
///
/// In the shipped Telegram adapter this is the chat id, but nothing in the
/// core depends on that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(i64);

impl SubscriberId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cache partition key.
///
/// A deployment either shares one [`Global`](Scope::Global) snapshot across
/// all subscribers or keeps one snapshot per subscriber; the two modes have
/// different freshness clocks and must not be mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Subscriber(SubscriberId),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Subscriber(id) => write!(f, "subscriber:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_display() {
        assert_eq!(Scope::Global.to_string(), "global");
        assert_eq!(
            Scope::Subscriber(SubscriberId::new(42)).to_string(),
            "subscriber:42"
        );
    }
}
