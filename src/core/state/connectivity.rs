//! Connectivity gate

use serde::{Deserialize, Serialize};
use strum::Display;

/// Last observed state of the remote channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum Connectivity {
    #[default]
    Disconnected,
    Connected,
}

impl Connectivity {
    /// Record a new connectivity signal.
    ///
    /// Returns `true` only on `Disconnected -> Connected`, which is the one
    /// transition that calls for a full reload.
    pub fn transition(&mut self, connected: bool) -> bool {
        let next = if connected {
            Connectivity::Connected
        } else {
            Connectivity::Disconnected
        };
        let rising = *self == Connectivity::Disconnected && next == Connectivity::Connected;
        *self = next;
        rising
    }

    pub fn is_connected(&self) -> bool {
        *self == Connectivity::Connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition() {
        let mut c = Connectivity::default();
        assert!(!c.is_connected());

        // disconnected -> disconnected
        assert!(!c.transition(false));
        // disconnected -> connected
        assert!(c.transition(true));
        assert!(c.is_connected());
        // connected -> connected
        assert!(!c.transition(true));
        // connected -> disconnected
        assert!(!c.transition(false));
        assert_eq!(c, Connectivity::Disconnected);
        // reconnect triggers again
        assert!(c.transition(true));
    }
}
