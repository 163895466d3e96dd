//! Request ordering.
//!
//! Every fetch takes a [`Ticket`] when it starts. A response is applied only
//! when its ticket is newer than the last one applied, so a slow response
//! can never overwrite data from a request issued after it.

/// Issue order of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Position in issue order, starting at 1.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Hands out tickets and tracks the newest applied one.
#[derive(Debug, Default, Clone)]
pub struct Sequencer {
    issued: u64,
    applied: u64,
}

impl Sequencer {
    /// Create a sequencer with nothing issued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket.
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Record `ticket` as applied if it is newer than anything applied so
    /// far. Returns `false` for a stale ticket.
    pub fn accept(&mut self, ticket: Ticket) -> bool {
        if ticket.0 > self.applied {
            self.applied = ticket.0;
            true
        } else {
            false
        }
    }
}
