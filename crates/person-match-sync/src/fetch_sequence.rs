use serde::{Deserialize, Serialize};

/// Identifies the parameter change that issued a record fetch.
///
/// Tickets order by mount first, then by generation within the mount. A
/// completion whose ticket is older than the newest issued ticket belongs to a
/// superseded URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FetchTicket {
    pub mount: u64,
    pub generation: u64,
}

impl FetchTicket {
    #[must_use]
    pub const fn new(mount: u64, generation: u64) -> Self {
        Self { mount, generation }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    Current,
    Stale {
        latest: FetchTicket,
        incoming: FetchTicket,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleFetchPolicy {
    #[default]
    Discard,
    Apply,
}

impl StaleFetchPolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discard => "discard",
            Self::Apply => "apply",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchSequencer {
    latest: Option<FetchTicket>,
}

impl FetchSequencer {
    pub fn register(&mut self, ticket: FetchTicket) {
        self.latest = Some(self.latest.map_or(ticket, |latest| latest.max(ticket)));
    }

    #[must_use]
    pub fn latest(&self) -> Option<FetchTicket> {
        self.latest
    }

    #[must_use]
    pub fn admit(&self, ticket: FetchTicket) -> FetchDecision {
        match self.latest {
            Some(latest) if ticket < latest => FetchDecision::Stale {
                latest,
                incoming: ticket,
            },
            _ => FetchDecision::Current,
        }
    }
}
