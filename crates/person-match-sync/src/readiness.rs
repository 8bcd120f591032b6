use serde::Serialize;

use crate::intent::PageIntent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// Mounted, but no parameter change has been delivered yet.
    Uninitialized,
    /// The store's mode disagrees with the URL.
    Syncing,
    Ready,
}

impl SyncPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Syncing => "syncing",
            Self::Ready => "ready",
        }
    }

    #[must_use]
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// The mode switch has no neutral state, so the body may only render once the
/// store already holds the mode the URL asks for.
#[must_use]
pub fn is_ready(url_intent: &PageIntent, store_match_mode: bool) -> bool {
    store_match_mode == url_intent.match_mode
}

#[must_use]
pub fn sync_phase(
    observed_since_mount: bool,
    url_intent: &PageIntent,
    store_match_mode: bool,
) -> SyncPhase {
    if !observed_since_mount {
        return SyncPhase::Uninitialized;
    }
    if is_ready(url_intent, store_match_mode) {
        SyncPhase::Ready
    } else {
        SyncPhase::Syncing
    }
}

#[cfg(test)]
mod tests {
    use super::{SyncPhase, is_ready, sync_phase};
    use crate::intent::PageIntent;

    fn intent(match_mode: bool) -> PageIntent {
        PageIntent {
            match_mode,
            resource_id: None,
        }
    }

    #[test]
    fn ready_only_when_modes_agree() {
        assert!(is_ready(&intent(true), true));
        assert!(is_ready(&intent(false), false));
        assert!(!is_ready(&intent(true), false));
        assert!(!is_ready(&intent(false), true));
    }

    #[test]
    fn phase_stays_uninitialized_until_first_delivery_even_if_modes_agree() {
        assert_eq!(sync_phase(false, &intent(false), false), SyncPhase::Uninitialized);
        assert_eq!(sync_phase(true, &intent(false), false), SyncPhase::Ready);
        assert_eq!(sync_phase(true, &intent(true), false), SyncPhase::Syncing);
    }
}
