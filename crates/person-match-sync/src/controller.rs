//! Keeps the person match page's URL, store, and rendered frame in agreement.
//!
//! The URL is the source of truth for what the page shows. Every delivered
//! parameter change is pushed into the store, and the body is withheld until
//! the store's mode matches the URL so the mode switch never renders a value it
//! is about to flip away from. Mode toggles write the store first and then
//! rewrite the URL, so the follow-up delivery finds the store already settled.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::fetch_sequence::FetchTicket;
use crate::intent::{PageIntent, QueryParams, toggle_params};
use crate::navigation::{Navigator, person_match_location};
use crate::readiness::{SyncPhase, sync_phase};
use crate::routes::RouteError;
use crate::store::PersonMatchStore;
use crate::view::PageFrame;

static NEXT_MOUNT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ToggleOutcome {
    Applied { href: String },
    IgnoredWhileSyncing,
}

pub struct ViewSyncController<S, N> {
    store: S,
    navigator: N,
    config: ControllerConfig,
    mount_id: u64,
    generation: u64,
    observed_since_mount: bool,
}

impl<S, N> ViewSyncController<S, N>
where
    S: PersonMatchStore,
    N: Navigator,
{
    #[must_use]
    pub fn mount(store: S, navigator: N, config: ControllerConfig) -> Self {
        let mount_id = NEXT_MOUNT_ID.fetch_add(1, Ordering::Relaxed);
        info!(
            mount_id,
            href = %navigator.current_location().href(),
            toggle_history = config.toggle_history.as_str(),
            "person match page mounted"
        );
        Self {
            store,
            navigator,
            config,
            mount_id,
            generation: 0,
            observed_since_mount: false,
        }
    }

    /// Hands the collaborators back untouched.
    pub fn unmount(self) -> (S, N) {
        info!(mount_id = self.mount_id, "person match page unmounted");
        (self.store, self.navigator)
    }

    pub fn on_parameters_changed(&mut self, params: &QueryParams) {
        let intent = PageIntent::from_params(params);
        self.generation = self.generation.saturating_add(1);
        let ticket = FetchTicket::new(self.mount_id, self.generation);
        debug!(
            match_mode = intent.match_mode,
            resource_id = intent.resource_id.as_deref().unwrap_or(""),
            generation = ticket.generation,
            "parameters changed"
        );

        self.store.fetch_data_sources();
        self.store.fetch_summaries();
        self.store.set_match_mode(intent.match_mode);

        if let Some(id) = intent.resource_id.as_deref() {
            self.store.select_summary(id);
            // Branch on the URL's mode: the store write above may not be visible yet.
            if intent.match_mode {
                self.store.fetch_potential_match(id, ticket);
            } else {
                self.store.fetch_person(id, ticket);
            }
        }

        self.observed_since_mount = true;
    }

    pub fn on_mode_toggled(&mut self, checked: bool) -> Result<ToggleOutcome, RouteError> {
        if !self.phase().is_ready() {
            warn!(checked, phase = self.phase().as_str(), "mode toggle ignored");
            return Ok(ToggleOutcome::IgnoredWhileSyncing);
        }

        self.store.set_match_mode(checked);
        let params = toggle_params(
            checked,
            self.store.selected_person_id(),
            self.store.selected_potential_match_id(),
        );
        let location = person_match_location(params);
        let href = location.href();
        debug!(checked, href = %href, "mode toggled");
        self.navigator.navigate(location, self.config.toggle_history)?;
        Ok(ToggleOutcome::Applied { href })
    }

    #[must_use]
    pub fn url_intent(&self) -> PageIntent {
        PageIntent::from_params(self.navigator.current_params())
    }

    #[must_use]
    pub fn phase(&self) -> SyncPhase {
        sync_phase(
            self.observed_since_mount,
            &self.url_intent(),
            self.store.match_mode(),
        )
    }

    #[must_use]
    pub fn render(&self) -> PageFrame {
        if !self.phase().is_ready() {
            return PageFrame::loading();
        }
        PageFrame::body(self.store.match_mode(), self.store.active_selection())
    }

    #[must_use]
    pub fn mount_id(&self) -> u64 {
        self.mount_id
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    #[must_use]
    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut N {
        &mut self.navigator
    }
}
