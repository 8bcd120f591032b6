//! Headless driver for one person match page: replays browser and operator
//! events against the in-memory collaborators and records every frame.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PersonMatchConfig;
use crate::controller::{ToggleOutcome, ViewSyncController};
use crate::intent::match_mode_from_params;
use crate::memory_store::{FetchOrder, Fixture, InMemoryPersonMatchStore};
use crate::navigation::{HistoryMode, MemoryRouter, Navigator, ParamChangeSource};
use crate::readiness::SyncPhase;
use crate::routes::RouteError;
use crate::store::PersonMatchStore;
use crate::view::PageFrame;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PageEvent {
    Toggle {
        checked: bool,
    },
    Navigate {
        href: String,
        #[serde(default = "default_link_history")]
        history: HistoryMode,
    },
    Back,
    Forward,
    FlushStore,
    ResolveFetches {
        #[serde(default)]
        order: FetchOrder,
    },
}

fn default_link_history() -> HistoryMode {
    HistoryMode::Push
}

/// What triggered a recorded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameCause {
    Mount,
    ParamsDelivered,
    Event,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameRecord {
    pub sequence: usize,
    pub cause: FrameCause,
    pub href: String,
    pub url_match_mode: bool,
    pub store_match_mode: bool,
    pub phase: SyncPhase,
    pub frame: PageFrame,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlickerViolation {
    #[error(
        "frame {sequence} rendered the body while store mode {store} disagreed with url mode {url}"
    )]
    PrematureBody {
        sequence: usize,
        store: bool,
        url: bool,
    },
    #[error("frame {sequence} rendered switch={switch} for url mode {url}")]
    SwitchMismatch {
        sequence: usize,
        switch: bool,
        url: bool,
    },
}

pub struct PageSession {
    controller: ViewSyncController<InMemoryPersonMatchStore, MemoryRouter>,
    frames: Vec<FrameRecord>,
}

impl PageSession {
    pub fn open(
        href: &str,
        fixture: Fixture,
        config: PersonMatchConfig,
    ) -> Result<Self, RouteError> {
        let router = MemoryRouter::open(href)?;
        let store = InMemoryPersonMatchStore::new(fixture, config.store);
        let controller = ViewSyncController::mount(store, router, config.controller);
        let mut session = Self {
            controller,
            frames: Vec::new(),
        };
        session.record(FrameCause::Mount);
        session.pump_param_changes();
        Ok(session)
    }

    pub fn dispatch(&mut self, event: PageEvent) -> Result<Option<ToggleOutcome>, RouteError> {
        debug!(?event, "dispatch");
        let mut outcome = None;
        match event {
            PageEvent::Toggle { checked } => {
                outcome = Some(self.controller.on_mode_toggled(checked)?);
            }
            PageEvent::Navigate { href, history } => {
                self.controller
                    .navigator_mut()
                    .navigate_href(&href, history)?;
            }
            PageEvent::Back => {
                let _ = self.controller.navigator_mut().back();
            }
            PageEvent::Forward => {
                let _ = self.controller.navigator_mut().forward();
            }
            PageEvent::FlushStore => {
                let _ = self.controller.store_mut().flush_writes();
            }
            PageEvent::ResolveFetches { order } => {
                let _ = self.controller.store_mut().resolve_fetches(order);
            }
        }
        self.record(FrameCause::Event);
        self.pump_param_changes();
        Ok(outcome)
    }

    /// Flushes deferred store writes, then resolves queued fetches in issue order.
    pub fn settle(&mut self) {
        if self.controller.store().pending_write_count() > 0 {
            let _ = self.dispatch_infallible(PageEvent::FlushStore);
        }
        if self.controller.store().pending_fetch_count() > 0 {
            let _ = self.dispatch_infallible(PageEvent::ResolveFetches {
                order: FetchOrder::Issued,
            });
        }
    }

    #[must_use]
    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    #[must_use]
    pub fn current_frame(&self) -> PageFrame {
        self.controller.render()
    }

    #[must_use]
    pub fn href(&self) -> String {
        self.controller.navigator().current_location().href()
    }

    #[must_use]
    pub fn store(&self) -> &InMemoryPersonMatchStore {
        self.controller.store()
    }

    #[must_use]
    pub fn router(&self) -> &MemoryRouter {
        self.controller.navigator()
    }

    #[must_use]
    pub fn phase(&self) -> SyncPhase {
        self.controller.phase()
    }

    pub fn close(self) -> (InMemoryPersonMatchStore, MemoryRouter) {
        self.controller.unmount()
    }

    fn dispatch_infallible(&mut self, event: PageEvent) -> Option<ToggleOutcome> {
        // Store events never touch the router, so they cannot fail.
        self.dispatch(event).ok().flatten()
    }

    fn pump_param_changes(&mut self) {
        // Deliver strictly in arrival order, including anything queued mid-drain.
        loop {
            let changes = self.controller.navigator_mut().drain_param_changes();
            if changes.is_empty() {
                break;
            }
            for params in changes {
                self.controller.on_parameters_changed(&params);
                self.record(FrameCause::ParamsDelivered);
            }
        }
    }

    fn record(&mut self, cause: FrameCause) {
        let navigator = self.controller.navigator();
        let record = FrameRecord {
            sequence: self.frames.len(),
            cause,
            href: navigator.current_location().href(),
            url_match_mode: match_mode_from_params(navigator.current_params()),
            store_match_mode: self.controller.store().match_mode(),
            phase: self.controller.phase(),
            frame: self.controller.render(),
        };
        self.frames.push(record);
    }
}

/// Checks that no recorded body frame shows a switch value the URL does not ask for.
pub fn verify_no_flicker(frames: &[FrameRecord]) -> Result<(), FlickerViolation> {
    for record in frames {
        let Some(switch) = record.frame.switch_checked() else {
            continue;
        };
        if record.store_match_mode != record.url_match_mode {
            return Err(FlickerViolation::PrematureBody {
                sequence: record.sequence,
                store: record.store_match_mode,
                url: record.url_match_mode,
            });
        }
        if switch != record.url_match_mode {
            return Err(FlickerViolation::SwitchMismatch {
                sequence: record.sequence,
                switch,
                url: record.url_match_mode,
            });
        }
    }
    Ok(())
}
