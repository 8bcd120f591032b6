//! View-state synchronization for the person match page.
//!
//! The page has three sources of truth: the URL query (`matchMode`, `id`), the
//! application store, and the rendered frame. [`controller::ViewSyncController`]
//! reconciles them; the remaining modules define its collaborators and an
//! in-memory rendition of each for headless sessions.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod controller;
pub mod fetch_sequence;
pub mod intent;
pub mod memory_store;
pub mod navigation;
pub mod readiness;
pub mod routes;
pub mod session;
pub mod store;
pub mod view;

pub use config::{ConfigError, ControllerConfig, PersonMatchConfig};
pub use controller::{ToggleOutcome, ViewSyncController};
pub use fetch_sequence::{FetchDecision, FetchSequencer, FetchTicket, StaleFetchPolicy};
pub use intent::{PageIntent, QueryParams};
pub use memory_store::{Fixture, InMemoryPersonMatchStore, StoreConfig};
pub use navigation::{HistoryMode, MemoryRouter, Navigator, ParamChangeSource};
pub use readiness::SyncPhase;
pub use routes::{Location, Route, RouteError};
pub use session::{FrameRecord, PageEvent, PageSession, verify_no_flicker};
pub use store::PersonMatchStore;
pub use view::PageFrame;
