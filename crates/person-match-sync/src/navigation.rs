use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::intent::QueryParams;
use crate::routes::{Location, Route, RouteError, RouteResolution, resolve_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    Push,
    #[default]
    Replace,
}

impl HistoryMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Replace => "replace",
        }
    }
}

/// The router as the page sees it: the current location plus navigation.
pub trait Navigator {
    fn current_location(&self) -> &Location;

    fn current_params(&self) -> &QueryParams {
        &self.current_location().query
    }

    fn navigate(&mut self, location: Location, mode: HistoryMode) -> Result<(), RouteError>;
}

/// Read side: query parameter changes in the order they happened.
pub trait ParamChangeSource {
    fn drain_param_changes(&mut self) -> Vec<QueryParams>;
}

/// Browser-style history kept in memory.
#[derive(Debug, Clone)]
pub struct MemoryRouter {
    entries: Vec<Location>,
    index: usize,
    pending_changes: VecDeque<QueryParams>,
}

impl MemoryRouter {
    /// Opens `href` as the first history entry, following redirects, and queues
    /// the initial parameter delivery.
    pub fn open(href: &str) -> Result<Self, RouteError> {
        let location = resolve_location(Location::parse(href)?)?;
        info!(href = %location.href(), "router opened");
        let mut pending_changes = VecDeque::new();
        pending_changes.push_back(location.query.clone());
        Ok(Self {
            entries: vec![location],
            index: 0,
            pending_changes,
        })
    }

    pub fn navigate_href(&mut self, href: &str, mode: HistoryMode) -> Result<(), RouteError> {
        let location = Location::parse(href)?;
        self.navigate(location, mode)
    }

    /// Browser back. Returns false at the start of history.
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        let previous = self.current().query.clone();
        self.index -= 1;
        self.note_change(&previous);
        true
    }

    /// Browser forward. Returns false at the end of history.
    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        let previous = self.current().query.clone();
        self.index += 1;
        self.note_change(&previous);
        true
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn entries(&self) -> &[Location] {
        &self.entries
    }

    fn current(&self) -> &Location {
        // `index` always points into `entries`, which is never empty.
        &self.entries[self.index]
    }

    fn note_change(&mut self, previous: &QueryParams) {
        let current = self.current().query.clone();
        if &current != previous {
            self.pending_changes.push_back(current);
        }
    }
}

impl Navigator for MemoryRouter {
    fn current_location(&self) -> &Location {
        self.current()
    }

    fn navigate(&mut self, location: Location, mode: HistoryMode) -> Result<(), RouteError> {
        // Redirects rewrite the target only; `mode` still decides whether history grows.
        let location = resolve_location(location)?;

        info!(href = %location.href(), mode = mode.as_str(), "navigate");
        let previous = self.current().query.clone();
        match mode {
            HistoryMode::Push => {
                self.entries.truncate(self.index + 1);
                self.entries.push(location);
                self.index = self.entries.len() - 1;
            }
            HistoryMode::Replace => {
                self.entries[self.index] = location;
            }
        }
        self.note_change(&previous);
        Ok(())
    }
}

impl ParamChangeSource for MemoryRouter {
    fn drain_param_changes(&mut self) -> Vec<QueryParams> {
        self.pending_changes.drain(..).collect()
    }
}

fn resolve_location(location: Location) -> Result<Location, RouteError> {
    match resolve_path(&location.path) {
        RouteResolution::Page(route) => Ok(Location::new(route, location.query)),
        RouteResolution::Redirect { to, .. } => Ok(Location::new(to, location.query)),
        RouteResolution::NotFound => Err(RouteError::UnknownRoute(location.path)),
    }
}

#[must_use]
pub fn person_match_location(query: QueryParams) -> Location {
    Location::new(Route::PersonMatch, query)
}
