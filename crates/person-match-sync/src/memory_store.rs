//! In-memory [`PersonMatchStore`] backed by a fixture.
//!
//! Selection writes can be deferred to model a store that commits state on a
//! later tick, and record fetches stay queued until [`InMemoryPersonMatchStore::resolve_fetches`]
//! runs, so callers decide when (and in what order) network responses land.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::fetch_sequence::{FetchDecision, FetchSequencer, FetchTicket, StaleFetchPolicy};
use crate::store::PersonMatchStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub person_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_match_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: String,
    pub data_source_id: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialMatchRecord {
    pub id: String,
    pub person_ids: Vec<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub data_sources: Vec<DataSource>,
    #[serde(default)]
    pub summaries: Vec<PersonSummary>,
    #[serde(default)]
    pub persons: Vec<PersonRecord>,
    #[serde(default)]
    pub potential_matches: Vec<PotentialMatchRecord>,
}

impl Fixture {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub defer_writes: bool,
    #[serde(default)]
    pub stale_fetch_policy: StaleFetchPolicy,
}

/// Every call the store received, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    FetchDataSources,
    FetchSummaries,
    SetMatchMode(bool),
    SelectSummary(String),
    FetchPotentialMatch { id: String, ticket: FetchTicket },
    FetchPerson { id: String, ticket: FetchTicket },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StoreWrite {
    MatchMode(bool),
    SelectSummary(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    Person,
    PotentialMatch,
}

impl FetchKind {
    fn label(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::PotentialMatch => "potential match",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingFetch {
    kind: FetchKind,
    id: String,
    ticket: FetchTicket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOrder {
    #[default]
    Issued,
    Reversed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchResolution {
    pub applied: usize,
    pub discarded: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryPersonMatchStore {
    config: StoreConfig,
    fixture: Fixture,
    match_mode: bool,
    selected_person_id: Option<String>,
    selected_potential_match_id: Option<String>,
    data_sources: Vec<DataSource>,
    summaries: Vec<PersonSummary>,
    person: Option<PersonRecord>,
    potential_match: Option<PotentialMatchRecord>,
    last_error: Option<String>,
    pending_writes: VecDeque<StoreWrite>,
    pending_fetches: Vec<PendingFetch>,
    sequencer: FetchSequencer,
    operations: Vec<StoreOp>,
}

impl InMemoryPersonMatchStore {
    #[must_use]
    pub fn new(fixture: Fixture, config: StoreConfig) -> Self {
        Self {
            config,
            fixture,
            ..Self::default()
        }
    }

    /// Applies deferred selection writes in the order they were issued.
    pub fn flush_writes(&mut self) -> usize {
        let mut applied = 0;
        while let Some(write) = self.pending_writes.pop_front() {
            self.apply_write(write);
            applied += 1;
        }
        applied
    }

    pub fn resolve_fetches(&mut self, order: FetchOrder) -> FetchResolution {
        let mut pending = std::mem::take(&mut self.pending_fetches);
        if order == FetchOrder::Reversed {
            pending.reverse();
        }

        let mut resolution = FetchResolution::default();
        for fetch in pending {
            let decision = self.sequencer.admit(fetch.ticket);
            if let FetchDecision::Stale { latest, incoming } = decision {
                if self.config.stale_fetch_policy == StaleFetchPolicy::Discard {
                    warn!(
                        kind = fetch.kind.label(),
                        id = %fetch.id,
                        latest_generation = latest.generation,
                        incoming_generation = incoming.generation,
                        "discarding stale fetch completion"
                    );
                    resolution.discarded += 1;
                    continue;
                }
            }
            self.complete_fetch(&fetch);
            resolution.applied += 1;
        }
        resolution
    }

    #[must_use]
    pub fn pending_write_count(&self) -> usize {
        self.pending_writes.len()
    }

    #[must_use]
    pub fn pending_fetch_count(&self) -> usize {
        self.pending_fetches.len()
    }

    #[must_use]
    pub fn operations(&self) -> &[StoreOp] {
        &self.operations
    }

    #[must_use]
    pub fn data_sources(&self) -> &[DataSource] {
        &self.data_sources
    }

    #[must_use]
    pub fn summaries(&self) -> &[PersonSummary] {
        &self.summaries
    }

    #[must_use]
    pub fn person(&self) -> Option<&PersonRecord> {
        self.person.as_ref()
    }

    #[must_use]
    pub fn potential_match(&self) -> Option<&PotentialMatchRecord> {
        self.potential_match.as_ref()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn write(&mut self, write: StoreWrite) {
        if self.config.defer_writes {
            self.pending_writes.push_back(write);
        } else {
            self.apply_write(write);
        }
    }

    fn apply_write(&mut self, write: StoreWrite) {
        match write {
            StoreWrite::MatchMode(match_mode) => self.match_mode = match_mode,
            StoreWrite::SelectSummary(id) => {
                if self.match_mode {
                    self.selected_potential_match_id = Some(id);
                } else {
                    self.selected_person_id = Some(id);
                }
            }
        }
    }

    fn queue_fetch(&mut self, kind: FetchKind, id: &str, ticket: FetchTicket) {
        self.sequencer.register(ticket);
        self.pending_fetches.push(PendingFetch {
            kind,
            id: id.to_string(),
            ticket,
        });
    }

    fn complete_fetch(&mut self, fetch: &PendingFetch) {
        debug!(
            kind = fetch.kind.label(),
            id = %fetch.id,
            generation = fetch.ticket.generation,
            "fetch completed"
        );
        let found = match fetch.kind {
            FetchKind::Person => {
                self.person = self
                    .fixture
                    .persons
                    .iter()
                    .find(|person| person.id == fetch.id)
                    .cloned();
                self.person.is_some()
            }
            FetchKind::PotentialMatch => {
                self.potential_match = self
                    .fixture
                    .potential_matches
                    .iter()
                    .find(|candidate| candidate.id == fetch.id)
                    .cloned();
                self.potential_match.is_some()
            }
        };
        self.last_error = if found {
            None
        } else {
            Some(format!("{} {} not found", fetch.kind.label(), fetch.id))
        };
    }
}

impl PersonMatchStore for InMemoryPersonMatchStore {
    fn fetch_data_sources(&mut self) {
        self.operations.push(StoreOp::FetchDataSources);
        self.data_sources.clone_from(&self.fixture.data_sources);
    }

    fn fetch_summaries(&mut self) {
        self.operations.push(StoreOp::FetchSummaries);
        self.summaries.clone_from(&self.fixture.summaries);
    }

    fn set_match_mode(&mut self, match_mode: bool) {
        self.operations.push(StoreOp::SetMatchMode(match_mode));
        self.write(StoreWrite::MatchMode(match_mode));
    }

    fn select_summary(&mut self, id: &str) {
        self.operations.push(StoreOp::SelectSummary(id.to_string()));
        self.write(StoreWrite::SelectSummary(id.to_string()));
    }

    fn fetch_potential_match(&mut self, id: &str, ticket: FetchTicket) {
        self.operations.push(StoreOp::FetchPotentialMatch {
            id: id.to_string(),
            ticket,
        });
        self.queue_fetch(FetchKind::PotentialMatch, id, ticket);
    }

    fn fetch_person(&mut self, id: &str, ticket: FetchTicket) {
        self.operations.push(StoreOp::FetchPerson {
            id: id.to_string(),
            ticket,
        });
        self.queue_fetch(FetchKind::Person, id, ticket);
    }

    fn match_mode(&self) -> bool {
        self.match_mode
    }

    fn selected_person_id(&self) -> Option<&str> {
        self.selected_person_id.as_deref()
    }

    fn selected_potential_match_id(&self) -> Option<&str> {
        self.selected_potential_match_id.as_deref()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_fixture() -> Fixture {
        Fixture {
            data_sources: vec![DataSource {
                id: "ds-1".to_string(),
                name: "Clinic EHR".to_string(),
            }],
            summaries: vec![PersonSummary {
                person_id: "P7".to_string(),
                display_name: "Ada Lovelace".to_string(),
                potential_match_id: Some("42".to_string()),
            }],
            persons: vec![
                PersonRecord {
                    id: "P7".to_string(),
                    data_source_id: "ds-1".to_string(),
                    first_name: "Ada".to_string(),
                    last_name: "Lovelace".to_string(),
                },
                PersonRecord {
                    id: "P8".to_string(),
                    data_source_id: "ds-1".to_string(),
                    first_name: "Augusta".to_string(),
                    last_name: "King".to_string(),
                },
            ],
            potential_matches: vec![PotentialMatchRecord {
                id: "42".to_string(),
                person_ids: vec!["P7".to_string(), "P8".to_string()],
                score: 0.93,
            }],
        }
    }

    #[test]
    fn deferred_writes_are_invisible_until_flushed_in_order() {
        let mut store = InMemoryPersonMatchStore::new(
            sample_fixture(),
            StoreConfig {
                defer_writes: true,
                ..StoreConfig::default()
            },
        );
        store.set_match_mode(true);
        store.select_summary("42");
        assert!(!store.match_mode());
        assert_eq!(store.selected_potential_match_id(), None);
        assert_eq!(store.pending_write_count(), 2);

        assert_eq!(store.flush_writes(), 2);
        assert!(store.match_mode());
        assert_eq!(store.selected_potential_match_id(), Some("42"));
        assert_eq!(store.selected_person_id(), None);
    }

    #[test]
    fn select_summary_writes_field_for_current_mode() {
        let mut store = InMemoryPersonMatchStore::new(sample_fixture(), StoreConfig::default());
        store.select_summary("P7");
        store.set_match_mode(true);
        store.select_summary("42");
        assert_eq!(store.selected_person_id(), Some("P7"));
        assert_eq!(store.selected_potential_match_id(), Some("42"));
        assert_eq!(store.active_selection(), Some("42"));
    }

    #[test]
    fn stale_completion_is_discarded_by_default() {
        let mut store = InMemoryPersonMatchStore::new(sample_fixture(), StoreConfig::default());
        store.fetch_person("P7", FetchTicket::new(1, 1));
        store.fetch_person("P8", FetchTicket::new(1, 2));

        let resolution = store.resolve_fetches(FetchOrder::Reversed);
        assert_eq!(
            resolution,
            FetchResolution {
                applied: 1,
                discarded: 1
            }
        );
        assert_eq!(store.person().map(|person| person.id.as_str()), Some("P8"));
    }

    #[test]
    fn apply_policy_keeps_last_writer_wins() {
        let mut store = InMemoryPersonMatchStore::new(
            sample_fixture(),
            StoreConfig {
                stale_fetch_policy: StaleFetchPolicy::Apply,
                ..StoreConfig::default()
            },
        );
        store.fetch_person("P7", FetchTicket::new(1, 1));
        store.fetch_person("P8", FetchTicket::new(1, 2));

        let resolution = store.resolve_fetches(FetchOrder::Reversed);
        assert_eq!(resolution.applied, 2);
        assert_eq!(store.person().map(|person| person.id.as_str()), Some("P7"));
    }

    #[test]
    fn missing_record_surfaces_store_error() {
        let mut store = InMemoryPersonMatchStore::new(sample_fixture(), StoreConfig::default());
        store.fetch_potential_match("missing", FetchTicket::new(1, 1));
        let _ = store.resolve_fetches(FetchOrder::Issued);
        assert_eq!(store.potential_match(), None);
        assert_eq!(store.last_error(), Some("potential match missing not found"));
    }

    #[test]
    fn fixture_decodes_with_missing_sections() {
        let fixture = Fixture::from_json(
            r#"{"persons":[{"id":"P1","data_source_id":"ds","first_name":"A","last_name":"B"}]}"#,
        )
        .expect("fixture json");
        assert_eq!(fixture.persons.len(), 1);
        assert!(fixture.potential_matches.is_empty());
    }
}
