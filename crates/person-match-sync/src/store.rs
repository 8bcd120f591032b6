use crate::fetch_sequence::FetchTicket;

/// Capabilities the page controller needs from the application state store.
///
/// Fetch operations are fire-and-forget: the store resolves them on its own
/// schedule and surfaces failures through its own error state. Selection
/// writes may also be applied asynchronously; readers observe the last applied
/// value.
pub trait PersonMatchStore {
    fn fetch_data_sources(&mut self);
    fn fetch_summaries(&mut self);
    fn set_match_mode(&mut self, match_mode: bool);
    fn select_summary(&mut self, id: &str);
    fn fetch_potential_match(&mut self, id: &str, ticket: FetchTicket);
    fn fetch_person(&mut self, id: &str, ticket: FetchTicket);

    fn match_mode(&self) -> bool;
    fn selected_person_id(&self) -> Option<&str>;
    fn selected_potential_match_id(&self) -> Option<&str>;

    /// The selection that matters for the store's current mode.
    fn active_selection(&self) -> Option<&str> {
        if self.match_mode() {
            self.selected_potential_match_id()
        } else {
            self.selected_person_id()
        }
    }
}
