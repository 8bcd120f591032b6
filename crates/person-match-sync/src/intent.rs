use serde::{Deserialize, Serialize};
use url::form_urlencoded;

pub const MATCH_MODE_PARAM: &str = "matchMode";
pub const ID_PARAM: &str = "id";
pub const MATCH_MODE_ENABLED: &str = "true";

/// Ordered query parameters, decoded with `application/x-www-form-urlencoded` rules.
///
/// Duplicate keys are kept; [`QueryParams::get`] returns the first value for a key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw query string. A single leading `?` is ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let pairs = form_urlencoded::parse(raw.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        Self { pairs }
    }

    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(candidate, _)| candidate == key)
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Encodes the pairs without a leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

/// What the current URL asks the page to show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageIntent {
    pub match_mode: bool,
    pub resource_id: Option<String>,
}

impl PageIntent {
    #[must_use]
    pub fn from_params(params: &QueryParams) -> Self {
        Self {
            match_mode: match_mode_from_params(params),
            resource_id: params
                .get(ID_PARAM)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        }
    }
}

/// Only the literal `"true"` enables match mode; anything else is browse mode.
#[must_use]
pub fn match_mode_from_params(params: &QueryParams) -> bool {
    params.get(MATCH_MODE_PARAM) == Some(MATCH_MODE_ENABLED)
}

/// Query parameters to publish after the operator flips the mode switch.
///
/// Match mode carries the potential-match selection, browse mode carries the
/// person selection. Empty selections are dropped.
#[must_use]
pub fn toggle_params(
    checked: bool,
    selected_person_id: Option<&str>,
    selected_potential_match_id: Option<&str>,
) -> QueryParams {
    let mut params = QueryParams::new();
    let carried_id = if checked {
        params.append(MATCH_MODE_PARAM, MATCH_MODE_ENABLED);
        selected_potential_match_id
    } else {
        selected_person_id
    };
    if let Some(id) = carried_id.filter(|id| !id.is_empty()) {
        params.append(ID_PARAM, id);
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decodes_pairs_and_ignores_leading_question_mark() {
        let params = QueryParams::parse("?id=P%2012&matchMode=true");
        assert_eq!(params.get(ID_PARAM), Some("P 12"));
        assert_eq!(params.get(MATCH_MODE_PARAM), Some("true"));
        assert!(QueryParams::parse("").is_empty());
        assert!(QueryParams::parse("?").is_empty());
    }

    #[test]
    fn get_returns_first_value_for_duplicate_keys() {
        let params = QueryParams::parse("matchMode=false&matchMode=true");
        assert_eq!(params.get(MATCH_MODE_PARAM), Some("false"));
        assert!(!match_mode_from_params(&params));
    }

    #[test]
    fn match_mode_requires_literal_true() {
        for raw in ["matchMode=TRUE", "matchMode=1", "matchMode=", "matchMode", ""] {
            let params = QueryParams::parse(raw);
            assert!(!match_mode_from_params(&params), "{raw} should be browse mode");
        }
        assert!(match_mode_from_params(&QueryParams::parse("matchMode=true")));
    }

    #[test]
    fn intent_treats_empty_id_as_no_selection() {
        let intent = PageIntent::from_params(&QueryParams::parse("id=&matchMode=true"));
        assert_eq!(
            intent,
            PageIntent {
                match_mode: true,
                resource_id: None,
            }
        );
    }

    #[test]
    fn query_string_round_trips_reserved_characters() {
        let params = QueryParams::from_pairs([(ID_PARAM, "a&b=c")]);
        let encoded = params.to_query_string();
        assert_eq!(encoded, "id=a%26b%3Dc");
        assert_eq!(QueryParams::parse(&encoded), params);
    }

    #[test]
    fn toggle_on_carries_potential_match_selection_only() {
        let params = toggle_params(true, Some("P7"), Some("M3"));
        assert_eq!(params.to_query_string(), "matchMode=true&id=M3");

        let params = toggle_params(true, Some("P7"), None);
        assert_eq!(params.to_query_string(), "matchMode=true");
    }

    #[test]
    fn toggle_off_carries_person_selection_and_drops_match_mode() {
        let params = toggle_params(false, Some("P7"), Some("M3"));
        assert_eq!(params.to_query_string(), "id=P7");
        assert!(!params.contains_key(MATCH_MODE_PARAM));

        assert!(toggle_params(false, Some(""), Some("M3")).is_empty());
    }
}
