use serde::Serialize;

pub const PAGE_TITLE: &str = "Person Match";
pub const MATCH_MODE_SWITCH_ID: &str = "match-mode";
pub const MATCH_MODE_SWITCH_LABEL: &str = "Match Mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavTab {
    PersonMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchView {
    pub id: &'static str,
    pub label: &'static str,
    pub checked: bool,
}

impl SwitchView {
    #[must_use]
    pub fn match_mode(checked: bool) -> Self {
        Self {
            id: MATCH_MODE_SWITCH_ID,
            label: MATCH_MODE_SWITCH_LABEL,
            checked,
        }
    }
}

/// One rendered state of the page. The nav bar is drawn in both variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageFrame {
    Loading {
        tab: NavTab,
    },
    Body {
        tab: NavTab,
        title: &'static str,
        match_mode_switch: SwitchView,
        active_selection: Option<String>,
    },
}

impl PageFrame {
    #[must_use]
    pub fn loading() -> Self {
        Self::Loading {
            tab: NavTab::PersonMatch,
        }
    }

    #[must_use]
    pub fn body(match_mode: bool, active_selection: Option<&str>) -> Self {
        Self::Body {
            tab: NavTab::PersonMatch,
            title: PAGE_TITLE,
            match_mode_switch: SwitchView::match_mode(match_mode),
            active_selection: active_selection.map(str::to_string),
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    #[must_use]
    pub fn switch_checked(&self) -> Option<bool> {
        match self {
            Self::Loading { .. } => None,
            Self::Body {
                match_mode_switch, ..
            } => Some(match_mode_switch.checked),
        }
    }
}
