use serde::Serialize;

use crate::intent::QueryParams;

pub const ROUTE_ROOT: &str = "/";
pub const ROUTE_PERSON_MATCH: &str = "/person_match";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("href must not be empty")]
    EmptyHref,
    #[error("href must be an absolute path starting with '/': {0}")]
    RelativeHref(String),
    #[error("no route matches path {0}")]
    UnknownRoute(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Root,
    PersonMatch,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Root => ROUTE_ROOT,
            Self::PersonMatch => ROUTE_PERSON_MATCH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteResolution {
    Page(Route),
    Redirect { to: Route, replace: bool },
    NotFound,
}

#[must_use]
pub fn resolve_path(path: &str) -> RouteResolution {
    let trimmed = path.trim_end_matches('/');
    match trimmed {
        "" => RouteResolution::Redirect {
            to: Route::PersonMatch,
            replace: true,
        },
        ROUTE_PERSON_MATCH => RouteResolution::Page(Route::PersonMatch),
        _ => RouteResolution::NotFound,
    }
}

#[must_use]
pub fn get_route(route: Route, query: &QueryParams) -> String {
    if query.is_empty() {
        return route.path().to_string();
    }
    format!("{}?{}", route.path(), query.to_query_string())
}

/// A path plus its decoded query. Fragments are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: QueryParams,
}

impl Location {
    #[must_use]
    pub fn new(route: Route, query: QueryParams) -> Self {
        Self {
            path: route.path().to_string(),
            query,
        }
    }

    pub fn parse(href: &str) -> Result<Self, RouteError> {
        let href = href.trim();
        if href.is_empty() {
            return Err(RouteError::EmptyHref);
        }
        if !href.starts_with('/') {
            return Err(RouteError::RelativeHref(href.to_string()));
        }
        let without_fragment = href.split('#').next().unwrap_or(href);
        let (path, raw_query) = without_fragment
            .split_once('?')
            .unwrap_or((without_fragment, ""));
        Ok(Self {
            path: path.to_string(),
            query: QueryParams::parse(raw_query),
        })
    }

    #[must_use]
    pub fn href(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        format!("{}?{}", self.path, self.query.to_query_string())
    }
}
