//! Demo-mode detection.
//!
//! A request is a demo request when any of these carries the literal value
//! `true`: the `demo` query parameter, the `demo_mode` cookie, or the
//! `X-Demo-Mode` header. Anything else, including `1` or `TRUE`, is not.

use axum::http::{header::COOKIE, HeaderMap};
use serde::Serialize;

pub const DEMO_QUERY_PARAM: &str = "demo";
pub const DEMO_COOKIE: &str = "demo_mode";
pub const DEMO_HEADER: &str = "x-demo-mode";

const DEMO_FLAG_VALUE: &str = "true";

/// Which signal put the request into demo mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoSource {
    Query,
    Cookie,
    Header,
    /// The session belongs to a configured demo account
    Account,
}

/// Inspect the request's query string, cookies and headers for a demo flag.
/// Checked in that order; the first match wins.
pub fn detect_demo(query: Option<&str>, headers: &HeaderMap) -> Option<DemoSource> {
    let query_flag = query.is_some_and(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .any(|(key, value)| key == DEMO_QUERY_PARAM && value == DEMO_FLAG_VALUE)
    });
    if query_flag {
        return Some(DemoSource::Query);
    }

    if cookie_value(headers, DEMO_COOKIE) == Some(DEMO_FLAG_VALUE) {
        return Some(DemoSource::Cookie);
    }

    let header_flag = headers
        .get_all(DEMO_HEADER)
        .iter()
        .any(|v| v.to_str().is_ok_and(|s| s.trim() == DEMO_FLAG_VALUE));
    if header_flag {
        return Some(DemoSource::Header);
    }

    None
}

/// Value of the first cookie named `name` across all `Cookie` headers
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
}
