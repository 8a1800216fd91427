//! Feed endpoint

use axum::{
    Router,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use anyhow::Context;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use zmanim_core::constants::FEED_NAME_PREFIX;
use zmanim_core::{DateRange, LocationQuery, ZmanimError, ZmanimResult, build_feed, normalize};

use crate::routes::AppError;
use crate::state::AppState;

const CONTENT_TYPE: &str = "text/calendar; charset=utf-8";
const CONTENT_DISPOSITION: &str = "attachment; filename=\"zmanim.ics\"";

pub fn router() -> Router<AppState> {
    Router::new().route("/feed", get(feed))
}

/// Query parameters accepted by `GET /feed`
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub zip: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub tzid: Option<String>,
    /// Minutes after sunset for Havdallah
    pub havdallah: Option<String>,
    /// Include weekly Torah portions
    pub parasha: Option<String>,
}

impl FeedQuery {
    fn location(&self) -> LocationQuery {
        LocationQuery {
            zip: self.zip.clone(),
            lat: self.lat.clone(),
            lng: self.lng.clone(),
            tzid: self.tzid.clone(),
        }
    }
}

/// GET /feed - iCalendar feed for a ZIP code or coordinates
async fn feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Response, AppError> {
    // Event computation is CPU-bound (ephemeris, boundary lookup)
    let body = tokio::task::spawn_blocking(move || render_feed(&state, &query))
        .await
        .context("Task join error")??;

    Ok((
        [
            (header::CONTENT_TYPE, CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, CONTENT_DISPOSITION),
        ],
        body,
    )
        .into_response())
}

/// Resolve, compute, normalize and serialize one feed.
fn render_feed(state: &AppState, query: &FeedQuery) -> ZmanimResult<String> {
    let location = state.resolver.resolve(&query.location())?;

    let mut options = state.settings.calendar_options(&location);
    if let Some(mins) = parse_minutes("havdallah", query.havdallah.as_deref())? {
        options.havdalah_mins = Some(mins);
    }
    if let Some(sedrot) = parse_flag("parasha", query.parasha.as_deref())? {
        options.sedrot = sedrot;
    }

    let range = DateRange::feed_window(Utc::now());
    let raw = state.source.compute_events(&location, &range, &options)?;
    let events = normalize(state.source.as_ref(), &raw, &location);

    let name = format!("{} - {}", FEED_NAME_PREFIX, location.display_name);
    let body = build_feed(&events, &name, location.tzid())?;

    info!(
        location = %location.display_name,
        tzid = location.tzid(),
        events = events.len(),
        "Served feed"
    );

    Ok(body)
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_minutes(name: &'static str, value: Option<&str>) -> Result<Option<i64>, ZmanimError> {
    present(value)
        .map(|v| {
            v.parse::<i64>()
                .ok()
                .filter(|m| (0..=180).contains(m))
                .ok_or_else(|| ZmanimError::InvalidParameter {
                    name,
                    value: v.to_string(),
                })
        })
        .transpose()
}

fn parse_flag(name: &'static str, value: Option<&str>) -> Result<Option<bool>, ZmanimError> {
    present(value)
        .map(|v| match v.to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => Ok(true),
            "false" | "0" | "off" | "no" => Ok(false),
            _ => Err(ZmanimError::InvalidParameter {
                name,
                value: v.to_string(),
            }),
        })
        .transpose()
}
