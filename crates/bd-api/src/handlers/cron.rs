//! Manual trigger surface for the lifecycle sweep
//!
//! Replays any phase for an arbitrary date without waiting for the calendar.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use bd_services::Phase;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, CurrentUser};

const RUN_ALL: &str = "all";

#[derive(Debug, Default, Deserialize)]
pub struct CronQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronResponse {
    pub action: String,
    pub date_used: NaiveDate,
    pub status: &'static str,
    pub affected: usize,
}

/// Blank or absent means the business "today"
fn resolve_date(state: &AppState, raw: Option<&str>) -> ApiResult<NaiveDate> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(state.services.clock.today()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| ApiError::bad_request(format!("Invalid date '{}', expected YYYY-MM-DD", s))),
    }
}

/// POST /api/cron/:action
pub async fn run_phase(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(action): Path<String>,
    Query(query): Query<CronQuery>,
) -> ApiResult<impl IntoResponse> {
    let date = resolve_date(&state, query.date.as_deref())?;
    let lifecycle = &state.services.lifecycle;

    let affected = if action == RUN_ALL {
        lifecycle
            .run_all(date)
            .await?
            .iter()
            .map(|r| r.affected)
            .sum::<usize>()
    } else {
        let phase: Phase = action.parse()?;
        lifecycle.run(phase, date).await?.affected
    };

    tracing::info!(%action, %date, affected, "Manual sweep triggered");
    Ok(Json(CronResponse {
        action,
        date_used: date,
        status: "OK",
        affected,
    }))
}
