//! Scheduling Calculator
//!
//! Orders in a project run strictly one after another. A new order starts the
//! day after the project's latest scheduled end date (or the day after the
//! request date when nothing is scheduled) and ends `duration + 1` days later,
//! the extra day being the handover.

use std::sync::Arc;

use bd_core::error::BdError;
use bd_core::result::BdResult;
use bd_core::traits::Id;
use bd_db::OrderRepository;
use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Fixed buffer after every build
pub const HANDOVER_DAYS: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ScheduleWindow {
    /// Window of a build that may begin the day after `anchor`
    pub fn after(anchor: NaiveDate, duration_days: i32) -> BdResult<Self> {
        let duration = u64::try_from(duration_days)
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| {
                BdError::Config(format!(
                    "construction duration must be a positive number of days, got {}",
                    duration_days
                ))
            })?;

        let start = anchor
            .checked_add_days(Days::new(1))
            .ok_or_else(|| BdError::Internal(format!("date overflow after {}", anchor)))?;
        let end = start
            .checked_add_days(Days::new(duration + HANDOVER_DAYS))
            .ok_or_else(|| BdError::Internal(format!("date overflow after {}", start)))?;
        Ok(Self { start, end })
    }
}

pub struct SchedulingCalculator {
    orders: Arc<dyn OrderRepository>,
}

impl SchedulingCalculator {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// Next free window for `project_id`
    ///
    /// Callers must hold the project's lock until the resulting order is
    /// saved, otherwise two callers can be handed the same window.
    pub async fn next_window(
        &self,
        project_id: Id,
        request_date: NaiveDate,
        duration_days: i32,
    ) -> BdResult<ScheduleWindow> {
        let anchor = self
            .orders
            .max_scheduled_end_date(project_id)
            .await?
            .unwrap_or(request_date);
        ScheduleWindow::after(anchor, duration_days)
    }
}
