//! Shared query parameter types for API handlers.
//!
//! Dates arrive as `YYYY-MM-DD` (or RFC 3339) strings; empty values are
//! treated as absent.

use chrono::NaiveDate;
use lodge_core::booking::{parse_stay_date, ReservationStatus};
use lodge_core::error::CoreError;
use lodge_core::room::RoomCategory;
use lodge_core::types::DbId;
use lodge_db::models::reservation::ReservationFilter;
use serde::Deserialize;

/// `?status=&startDate=&endDate=&roomId=` on the staff reservation list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationListParams {
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub room_id: Option<DbId>,
}

impl ReservationListParams {
    pub fn to_filter(&self) -> Result<ReservationFilter, CoreError> {
        Ok(ReservationFilter {
            status: parse_status(self.status.as_deref())?,
            start_date: parse_date("startDate", self.start_date.as_deref())?,
            end_date: parse_date("endDate", self.end_date.as_deref())?,
            room_id: self.room_id,
            room_type: None,
        })
    }
}

/// `?startDate=&endDate=&status=&roomType=` on the reservation report.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationReportParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub room_type: Option<String>,
}

impl ReservationReportParams {
    pub fn to_filter(&self) -> Result<ReservationFilter, CoreError> {
        let room_type = match non_empty(self.room_type.as_deref()) {
            Some(raw) => Some(RoomCategory::parse(raw)?.as_str().to_string()),
            None => None,
        };
        Ok(ReservationFilter {
            status: parse_status(self.status.as_deref())?,
            start_date: parse_date("startDate", self.start_date.as_deref())?,
            end_date: parse_date("endDate", self.end_date.as_deref())?,
            room_id: None,
            room_type,
        })
    }
}

/// `?startDate=&endDate=` on the financial report.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRangeParams {
    pub fn bounds(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>), CoreError> {
        Ok((
            parse_date("startDate", self.start_date.as_deref())?,
            parse_date("endDate", self.end_date.as_deref())?,
        ))
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn parse_date(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, CoreError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(value) => parse_stay_date(value)
            .map(Some)
            .ok_or_else(|| CoreError::Validation(format!("Invalid {name} '{value}'"))),
    }
}

fn parse_status(raw: Option<&str>) -> Result<Option<String>, CoreError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(value) => Ok(Some(ReservationStatus::parse(value)?.as_str().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn list_params_normalize_status_and_dates() {
        let params = ReservationListParams {
            status: Some("confirmed".into()),
            start_date: Some("2027-01-01".into()),
            end_date: Some(String::new()),
            room_id: Some(3),
        };
        let filter = params.to_filter().unwrap();
        assert_eq!(filter.status.as_deref(), Some("CONFIRMED"));
        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2027, 1, 1));
        assert_eq!(filter.end_date, None);
        assert_eq!(filter.room_id, Some(3));
    }

    #[test]
    fn bad_values_are_validation_errors() {
        let params = ReservationListParams {
            start_date: Some("next tuesday".into()),
            ..Default::default()
        };
        assert_matches!(params.to_filter(), Err(CoreError::Validation(msg)) => {
            assert!(msg.contains("startDate"));
        });

        let report = ReservationReportParams {
            room_type: Some("penthouse".into()),
            ..Default::default()
        };
        assert_matches!(report.to_filter(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn report_room_type_is_uppercased() {
        let report = ReservationReportParams {
            room_type: Some("family_cabin".into()),
            ..Default::default()
        };
        assert_eq!(report.to_filter().unwrap().room_type.as_deref(), Some("FAMILY_CABIN"));
    }
}
