use serde::Serialize;
use time::{format_description::FormatItem, macros::format_description, PrimitiveDateTime};

use crate::error::ApiError;

/// Client-facing timestamp pattern: yyyy-MM-dd-HH-mm-ss-SSS.
const SAMPLE_DATE_FORMAT: &[FormatItem<'static>] = format_description!(
    "[year]-[month]-[day]-[hour]-[minute]-[second]-[subsecond digits:3]"
);

pub fn parse_sample_date(value: &str) -> Result<PrimitiveDateTime, ApiError> {
    PrimitiveDateTime::parse(value, SAMPLE_DATE_FORMAT).map_err(|_| ApiError::InvalidDate)
}

pub fn format_sample_date(value: PrimitiveDateTime) -> anyhow::Result<String> {
    Ok(value.format(SAMPLE_DATE_FORMAT)?)
}

/// External representation of a classification job.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MushroomClassificationDto {
    pub mushroom_instance_id: i64,
    pub classification_result: Option<String>,
    pub sample_taken_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_date_roundtrip() {
        let parsed = parse_sample_date("2024-01-01-00-00-00-000").expect("parse");
        assert_eq!(
            format_sample_date(parsed).expect("format"),
            "2024-01-01-00-00-00-000"
        );
    }

    #[test]
    fn sample_date_keeps_milliseconds() {
        let parsed = parse_sample_date("2023-11-05-13-45-30-123").expect("parse");
        assert_eq!(
            format_sample_date(parsed).expect("format"),
            "2023-11-05-13-45-30-123"
        );
    }

    #[test]
    fn malformed_dates_are_rejected() {
        for bad in [
            "2024-01-01 00:00:00",
            "2024-01-01-00-00-00",
            "01-01-2024-00-00-00-000",
            "not-a-date",
            "",
        ] {
            assert!(matches!(
                parse_sample_date(bad),
                Err(ApiError::InvalidDate)
            ));
        }
    }

    #[test]
    fn dto_serializes_camel_case() {
        let dto = MushroomClassificationDto {
            mushroom_instance_id: 3,
            classification_result: Some("Boletus edulis".into()),
            sample_taken_at: "2024-01-01-00-00-00-000".into(),
        };
        let json = serde_json::to_string(&dto).unwrap();
        assert!(json.contains("mushroomInstanceId"));
        assert!(json.contains("classificationResult"));
        assert!(json.contains("sampleTakenAt"));
    }
}
