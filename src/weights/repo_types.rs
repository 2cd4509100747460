use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// One weight measurement. At most one per user per calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct WeightEntry {
    pub id: i64,
    pub user_id: i64,
    pub weight_kg: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
    pub notes: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewWeightEntry {
    pub user_id: i64,
    pub weight_kg: f64,
    pub recorded_at: OffsetDateTime,
    pub notes: String,
}
