use time::OffsetDateTime;
use tracing::info;

use super::{
    repo::WeightStore,
    repo_types::{NewWeightEntry, WeightEntry},
};
use crate::error::StoreError;

pub const MIN_WEIGHT_KG: f64 = 20.0;
pub const MAX_WEIGHT_KG: f64 = 500.0;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum WeightInputError {
    #[error("Invalid weight value")]
    NotANumber,
    #[error("Weight must be between 20 and 500 kg")]
    OutOfRange,
}

/// Parses the submitted form value; NaN and infinities fail the range check.
pub fn parse_weight(raw: &str) -> Result<f64, WeightInputError> {
    let kg: f64 = raw.trim().parse().map_err(|_| WeightInputError::NotANumber)?;
    if kg <= 0.0 {
        return Err(WeightInputError::NotANumber);
    }
    if !(MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&kg) {
        return Err(WeightInputError::OutOfRange);
    }
    Ok(kg)
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogOutcome {
    Created(WeightEntry),
    Updated(WeightEntry),
}

/// Records `weight_kg` for the calendar day of `now`: overwrites the day's
/// entry if there is one, inserts otherwise.
pub async fn log_weight(
    store: &WeightStore,
    user_id: i64,
    weight_kg: f64,
    notes: String,
    now: OffsetDateTime,
) -> Result<LogOutcome, StoreError> {
    match store.get_by_date(user_id, now.date()).await {
        Ok(mut existing) => {
            existing.weight_kg = weight_kg;
            existing.notes = notes;
            store.update(&existing).await?;
            info!(user_id, entry_id = existing.id, weight_kg, "weight entry updated");
            Ok(LogOutcome::Updated(existing))
        }
        Err(StoreError::NotFound) => {
            let created = store
                .create(&NewWeightEntry {
                    user_id,
                    weight_kg,
                    recorded_at: now,
                    notes,
                })
                .await?;
            info!(user_id, entry_id = created.id, weight_kg, "weight entry created");
            Ok(LogOutcome::Created(created))
        }
        Err(e) => Err(e),
    }
}
