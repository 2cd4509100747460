use serde::Serialize;
use time::{format_description::FormatItem, macros::format_description};

use crate::weights::WeightEntry;

/// `Jan 02`
const LABEL_FORMAT: &[FormatItem<'static>] = format_description!("[month repr:short] [day]");

/// Chart.js line-chart payload.
#[derive(Debug, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: &'static str,
    pub data: Vec<f64>,
    pub border_color: &'static str,
    pub background_color: &'static str,
    pub fill: bool,
    pub tension: f64,
}

impl ChartData {
    /// `entries` in plotting order (oldest first).
    pub fn from_entries(entries: &[WeightEntry]) -> Result<Self, time::error::Format> {
        let labels = entries
            .iter()
            .map(|e| e.recorded_at.format(LABEL_FORMAT))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            labels,
            datasets: vec![Dataset {
                label: "Weight (kg)",
                data: entries.iter().map(|e| e.weight_kg).collect(),
                border_color: "#3b82f6",
                background_color: "rgba(59, 130, 246, 0.1)",
                fill: true,
                tension: 0.4,
            }],
        })
    }
}
