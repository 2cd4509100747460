use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct WeightForm {
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub notes: String,
}
