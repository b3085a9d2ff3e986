use crate::inventory::{Feature, LotError, LotStatus, LotView};
use serde::{Deserialize, Deserializer, Serialize};

pub(crate) const HEADER: [&str; 7] = [
    "ID",
    "Block",
    "LotNumber",
    "Size",
    "Price",
    "Status",
    "Features",
];

#[derive(Debug, Serialize)]
pub(crate) struct ExportRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Block")]
    block: u32,
    #[serde(rename = "LotNumber")]
    lot_number: u32,
    #[serde(rename = "Size")]
    size: f64,
    #[serde(rename = "Price")]
    price: f64,
    #[serde(rename = "Status")]
    status: &'static str,
    #[serde(rename = "Features")]
    features: String,
}

impl ExportRow {
    pub(crate) fn from_view(view: &LotView) -> Self {
        let record = view.base();
        Self {
            id: record.id().to_string(),
            block: record.block(),
            lot_number: record.lot_number(),
            size: record.size(),
            price: view.price(),
            status: view.status().label(),
            features: view
                .features()
                .iter()
                .map(|feature| feature.name())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImportRow {
    #[serde(rename = "ID", default, deserialize_with = "empty_string_as_none")]
    pub(crate) id: Option<String>,
    #[serde(rename = "Block")]
    pub(crate) block: u32,
    #[serde(rename = "LotNumber")]
    pub(crate) lot_number: u32,
    #[serde(rename = "Size")]
    pub(crate) size: f64,
    #[serde(rename = "Price")]
    pub(crate) price: f64,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(rename = "Features", default, deserialize_with = "empty_string_as_none")]
    features: Option<String>,
}

impl ImportRow {
    /// Missing status means the lot is still on the market.
    pub(crate) fn status(&self) -> Result<LotStatus, LotError> {
        match self.status.as_deref() {
            Some(raw) => raw.parse(),
            None => Ok(LotStatus::Available),
        }
    }

    /// Features in listed order, duplicates dropped. Entries are comma separated; an entry
    /// that is not a single feature is read as space-joined names (`Pool Fencing`).
    pub(crate) fn features(&self) -> Result<Vec<Feature>, LotError> {
        let Some(raw) = self.features.as_deref() else {
            return Ok(Vec::new());
        };

        let mut features = Vec::new();
        for token in raw.split(',').map(str::trim).filter(|token| !token.is_empty()) {
            let listed = match Feature::parse(token) {
                Some(feature) => vec![feature],
                None => split_joined(token)?,
            };
            for feature in listed {
                if !features.contains(&feature) {
                    features.push(feature);
                }
            }
        }
        Ok(features)
    }

    /// Exported prices include feature costs; the stored base price does not.
    pub(crate) fn base_price(&self, features: &[Feature]) -> f64 {
        self.price - features.iter().map(|feature| feature.cost()).sum::<f64>()
    }
}

/// Reads words left to right, preferring two-word display names over single-word keys.
fn split_joined(token: &str) -> Result<Vec<Feature>, LotError> {
    let words: Vec<&str> = token.split_whitespace().collect();
    let mut features = Vec::new();
    let mut index = 0;

    while index < words.len() {
        let pair = words
            .get(index..index + 2)
            .and_then(|pair| Feature::parse(&pair.join(" ")));
        if let Some(feature) = pair {
            features.push(feature);
            index += 2;
            continue;
        }

        let word = words[index];
        features.push(word.parse::<Feature>()?);
        index += 1;
    }

    Ok(features)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
