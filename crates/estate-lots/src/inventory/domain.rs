use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Number of blocks in the subdivision.
pub const BLOCK_COUNT: u32 = 5;
/// Number of lots laid out in each block.
pub const LOTS_PER_BLOCK: u32 = 20;

/// Canonical lot identifier, rendered as `Lot{block} {lot_number}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotId(String);

impl LotId {
    pub fn new(block: u32, lot_number: u32) -> Self {
        Self(format!("Lot{block} {lot_number}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LotId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for LotId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
    Available,
    Reserved,
    Sold,
}

impl LotStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Available, Self::Reserved, Self::Sold]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Reserved => "RESERVED",
            Self::Sold => "SOLD",
        }
    }

    /// Parses a status or the verb that leads to it (`sell`, `reserve`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "available" => Some(Self::Available),
            "reserve" | "reserved" => Some(Self::Reserved),
            "sell" | "sold" => Some(Self::Sold),
            _ => None,
        }
    }

    /// Whether a lot currently in `self` may move to `target`.
    ///
    /// SOLD is terminal and a reservation can only be promoted to a sale, so the lot
    /// lifecycle only ever moves forward: AVAILABLE -> RESERVED -> SOLD, or straight
    /// from AVAILABLE to SOLD.
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Available, Self::Reserved)
                | (Self::Available, Self::Sold)
                | (Self::Reserved, Self::Sold)
        )
    }
}

impl fmt::Display for LotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for LotStatus {
    type Err = LotError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| LotError::UnknownStatus(value.trim().to_string()))
    }
}

/// Add-on that can be attached to a lot once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    #[serde(rename = "pool")]
    SwimmingPool,
    #[serde(rename = "landscaping")]
    PremiumLandscaping,
    #[serde(rename = "fencing")]
    PerimeterFencing,
}

impl Feature {
    pub const fn all() -> [Self; 3] {
        [
            Self::SwimmingPool,
            Self::PremiumLandscaping,
            Self::PerimeterFencing,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::SwimmingPool => "pool",
            Self::PremiumLandscaping => "landscaping",
            Self::PerimeterFencing => "fencing",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::SwimmingPool => "Swimming Pool",
            Self::PremiumLandscaping => "Premium Landscaping",
            Self::PerimeterFencing => "Perimeter Fencing",
        }
    }

    pub const fn cost(self) -> f64 {
        match self {
            Self::SwimmingPool => 25_000.0,
            Self::PremiumLandscaping => 12_000.0,
            Self::PerimeterFencing => 8_000.0,
        }
    }

    /// Accepts the short key (`pool`) or the display name (`Swimming Pool`), ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::all().into_iter().find(|feature| {
            normalized.eq_ignore_ascii_case(feature.key())
                || normalized.eq_ignore_ascii_case(feature.name())
        })
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Feature {
    type Err = LotError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| LotError::UnknownFeature(value.trim().to_string()))
    }
}

/// Undecorated lot data. Identity and size never change once created.
#[derive(Debug, Clone, PartialEq)]
pub struct LotRecord {
    id: LotId,
    block: u32,
    lot_number: u32,
    size: f64,
    price: f64,
    status: LotStatus,
}

impl LotRecord {
    pub fn new(block: u32, lot_number: u32, size: f64, price: f64) -> Result<Self, LotError> {
        validate(block, lot_number, size, price)?;
        Ok(Self::unchecked(block, lot_number, size, price))
    }

    /// Default inventory entry for a grid position.
    pub fn seeded(block: u32, lot_number: u32) -> Self {
        let size = 200.0 + 20.0 * f64::from(block) + 5.0 * f64::from(lot_number);
        let price = 100_000.0 + 15_000.0 * f64::from(block) + 2_500.0 * f64::from(lot_number);
        Self::unchecked(block, lot_number, size, price)
    }

    fn unchecked(block: u32, lot_number: u32, size: f64, price: f64) -> Self {
        Self {
            id: LotId::new(block, lot_number),
            block,
            lot_number,
            size,
            price,
            status: LotStatus::Available,
        }
    }

    pub fn id(&self) -> &LotId {
        &self.id
    }

    pub fn block(&self) -> u32 {
        self.block
    }

    pub fn lot_number(&self) -> u32 {
        self.lot_number
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn status(&self) -> LotStatus {
        self.status
    }
}

fn validate(block: u32, lot_number: u32, size: f64, price: f64) -> Result<(), LotError> {
    let mut violations = Vec::new();

    if !(1..=BLOCK_COUNT).contains(&block) {
        violations.push(format!("block must be between 1 and {BLOCK_COUNT}"));
    }
    if !(1..=LOTS_PER_BLOCK).contains(&lot_number) {
        violations.push(format!("lot number must be between 1 and {LOTS_PER_BLOCK}"));
    }
    if !(size.is_finite() && size > 0.0) {
        violations.push("size must be positive".to_string());
    }
    if !(price.is_finite() && price > 0.0) {
        violations.push("price must be positive".to_string());
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(LotError::Validation(violations))
    }
}

/// Renders an amount with at least one fractional digit (`245.0`, `212.5`).
pub(crate) fn format_amount(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LotError {
    #[error("invalid lot: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("lot {0} already exists")]
    Duplicate(LotId),
    #[error("lot {0} not found")]
    NotFound(String),
    #[error("cannot change lot {id} from {from} to {to}")]
    IllegalTransition {
        id: LotId,
        from: LotStatus,
        to: LotStatus,
    },
    #[error("unknown feature '{0}' (expected pool, fencing, or landscaping)")]
    UnknownFeature(String),
    #[error("unknown status '{0}' (expected reserve or sell)")]
    UnknownStatus(String),
    #[error("unknown lot template '{0}'")]
    UnknownTemplate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lot_id_uses_block_space_lot_format() {
        assert_eq!(LotId::new(3, 7).as_str(), "Lot3 7");
        assert_eq!(LotId::new(5, 20).to_string(), "Lot5 20");
    }

    #[test]
    fn status_aliases_normalize() {
        assert_eq!(LotStatus::parse("sell"), Some(LotStatus::Sold));
        assert_eq!(LotStatus::parse(" SOLD "), Some(LotStatus::Sold));
        assert_eq!(LotStatus::parse("Reserve"), Some(LotStatus::Reserved));
        assert_eq!(LotStatus::parse("reserved"), Some(LotStatus::Reserved));
        assert_eq!(LotStatus::parse("available"), Some(LotStatus::Available));
        assert!(matches!(
            "lease".parse::<LotStatus>(),
            Err(LotError::UnknownStatus(value)) if value == "lease"
        ));
    }

    #[test]
    fn sold_is_terminal() {
        for target in LotStatus::ordered() {
            assert!(!LotStatus::Sold.can_transition_to(target));
        }
        assert!(!LotStatus::Reserved.can_transition_to(LotStatus::Available));
        assert!(LotStatus::Reserved.can_transition_to(LotStatus::Sold));
        assert!(LotStatus::Available.can_transition_to(LotStatus::Reserved));
    }

    #[test]
    fn feature_parse_accepts_keys_and_names() {
        assert_eq!(Feature::parse("POOL"), Some(Feature::SwimmingPool));
        assert_eq!(Feature::parse("swimming  pool"), Some(Feature::SwimmingPool));
        assert_eq!(Feature::parse("Fencing"), Some(Feature::PerimeterFencing));
        assert_eq!(
            Feature::parse("Premium Landscaping"),
            Some(Feature::PremiumLandscaping)
        );
        assert_eq!(Feature::parse("sauna"), None);
    }

    #[test]
    fn validation_lists_every_violation() {
        let error = LotRecord::new(0, 21, -1.0, 0.0).expect_err("all fields invalid");
        match error {
            LotError::Validation(violations) => {
                assert_eq!(violations.len(), 4);
                assert!(violations[0].contains("block"));
                assert!(violations[1].contains("lot number"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn seeded_record_follows_grid_formula() {
        let record = LotRecord::seeded(2, 5);
        assert_eq!(record.size(), 265.0);
        assert_eq!(record.price(), 142_500.0);
        assert_eq!(record.status(), LotStatus::Available);
    }

    #[test]
    fn amounts_render_with_fraction() {
        assert_eq!(format_amount(245.0), "245.0");
        assert_eq!(format_amount(212.5), "212.5");
        assert_eq!(format_amount(127_500.0), "127500.0");
        assert_eq!(format_amount(10_000_000.0), "10000000.0");
    }
}
