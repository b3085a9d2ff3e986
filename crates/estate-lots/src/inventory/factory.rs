//! Chain builders for lot views.
//!
//! Every function here is pure: it takes a chain head and returns either the same head
//! (nothing to do) or a new head with one more layer. Duplicate features and backwards
//! status moves are detected by walking the chain, never by inspecting description text.

use super::domain::{Feature, LotError, LotRecord, LotStatus};
use super::view::{Layer, LotView};

/// Result of a chain operation: the resulting head and whether it differs from the input.
#[derive(Debug, Clone)]
pub struct LotChange {
    view: LotView,
    changed: bool,
}

impl LotChange {
    pub(crate) fn applied(view: LotView) -> Self {
        Self {
            view,
            changed: true,
        }
    }

    pub(crate) fn unchanged(view: LotView) -> Self {
        Self {
            view,
            changed: false,
        }
    }

    pub fn view(&self) -> &LotView {
        &self.view
    }

    pub fn into_view(self) -> LotView {
        self.view
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }
}

/// Attaches the feature named by `key` (`pool`, `fencing`, `landscaping`, or a display name).
pub fn add_feature(view: &LotView, key: &str) -> Result<LotChange, LotError> {
    let feature = key.parse::<Feature>()?;
    Ok(attach_feature(view, feature))
}

pub fn attach_feature(view: &LotView, feature: Feature) -> LotChange {
    if has_feature(view, feature) {
        LotChange::unchanged(view.clone())
    } else {
        LotChange::applied(view.with_feature(feature))
    }
}

/// Moves the lot to the status named by `key` (`reserve`, `reserved`, `sell`, `sold`).
pub fn change_status(view: &LotView, key: &str) -> Result<LotChange, LotError> {
    let target = key.parse::<LotStatus>()?;
    transition(view, target)
}

pub fn transition(view: &LotView, target: LotStatus) -> Result<LotChange, LotError> {
    let current = view.status();
    if current == target {
        return Ok(LotChange::unchanged(view.clone()));
    }
    if !current.can_transition_to(target) {
        return Err(LotError::IllegalTransition {
            id: view.id().clone(),
            from: current,
            to: target,
        });
    }

    Ok(LotChange::applied(view.with_status(target)))
}

pub fn unwrap_base(view: &LotView) -> &LotRecord {
    view.base()
}

pub fn has_feature(view: &LotView, feature: Feature) -> bool {
    view.has_feature(feature)
}

/// Rebuilds a chain from layers listed in application order.
pub fn apply_layers(record: LotRecord, layers: &[Layer]) -> Result<LotView, LotError> {
    layers
        .iter()
        .try_fold(LotView::base_lot(record), |view, layer| match layer {
            Layer::Status(status) => transition(&view, *status).map(LotChange::into_view),
            Layer::Feature(feature) => Ok(attach_feature(&view, *feature).into_view()),
        })
}

struct LotTemplate {
    name: &'static str,
    size: (f64, f64),
    price: (f64, f64),
    features: &'static [Feature],
}

const TEMPLATES: [LotTemplate; 7] = [
    LotTemplate {
        name: "small",
        size: (200.0, 250.0),
        price: (100_000.0, 150_000.0),
        features: &[],
    },
    LotTemplate {
        name: "medium",
        size: (250.0, 350.0),
        price: (150_000.0, 225_000.0),
        features: &[],
    },
    LotTemplate {
        name: "large",
        size: (350.0, 500.0),
        price: (225_000.0, 300_000.0),
        features: &[],
    },
    LotTemplate {
        name: "premium",
        size: (500.0, 750.0),
        price: (300_000.0, 500_000.0),
        features: &[],
    },
    LotTemplate {
        name: "starter",
        size: (200.0, 250.0),
        price: (100_000.0, 150_000.0),
        features: &[Feature::PerimeterFencing],
    },
    LotTemplate {
        name: "family",
        size: (300.0, 400.0),
        price: (200_000.0, 275_000.0),
        features: &[Feature::PerimeterFencing, Feature::PremiumLandscaping],
    },
    LotTemplate {
        name: "luxury",
        size: (400.0, 600.0),
        price: (275_000.0, 450_000.0),
        features: &[
            Feature::PerimeterFencing,
            Feature::PremiumLandscaping,
            Feature::SwimmingPool,
        ],
    },
];

pub fn template_names() -> impl Iterator<Item = &'static str> {
    TEMPLATES.iter().map(|template| template.name)
}

/// Builds a lot from a named package. Size and price take the midpoint of the template
/// range, rounded to 0.1 sqm and to the nearest thousand.
pub fn from_template(name: &str, block: u32, lot_number: u32) -> Result<LotView, LotError> {
    let template = TEMPLATES
        .iter()
        .find(|template| template.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| LotError::UnknownTemplate(name.trim().to_string()))?;

    let size = ((template.size.0 + template.size.1) / 2.0 * 10.0).round() / 10.0;
    let price = ((template.price.0 + template.price.1) / 2.0 / 1_000.0).round() * 1_000.0;
    let record = LotRecord::new(block, lot_number, size, price)?;

    Ok(template
        .features
        .iter()
        .fold(LotView::base_lot(record), |view, feature| {
            attach_feature(&view, *feature).into_view()
        }))
}
