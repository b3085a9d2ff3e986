use super::domain::{format_amount, Feature, LotId, LotRecord, LotStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One decoration applied on top of a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Status(LotStatus),
    Feature(Feature),
}

/// Effective view of a lot: a base record wrapped by zero or more decorations.
///
/// Chains are immutable. Decorating produces a new head that shares the wrapped
/// chain, so cloning a view is cheap and old heads stay valid for readers.
#[derive(Debug, Clone, PartialEq)]
pub enum LotView {
    Base(Arc<LotRecord>),
    Status {
        status: LotStatus,
        inner: Arc<LotView>,
    },
    Feature {
        feature: Feature,
        inner: Arc<LotView>,
    },
}

impl LotView {
    pub fn base_lot(record: LotRecord) -> Self {
        Self::Base(Arc::new(record))
    }

    pub(crate) fn with_status(&self, status: LotStatus) -> Self {
        Self::Status {
            status,
            inner: Arc::new(self.clone()),
        }
    }

    pub(crate) fn with_feature(&self, feature: Feature) -> Self {
        Self::Feature {
            feature,
            inner: Arc::new(self.clone()),
        }
    }

    /// The record at the root of the chain.
    pub fn base(&self) -> &LotRecord {
        let mut current = self;
        loop {
            match current {
                Self::Base(record) => return record,
                Self::Status { inner, .. } | Self::Feature { inner, .. } => current = inner,
            }
        }
    }

    pub fn id(&self) -> &LotId {
        self.base().id()
    }

    /// Effective status: the topmost status layer, else the base record's status.
    pub fn status(&self) -> LotStatus {
        self.layers()
            .find_map(|layer| match layer {
                Layer::Status(status) => Some(status),
                Layer::Feature(_) => None,
            })
            .unwrap_or_else(|| self.base().status())
    }

    /// Base price plus the cost of every feature on the chain.
    pub fn price(&self) -> f64 {
        self.base().price() + self.features().iter().map(|feature| feature.cost()).sum::<f64>()
    }

    /// One-line summary. The price shown is the base price; features are listed after it.
    pub fn description(&self) -> String {
        let record = self.base();
        let mut text = format!(
            "Lot {}-{} ({} sqm) - ${} - Status: {}",
            record.block(),
            record.lot_number(),
            format_amount(record.size()),
            format_amount(record.price()),
            self.status().label()
        );
        for feature in self.features() {
            text.push_str(" + ");
            text.push_str(feature.name());
        }
        text
    }

    /// Decorations from the head of the chain down to the base.
    pub fn layers(&self) -> Layers<'_> {
        Layers {
            current: Some(self),
        }
    }

    /// Decorations in the order they were applied.
    pub fn layer_stack(&self) -> Vec<Layer> {
        let mut stack: Vec<Layer> = self.layers().collect();
        stack.reverse();
        stack
    }

    /// Features in the order they were applied.
    pub fn features(&self) -> Vec<Feature> {
        self.layer_stack()
            .into_iter()
            .filter_map(|layer| match layer {
                Layer::Feature(feature) => Some(feature),
                Layer::Status(_) => None,
            })
            .collect()
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.layers().any(|layer| layer == Layer::Feature(feature))
    }

    pub fn depth(&self) -> usize {
        self.layers().count()
    }

    /// Whether both views are the same chain head rather than merely equal chains.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Base(left), Self::Base(right)) => Arc::ptr_eq(left, right),
            (
                Self::Status { status, inner },
                Self::Status {
                    status: other_status,
                    inner: other_inner,
                },
            ) => status == other_status && Arc::ptr_eq(inner, other_inner),
            (
                Self::Feature { feature, inner },
                Self::Feature {
                    feature: other_feature,
                    inner: other_inner,
                },
            ) => feature == other_feature && Arc::ptr_eq(inner, other_inner),
            _ => false,
        }
    }
}

impl fmt::Display for LotView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

pub struct Layers<'a> {
    current: Option<&'a LotView>,
}

impl Iterator for Layers<'_> {
    type Item = Layer;

    fn next(&mut self) -> Option<Self::Item> {
        match self.current? {
            LotView::Base(_) => {
                self.current = None;
                None
            }
            LotView::Status { status, inner } => {
                self.current = Some(inner);
                Some(Layer::Status(*status))
            }
            LotView::Feature { feature, inner } => {
                self.current = Some(inner);
                Some(Layer::Feature(*feature))
            }
        }
    }
}
