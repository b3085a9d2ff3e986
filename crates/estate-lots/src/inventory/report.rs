use super::domain::{Feature, LotStatus};
use super::view::LotView;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub id: String,
    pub block: u32,
    pub lot_number: u32,
    pub size: f64,
    pub price: f64,
    pub status: LotStatus,
    pub features: Vec<&'static str>,
}

/// Inventory summary with one row per lot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InventoryReport {
    pub total_lots: usize,
    pub status_counts: BTreeMap<&'static str, usize>,
    pub feature_counts: BTreeMap<&'static str, usize>,
    pub inventory_value: f64,
    pub available_value: f64,
    pub rows: Vec<ReportRow>,
}

impl InventoryReport {
    pub fn from_views(views: &[LotView]) -> Self {
        let mut report = Self {
            status_counts: LotStatus::ordered()
                .into_iter()
                .map(|status| (status.label(), 0))
                .collect(),
            feature_counts: Feature::all()
                .into_iter()
                .map(|feature| (feature.name(), 0))
                .collect(),
            ..Self::default()
        };

        for view in views {
            let record = view.base();
            let status = view.status();
            let price = view.price();
            let features = view.features();

            *report.status_counts.entry(status.label()).or_default() += 1;
            for feature in &features {
                *report.feature_counts.entry(feature.name()).or_default() += 1;
            }
            report.inventory_value += price;
            if status == LotStatus::Available {
                report.available_value += price;
            }

            report.rows.push(ReportRow {
                id: record.id().to_string(),
                block: record.block(),
                lot_number: record.lot_number(),
                size: record.size(),
                price,
                status,
                features: features.iter().map(|feature| feature.name()).collect(),
            });
        }

        report.total_lots = report.rows.len();
        report
    }

    pub fn count(&self, status: LotStatus) -> usize {
        self.status_counts.get(status.label()).copied().unwrap_or(0)
    }

    /// Fixed-width text table used by the command line and printable reports.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return "No lots available in the system.".to_string();
        }

        let mut out = String::from("REAL ESTATE PROPERTY REPORT\n");
        out.push_str("==============================\n");
        let _ = writeln!(
            out,
            "{:<10} {:<8} {:<8} {:<10} {:<15} {:<10}",
            "ID", "Block", "Lot#", "Size(sqm)", "Price($)", "Status"
        );
        out.push_str("------------------------------------------------------\n");

        for row in &self.rows {
            let _ = write!(
                out,
                "{:<10} {:<8} {:<8} {:<10.2} {:<15.2} {:<10}",
                row.id, row.block, row.lot_number, row.size, row.price, row.status
            );
            if !row.features.is_empty() {
                let _ = write!(out, " {}", row.features.join(", "));
            }
            out.push('\n');
        }

        let _ = write!(
            out,
            "\nTotal Properties: {}\nAvailable: {} | Reserved: {} | Sold: {}\nInventory value: ${:.2} (available ${:.2})",
            self.total_lots,
            self.count(LotStatus::Available),
            self.count(LotStatus::Reserved),
            self.count(LotStatus::Sold),
            self.inventory_value,
            self.available_value
        );
        out
    }
}
