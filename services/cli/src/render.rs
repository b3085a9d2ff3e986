use estate_lots::error::AppError;
use estate_lots::exchange::ImportSummary;
use estate_lots::inventory::{InventoryReport, LotChange, LotView};

pub(crate) fn lots(views: &[LotView], json: bool) -> Result<String, AppError> {
    if json {
        let report = InventoryReport::from_views(views);
        return Ok(serde_json::to_string_pretty(&report.rows)?);
    }
    if views.is_empty() {
        return Ok("No lots matched.".to_string());
    }

    let mut lines: Vec<String> = views.iter().map(LotView::description).collect();
    lines.push(format!("{} lot(s)", views.len()));
    Ok(lines.join("\n"))
}

pub(crate) fn report(report: &InventoryReport, json: bool) -> Result<String, AppError> {
    if json {
        Ok(serde_json::to_string_pretty(report)?)
    } else {
        Ok(report.render())
    }
}

pub(crate) fn change(change: &LotChange) -> String {
    if change.is_changed() {
        format!("Updated: {}", change.view())
    } else {
        format!("Unchanged: {}", change.view())
    }
}

pub(crate) fn import(summary: &ImportSummary, json: bool) -> Result<String, AppError> {
    if json {
        return Ok(serde_json::to_string_pretty(summary)?);
    }

    let mut text = format!("Imported {} lot(s)", summary.imported);
    if !summary.errors.is_empty() {
        text.push_str(&format!(", {} row(s) rejected:", summary.errors.len()));
        for error in &summary.errors {
            text.push_str("\n  ");
            text.push_str(error);
        }
    }
    Ok(text)
}
