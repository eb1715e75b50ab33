use super::model::{CellValue, Table, TIMEPOINT};

// ---------------------------------------------------------------------------
// Row predicates: duration bound and category selection
// ---------------------------------------------------------------------------

/// Keep rows whose `Timepoint` is at most `bound` days, in source order.
///
/// * Rows with a non-numeric or empty `Timepoint` never pass.
/// * A table without a `Timepoint` column is returned unchanged; the chart
///   step rejects it for the missing column.
pub fn filter_by_days(table: &Table, bound: u32) -> Table {
    let Some(idx) = table.column_index(TIMEPOINT) else {
        log::debug!("no {TIMEPOINT} column, duration filter skipped");
        return table.clone();
    };
    let bound = f64::from(bound);
    let filtered = table.retain_rows(|row| {
        row.get(idx)
            .and_then(CellValue::as_f64)
            .is_some_and(|t| t <= bound)
    });
    log::debug!(
        "duration filter <= {bound}: {} of {} rows",
        filtered.len(),
        table.len()
    );
    filtered
}

/// Keep rows whose `column` equals `value`. `None` if the column is absent;
/// an unknown value gives an empty table.
pub fn narrow_by_category(table: &Table, column: &str, value: &CellValue) -> Option<Table> {
    let idx = table.column_index(column)?;
    Some(table.retain_rows(|row| row.get(idx).is_some_and(|cell| cell == value)))
}
