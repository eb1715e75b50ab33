//! One full pass from loaded tables to chart parameters.
//!
//! `recompute` is pure: the UI shell calls it after every control change with
//! the current control values and the two loaded tables, then draws whatever
//! it returns. Nothing here touches egui.

use crate::data::filter::{filter_by_days, narrow_by_category};
use crate::data::model::{CellValue, DatasetKind, Table, TIMEPOINT};
use crate::error::DashboardError;

/// Control values for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Inputs {
    /// Inclusive upper bound on `Timepoint`.
    pub days_in_space: u32,
    pub selected_gene: Option<CellValue>,
    pub selected_marker: Option<CellValue>,
    /// Source file names, used in MissingColumn messages.
    pub gene_file: String,
    pub stress_file: String,
}

/// One line on a chart, points in source row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend entry; `None` for a single unnamed series.
    pub name: Option<String>,
    pub points: Vec<[f64; 2]>,
}

/// Everything the renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl ChartSpec {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

/// Output for one side of the dashboard.
#[derive(Debug)]
pub struct Panel {
    pub kind: DatasetKind,
    /// Selector choices, from the unfiltered table.
    pub options: Vec<CellValue>,
    pub selected: Option<CellValue>,
    pub subheader: String,
    /// Rows left after filtering and narrowing.
    pub rows: Table,
    pub chart: Result<ChartSpec, DashboardError>,
}

#[derive(Debug)]
pub struct Dashboard {
    pub days_in_space: u32,
    pub gene: Panel,
    pub stress: Panel,
}

/// Run the filter, select and chart steps for both panels.
pub fn recompute(inputs: &Inputs, gene: &Table, stress: &Table) -> Dashboard {
    Dashboard {
        days_in_space: inputs.days_in_space,
        gene: build_panel(
            DatasetKind::GeneExpression,
            gene,
            &inputs.gene_file,
            inputs.days_in_space,
            inputs.selected_gene.as_ref(),
        ),
        stress: build_panel(
            DatasetKind::OxidativeStress,
            stress,
            &inputs.stress_file,
            inputs.days_in_space,
            inputs.selected_marker.as_ref(),
        ),
    }
}

/// Keep `wanted` if it is still offered, otherwise fall back to the first option.
pub fn resolve_selection(options: &[CellValue], wanted: Option<&CellValue>) -> Option<CellValue> {
    match wanted {
        Some(w) if options.contains(w) => Some(w.clone()),
        _ => options.first().cloned(),
    }
}

pub fn build_panel(
    kind: DatasetKind,
    table: &Table,
    file: &str,
    days: u32,
    wanted: Option<&CellValue>,
) -> Panel {
    let category = kind.category_column();
    let options = table.distinct_values(category);
    let selected = resolve_selection(&options, wanted);
    let label = selected
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "(none)".to_string());
    let subheader = kind.subheader(&label);

    let filtered = filter_by_days(table, days);
    let narrowed = match &selected {
        Some(value) => narrow_by_category(&filtered, category, value),
        None if filtered.has_column(category) => Some(filtered.retain_rows(|_| false)),
        None => None,
    };

    let Some(rows) = narrowed else {
        let err = DashboardError::MissingColumn {
            columns: vec![category.to_string()],
            file: file.to_string(),
        };
        log::error!("{}: {err}", kind.label());
        return Panel {
            kind,
            options,
            selected,
            subheader,
            rows: Table::default(),
            chart: Err(err),
        };
    };

    let missing = rows.missing_columns(kind.chart_columns());
    let chart = if missing.is_empty() {
        Ok(chart_spec(kind, &rows, &label, days))
    } else {
        log::error!("{}: missing chart columns {missing:?}", kind.label());
        Err(DashboardError::MissingColumn {
            columns: kind.chart_columns().iter().map(|c| c.to_string()).collect(),
            file: file.to_string(),
        })
    };

    Panel {
        kind,
        options,
        selected,
        subheader,
        rows,
        chart,
    }
}

/// Assemble chart parameters from narrowed rows that carry every chart column.
/// Rows without a numeric x or y are left out.
pub fn chart_spec(kind: DatasetKind, rows: &Table, selected: &str, days: u32) -> ChartSpec {
    let x_idx = rows.column_index(TIMEPOINT);
    let y_idx = rows.column_index(kind.value_column());
    let group_idx = kind.group_column().and_then(|g| rows.column_index(g));

    let mut series: Vec<Series> = Vec::new();
    let mut skipped = 0usize;

    if let (Some(x_idx), Some(y_idx)) = (x_idx, y_idx) {
        for row in 0..rows.len() {
            let (Some(x), Some(y)) = (rows.cell(row, x_idx).as_f64(), rows.cell(row, y_idx).as_f64())
            else {
                skipped += 1;
                continue;
            };
            let name = group_idx.map(|g| rows.cell(row, g).to_string());
            match series.iter_mut().find(|s| s.name == name) {
                Some(s) => s.points.push([x, y]),
                None => series.push(Series {
                    name,
                    points: vec![[x, y]],
                }),
            }
        }
    }

    if skipped > 0 {
        log::debug!("{}: skipped {skipped} non-numeric rows", kind.label());
    }

    ChartSpec {
        title: kind.chart_title(selected, days),
        x_label: "Days in Space".to_string(),
        y_label: kind.y_axis_label().to_string(),
        series,
    }
}
