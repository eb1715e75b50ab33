use std::collections::HashSet;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a study table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value, guessed per cell at load time.
/// Used as a map/set key downstream so `CellValue` must be `Ord` and `Hash`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can key maps by CellValue --
// Equality follows `Ord` (floats by `total_cmp`), so it agrees with `Hash`.

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Guess the type of a raw text cell.
    pub fn guess(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }

    /// Numeric view of the cell, used for the time axis and measured values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

static NULL: CellValue = CellValue::Null;

// ---------------------------------------------------------------------------
// Table – an ordered, column-named record set
// ---------------------------------------------------------------------------

/// A loaded tabular record set. Rows keep their source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Table { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Columns out of `required` that this table lacks, in the given order.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect()
    }

    /// Cell at (`row`, `column`). Short rows read as `Null`.
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL)
    }

    /// Distinct values of a column in first-seen order. Empty if the column is absent.
    pub fn distinct_values(&self, column: &str) -> Vec<CellValue> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for row in 0..self.rows.len() {
            let val = self.cell(row, idx);
            if seen.insert(val.clone()) {
                out.push(val.clone());
            }
        }
        out
    }

    /// New table holding only the rows accepted by `keep`, in the original order.
    pub fn retain_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r.as_slice())).cloned().collect(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DatasetKind – the two study tables
// ---------------------------------------------------------------------------

pub const TIMEPOINT: &str = "Timepoint";

/// Which of the two study tables a record set holds, with its column roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    GeneExpression,
    OxidativeStress,
}

impl DatasetKind {
    pub fn label(self) -> &'static str {
        match self {
            DatasetKind::GeneExpression => "Gene Expression",
            DatasetKind::OxidativeStress => "Oxidative Stress",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            DatasetKind::GeneExpression => "gene_expression.csv",
            DatasetKind::OxidativeStress => "oxidative_stress.csv",
        }
    }

    /// Column holding the user-selected category.
    pub fn category_column(self) -> &'static str {
        match self {
            DatasetKind::GeneExpression => "Gene",
            DatasetKind::OxidativeStress => "Marker",
        }
    }

    /// Column holding the measured quantity.
    pub fn value_column(self) -> &'static str {
        match self {
            DatasetKind::GeneExpression => "Expression",
            DatasetKind::OxidativeStress => "Value",
        }
    }

    /// Secondary column splitting the chart into one series per value.
    pub fn group_column(self) -> Option<&'static str> {
        match self {
            DatasetKind::GeneExpression => Some("Twin"),
            DatasetKind::OxidativeStress => None,
        }
    }

    /// Columns the chart needs after narrowing by category.
    pub fn chart_columns(self) -> &'static [&'static str] {
        match self {
            DatasetKind::GeneExpression => &[TIMEPOINT, "Twin", "Expression"],
            DatasetKind::OxidativeStress => &[TIMEPOINT, "Value"],
        }
    }

    pub fn y_axis_label(self) -> &'static str {
        match self {
            DatasetKind::GeneExpression => "Expression Level",
            DatasetKind::OxidativeStress => "Level",
        }
    }

    pub fn subheader(self, selected: &str) -> String {
        match self {
            DatasetKind::GeneExpression => format!("Gene Expression: {selected}"),
            DatasetKind::OxidativeStress => format!("Oxidative Stress: {selected}"),
        }
    }

    pub fn chart_title(self, selected: &str, days: u32) -> String {
        match self {
            DatasetKind::GeneExpression => format!("{selected} Expression over {days} days"),
            DatasetKind::OxidativeStress => format!("{selected} over {days} days"),
        }
    }
}
