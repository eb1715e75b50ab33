use crate::config::AppConfig;
use crate::data::cache::LoadCache;
use crate::data::loader::{load_source, LoadOutcome, Source, Upload};
use crate::data::model::{CellValue, DatasetKind};
use crate::error::DashboardError;
use crate::pipeline::{recompute, Dashboard, Inputs};

pub const MISSING_DATA_NOTICE: &str =
    "Please provide both 'gene_expression.csv' and 'oxidative_stress.csv' in 'data/' or via uploader.";

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Slider value: inclusive upper bound on `Timepoint`.
    pub days_in_space: u32,

    /// Load from picked files instead of the fixed paths.
    pub use_uploader: bool,

    pub gene_upload: Option<Upload>,
    pub stress_upload: Option<Upload>,

    pub selected_gene: Option<CellValue>,
    pub selected_marker: Option<CellValue>,

    /// Parsed tables, reused across runs while their source is unchanged.
    pub cache: LoadCache,

    /// Per-source warnings shown in the side panel.
    pub source_warnings: Vec<String>,

    /// Shown instead of the charts when a dataset is absent.
    pub notice: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Output of the last run; `None` when the run stopped early.
    pub dashboard: Option<Dashboard>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let mut state = Self {
            days_in_space: config.max_days,
            use_uploader: config.use_uploader,
            config,
            gene_upload: None,
            stress_upload: None,
            selected_gene: None,
            selected_marker: None,
            cache: LoadCache::default(),
            source_warnings: Vec::new(),
            notice: None,
            status_message: None,
            dashboard: None,
        };
        state.refresh();
        state
    }

    /// Where `kind` is read from on this run.
    pub fn source(&self, kind: DatasetKind) -> Source {
        if self.use_uploader {
            let upload = match kind {
                DatasetKind::GeneExpression => self.gene_upload.clone(),
                DatasetKind::OxidativeStress => self.stress_upload.clone(),
            };
            Source::Upload(upload)
        } else {
            Source::Path(self.config.path_for(kind))
        }
    }

    fn file_name(&self, kind: DatasetKind) -> String {
        self.source(kind)
            .file_name()
            .unwrap_or_else(|| kind.default_file_name().to_string())
    }

    /// Recompute everything from the sources down to chart parameters.
    pub fn refresh(&mut self) {
        self.source_warnings.clear();
        self.notice = None;
        self.status_message = None;
        self.dashboard = None;

        let Some(gene) = self.load(DatasetKind::GeneExpression) else {
            return;
        };
        let Some(stress) = self.load(DatasetKind::OxidativeStress) else {
            return;
        };

        for outcome in [&gene, &stress] {
            if let Some(w) = outcome.warning() {
                self.source_warnings.push(w.to_string());
            }
        }

        let (Some(gene), Some(stress)) = (gene.table(), stress.table()) else {
            self.notice = Some(MISSING_DATA_NOTICE.to_string());
            return;
        };

        let inputs = Inputs {
            days_in_space: self.days_in_space,
            selected_gene: self.selected_gene.clone(),
            selected_marker: self.selected_marker.clone(),
            gene_file: self.file_name(DatasetKind::GeneExpression),
            stress_file: self.file_name(DatasetKind::OxidativeStress),
        };
        let dashboard = recompute(&inputs, gene, stress);

        self.selected_gene = dashboard.gene.selected.clone();
        self.selected_marker = dashboard.stress.selected.clone();
        log::debug!(
            "refreshed: {} days, gene {:?} ({} rows), marker {:?} ({} rows); cache {} tables, {} hits, {} misses",
            self.days_in_space,
            self.selected_gene,
            dashboard.gene.rows.len(),
            self.selected_marker,
            dashboard.stress.rows.len(),
            self.cache.len(),
            self.cache.hits(),
            self.cache.misses()
        );
        self.dashboard = Some(dashboard);
    }

    /// Load one source. A parse failure stops the run and sets the status message.
    fn load(&mut self, kind: DatasetKind) -> Option<LoadOutcome> {
        let source = self.source(kind);
        match load_source(&source, kind.label(), &mut self.cache) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                let err = DashboardError::Parse {
                    label: kind.label().to_string(),
                    source: e,
                };
                log::error!("{err}");
                self.status_message = Some(format!("Error: {err}"));
                None
            }
        }
    }

    pub fn set_days(&mut self, days: u32) {
        self.days_in_space = days.min(self.config.max_days);
        self.refresh();
    }

    pub fn set_use_uploader(&mut self, on: bool) {
        self.use_uploader = on;
        self.refresh();
    }

    /// Replace (or clear) the picked file for one dataset.
    pub fn set_upload(&mut self, kind: DatasetKind, upload: Option<Upload>) {
        match kind {
            DatasetKind::GeneExpression => self.gene_upload = upload,
            DatasetKind::OxidativeStress => self.stress_upload = upload,
        }
        self.refresh();
    }

    pub fn upload(&self, kind: DatasetKind) -> Option<&Upload> {
        match kind {
            DatasetKind::GeneExpression => self.gene_upload.as_ref(),
            DatasetKind::OxidativeStress => self.stress_upload.as_ref(),
        }
    }

    pub fn select(&mut self, kind: DatasetKind, value: CellValue) {
        match kind {
            DatasetKind::GeneExpression => self.selected_gene = Some(value),
            DatasetKind::OxidativeStress => self.selected_marker = Some(value),
        }
        self.refresh();
    }

    /// Drop cached tables and read every source again.
    pub fn reload(&mut self) {
        self.cache.clear();
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use std::sync::Arc;

    const GENE_CSV: &str = "Timepoint,Twin,Gene,Expression\n\
        0,A,X,1.0\n0,B,X,1.1\n200,A,X,2.0\n400,A,X,9.0\n0,A,Y,5.0\n";
    const STRESS_CSV: &str = "Timepoint,Marker,Value\n0,MDA,3.0\n300,MDA,4.0\n0,8-OHdG,1.0\n";

    fn write(dir: &Path, name: &str, body: &str) {
        let mut f = std::fs::File::create(dir.join(name)).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    fn config_for(dir: &Path) -> AppConfig {
        AppConfig {
            data_dir: dir.to_path_buf(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_full_run_from_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "gene_expression.csv", GENE_CSV);
        write(dir.path(), "oxidative_stress.csv", STRESS_CSV);

        let state = AppState::new(config_for(dir.path()));
        let dash = state.dashboard.as_ref().unwrap();

        assert_eq!(state.days_in_space, 340);
        assert_eq!(state.selected_gene, Some(CellValue::String("X".into())));
        assert_eq!(dash.gene.rows.len(), 3);
        assert_eq!(dash.stress.rows.len(), 2);
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_missing_file_stops_run_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "gene_expression.csv", GENE_CSV);

        let state = AppState::new(config_for(dir.path()));

        assert!(state.dashboard.is_none());
        assert_eq!(state.notice.as_deref(), Some(MISSING_DATA_NOTICE));
        assert_eq!(state.source_warnings.len(), 1);
        assert!(state.source_warnings[0].contains("oxidative_stress.csv"));
    }

    #[test]
    fn test_slider_and_selection_recompute() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "gene_expression.csv", GENE_CSV);
        write(dir.path(), "oxidative_stress.csv", STRESS_CSV);
        let mut state = AppState::new(config_for(dir.path()));

        state.set_days(0);
        let dash = state.dashboard.as_ref().unwrap();
        assert_eq!(dash.gene.rows.len(), 2);
        assert_eq!(dash.stress.rows.len(), 1);

        state.select(DatasetKind::GeneExpression, CellValue::String("Y".into()));
        assert_eq!(state.dashboard.as_ref().unwrap().gene.rows.len(), 1);

        state.set_days(10_000);
        assert_eq!(state.days_in_space, 340);
    }

    #[test]
    fn test_upload_mode() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(config_for(dir.path()));
        assert!(state.dashboard.is_none());

        state.set_use_uploader(true);
        assert!(state.source_warnings.is_empty());
        assert_eq!(state.notice.as_deref(), Some(MISSING_DATA_NOTICE));

        let upload = |name: &str, body: &str| Upload {
            name: name.to_string(),
            bytes: Arc::new(body.as_bytes().to_vec()),
        };
        state.set_upload(DatasetKind::GeneExpression, Some(upload("g.csv", GENE_CSV)));
        assert!(state.dashboard.is_none());
        state.set_upload(DatasetKind::OxidativeStress, Some(upload("o.csv", STRESS_CSV)));
        assert!(state.dashboard.is_some());
        assert_eq!(state.upload(DatasetKind::OxidativeStress).unwrap().name, "o.csv");
    }

    #[test]
    fn test_missing_column_banner_names_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "gene_expression.csv", GENE_CSV);
        write(dir.path(), "ox_custom.csv", "Timepoint,Marker
0,MDA
");
        let config = AppConfig {
            stress_file: "ox_custom.csv".into(),
            ..config_for(dir.path())
        };

        let mut state = AppState::new(config);
        let err = state.dashboard.as_ref().unwrap().stress.chart.as_ref().unwrap_err();
        assert!(err.to_string().ends_with("missing in ox_custom.csv"));

        let upload = Upload {
            name: "uploaded_stress.csv".into(),
            bytes: Arc::new(b"Timepoint,Marker
0,MDA
".to_vec()),
        };
        state.set_use_uploader(true);
        let gene = Upload::from_path(&dir.path().join("gene_expression.csv")).unwrap();
        state.set_upload(DatasetKind::GeneExpression, Some(gene));
        state.set_upload(DatasetKind::OxidativeStress, Some(upload));
        let err = state.dashboard.as_ref().unwrap().stress.chart.as_ref().unwrap_err();
        assert!(err.to_string().ends_with("missing in uploaded_stress.csv"));
    }

    #[test]
    fn test_malformed_file_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "gene_expression.csv", "Timepoint,Gene\n1,X,extra\n");
        write(dir.path(), "oxidative_stress.csv", STRESS_CSV);

        let state = AppState::new(config_for(dir.path()));
        assert!(state.dashboard.is_none());
        let msg = state.status_message.unwrap();
        assert!(msg.contains("Gene Expression"));
    }
}
