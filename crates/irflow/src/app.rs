use crate::config::Settings;
use crate::download::{DirectorySaveTarget, DownloadHandle, Downloads, ObjectUrlStore, SaveTarget};
use crate::encode::{ImageEncoder, ResvgEncoder};
use crate::export::Exporter;
use crate::selftest::{SelfTestReport, TestResult};
use irflow_core::{EdgeChange, FlowState, NodeChange, Workflow};
use irflow_render::{DeterministicTextMeasurer, Region, TextMeasurer, ViewOptions, render_view};
use std::path::PathBuf;
use std::sync::Arc;

/// The workflow page: one diagram, its view state, the two export actions and the
/// self-test panel.
///
/// The container handle only exists while the app is mounted; exports against an unmounted
/// app are no-ops.
pub struct WorkflowApp {
    state: FlowState,
    view: ViewOptions,
    measurer: Arc<dyn TextMeasurer + Send + Sync>,
    exporter: Exporter,
    test_results: Vec<TestResult>,
    mounted: bool,
}

impl WorkflowApp {
    pub fn new(seed: &Workflow, settings: Settings, exporter_parts: ExporterParts) -> Self {
        let ExporterParts { encoder, target } = exporter_parts;
        let object_urls = Arc::new(ObjectUrlStore::new(settings.export.object_url_release()));
        let exporter = Exporter::new(
            encoder,
            Downloads::new(target, object_urls),
            settings.export,
        );
        Self {
            state: FlowState::new(seed),
            view: settings.view,
            measurer: Arc::new(DeterministicTextMeasurer::default()),
            exporter,
            test_results: Vec::new(),
            mounted: true,
        }
    }

    /// The seed workflow with default encoder, saving into `out_dir`.
    pub fn with_output_dir(seed: &Workflow, settings: Settings, out_dir: impl Into<PathBuf>) -> Self {
        Self::new(
            seed,
            settings,
            ExporterParts {
                encoder: Arc::new(ResvgEncoder::new()),
                target: Arc::new(DirectorySaveTarget::new(out_dir)),
            },
        )
    }

    pub fn with_measurer(mut self, measurer: Arc<dyn TextMeasurer + Send + Sync>) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn view_options(&self) -> &ViewOptions {
        &self.view
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn mount(&mut self) {
        self.mounted = true;
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    /// Renders the current state, or `None` while unmounted.
    pub fn container(&self) -> crate::Result<Option<Region>> {
        if !self.mounted {
            return Ok(None);
        }
        let region = render_view(&self.state, &self.view, self.measurer.as_ref())?;
        Ok(Some(region))
    }

    pub fn on_nodes_change(&mut self, changes: &[NodeChange]) {
        self.state.apply_node_changes(changes);
    }

    pub fn on_edges_change(&mut self, changes: &[EdgeChange]) {
        self.state.apply_edge_changes(changes);
    }

    pub fn export_png_sync(&self) -> crate::Result<Option<DownloadHandle>> {
        let container = self.container()?;
        Ok(self.exporter.export_raster_sync(container.as_ref())?)
    }

    pub fn export_svg_sync(&self) -> crate::Result<Option<DownloadHandle>> {
        let container = self.container()?;
        Ok(self.exporter.export_vector_sync(container.as_ref())?)
    }

    pub async fn export_png(&self) -> crate::Result<Option<DownloadHandle>> {
        self.export_png_sync()
    }

    pub async fn export_svg(&self) -> crate::Result<Option<DownloadHandle>> {
        self.export_svg_sync()
    }

    /// Replaces the results panel with a fresh run.
    pub fn run_self_tests_sync(&mut self) -> &[TestResult] {
        self.test_results = self.exporter.run_self_tests_sync();
        &self.test_results
    }

    pub async fn run_self_tests(&mut self) -> &[TestResult] {
        self.run_self_tests_sync()
    }

    pub fn test_results(&self) -> &[TestResult] {
        &self.test_results
    }

    pub fn report(&self) -> SelfTestReport {
        SelfTestReport(self.test_results.clone())
    }
}

/// The pluggable ends of the export path.
pub struct ExporterParts {
    pub encoder: Arc<dyn ImageEncoder + Send + Sync>,
    pub target: Arc<dyn SaveTarget + Send + Sync>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::testing::RecordingSaveTarget;
    use irflow_core::{Position, ir_workflow};

    fn app() -> (Arc<RecordingSaveTarget>, WorkflowApp) {
        let target = Arc::new(RecordingSaveTarget::default());
        let app = WorkflowApp::new(
            &ir_workflow(),
            Settings::default(),
            ExporterParts {
                encoder: Arc::new(ResvgEncoder::new()),
                target: target.clone(),
            },
        );
        (target, app)
    }

    #[test]
    fn unmounted_app_exports_nothing() {
        let (target, mut app) = app();
        app.unmount();
        assert_eq!(app.container().unwrap(), None);
        assert_eq!(app.export_png_sync().unwrap(), None);
        assert_eq!(app.export_svg_sync().unwrap(), None);
        assert!(target.saved().is_empty());

        app.mount();
        assert!(app.container().unwrap().is_some());
    }

    #[test]
    fn self_test_runs_replace_previous_results() {
        let (target, mut app) = app();
        assert!(app.test_results().is_empty());
        assert_eq!(app.run_self_tests_sync().len(), 3);
        assert_eq!(app.run_self_tests_sync().len(), 3);
        assert!(app.report().all_passed());
        assert!(target.saved().is_empty());
    }

    #[test]
    fn node_changes_flow_into_the_container() {
        let (_, mut app) = app();
        app.on_nodes_change(&[
            NodeChange::Position {
                id: "s8".into(),
                position: Position::new(700.0, 40.0),
            },
            NodeChange::Remove { id: "d4".into() },
        ]);
        assert_eq!(app.state().nodes().len(), 11);
        assert_eq!(app.state().edges().len(), 10);
        let region = app.container().unwrap().unwrap();
        assert!(region.body().contains(r#"data-id="s8" transform="translate(700, 40)""#));
        assert!(!region.body().contains(r#"data-id="d4""#));
    }
}
