use futures::executor::block_on;
use irflow::{
    DataUrl, DirectorySaveTarget, Downloads, ExportOptions, Exporter, ObjectUrlStore,
    ResvgEncoder, Settings, WorkflowApp,
};
use irflow_core::{FlowState, ir_workflow};
use irflow_render::{DeterministicTextMeasurer, Region, ViewOptions, render_view};
use std::sync::Arc;

fn diagram(options: &ViewOptions) -> Region {
    let state = FlowState::new(&ir_workflow());
    render_view(&state, options, &DeterministicTextMeasurer::default()).expect("render ok")
}

fn exporter(dir: &std::path::Path) -> Exporter {
    Exporter::new(
        Arc::new(ResvgEncoder::new()),
        Downloads::new(
            Arc::new(DirectorySaveTarget::new(dir)),
            Arc::new(ObjectUrlStore::default()),
        ),
        ExportOptions::default(),
    )
}

#[test]
fn raster_export_writes_a_double_resolution_png() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let options = ViewOptions {
        width: 320.0,
        height: 240.0,
        ..Default::default()
    };
    let region = diagram(&options);

    let handle = exporter(tmp.path())
        .export_raster_sync(Some(&region))
        .expect("export ok")
        .expect("container present");
    let path = tmp.path().join("ir-workflow.png");
    assert_eq!(handle.saved_to.as_deref(), Some(path.as_path()));

    let bytes = std::fs::read(&path).expect("read png");
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    let decoder = png::Decoder::new(std::io::Cursor::new(&bytes));
    let reader = decoder.read_info().expect("png header");
    assert_eq!((reader.info().width, reader.info().height), (640, 480));

    // The handle carries the same bytes that were saved.
    assert_eq!(DataUrl::parse(&handle.href).unwrap().data(), bytes.as_slice());
}

#[test]
fn vector_export_writes_well_formed_svg() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let region = diagram(&ViewOptions::default());

    let handle = exporter(tmp.path())
        .export_vector_sync(Some(&region))
        .expect("export ok")
        .expect("container present");
    assert!(handle.href.starts_with("blob:irflow/"));

    let svg = std::fs::read_to_string(tmp.path().join("ir-workflow.svg")).expect("read svg");
    let doc = roxmltree::Document::parse(&svg).expect("well-formed SVG");
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "svg");
    assert_eq!(root.attribute("id"), Some("ir-workflow"));
    let nodes = doc
        .descendants()
        .filter(|n| n.attribute("class").is_some_and(|c| c.starts_with("node ")))
        .count();
    assert_eq!(nodes, 12);
}

#[test]
fn missing_container_saves_nothing() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let exporter = exporter(tmp.path());
    assert_eq!(exporter.export_raster_sync(None).unwrap(), None);
    assert_eq!(exporter.export_vector_sync(None).unwrap(), None);
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn async_wrappers_match_the_sync_paths() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let app = WorkflowApp::with_output_dir(&ir_workflow(), Settings::default(), tmp.path());

    let png = block_on(app.export_png()).unwrap().unwrap();
    let svg = block_on(app.export_svg()).unwrap().unwrap();
    assert_eq!(png.filename, "ir-workflow.png");
    assert_eq!(svg.filename, "ir-workflow.svg");
    assert!(tmp.path().join("ir-workflow.png").is_file());
    assert!(tmp.path().join("ir-workflow.svg").is_file());
}

#[test]
fn self_tests_never_touch_the_output_directory() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut app = WorkflowApp::with_output_dir(&ir_workflow(), Settings::default(), tmp.path());

    let results = block_on(app.run_self_tests()).to_vec();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.pass), "{results:?}");
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}
