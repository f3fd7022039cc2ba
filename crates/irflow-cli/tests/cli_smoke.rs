use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;

fn cli() -> Command {
    Command::new(assert_cmd::cargo_bin!("irflow-cli"))
}

#[test]
fn cli_exports_png_smoke() {
    let tmp = tempfile::tempdir().expect("tempdir");

    cli()
        .args([
            "export-png",
            "--out-dir",
            tmp.path().to_string_lossy().as_ref(),
            "--viewport",
            "400x300",
        ])
        .assert()
        .success();

    let bytes = fs::read(tmp.path().join("ir-workflow.png")).expect("read png");
    assert!(
        bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "output is not a PNG"
    );

    let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
    let reader = decoder.read_info().expect("png header");
    let info = reader.info();
    assert_eq!((info.width, info.height), (800, 600));
}

#[test]
fn cli_exports_svg_with_config_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = tmp.path().join("irflow.json");
    fs::write(&config, r#"{"export":{"svgFilename":"flow.svg"}}"#).expect("write config");

    cli()
        .args([
            "export-svg",
            "--out-dir",
            tmp.path().to_string_lossy().as_ref(),
            "--config",
            config.to_string_lossy().as_ref(),
            "--no-minimap",
        ])
        .assert()
        .success();

    let svg = fs::read_to_string(tmp.path().join("flow.svg")).expect("read svg");
    assert!(svg.starts_with("<svg"));
    assert!(!svg.contains(r#"class="minimap""#));
    assert!(!tmp.path().join("ir-workflow.svg").exists());
}

#[test]
fn cli_self_test_passes() {
    let output = cli().arg("self-test").output().expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        [
            "T1: toPng returns data URL: PASS",
            "T2: toSvg returns data URL: PASS",
            "T3: download helpers (dry-run): PASS",
        ]
    );
}

#[test]
fn cli_validate_reports_cycles() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("cycle.json");
    fs::write(
        &path,
        r#"{
  "nodes": [
    {"id": "a", "position": {"x": 0, "y": 0}, "content": {"title": "A", "bullets": []}},
    {"id": "b", "position": {"x": 0, "y": 100}, "content": {"title": "B", "bullets": []}}
  ],
  "edges": [
    {"id": "ab", "source": "a", "target": "b"},
    {"id": "ba", "source": "b", "target": "a"}
  ]
}"#,
    )
    .expect("write workflow");

    cli()
        .args(["validate", path.to_string_lossy().as_ref()])
        .assert()
        .code(1);

    cli().arg("validate").assert().success();
}

#[test]
fn cli_usage_error_exits_2() {
    cli().assert().code(2);
    cli().args(["export-png", "--scale", "nope"]).assert().code(2);
}

#[test]
fn cli_graph_prints_the_seed_workflow() {
    let output = cli().args(["graph", "--pretty"]).output().expect("run");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["nodes"].as_array().map(Vec::len), Some(12));
    assert_eq!(json["edges"].as_array().map(Vec::len), Some(12));
    assert_eq!(json["nodes"][0]["id"], "s1");
    assert_eq!(json["edges"][0]["markerEnd"], "arrowclosed");
}
