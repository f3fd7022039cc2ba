use futures::executor::block_on;
use irflow::{Settings, WorkflowApp};
use irflow_core::{Workflow, ir_workflow};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Irflow(irflow::Error),
    Workflow(irflow_core::Error),
    Json(serde_json::Error),
    SelfTestFailed,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Irflow(err) => write!(f, "{err}"),
            CliError::Workflow(err) => write!(f, "invalid workflow: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::SelfTestFailed => write!(f, "self-tests failed"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<irflow::Error> for CliError {
    fn from(value: irflow::Error) -> Self {
        Self::Irflow(value)
    }
}

impl From<irflow_core::Error> for CliError {
    fn from(value: irflow_core::Error) -> Self {
        Self::Workflow(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Help,
    ExportPng,
    ExportSvg,
    SelfTest,
    Graph,
    Validate,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    out_dir: Option<String>,
    config: Option<String>,
    scale: Option<f32>,
    pretty: bool,
    no_minimap: bool,
    no_controls: bool,
    no_background: bool,
    viewport: Option<(f64, f64)>,
}

fn usage() -> &'static str {
    "irflow-cli\n\
\n\
USAGE:\n\
  irflow-cli export-png [--out-dir <dir>] [--config <json>] [--scale <n>] [VIEW OPTIONS]\n\
  irflow-cli export-svg [--out-dir <dir>] [--config <json>] [VIEW OPTIONS]\n\
  irflow-cli self-test [--config <json>]\n\
  irflow-cli graph [--pretty]\n\
  irflow-cli validate [<path>|-]\n\
\n\
VIEW OPTIONS:\n\
  --no-minimap  --no-controls  --no-background  --viewport <w>x<h>\n\
\n\
NOTES:\n\
  - Exports are written to --out-dir (default: current directory) as ir-workflow.png / ir-workflow.svg.\n\
  - self-test exits with status 1 when any test fails.\n\
  - validate checks the built-in workflow unless a workflow JSON file is given ('-' reads stdin).\n\
  - Set RUST_LOG to adjust logging (default: irflow=info,warn).\n\
"
}

fn parse_viewport(text: &str) -> Option<(f64, f64)> {
    let (w, h) = text.trim().split_once(['x', 'X'])?;
    let w = w.trim().parse::<f64>().ok()?;
    let h = h.trim().parse::<f64>().ok()?;
    (w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0).then_some((w, h))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "export-png" => args.command = Command::ExportPng,
            "export-svg" => args.command = Command::ExportSvg,
            "self-test" => args.command = Command::SelfTest,
            "graph" => args.command = Command::Graph,
            "validate" => args.command = Command::Validate,
            "--pretty" => args.pretty = true,
            "--no-minimap" => args.no_minimap = true,
            "--no-controls" => args.no_controls = true,
            "--no-background" => args.no_background = true,
            "--out-dir" => {
                let Some(dir) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out_dir = Some(dir.clone());
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--scale" => {
                let Some(scale) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let scale = scale.parse::<f32>().map_err(|_| CliError::Usage(usage()))?;
                if !(scale.is_finite() && scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
                args.scale = Some(scale);
            }
            "--viewport" => {
                let Some(size) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.viewport = Some(parse_viewport(size).ok_or(CliError::Usage(usage()))?);
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if matches!(args.command, Command::Help) {
        return Err(CliError::Usage(usage()));
    }
    if args.input.is_some() && !matches!(args.command, Command::Validate) {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn read_input(input: &str) -> Result<String, CliError> {
    match input {
        "-" => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        path => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn load_settings(args: &Args) -> Result<Settings, CliError> {
    let mut settings = match args.config.as_deref() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let view = &mut settings.view;
    if args.no_minimap {
        view.show_minimap = false;
    }
    if args.no_controls {
        view.show_controls = false;
    }
    if args.no_background {
        view.show_background = false;
    }
    if let Some((w, h)) = args.viewport {
        view.width = w;
        view.height = h;
    }
    if let Some(scale) = args.scale {
        settings.export.pixel_ratio = scale;
    }
    Ok(settings)
}

fn build_app(args: &Args) -> Result<WorkflowApp, CliError> {
    let settings = load_settings(args)?;
    let out_dir = PathBuf::from(args.out_dir.as_deref().unwrap_or("."));
    Ok(WorkflowApp::with_output_dir(&ir_workflow(), settings, out_dir))
}

fn report_saved(handle: Option<irflow::DownloadHandle>) {
    match handle.and_then(|h| h.saved_to) {
        Some(path) => println!("{}", path.display()),
        None => tracing::warn!("nothing to export"),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Help => Err(CliError::Usage(usage())),
        Command::ExportPng => {
            let app = build_app(&args)?;
            report_saved(block_on(app.export_png())?);
            Ok(())
        }
        Command::ExportSvg => {
            let app = build_app(&args)?;
            report_saved(block_on(app.export_svg())?);
            Ok(())
        }
        Command::SelfTest => {
            let mut app = build_app(&args)?;
            block_on(app.run_self_tests());
            let report = app.report();
            print!("{report}");
            if report.all_passed() {
                Ok(())
            } else {
                Err(CliError::SelfTestFailed)
            }
        }
        Command::Graph => {
            let workflow = ir_workflow();
            workflow.validate()?;
            write_json(&workflow, args.pretty)
        }
        Command::Validate => {
            let workflow = match args.input.as_deref() {
                Some(input) => serde_json::from_str::<Workflow>(&read_input(input)?)?,
                None => ir_workflow(),
            };
            let order = workflow.topological_order()?;
            println!(
                "ok: {} nodes, {} edges",
                workflow.nodes().len(),
                workflow.edges().len()
            );
            println!("{}", order.join(" -> "));
            Ok(())
        }
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("irflow=info,warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_logging();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("irflow-cli")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn parses_export_flags() {
        let args = parse_args(&argv(&[
            "export-png",
            "--out-dir",
            "out",
            "--scale",
            "3",
            "--viewport",
            "640x480",
            "--no-minimap",
        ]))
        .unwrap();
        assert!(matches!(args.command, Command::ExportPng));
        assert_eq!(args.out_dir.as_deref(), Some("out"));
        assert_eq!(args.scale, Some(3.0));
        assert_eq!(args.viewport, Some((640.0, 480.0)));

        let settings = load_settings(&args).unwrap();
        assert!(!settings.view.show_minimap);
        assert!(settings.view.show_controls);
        assert_eq!(settings.export.pixel_ratio, 3.0);
        assert_eq!(settings.view.width, 640.0);
    }

    #[test]
    fn rejects_bad_usage() {
        for bad in [
            &[][..],
            &["export-png", "--scale", "0"][..],
            &["export-svg", "--viewport", "10"][..],
            &["self-test", "--bogus"][..],
            &["export-png", "stray.json"][..],
        ] {
            assert!(
                matches!(parse_args(&argv(bad)), Err(CliError::Usage(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn viewport_parser() {
        assert_eq!(parse_viewport("800X600"), Some((800.0, 600.0)));
        assert_eq!(parse_viewport("0x600"), None);
        assert_eq!(parse_viewport("wide"), None);
    }
}
