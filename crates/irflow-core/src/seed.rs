//! The IR imaging & spectroscopy procedure shown by the diagram.

use crate::model::{Edge, Node, NodeContent, NodeKind, Position, Workflow};

fn node(id: &str, kind: NodeKind, (x, y): (f64, f64), title: &str, bullets: &[&str]) -> Node {
    Node::new(
        id,
        Position::new(x, y),
        kind,
        NodeContent {
            title: title.to_string(),
            bullets: bullets.iter().map(|b| b.to_string()).collect(),
        },
    )
}

fn step(id: &str, at: (f64, f64), title: &str, bullets: &[&str]) -> Node {
    node(id, NodeKind::Step, at, title, bullets)
}

fn decision(id: &str, at: (f64, f64), title: &str, bullets: &[&str]) -> Node {
    node(id, NodeKind::Decision, at, title, bullets)
}

pub fn ir_workflow_nodes() -> Vec<Node> {
    vec![
        step(
            "s1",
            (160.0, 0.0),
            "Step 1 — Intake & triage",
            &[
                "Define questions, constraints, risk; register object IDs",
                "Record provenance, condition, prior treatments; sampling limits",
            ],
        ),
        decision(
            "d1",
            (160.0, 140.0),
            "Decision — Need material IDs (not just mapping)?",
            &["If yes, pre-plan XRF/FTIR confirmation."],
        ),
        step(
            "s2",
            (160.0, 280.0),
            "Step 2 — Visual & historical survey",
            &[
                "Macro/micro exam; note stratigraphy indicators",
                "Extract candidate pigments from timeline/literature (working theory)",
            ],
        ),
        step(
            "s3",
            (160.0, 420.0),
            "Step 3 — Acquisition plan",
            &[
                "Imaging: three registered monochrome IR bands (LWP/BP/SWP)",
                "XRF: define non-contact spots; repeats + standards",
                "FTIR: reflection first; reserve micro-ATR for stable points",
                "Microscopy/microsampling: only if non-contact insufficient; sampling dossier",
            ],
        ),
        decision(
            "d2",
            (160.0, 620.0),
            "Decision — Pilot shows mis-registration or illumination falloff?",
            &["If yes, re-capture before analysis (app will not register bands)."],
        ),
        step(
            "s4",
            (160.0, 780.0),
            "Step 4 — Data capture",
            &[
                "Acquire three IR bands; embed IDs/band names/coords; log T/RH/light",
                "XRF ROIs with calibration + QC standard",
                "FTIR background + sample; document mode, resolution, scans, corrections",
            ],
        ),
        step(
            "s5",
            (160.0, 960.0),
            "Step 5 — Pre-processing (app)",
            &[
                "Load TIFFs; verify identical dimensions",
                "Optional: dark-frame, flat-field; pre-equalize means",
                "Stretch + gamma; gray-world or white-patch balance",
                "Optional: decorrelation stretch / saturation boost",
            ],
        ),
        decision(
            "d3",
            (160.0, 1160.0),
            "Decision — Channel shape mismatch or ghosting visible?",
            &["If yes, stop and re-capture."],
        ),
        step(
            "s6",
            (160.0, 1320.0),
            "Step 6 — Multivariate exploration (in app)",
            &[
                "PCA helper: choose PC→RGB mapping; scaling",
                "Segment with PC1 masks; lasso clusters; review band signatures",
                "Ratio composite: R/G, B/R, (SWP−BP)/(SWP+BP); tune",
                "Save ROI overlays and ROI CSV (targets for XRF/FTIR/microscopy)",
            ],
        ),
        step(
            "s7",
            (-220.0, 1520.0),
            "Step 7 — Identification & interpretation",
            &[
                "XRF: acquire per ROI; interpret elemental patterns; map back to classes",
                "If ambiguous (e.g., Cu blues), escalate to FTIR/microsampling",
                "FTIR: reflection first; if weak/derivative issues → micro-ATR",
                "Microsampling + stereo/PLM; chain-of-custody; correlate modalities",
            ],
        ),
        decision(
            "d4",
            (540.0, 1520.0),
            "Decision — Modalities disagree?",
            &["Document alternatives; plan follow-ups (Raman, GC-MS, etc.)"],
        ),
        step(
            "s8",
            (160.0, 1760.0),
            "Step 8 — Synthesis, reporting, preservation",
            &[
                "Compile report: app PNGs, ROI CSV, Markdown, spectra/files/params, logs, uncertainties",
                "Recommend preventive measures; list further analyses",
                "Archive raw data + metadata for repeatability",
            ],
        ),
    ]
}

pub fn ir_workflow_edges() -> Vec<Edge> {
    [
        ("e1", "s1", "d1"),
        ("e2", "d1", "s2"),
        ("e3", "s2", "s3"),
        ("e4", "s3", "d2"),
        ("e5", "d2", "s4"),
        ("e6", "s4", "s5"),
        ("e7", "s5", "d3"),
        ("e8", "d3", "s6"),
        // Fan-out: identification and the disagreement check run side by side.
        ("e9", "s6", "s7"),
        ("e10", "s6", "d4"),
        // Fan-in.
        ("e11", "s7", "s8"),
        ("e12", "d4", "s8"),
    ]
    .into_iter()
    .map(|(id, source, target)| Edge::new(id, source, target))
    .collect()
}

/// The full procedure as an unvalidated [`Workflow`]; the tests below pin its invariants.
pub fn ir_workflow() -> Workflow {
    Workflow::new(ir_workflow_nodes(), ir_workflow_edges())
}
