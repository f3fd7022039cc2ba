#![forbid(unsafe_code)]

//! IR imaging & spectroscopy workflow flowchart.
//!
//! This crate ties the graph model (`irflow-core`) and the headless renderer (`irflow-render`)
//! to image export: PNG/SVG encoding, save-to-disk download helpers and the export
//! self-tests.
//!
//! Operations are synchronous (`*_sync`) with thin `async` wrappers; drive the wrappers with
//! any executor, e.g. `futures::executor::block_on`.

pub mod app;
pub mod config;
pub mod data_url;
pub mod download;
pub mod encode;
pub mod export;
pub mod selftest;

pub use app::{ExporterParts, WorkflowApp};
pub use config::Settings;
pub use data_url::{Blob, DataUrl, DataUrlError, fetch_data_url};
pub use download::{
    DirectorySaveTarget, DownloadError, DownloadHandle, DownloadMode, Downloads, ObjectUrlStore,
    SaveTarget,
};
pub use encode::{EncodeError, ImageEncoder, RasterOptions, ResvgEncoder, VectorOptions};
pub use export::{ExportError, ExportOptions, Exporter};
pub use selftest::{SelfTestReport, TestResult, run_self_tests};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] irflow_core::Error),
    #[error(transparent)]
    Render(#[from] irflow_render::Error),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("invalid settings: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
