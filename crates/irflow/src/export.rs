use crate::download::{DownloadError, DownloadHandle, DownloadMode, Downloads};
use crate::data_url::fetch_data_url;
use crate::encode::{EncodeError, ImageEncoder, RasterOptions, VectorOptions};
use crate::selftest::{TestResult, run_self_tests};
use irflow_render::Region;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const PNG_FILENAME: &str = "ir-workflow.png";
pub const SVG_FILENAME: &str = "ir-workflow.svg";
pub const PNG_PIXEL_RATIO: f32 = 2.0;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Download(#[from] DownloadError),
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    pub png_filename: String,
    pub svg_filename: String,
    pub pixel_ratio: f32,
    /// Raster fill under the region. `None` keeps the region's own background.
    pub background: Option<String>,
    pub cache_bust: bool,
    /// Lifetime of the temporary object URL behind an SVG download. Must leave the save
    /// enough time to start.
    pub object_url_release_ms: u64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            png_filename: PNG_FILENAME.to_string(),
            svg_filename: SVG_FILENAME.to_string(),
            pixel_ratio: PNG_PIXEL_RATIO,
            background: None,
            cache_bust: true,
            object_url_release_ms: 4000,
        }
    }
}

impl ExportOptions {
    pub fn object_url_release(&self) -> Duration {
        Duration::from_millis(self.object_url_release_ms)
    }
}

/// Export and self-test actions over one encoder and one set of download triggers.
#[derive(Clone)]
pub struct Exporter {
    encoder: Arc<dyn ImageEncoder + Send + Sync>,
    downloads: Downloads,
    options: ExportOptions,
}

impl Exporter {
    pub fn new(
        encoder: Arc<dyn ImageEncoder + Send + Sync>,
        downloads: Downloads,
        options: ExportOptions,
    ) -> Self {
        Self {
            encoder,
            downloads,
            options,
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn downloads(&self) -> &Downloads {
        &self.downloads
    }

    /// Snapshots `container` to PNG and saves it. A missing container is a no-op.
    pub fn export_raster_sync(&self, container: Option<&Region>) -> Result<Option<DownloadHandle>> {
        let Some(region) = container else {
            tracing::debug!("raster export skipped: no container");
            return Ok(None);
        };
        let raster = RasterOptions {
            pixel_ratio: self.options.pixel_ratio,
            background: self.options.background.clone(),
            cache_bust: self.options.cache_bust,
        };
        let data_url = self.encoder.to_png(region, &raster)?;
        let handle = self.downloads.download_data_url(
            &data_url,
            &self.options.png_filename,
            DownloadMode::Save,
        )?;
        tracing::info!(filename = %handle.filename, "exported PNG");
        Ok(Some(handle))
    }

    /// Snapshots `container` to SVG, fetches the result as a blob and saves it through a
    /// temporary object URL. A missing container is a no-op.
    pub fn export_vector_sync(&self, container: Option<&Region>) -> Result<Option<DownloadHandle>> {
        let Some(region) = container else {
            tracing::debug!("vector export skipped: no container");
            return Ok(None);
        };
        let vector = VectorOptions {
            cache_bust: self.options.cache_bust,
        };
        let data_url = self.encoder.to_svg(region, &vector)?;
        let blob = fetch_data_url(&data_url).map_err(DownloadError::from)?;
        let handle =
            self.downloads
                .download_blob(blob, &self.options.svg_filename, DownloadMode::Save)?;
        tracing::info!(filename = %handle.filename, "exported SVG");
        Ok(Some(handle))
    }

    pub async fn export_raster(&self, container: Option<&Region>) -> Result<Option<DownloadHandle>> {
        self.export_raster_sync(container)
    }

    pub async fn export_vector(&self, container: Option<&Region>) -> Result<Option<DownloadHandle>> {
        self.export_vector_sync(container)
    }

    pub fn run_self_tests_sync(&self) -> Vec<TestResult> {
        run_self_tests(self.encoder.as_ref(), &self.downloads)
    }

    pub async fn run_self_tests(&self) -> Vec<TestResult> {
        self.run_self_tests_sync()
    }
}
