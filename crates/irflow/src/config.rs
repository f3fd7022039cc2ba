use crate::export::ExportOptions;
use irflow_render::ViewOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything a caller can tune: the rendered view and the export paths.
///
/// Missing keys fall back to the built-in defaults, so `{}` is a valid settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub view: ViewOptions,
    pub export: ExportOptions,
}

impl Settings {
    pub fn from_json_str(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }
}
