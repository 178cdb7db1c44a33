use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use super::{Dataset, parse_dataset};

/// Reads a dataset from `path`, or from stdin when `path` is `-`.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let raw = if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read dataset from stdin")?;
        raw
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset {}", path.display()))?
    };

    let dataset =
        parse_dataset(&raw).with_context(|| format!("failed to parse dataset {}", path.display()))?;
    tracing::info!(path = %path.display(), symbols = dataset.symbols().len(), "dataset loaded");
    Ok(dataset)
}
