use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::models::Leaflet;

/// Write all leaflets to `path` as a pretty-printed JSON array, replacing any existing file.
pub fn save_to_file(leaflets: &[Leaflet], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let mut ser = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    leaflets.serialize(&mut ser)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!(path = %path.display(), count = leaflets.len(), "leaflets archived");
    Ok(())
}
