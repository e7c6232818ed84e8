//! YAML export
//!
//! Same content as the JSON export, in a form that reads well in a pager.

use std::io::Write;

use crate::error::{DealError, DealResult};
use crate::export::json::FullExport;
use crate::storage::Storage;

fn export_err(e: impl std::fmt::Display) -> DealError {
    DealError::Export(e.to_string())
}

/// Export the full store as YAML
pub fn export_full_yaml<W: Write + ?Sized>(storage: &Storage, writer: &mut W) -> DealResult<()> {
    let export = FullExport::from_storage(storage)?;

    writeln!(writer, "# dealtrack export").map_err(export_err)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(export_err)?;
    writeln!(
        writer,
        "# {} transactions, {} documents",
        export.metadata.transaction_count, export.metadata.document_count
    )
    .map_err(export_err)?;
    writeln!(writer).map_err(export_err)?;

    serde_yaml::to_writer(writer, &export).map_err(export_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::DealPaths;
    use crate::storage::seed_demo;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_export() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(DealPaths::with_base_dir(temp_dir.path())).unwrap();
        seed_demo(&storage).unwrap();

        let mut out = Vec::new();
        export_full_yaml(&storage, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("# dealtrack export"));
        assert!(text.contains("3 transactions, 12 documents"));
        assert!(text.contains("address: 789 Pine Road"));

        let parsed: FullExport = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed.documents.len(), 12);
    }
}
