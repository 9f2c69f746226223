use super::json_store::ensure_parent;
use crate::error::StorageError;
use crate::models::NormalizedTable;
use std::io::Write;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 导出表格为 CSV (带 BOM，表格软件可直接识别中文)
pub fn write_table_csv(path: &Path, table: &NormalizedTable) -> Result<(), StorageError> {
    ensure_parent(path)?;
    let write_err = |source: std::io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    let csv_err = |source: csv::Error| StorageError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut file = std::fs::File::create(path).map_err(write_err)?;
    file.write_all(UTF8_BOM).map_err(write_err)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(&table.columns).map_err(csv_err)?;
    for row in 0..table.row_count() {
        writer.write_record(table.row_texts(row)).map_err(csv_err)?;
    }
    writer.flush().map_err(write_err)?;

    tracing::info!("成功导出 {} 条记录到: {}", table.row_count(), path.display());
    Ok(())
}
