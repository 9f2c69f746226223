use crate::error::StorageError;
use serde_json::Value;
use std::path::Path;

/// 保存原始订单 JSON (缩进输出，保留中文)
pub fn save_orders_json(path: &Path, orders: &[Value]) -> Result<(), StorageError> {
    ensure_parent(path)?;
    let text = serde_json::to_string_pretty(orders).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, text).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("✅ JSON 已保存: {}", path.display());
    Ok(())
}

/// 加载订单 JSON：数组或单个对象
pub fn load_orders_json(path: &Path) -> Result<Vec<Value>, StorageError> {
    let text = std::fs::read_to_string(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Array(orders) => Ok(orders),
        order @ Value::Object(_) => Ok(vec![order]),
        _ => Err(StorageError::UnexpectedShape {
            path: path.to_path_buf(),
        }),
    }
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StorageError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
