use super::order::{scalar_to_text, FlatRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 列标准化后的矩形表格：每行都包含 columns 中的全部列 (缺失为 null)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    pub columns: Vec<String>,
    pub rows: Vec<FlatRecord>,
}

impl NormalizedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 单元格值
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// 按列顺序输出一行的文本 (用于 CSV 导出)
    pub fn row_texts(&self, row: usize) -> Vec<String> {
        let Some(record) = self.rows.get(row) else {
            return Vec::new();
        };
        self.columns
            .iter()
            .map(|c| record.get(c).map(scalar_to_text).unwrap_or_default())
            .collect()
    }
}

/// 批次处理统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_orders: usize,
    pub processed_orders: usize,
    pub skipped_orders: usize,
    pub output_rows: usize,
    pub output_columns: usize,
}
