use crate::models::{is_blank, FlatRecord, MappingTables, NormalizedTable};
use indexmap::IndexSet;
use serde_json::Value;

/// 统一列名格式：空格和斜杠替换为下划线，转小写
pub fn normalize_column_name(name: &str) -> String {
    name.replace([' ', '/'], "_").to_lowercase()
}

/// 列标准化 (对整批记录执行一次)
///
/// 1. 统一列名格式
/// 2. 应用列名二次映射
/// 3. 合并同义列 (如中英文服务标签)
/// 4. 删除全空列
/// 5. 推荐列在前，其余按字母排序
pub fn normalize_columns(rows: Vec<FlatRecord>, tables: &MappingTables) -> NormalizedTable {
    let mut rows: Vec<FlatRecord> = rows.into_iter().map(|row| rename_row(row, tables)).collect();

    for rule in &tables.synonyms {
        for row in rows.iter_mut() {
            if let Some(value) = row.shift_remove(&rule.synonym) {
                coalesce_insert(row, &rule.canonical, value);
            }
        }
    }

    let mut present: IndexSet<String> = IndexSet::new();
    for row in &rows {
        for (key, value) in row {
            if !is_blank(value) {
                present.insert(key.clone());
            }
        }
    }

    let columns = order_columns(&present, &tables.preferred_columns);

    let rows = rows
        .into_iter()
        .map(|mut row| {
            columns
                .iter()
                .map(|c| (c.clone(), row.swap_remove(c).unwrap_or(Value::Null)))
                .collect::<FlatRecord>()
        })
        .collect();

    NormalizedTable { columns, rows }
}

fn rename_row(row: FlatRecord, tables: &MappingTables) -> FlatRecord {
    let mut out = FlatRecord::with_capacity(row.len());
    for (key, value) in row {
        let name = normalize_column_name(&key);
        let name = tables.columns.get(&name).cloned().unwrap_or(name);
        coalesce_insert(&mut out, &name, value);
    }
    out
}

/// 列名冲突时保留已有非空值，仅填充空值
fn coalesce_insert(row: &mut FlatRecord, column: &str, value: Value) {
    match row.get_mut(column) {
        Some(existing) if existing.is_null() => *existing = value,
        Some(_) => {}
        None => {
            row.insert(column.to_string(), value);
        }
    }
}

/// 推荐列 (仅保留存在的) + 其余列字母序
pub fn order_columns(present: &IndexSet<String>, preferred: &[String]) -> Vec<String> {
    let mut ordered: IndexSet<String> = preferred
        .iter()
        .filter(|c| present.contains(c.as_str()))
        .cloned()
        .collect();

    let mut others: Vec<&String> = present.iter().filter(|c| !ordered.contains(c.as_str())).collect();
    others.sort();
    ordered.extend(others.into_iter().cloned());
    ordered.into_iter().collect()
}
