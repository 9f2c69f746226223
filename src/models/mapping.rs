use crate::error::MappingError;
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use std::path::Path;

const BUILTIN_FIELD_MAPPING: &str = include_str!("../../assets/field_mapping.json");
const BUILTIN_COLUMN_MAPPING: &str = include_str!("../../assets/column_mapping.json");

pub const FIELD_MAPPING_FILE: &str = "field_mapping.json";
pub const COLUMN_MAPPING_FILE: &str = "column_mapping.json";

/// 列映射文件结构 (商品相关条目以 {i} 为模板，按商品数量展开)
#[derive(Debug, Deserialize)]
struct ColumnMappingFile {
    columns: IndexMap<String, String>,
    #[serde(default)]
    product_columns: Option<ProductColumnTemplate>,
    #[serde(default)]
    synonyms: Vec<SynonymTemplate>,
    #[serde(default)]
    preferred_columns: Vec<PreferredEntry>,
}

#[derive(Debug, Deserialize)]
struct ProductColumnTemplate {
    source: String,
    target: String,
    fields: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct SynonymTemplate {
    canonical: String,
    synonym: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PreferredEntry {
    Column(String),
    PerProduct { per_product: Vec<String> },
}

/// 同义列合并规则：synonym 的值填充 canonical 中的空值后删除 synonym
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymRule {
    pub canonical: String,
    pub synonym: String,
}

/// 字段映射表集合 (数据而非逻辑，可独立扩展)
#[derive(Debug, Clone)]
pub struct MappingTables {
    /// 原始字段名 -> 规范字段名 (多对一)
    pub fields: IndexMap<String, String>,
    /// 展平后列名的二次映射
    pub columns: IndexMap<String, String>,
    pub synonyms: Vec<SynonymRule>,
    /// 推荐列顺序 (已按商品数量展开)
    pub preferred_columns: Vec<String>,
}

impl MappingTables {
    /// 内置映射表
    pub fn builtin(num_products: usize) -> Result<Self, MappingError> {
        Self::parse(BUILTIN_FIELD_MAPPING, BUILTIN_COLUMN_MAPPING, num_products)
    }

    /// 从目录加载 field_mapping.json 和 column_mapping.json
    pub fn from_dir(dir: &Path, num_products: usize) -> Result<Self, MappingError> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| MappingError::Io { path, source })
        };
        let fields = read(FIELD_MAPPING_FILE)?;
        let columns = read(COLUMN_MAPPING_FILE)?;
        Self::parse(&fields, &columns, num_products)
    }

    pub fn parse(fields_json: &str, columns_json: &str, num_products: usize) -> Result<Self, MappingError> {
        let fields: IndexMap<String, String> =
            serde_json::from_str(fields_json).map_err(|source| MappingError::Parse {
                name: FIELD_MAPPING_FILE.to_string(),
                source,
            })?;
        let file: ColumnMappingFile =
            serde_json::from_str(columns_json).map_err(|source| MappingError::Parse {
                name: COLUMN_MAPPING_FILE.to_string(),
                source,
            })?;

        let mut columns = file.columns;
        if let Some(template) = &file.product_columns {
            for i in 0..num_products {
                for (field, target_field) in &template.fields {
                    columns.insert(
                        fill_template(&template.source, i, field),
                        fill_template(&template.target, i, target_field),
                    );
                }
            }
        }

        let mut synonyms = Vec::new();
        for rule in &file.synonyms {
            for i in 0..num_products {
                synonyms.push(SynonymRule {
                    canonical: fill_template(&rule.canonical, i, ""),
                    synonym: fill_template(&rule.synonym, i, ""),
                });
            }
        }

        // 去重保序
        let mut preferred: IndexSet<String> = IndexSet::new();
        for entry in &file.preferred_columns {
            match entry {
                PreferredEntry::Column(name) => {
                    preferred.insert(name.clone());
                }
                PreferredEntry::PerProduct { per_product } => {
                    for i in 0..num_products {
                        for field in per_product {
                            preferred.insert(format!("product_{}_{}", i, field));
                        }
                    }
                }
            }
        }

        Ok(Self {
            fields,
            columns,
            synonyms,
            preferred_columns: preferred.into_iter().collect(),
        })
    }
}

fn fill_template(template: &str, index: usize, field: &str) -> String {
    template
        .replace("{i}", &index.to_string())
        .replace("{field}", field)
}
