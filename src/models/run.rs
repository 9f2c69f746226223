use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// 单次运行的上下文 (显式传入，取代全局日期/模型名)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    pub run_date: NaiveDate,
    pub model_name: String,
}

impl RunContext {
    pub fn new(run_date: NaiveDate, model_name: impl Into<String>) -> Self {
        Self {
            run_date,
            model_name: model_name.into(),
        }
    }

    /// 模型短名：`Pro/OpenGVLab/InternVL2-8B` -> `InternVL2-8B`
    pub fn model_short_name(&self) -> &str {
        self.model_name
            .rsplit('/')
            .next()
            .unwrap_or(&self.model_name)
    }

    /// 原始 JSON 文件名：{模型短名}_{YYYY-MM-DD}.json
    pub fn raw_json_file_name(&self) -> String {
        format!("{}_{}.json", self.model_short_name(), self.run_date.format("%Y-%m-%d"))
    }

    /// 表格文件名：{前缀}_{YYYY-MM-DD}.csv
    pub fn table_file_name(&self, prefix: &str) -> String {
        format!("{}_{}.csv", prefix, self.run_date.format("%Y-%m-%d"))
    }

    /// 批次目录名 (运行日期往前 days_back 天)：YYYYMMDD
    pub fn batch_folder_name(&self, days_back: u64) -> String {
        self.run_date
            .checked_sub_days(Days::new(days_back))
            .unwrap_or(self.run_date)
            .format("%Y%m%d")
            .to_string()
    }
}
