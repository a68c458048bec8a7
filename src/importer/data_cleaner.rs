// ==========================================
// 多供应商参数融合引擎 - 数据清洗器实现
// ==========================================
// 职责: TRIM / 全角空格标准化 / NULL 标准化 / 无数据占位词识别
// ==========================================

use crate::config::Dictionaries;
use crate::importer::cell_trait::CellCleaner;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct DataCleaner {
    dictionaries: Arc<Dictionaries>,
}

impl DataCleaner {
    pub fn new(dictionaries: Arc<Dictionaries>) -> Self {
        Self { dictionaries }
    }

    /// 清洗一行供应商值, 只保留有效值（保持原顺序）
    pub fn clean_values(&self, values: &[Option<String>]) -> Vec<String> {
        values
            .iter()
            .filter_map(|v| self.normalize_null(v.as_deref()))
            .collect()
    }

    /// 单元格是否为空（空白或无数据占位词）
    pub fn is_empty_cell(&self, value: Option<&str>) -> bool {
        self.normalize_null(value).is_none()
    }
}

impl CellCleaner for DataCleaner {
    fn clean_text(&self, value: &str) -> String {
        value.replace('\u{3000}', " ").trim().to_string()
    }

    fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let cleaned = self.clean_text(v);
            if cleaned.is_empty() || self.dictionaries.is_no_data(&cleaned) {
                None
            } else {
                Some(cleaned)
            }
        })
    }
}
