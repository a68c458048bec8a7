// ==========================================
// 多供应商参数融合引擎 - 单元格处理 Trait
// ==========================================
// 职责: 定义单元格清洗 / 整合参数预处理接口（不包含实现）
// 红线: 两个接口都不返回错误, 处理失败时退化为原值或空值
// ==========================================

// ==========================================
// CellCleaner Trait
// ==========================================
// 用途: 供应商单元格基础清洗（TRIM / 空值标准化 / 无数据占位词）
// 实现者: DataCleaner
pub trait CellCleaner: Send + Sync {
    /// 清洗单元格文本（去首尾空白, 全角空格转半角）
    fn clean_text(&self, value: &str) -> String;

    /// 空值标准化
    ///
    /// # 返回
    /// - Some(String): 清洗后的有效值
    /// - None: 空单元格、纯空白或无数据占位词
    fn normalize_null(&self, value: Option<&str>) -> Option<String>;
}

// ==========================================
// CellPreprocessor Trait
// ==========================================
// 用途: 整合参数单元格拆分, 只保留与当前参数相关的片段
// 实现者: IntegratedCellPreprocessor
pub trait CellPreprocessor: Send + Sync {
    /// 预处理单个供应商值
    ///
    /// # 参数
    /// - value: 供应商原始值
    /// - parameter_name: 当前行参数名称
    ///
    /// # 返回
    /// 相关片段; 非整合参数或未找到相关片段时返回原值
    fn preprocess(&self, value: &str, parameter_name: &str) -> String;

    /// 批量预处理一行的供应商值（空单元格保持为空）
    fn preprocess_row(
        &self,
        values: &[Option<String>],
        parameter_name: &str,
    ) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| v.as_deref().map(|s| self.preprocess(s, parameter_name)))
            .collect()
    }
}
