// ==========================================
// 多供应商参数融合引擎 - 导入层
// ==========================================
// 职责: 供应商单元格进入融合核心前的清洗与整合参数拆分
// 说明: 表格文件的读写由外部调用方负责, 本层只处理内存中的字符串
// ==========================================

// 模块声明
pub mod cell_trait;
pub mod data_cleaner;
pub mod integrated_cell;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use integrated_cell::{
    IntegratedCellPreprocessor, ParameterParser, ParsedSegment, SegmentSpecs, UNKNOWN_CATEGORY,
};

// 重导出 Trait 接口
pub use cell_trait::{CellCleaner, CellPreprocessor};
