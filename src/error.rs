// ==========================================
// 多供应商参数融合引擎 - 错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 融合核心不返回错误（失败即降级/落入下一策略）,
//       错误只出现在配置加载与并发批处理汇合处
// ==========================================

use thiserror::Error;

/// 融合引擎错误类型
#[derive(Error, Debug)]
pub enum FusionError {
    // ===== 配置相关错误 =====
    #[error("配置读取失败 (path: {path}): {message}")]
    ConfigRead { path: String, message: String },

    #[error("配置解析失败: {0}")]
    ConfigParse(String),

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValue {
        key: String,
        value: String,
        message: String,
    },

    // ===== 批处理错误 =====
    #[error("工作线程汇合失败: {0}")]
    WorkerJoin(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for FusionError {
    fn from(err: std::io::Error) -> Self {
        FusionError::ConfigRead {
            path: String::new(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FusionError {
    fn from(err: serde_json::Error) -> Self {
        FusionError::ConfigParse(err.to_string())
    }
}

impl From<tokio::task::JoinError> for FusionError {
    fn from(err: tokio::task::JoinError) -> Self {
        FusionError::WorkerJoin(err.to_string())
    }
}

/// Result 类型别名
pub type FusionResultT<T> = Result<T, FusionError>;
