use std::fmt;

use crate::session::SessionError;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 考试服务 API 调用错误
    Api(ApiError),
    /// 会话状态机错误
    Session(SessionError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Api(e) => write!(f, "API错误: {}", e),
            AppError::Session(e) => write!(f, "会话错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Api(e) => Some(e),
            AppError::Session(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 考试服务 API 调用错误
///
/// 对应三类可恢复失败：加载失败（可重试，考试未开始）、
/// 提交失败（内存状态保留，重试复用已累计的答案与计时）、
/// 成绩不存在（终态，只能放弃查询）
#[derive(Debug)]
pub enum ApiError {
    /// 拉取试卷失败（服务不可达或响应格式非法）
    LoadFailed {
        exam_id: String,
        detail: Option<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    /// 提交答卷失败
    SubmitFailed {
        exam_id: String,
        detail: Option<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    /// 查询不到对应的成绩记录
    ResultNotFound {
        exam_id: String,
        user_id: String,
    },
    /// API 返回错误响应
    BadResponse {
        endpoint: String,
        status: Option<u16>,
        message: Option<String>,
    },
    /// JSON 解析失败
    JsonParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::LoadFailed {
                exam_id,
                detail,
                source,
            } => match detail {
                Some(detail) => write!(f, "加载试卷 {} 失败: {}", exam_id, detail),
                None => match source {
                    Some(source) => write!(f, "加载试卷 {} 失败: {}", exam_id, source),
                    None => write!(f, "加载试卷 {} 失败", exam_id),
                },
            },
            ApiError::SubmitFailed {
                exam_id,
                detail,
                source,
            } => match detail {
                Some(detail) => write!(f, "提交答卷失败 (试卷: {}): {}", exam_id, detail),
                None => match source {
                    Some(source) => write!(f, "提交答卷失败 (试卷: {}): {}", exam_id, source),
                    None => write!(f, "提交答卷失败 (试卷: {})", exam_id),
                },
            },
            ApiError::ResultNotFound { exam_id, user_id } => {
                write!(f, "未找到成绩记录 (试卷: {}, 用户: {})", exam_id, user_id)
            }
            ApiError::BadResponse {
                endpoint,
                status,
                message,
            } => {
                write!(
                    f,
                    "API返回错误响应 ({}): status={:?}, message={:?}",
                    endpoint, status, message
                )
            }
            ApiError::JsonParseFailed { source } => write!(f, "JSON解析失败: {}", source),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::LoadFailed {
                source: Some(source),
                ..
            }
            | ApiError::SubmitFailed {
                source: Some(source),
                ..
            } => Some(source.as_ref() as &(dyn std::error::Error + 'static)),
            ApiError::JsonParseFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    FileReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileReadFailed { path, source } => {
                write!(f, "读取配置文件失败 ({}): {}", path, source)
            }
            ConfigError::TomlParseFailed { path, source } => {
                write!(f, "TOML解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileReadFailed { source, .. }
            | ConfigError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Session(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建试卷加载错误
    pub fn load_failed(
        exam_id: impl Into<String>,
        detail: Option<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        AppError::Api(ApiError::LoadFailed {
            exam_id: exam_id.into(),
            detail,
            source,
        })
    }

    /// 创建答卷提交错误
    pub fn submit_failed(
        exam_id: impl Into<String>,
        detail: Option<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        AppError::Api(ApiError::SubmitFailed {
            exam_id: exam_id.into(),
            detail,
            source,
        })
    }

    /// 创建成绩未找到错误
    pub fn result_not_found(exam_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        AppError::Api(ApiError::ResultNotFound {
            exam_id: exam_id.into(),
            user_id: user_id.into(),
        })
    }

    /// 创建错误响应错误
    pub fn bad_response(
        endpoint: impl Into<String>,
        status: Option<u16>,
        message: Option<String>,
    ) -> Self {
        AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.into(),
            status,
            message,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
