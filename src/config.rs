use serde::Deserialize;
use tracing::warn;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 考试服务 API 根地址
    pub exam_api_base_url: String,
    /// 要参加的试卷ID
    pub exam_id: String,
    /// 考试时长（秒）
    pub exam_duration_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

/// 配置文件中允许出现的字段（全部可选，缺省回退到默认值）
#[derive(Debug, Deserialize)]
struct FileConfig {
    exam_api_base_url: Option<String>,
    exam_id: Option<String>,
    exam_duration_secs: Option<u64>,
    verbose_logging: Option<bool>,
}

/// 默认配置文件路径
const CONFIG_FILE: &str = "exam_session.toml";

impl Default for Config {
    fn default() -> Self {
        Self {
            exam_api_base_url: "http://127.0.0.1:8000/api".to_string(),
            exam_id: "1".to_string(),
            // 与原服务保持一致：90 分钟
            exam_duration_secs: 90 * 60,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载完整配置：默认值 ← 配置文件 ← 环境变量（后者覆盖前者）
    pub fn load() -> Self {
        let base = match std::fs::read_to_string(CONFIG_FILE) {
            Ok(text) => match toml::from_str::<FileConfig>(&text) {
                Ok(file) => Self::default().merge_file(file),
                Err(e) => {
                    warn!("⚠️ 配置文件 {} 解析失败，使用默认配置: {}", CONFIG_FILE, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };
        base.merge_env()
    }

    /// 只从环境变量加载（基于默认值）
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    fn merge_file(self, file: FileConfig) -> Self {
        Self {
            exam_api_base_url: file.exam_api_base_url.unwrap_or(self.exam_api_base_url),
            exam_id: file.exam_id.unwrap_or(self.exam_id),
            exam_duration_secs: file.exam_duration_secs.unwrap_or(self.exam_duration_secs),
            verbose_logging: file.verbose_logging.unwrap_or(self.verbose_logging),
        }
    }

    fn merge_env(self) -> Self {
        Self {
            exam_api_base_url: std::env::var("EXAM_API_BASE_URL").unwrap_or(self.exam_api_base_url),
            exam_id: std::env::var("EXAM_ID").unwrap_or(self.exam_id),
            exam_duration_secs: std::env::var("EXAM_DURATION_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.exam_duration_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }
}
