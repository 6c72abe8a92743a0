use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 题目的稳定外部标识
///
/// 所有按标识建键的映射从一开始就使用该新类型，
/// 序列化时与裸整数完全等价，消除字符串/整数键的运行时转换
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct QuestionId(pub i64);

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 单道选择题
///
/// 加载进会话后不可变；选项数量至少为 2，常见为 4
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,

    /// 题干（服务端字段名为 question）
    #[serde(rename = "question")]
    pub text: String,

    pub options: Vec<String>,
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 截断题干内容以便显示（最多80个字符）
        let text_preview = if self.text.chars().count() > 80 {
            self.text.chars().take(80).collect::<String>() + "..."
        } else {
            self.text.clone()
        };
        write!(f, "[题目 #{}] {}", self.id, text_preview)
    }
}

/// GET /exam/{exam_id} 的响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamPaper {
    pub questions: Vec<Question>,
}

/// POST /exam/{exam_id}/submit 的请求体
///
/// answers 与 time_spent 均以题目标识建键；
/// 未作答的题目不出现在 answers 中（缺席，而不是 0）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub user_id: String,
    pub answers: HashMap<QuestionId, u32>,
    pub time_spent: HashMap<QuestionId, f64>,
    pub total_time: f64,
}

/// POST /exam/{exam_id}/submit 的响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    pub result_link: String,
    pub score: i64,
    pub total_questions: usize,
}

/// GET /result/{exam_id}/{user_id} 的响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamResult {
    pub exam_id: String,
    pub user_id: String,
    pub score: i64,
    pub total_questions: usize,
    pub attempted: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub time_spent: HashMap<QuestionId, f64>,
    pub submitted_at: DateTime<Utc>,
}

/// 服务端失败响应中的错误描述
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<String>,
}
