/// 考试服务 API 客户端
///
/// 封装所有与考试内容/评分服务相关的调用逻辑。
/// 客户端本身不做自动重试，失败如何恢复由调用方决定。
use reqwest::StatusCode;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::question::ErrorBody;
use crate::models::{ExamPaper, ExamResult, SubmitRequest, SubmitResponse};

/// 考试服务 API 客户端
pub struct ExamClient {
    http: reqwest::Client,
    base_url: String,
}

impl ExamClient {
    /// 创建新的考试服务客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.exam_api_base_url.clone(),
        }
    }

    /// 拉取试卷
    ///
    /// # 参数
    /// - `exam_id`: 试卷ID
    ///
    /// # 返回
    /// 返回完整的题目列表；服务不可达或响应非法均视为加载失败
    pub async fn fetch_exam(&self, exam_id: &str) -> AppResult<ExamPaper> {
        let url = format!("{}/exam/{}", self.base_url, exam_id);
        debug!("拉取试卷: {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::load_failed(exam_id, None, Some(Box::new(e))))?;

        if !response.status().is_success() {
            let detail = Self::extract_detail(response).await;
            return Err(AppError::load_failed(exam_id, detail, None));
        }

        let paper: ExamPaper = response
            .json()
            .await
            .map_err(|e| AppError::load_failed(exam_id, None, Some(Box::new(e))))?;

        // 题目为空或选项不足的试卷视为格式非法
        if paper.questions.is_empty() {
            return Err(AppError::load_failed(
                exam_id,
                Some("试卷不包含任何题目".to_string()),
                None,
            ));
        }
        if let Some(bad) = paper.questions.iter().find(|q| q.options.len() < 2) {
            return Err(AppError::load_failed(
                exam_id,
                Some(format!("题目 {} 的选项不足 2 个", bad.id)),
                None,
            ));
        }

        Ok(paper)
    }

    /// 提交答卷
    ///
    /// # 参数
    /// - `exam_id`: 试卷ID
    /// - `payload`: 提交载荷
    ///
    /// # 返回
    /// 返回评分服务的提交回执
    pub async fn submit_exam(
        &self,
        exam_id: &str,
        payload: &SubmitRequest,
    ) -> AppResult<SubmitResponse> {
        let url = format!("{}/exam/{}/submit", self.base_url, exam_id);
        debug!("提交答卷: {} (用户: {})", url, payload.user_id);

        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::submit_failed(exam_id, None, Some(Box::new(e))))?;

        if !response.status().is_success() {
            let detail = Self::extract_detail(response).await;
            return Err(AppError::submit_failed(exam_id, detail, None));
        }

        let receipt: SubmitResponse = response
            .json()
            .await
            .map_err(|e| AppError::submit_failed(exam_id, None, Some(Box::new(e))))?;

        debug!("提交回执: {}", receipt.message);
        Ok(receipt)
    }

    /// 查询成绩
    ///
    /// # 参数
    /// - `exam_id`: 试卷ID
    /// - `user_id`: 提交时生成的用户标识
    pub async fn fetch_result(&self, exam_id: &str, user_id: &str) -> AppResult<ExamResult> {
        let url = format!("{}/result/{}/{}", self.base_url, exam_id, user_id);
        debug!("查询成绩: {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::bad_response(url.clone(), None, Some(e.to_string())))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::result_not_found(exam_id, user_id));
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = Self::extract_detail(response).await;
            return Err(AppError::bad_response(url, Some(status), detail));
        }

        let result: ExamResult = response
            .json()
            .await
            .map_err(|e| AppError::bad_response(url, None, Some(e.to_string())))?;

        Ok(result)
    }

    /// 从失败响应中提取服务端错误描述（没有则为 None）
    async fn extract_detail(response: reqwest::Response) -> Option<String> {
        response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
    }
}
