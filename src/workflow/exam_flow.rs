//! 考试流程编排 - 流程层
//!
//! 核心职责：把会话仓库、转移策略、停留计时、倒计时与服务客户端
//! 组合成"一次考试"的完整动作集合，并守住两条约定：
//!
//! 1. 导航顺序约定：每次切题严格按"结算离开题状态 → 结算停留时间 →
//!    切换当前题 → 重置计时起点"执行，状态与答案落账完成之后
//!    导航才开始
//! 2. 单飞提交：重复点击、倒计时到期与手动提交的竞争都折叠为
//!    至多一次在途的提交请求；失败后守卫放开，内存状态保留供重试

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex as StdMutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::clients::ExamClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{ExamResult, SubmitRequest, SubmitResponse};
use crate::session::{next_status, ExamSession, NavAction, QuestionClock, SessionError};
use crate::submission;
use crate::timer;

/// 提交动作的结果
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// 提交成功
    Submitted {
        user_id: String,
        receipt: SubmitResponse,
    },
    /// 已有一次提交在途，本次调用被折叠
    InFlight,
    /// 会话早已提交
    AlreadySubmitted,
}

/// 会话状态与计时起点必须在同一把锁下变更，导航顺序约定才成立
struct FlowInner {
    session: ExamSession,
    clock: QuestionClock,
}

/// 考试流程
pub struct ExamFlow {
    client: ExamClient,
    exam_id: String,
    duration: Duration,
    inner: Mutex<FlowInner>,
    /// 单飞守卫
    submitting: AtomicBool,
    /// 倒计时剩余秒数（由 tick 回调刷新，供展示读取）
    remaining_secs: AtomicU64,
    countdown: StdMutex<Option<JoinHandle<()>>>,
    last_user_id: StdMutex<Option<String>>,
}

impl ExamFlow {
    /// 创建新的考试流程
    pub fn new(config: &Config) -> Self {
        Self {
            client: ExamClient::new(config),
            exam_id: config.exam_id.clone(),
            duration: Duration::from_secs(config.exam_duration_secs),
            inner: Mutex::new(FlowInner {
                session: ExamSession::new(),
                clock: QuestionClock::new(),
            }),
            submitting: AtomicBool::new(false),
            remaining_secs: AtomicU64::new(config.exam_duration_secs),
            countdown: StdMutex::new(None),
            last_user_id: StdMutex::new(None),
        }
    }

    pub fn exam_id(&self) -> &str {
        &self.exam_id
    }

    // ========== 加载 ==========

    /// 从服务加载试卷并开始考试
    ///
    /// 同一试卷重复调用是幂等的空操作；首次加载成功后第 1 题
    /// 立即计入访问并开始计时
    ///
    /// # 返回
    /// 返回题目数量
    pub async fn load(&self) -> AppResult<usize> {
        {
            let inner = self.inner.lock().await;
            if inner.session.exam_id() == Some(self.exam_id.as_str())
                && !inner.session.is_empty()
            {
                debug!("试卷 {} 已加载，跳过重复加载", self.exam_id);
                return Ok(inner.session.len());
            }
        }

        info!("🔍 正在加载试卷 {} ...", self.exam_id);
        let paper = self.client.fetch_exam(&self.exam_id).await?;

        let mut inner = self.inner.lock().await;
        let count = paper.questions.len();
        if inner.session.load_questions(&self.exam_id, paper.questions) {
            inner.session.start();
            inner.session.select_question(0)?;
            inner.clock.enter(0, Instant::now());
            info!("✓ 试卷加载完成，共 {} 题，考试开始", count);
        }
        Ok(count)
    }

    // ========== 导航与作答 ==========

    /// 切换到指定题目
    ///
    /// 执行顺序固定：① 按策略结算离开题的状态 → ② 结算停留时间 →
    /// ③ 切换当前题（首次访问规则在仓库内部）→ ④ 重置计时起点
    pub async fn select_question(&self, index: usize) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.session.is_submitted() {
            return Err(SessionError::AlreadySubmitted.into());
        }
        let now = Instant::now();

        // ① 离开题的状态按策略落账
        let current = inner.session.current_index();
        let has_answer = inner.session.answer_of(current).is_some();
        let status = next_status(
            inner.session.status_of(current),
            has_answer,
            NavAction::Navigate,
        );
        inner.session.set_status(current, status)?;

        // ② 停留时间落账（至多一次）
        if let Some((left, secs)) = inner.clock.leave(now) {
            inner.session.add_elapsed(left, secs)?;
        }

        // ③ 切换当前题
        inner.session.select_question(index)?;

        // ④ 重置计时起点
        inner.clock.enter(index, now);
        Ok(())
    }

    /// 下一题（最后一题时原地不动）
    ///
    /// # 返回
    /// 是否发生了切换
    pub async fn next(&self) -> AppResult<bool> {
        let (current, len) = {
            let inner = self.inner.lock().await;
            (inner.session.current_index(), inner.session.len())
        };
        if current + 1 < len {
            self.select_question(current + 1).await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// 上一题（第一题时原地不动）
    pub async fn previous(&self) -> AppResult<bool> {
        let current = {
            let inner = self.inner.lock().await;
            inner.session.current_index()
        };
        if current > 0 {
            self.select_question(current - 1).await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// 为当前题选择选项（None 表示取消选择）
    ///
    /// 只记录答案，状态在导航或显式动作时才落账
    pub async fn set_answer(&self, option: Option<u32>) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.session.is_submitted() {
            return Err(SessionError::AlreadySubmitted.into());
        }
        let current = inner.session.current_index();
        inner.session.set_answer(current, option)?;
        Ok(())
    }

    /// 标记当前题待复查并前进一题
    ///
    /// 标记立即同步落账，之后才开始导航
    pub async fn mark_for_review_and_next(&self) -> AppResult<()> {
        {
            let mut inner = self.inner.lock().await;
            if inner.session.is_submitted() {
                return Err(SessionError::AlreadySubmitted.into());
            }
            let current = inner.session.current_index();
            let has_answer = inner.session.answer_of(current).is_some();
            let status = next_status(
                inner.session.status_of(current),
                has_answer,
                NavAction::MarkForReview,
            );
            inner.session.set_status(current, status)?;
        }
        self.next().await?;
        Ok(())
    }

    /// 清除当前题的作答
    pub async fn clear_response(&self) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.session.is_submitted() {
            return Err(SessionError::AlreadySubmitted.into());
        }
        let current = inner.session.current_index();
        inner.session.set_answer(current, None)?;
        let status = next_status(
            inner.session.status_of(current),
            false,
            NavAction::ClearResponse,
        );
        inner.session.set_status(current, status)?;
        Ok(())
    }

    // ========== 提交 ==========

    /// 提交答卷（单飞）
    ///
    /// 并发的调用折叠为一次外呼；失败后守卫放开、内存状态保留，
    /// 重试直接复用已累计的答案与计时
    pub async fn submit(&self) -> AppResult<SubmitOutcome> {
        // 单飞守卫
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("已有提交在途，折叠本次调用");
            return Ok(SubmitOutcome::InFlight);
        }

        let payload = match self.settle_and_build().await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                self.submitting.store(false, Ordering::SeqCst);
                return Ok(SubmitOutcome::AlreadySubmitted);
            }
            Err(e) => {
                self.submitting.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        info!(
            "📤 正在提交答卷 (试卷: {}, 已答 {} 题, 总用时 {:.1} 秒) ...",
            self.exam_id,
            payload.answers.len(),
            payload.total_time
        );

        match self.client.submit_exam(&self.exam_id, &payload).await {
            Ok(receipt) => {
                {
                    let mut inner = self.inner.lock().await;
                    inner.session.submit();
                }
                // 会话先冻结、倒计时再取消，迟到的 tick 无法触发第二次提交
                self.abort_countdown();
                if let Ok(mut slot) = self.last_user_id.lock() {
                    *slot = Some(payload.user_id.clone());
                }
                self.submitting.store(false, Ordering::SeqCst);
                info!(
                    "✓ 提交成功: 得分 {}/{}",
                    receipt.score, receipt.total_questions
                );
                Ok(SubmitOutcome::Submitted {
                    user_id: payload.user_id,
                    receipt,
                })
            }
            Err(e) => {
                // 失败重试前当前题继续计时
                {
                    let mut inner = self.inner.lock().await;
                    let current = inner.session.current_index();
                    inner.clock.enter(current, Instant::now());
                }
                self.submitting.store(false, Ordering::SeqCst);
                warn!("⚠️ 提交失败，答案与计时已保留，可直接重试: {}", e);
                Err(e)
            }
        }
    }

    /// 结算当前题并构建提交载荷（锁内完成，网络调用在锁外）
    ///
    /// # 返回
    /// 会话早已提交时返回 None
    async fn settle_and_build(&self) -> AppResult<Option<SubmitRequest>> {
        let mut inner = self.inner.lock().await;
        if inner.session.is_submitted() {
            return Ok(None);
        }
        let now = Instant::now();

        let current = inner.session.current_index();
        let has_answer = inner.session.answer_of(current).is_some();
        let status = next_status(
            inner.session.status_of(current),
            has_answer,
            NavAction::Navigate,
        );
        inner.session.set_status(current, status)?;

        if let Some((left, secs)) = inner.clock.leave(now) {
            inner.session.add_elapsed(left, secs)?;
        }

        Ok(Some(submission::build_payload(&inner.session)))
    }

    // ========== 倒计时 ==========

    /// 启动倒计时；到期时恰好强制提交一次
    pub fn start_countdown(self: Arc<Self>) {
        let duration = self.duration;
        let tick_flow = Arc::clone(&self);
        let expire_flow = Arc::clone(&self);

        let handle = tokio::spawn(timer::drive(
            duration,
            move |remaining| {
                tick_flow
                    .remaining_secs
                    .store(remaining.as_secs(), Ordering::SeqCst);
            },
            move || async move {
                warn!("⏰ 考试时间到，强制提交答卷");
                match expire_flow.submit().await {
                    Ok(SubmitOutcome::Submitted { user_id, .. }) => {
                        info!("✓ 强制提交完成 (用户: {})", user_id);
                    }
                    Ok(outcome) => debug!("强制提交未执行: {:?}", outcome),
                    Err(e) => error!("❌ 强制提交失败: {}", e),
                }
            },
        ));

        if let Ok(mut slot) = self.countdown.lock() {
            *slot = Some(handle);
        }
    }

    /// 取消倒计时循环（提交成功或会话销毁时调用）
    pub fn abort_countdown(&self) {
        if let Ok(mut slot) = self.countdown.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
        self.remaining_secs.store(0, Ordering::SeqCst);
    }

    /// 倒计时剩余秒数
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs.load(Ordering::SeqCst)
    }

    // ========== 查询 ==========

    /// 会话快照（仅用于展示）
    pub async fn snapshot(&self) -> ExamSession {
        self.inner.lock().await.session.clone()
    }

    /// 最近一次成功提交使用的用户标识
    pub fn last_user_id(&self) -> Option<String> {
        self.last_user_id.lock().ok().and_then(|slot| slot.clone())
    }

    /// 查询本场考试的成绩
    pub async fn fetch_result(&self, user_id: &str) -> AppResult<ExamResult> {
        self.client.fetch_result(&self.exam_id, user_id).await
    }
}
