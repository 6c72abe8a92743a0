//! 应用层 - 命令行交互循环
//!
//! 只做胶水：读入一行命令、分发给流程层、打印结果。
//! 所有失败都在这里恢复为一条日志消息，循环继续。

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::ExamResult;
use crate::session::ExamSession;
use crate::timer;
use crate::utils::logging::truncate_text;
use crate::workflow::{ExamFlow, SubmitOutcome};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<ExamFlow>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);
        let flow = Arc::new(ExamFlow::new(&config));
        Ok(Self { config, flow })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        // 加载失败可恢复：考试未开始，提示后结束本次运行
        if let Err(e) = self.flow.load().await {
            error!("❌ 加载试卷失败: {}", e);
            error!("请确认考试服务可用后重试");
            return Ok(());
        }

        Arc::clone(&self.flow).start_countdown();

        print_help();
        if self.config.verbose_logging {
            print_stats(&self.flow.snapshot().await);
        }
        self.print_current().await;

        let stdin = tokio::io::stdin();
        let mut lines = BufReader::new(stdin).lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            let mut parts = line.split_whitespace();
            let command = match parts.next() {
                Some(command) => command,
                None => continue,
            };

            match command {
                "n" => {
                    match self.flow.next().await {
                        Ok(true) => self.print_current().await,
                        Ok(false) => warn!("⚠️ 已经是最后一题"),
                        Err(e) => error!("❌ {}", e),
                    }
                }
                "p" => {
                    match self.flow.previous().await {
                        Ok(true) => self.print_current().await,
                        Ok(false) => warn!("⚠️ 已经是第一题"),
                        Err(e) => error!("❌ {}", e),
                    }
                }
                "g" => match parts.next().and_then(|v| v.parse::<usize>().ok()) {
                    Some(number) if number >= 1 => {
                        match self.flow.select_question(number - 1).await {
                            Ok(()) => self.print_current().await,
                            Err(e) => error!("❌ {}", e),
                        }
                    }
                    _ => warn!("⚠️ 用法: g <题号>"),
                },
                "a" => match parts.next().and_then(|v| v.parse::<u32>().ok()) {
                    Some(number) if number >= 1 => {
                        match self.flow.set_answer(Some(number - 1)).await {
                            Ok(()) => self.print_current().await,
                            Err(e) => error!("❌ {}", e),
                        }
                    }
                    _ => warn!("⚠️ 用法: a <选项号>"),
                },
                "c" => match self.flow.clear_response().await {
                    Ok(()) => {
                        info!("✓ 已清除当前题作答");
                        self.print_current().await;
                    }
                    Err(e) => error!("❌ {}", e),
                },
                "m" => match self.flow.mark_for_review_and_next().await {
                    Ok(()) => {
                        info!("✓ 已标记待复查");
                        self.print_current().await;
                    }
                    Err(e) => error!("❌ {}", e),
                },
                "v" => self.print_current().await,
                "st" => print_stats(&self.flow.snapshot().await),
                "t" => info!(
                    "⏰ 剩余时间: {}",
                    timer::format_hms(self.flow.remaining_secs())
                ),
                "s" => match self.flow.submit().await {
                    Ok(SubmitOutcome::Submitted { user_id, receipt }) => {
                        info!("✓ {}", receipt.message);
                        info!("📄 成绩链接: {}", receipt.result_link);
                        self.print_result(&user_id).await;
                        break;
                    }
                    Ok(SubmitOutcome::InFlight) => warn!("⚠️ 已有提交在途，请稍候"),
                    Ok(SubmitOutcome::AlreadySubmitted) => warn!("⚠️ 答卷已提交"),
                    Err(e) => error!("❌ {}", e),
                },
                "r" => match self.flow.last_user_id() {
                    Some(user_id) => self.print_result(&user_id).await,
                    None => warn!("⚠️ 尚未成功提交，暂无成绩可查"),
                },
                "h" => print_help(),
                "q" => break,
                other => warn!("⚠️ 未知命令: {} (输入 h 查看帮助)", other),
            }
        }

        self.flow.abort_countdown();
        Ok(())
    }

    /// 打印当前题目
    async fn print_current(&self) {
        let session = self.flow.snapshot().await;
        print_question(&session);
    }

    /// 查询并打印成绩
    async fn print_result(&self, user_id: &str) {
        match self.flow.fetch_result(user_id).await {
            Ok(result) => print_result(&result),
            Err(e) => error!("❌ 查询成绩失败: {}", e),
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 在线考试客户端");
    info!("📄 试卷: {}", config.exam_id);
    info!(
        "⏰ 考试时长: {}",
        timer::format_hms(config.exam_duration_secs)
    );
    info!("{}", "=".repeat(60));
}

fn print_help() {
    info!("{}", "─".repeat(60));
    info!("命令: n 下一题 | p 上一题 | g <题号> 跳转 | a <选项号> 作答");
    info!("      c 清除作答 | m 标记并下一题 | v 查看当前题 | st 状态统计");
    info!("      t 剩余时间 | s 提交答卷 | r 查询成绩 | h 帮助 | q 退出");
    info!("{}", "─".repeat(60));
}

fn print_question(session: &ExamSession) {
    let index = session.current_index();
    let question = match session.current_question() {
        Some(question) => question,
        None => {
            warn!("⚠️ 当前没有题目");
            return;
        }
    };

    info!(
        "📝 第 {}/{} 题 [{}]",
        index + 1,
        session.len(),
        session.status_of(index)
    );
    info!("{}", truncate_text(&question.text, 120));

    let answer = session.answer_of(index);
    for (i, option) in question.options.iter().enumerate() {
        let marker = if answer == Some(i as u32) { "✓" } else { " " };
        info!("  {} {}. {}", marker, i + 1, truncate_text(option, 80));
    }
}

fn print_stats(session: &ExamSession) {
    let stats = session.stats();
    info!("{}", "─".repeat(60));
    info!("📊 答题进度 (共 {} 题)", stats.total);
    info!("  未访问: {}", stats.not_visited);
    info!("  未作答: {}", stats.not_answered);
    info!("  已作答: {}", stats.answered);
    info!("  标记复查: {}", stats.marked_for_review);
    info!("  已答并标记: {}", stats.answered_and_marked);
    info!("{}", "─".repeat(60));
}

fn print_result(result: &ExamResult) {
    info!("{}", "=".repeat(60));
    info!("📊 考试成绩");
    info!("  得分: {}/{}", result.score, result.total_questions);
    info!(
        "  作答: {} | 正确: {} | 错误: {}",
        result.attempted, result.correct, result.incorrect
    );
    info!(
        "  提交时间: {}",
        result.submitted_at.format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}
