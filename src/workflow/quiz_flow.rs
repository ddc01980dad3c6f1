//! 取题流程 - 流程层
//!
//! 核心职责：定义"一次测验"从取题到作答的完整状态机
//!
//! 状态走向：
//! 1. Idle → Fetching → Ready（题目已存在）
//! 2. Idle → Fetching → NotFound → Generating → Fetching → Ready（首次生成）
//! 3. 本实例已有生成在途时 → Polling（定时重新取题，次数封顶）
//!
//! 生成阶段以"带句柄的状态变体"表示，而不是独立的布尔标志：
//! 状态转移因此是显式的、可单独测试的。该守卫只防住本实例的
//! 重复触发；跨实例的去重由存储层唯一约束负责。
//!
//! 终止状态 Ready / Failed / TimedOut 都带有面向学员的文案，
//! 且随时可以手动重试——学员永远不会停在既无题目也无出路的界面上。

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clients::{CompletionGateway, ContentProvider};
use crate::config::Config;
use crate::error::{GenerationError, QuizError};
use crate::models::{AnswerOutcome, PlayerQuestion, QuizAnswer};
use crate::services::{GenerationOutcome, GenerationRequest, GenerationService, QuizService};
use crate::storage::QuizStore;
use crate::workflow::answer_ledger::{AnswerLedger, QuizSummary};

/// 等待生成超时的学员文案
const TIMEOUT_MESSAGE: &str = "题目生成时间过长，请稍后重试";

/// 取题流程的状态
///
/// `Generating` 持有分离任务的句柄；丢弃句柄只会停止本地等待，
/// 远端生成仍会继续，之后的取题可能看到它超时后才写入的数据。
#[derive(Debug)]
pub enum QuizPhase {
    /// 尚未开始
    Idle,
    /// 正在读取题目
    Fetching,
    /// 题目不存在（一等信号，不是错误）
    NotFound,
    /// 生成在途
    Generating {
        task: JoinHandle<Result<GenerationOutcome, GenerationError>>,
    },
    /// 正在轮询等待别处触发的生成完成
    Polling { attempt: u32 },
    /// 题目就绪，可以作答
    Ready { questions: Vec<PlayerQuestion> },
    /// 失败（带学员可读的文案，可手动重试）
    Failed { message: String },
    /// 等待超时（带学员可读的文案，可手动重试）
    TimedOut { message: String },
}

/// 取题流程
///
/// 单实例内协作式单线程：只在网络调用边界挂起，
/// 同一实例不会有两个状态转移并发执行。
pub struct QuizFlow<C, G, S> {
    content: Arc<C>,
    generation: Arc<GenerationService<G, S>>,
    quiz: Arc<QuizService<S>>,
    user_id: u64,
    phase: QuizPhase,
    ledger: AnswerLedger,
    generation_deadline: Duration,
    poll_interval: Duration,
    poll_max_attempts: u32,
}

impl<C, G, S> QuizFlow<C, G, S>
where
    C: ContentProvider,
    G: CompletionGateway,
    S: QuizStore,
{
    /// 创建新的取题流程
    pub fn new(
        content: Arc<C>,
        generation: Arc<GenerationService<G, S>>,
        quiz: Arc<QuizService<S>>,
        user_id: u64,
        config: &Config,
    ) -> Self {
        Self {
            content,
            generation,
            quiz,
            user_id,
            phase: QuizPhase::Idle,
            ledger: AnswerLedger::default(),
            generation_deadline: Duration::from_secs(config.generation_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            poll_max_attempts: config.poll_max_attempts,
        }
    }

    /// 当前状态
    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    /// 当前答题台账
    pub fn ledger(&self) -> &AnswerLedger {
        &self.ledger
    }

    /// 就绪时的题目列表
    pub fn questions(&self) -> Option<&[PlayerQuestion]> {
        match &self.phase {
            QuizPhase::Ready { questions } => Some(questions),
            _ => None,
        }
    }

    /// 加载一份材料的题目：存在即就绪，不存在则触发生成
    pub async fn load(&mut self, material_id: u64) {
        // 本实例已有生成在途（上一次加载被中途放弃）：只轮询，不重复触发
        if matches!(self.phase, QuizPhase::Generating { .. }) {
            info!("[材料 {}] 生成已在途，转入轮询", material_id);
            self.poll_until_ready(material_id).await;
            return;
        }

        self.phase = QuizPhase::Fetching;
        match self.quiz.fetch_for_player(material_id).await {
            Ok(Some(questions)) => self.enter_ready(material_id, questions),
            Ok(None) => {
                self.phase = QuizPhase::NotFound;
                self.generate_and_refetch(material_id).await;
            }
            Err(e) => self.fail(material_id, format!("读取题目失败: {}", e)),
        }
    }

    /// 手动重试：任何终止状态都可以重新发起加载
    pub async fn retry(&mut self, material_id: u64) {
        info!("[材料 {}] 🔄 手动重试", material_id);
        self.load(material_id).await;
    }

    /// 提交一道题的答案并记入台账
    pub async fn submit_answer(
        &mut self,
        question_id: u64,
        selected_option_id: u64,
    ) -> Result<AnswerOutcome, QuizError> {
        let outcome = self
            .quiz
            .submit_answer(self.user_id, question_id, selected_option_id)
            .await?;

        self.ledger.record(
            QuizAnswer {
                question_id,
                selected_option_id,
                is_correct: outcome.is_correct,
                correct_option_id: outcome.correct_option_id,
            },
            outcome.xp_earned,
        );

        if self.ledger.is_completed() {
            let summary = self.summary();
            info!(
                "[学员 {}] 🎉 测验完成: {}/{} 正确 ({}%)，共 {} XP，{}",
                self.user_id,
                summary.correct,
                summary.total,
                summary.percentage,
                summary.xp_total,
                summary.band.message()
            );
        }

        Ok(outcome)
    }

    /// 当前成绩摘要
    pub fn summary(&self) -> QuizSummary {
        self.ledger.summary()
    }

    // ========== 内部状态转移 ==========

    /// 触发生成并在硬截止时间内等待，然后重新取题
    async fn generate_and_refetch(&mut self, material_id: u64) {
        info!("[材料 {}] 题目不存在，触发生成", material_id);

        let material = match self.content.material(material_id).await {
            Ok(material) => material,
            Err(e) => {
                self.fail(material_id, format!("获取材料内容失败: {}", e));
                return;
            }
        };

        // 生成作为分离任务运行：本地放弃等待不会取消远端副作用
        let request = GenerationRequest::from_material(&material);
        let service = Arc::clone(&self.generation);
        let task = tokio::spawn(async move { service.generate(request).await });
        self.phase = QuizPhase::Generating { task };

        self.await_generation(material_id).await;
    }

    /// 在硬截止时间内等待生成在途任务
    ///
    /// 超时只停止本地等待；句柄被丢弃后远端生成仍在继续，
    /// 之后的取题可能看到超时之后才写入的数据。
    async fn await_generation(&mut self, material_id: u64) {
        let deadline = self.generation_deadline;
        let result = {
            let QuizPhase::Generating { task } = &mut self.phase else {
                return;
            };
            tokio::time::timeout(deadline, task).await
        };

        match result {
            Ok(Ok(Ok(GenerationOutcome::Created(questions)))) => {
                info!("[材料 {}] ✓ 生成完成，{} 道题", material_id, questions.len());
                self.refetch_after_generation(material_id).await;
            }
            Ok(Ok(Ok(GenerationOutcome::AlreadyExists))) => {
                // 并发的另一次请求抢先完成了生成
                info!("[材料 {}] 题目已由其他请求生成", material_id);
                self.refetch_after_generation(material_id).await;
            }
            Ok(Ok(Err(e))) => {
                warn!("[材料 {}] ⚠️ 生成失败: {}", material_id, e);
                self.fail(material_id, format!("题目生成失败: {}", e));
            }
            Ok(Err(join_err)) => {
                self.fail(material_id, format!("生成任务异常退出: {}", join_err));
            }
            Err(_elapsed) => {
                warn!("[材料 {}] ⏰ 等待生成超时", material_id);
                self.phase = QuizPhase::TimedOut {
                    message: TIMEOUT_MESSAGE.to_string(),
                };
            }
        }
    }

    /// 生成结束后重新取题
    async fn refetch_after_generation(&mut self, material_id: u64) {
        self.phase = QuizPhase::Fetching;
        match self.quiz.fetch_for_player(material_id).await {
            Ok(Some(questions)) => self.enter_ready(material_id, questions),
            Ok(None) => {
                self.fail(material_id, "生成已完成但题目仍不可用，请重试".to_string());
            }
            Err(e) => self.fail(material_id, format!("读取题目失败: {}", e)),
        }
    }

    /// 定时重新取题，次数封顶
    async fn poll_until_ready(&mut self, material_id: u64) {
        for attempt in 1..=self.poll_max_attempts {
            self.phase = QuizPhase::Polling { attempt };
            tokio::time::sleep(self.poll_interval).await;

            match self.quiz.fetch_for_player(material_id).await {
                Ok(Some(questions)) => {
                    info!(
                        "[材料 {}] ✓ 轮询第 {} 次取到题目",
                        material_id, attempt
                    );
                    self.enter_ready(material_id, questions);
                    return;
                }
                Ok(None) => {
                    debug!(
                        "[材料 {}] 轮询 {}/{}: 题目尚未就绪",
                        material_id, attempt, self.poll_max_attempts
                    );
                }
                Err(e) => {
                    self.fail(material_id, format!("读取题目失败: {}", e));
                    return;
                }
            }
        }

        warn!(
            "[材料 {}] ⏰ 轮询 {} 次后仍未就绪",
            material_id, self.poll_max_attempts
        );
        self.phase = QuizPhase::TimedOut {
            message: TIMEOUT_MESSAGE.to_string(),
        };
    }

    /// 进入就绪状态并重置答题台账
    fn enter_ready(&mut self, material_id: u64, questions: Vec<PlayerQuestion>) {
        info!(
            "[材料 {}] ✓ 题目就绪，共 {} 道",
            material_id,
            questions.len()
        );
        self.ledger = AnswerLedger::new(questions.len());
        self.phase = QuizPhase::Ready { questions };
    }

    /// 进入失败状态
    fn fail(&mut self, material_id: u64, message: String) {
        warn!("[材料 {}] ⚠️ {}", material_id, message);
        self.phase = QuizPhase::Failed { message };
    }
}
