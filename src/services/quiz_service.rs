//! 答题读取与判分服务 - 业务能力层
//!
//! 取题边界：按材料 id 读出题目列表，剥离正确性标记后交给答题端；
//! 没有题目时返回 None——"未找到"是一等信号，不是错误。
//! 提交边界：判定所选选项的对错，返回正确选项和获得的经验值。

use std::sync::Arc;

use tracing::info;

use crate::error::{QuizError, StoreError};
use crate::models::{AnswerOutcome, PlayerQuestion};
use crate::storage::QuizStore;
use crate::workflow::scoring;

/// 答题服务
pub struct QuizService<S> {
    store: Arc<S>,
}

impl<S> QuizService<S>
where
    S: QuizStore,
{
    /// 创建新的答题服务
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// 按材料 id 读取答题端题目列表
    ///
    /// # 返回
    /// - `None`: 该材料还没有题目（客户端据此触发生成）
    /// - `Some`: 按题号排序、已剥离正确性标记的题目列表
    pub async fn fetch_for_player(
        &self,
        material_id: u64,
    ) -> Result<Option<Vec<PlayerQuestion>>, StoreError> {
        let stored = self.store.questions_with_options(material_id).await?;
        if stored.is_empty() {
            return Ok(None);
        }
        Ok(Some(stored.iter().map(PlayerQuestion::from_stored).collect()))
    }

    /// 提交一道题的答案
    ///
    /// # 参数
    /// - `user_id`: 答题学员 id（进度记录由外部协作方消费）
    /// - `question_id`: 题目 id
    /// - `selected_option_id`: 所选选项 id
    ///
    /// # 返回
    /// 返回判分结果：是否正确、正确选项 id、获得的经验值
    pub async fn submit_answer(
        &self,
        user_id: u64,
        question_id: u64,
        selected_option_id: u64,
    ) -> Result<AnswerOutcome, QuizError> {
        let options = self.store.options_for_question(question_id).await?;
        if options.is_empty() {
            return Err(QuizError::QuestionNotFound { question_id });
        }

        let selected = options
            .iter()
            .find(|o| o.id == selected_option_id)
            .ok_or(QuizError::OptionNotFound {
                question_id,
                option_id: selected_option_id,
            })?;

        // 部分写入可能留下没有正确选项的孤儿题，显式报错而不是判错
        let correct = options
            .iter()
            .find(|o| o.is_correct)
            .ok_or(QuizError::CorrectOptionMissing { question_id })?;

        let xp_earned = if selected.is_correct {
            scoring::XP_PER_QUESTION
        } else {
            0
        };

        info!(
            "[学员 {}] 题目 {} 作答: 选 {} {}，获得 {} XP",
            user_id,
            question_id,
            selected.letter,
            if selected.is_correct { "✓" } else { "✗" },
            xp_earned
        );

        Ok(AnswerOutcome {
            is_correct: selected.is_correct,
            correct_option_id: correct.id,
            xp_earned,
        })
    }
}
