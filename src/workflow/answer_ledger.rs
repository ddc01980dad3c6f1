//! 答题台账 - 流程层
//!
//! 客户端持有的本次答题记录：每道题的作答、累计经验值、完成标记。
//! 仅存在于会话内；持久化的进度记录由外部进度协作方负责。

use crate::models::QuizAnswer;
use crate::workflow::scoring::{self, FeedbackBand};

/// 一次测验的成绩摘要
#[derive(Debug, Clone)]
pub struct QuizSummary {
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
    pub passed: bool,
    pub xp_total: u32,
    pub band: FeedbackBand,
}

/// 答题台账
#[derive(Debug, Default)]
pub struct AnswerLedger {
    answers: Vec<QuizAnswer>,
    total_questions: usize,
    xp_total: u32,
}

impl AnswerLedger {
    /// 为一套题目建立新台账
    pub fn new(total_questions: usize) -> Self {
        Self {
            answers: Vec::with_capacity(total_questions),
            total_questions,
            xp_total: 0,
        }
    }

    /// 记录一次作答
    pub fn record(&mut self, answer: QuizAnswer, xp_earned: u32) {
        self.answers.push(answer);
        self.xp_total += xp_earned;
    }

    /// 已作答数量
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// 答对数量
    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }

    /// 累计经验值
    pub fn xp_total(&self) -> u32 {
        self.xp_total
    }

    /// 最后一道题作答完毕即视为完成
    pub fn is_completed(&self) -> bool {
        self.total_questions > 0 && self.answers.len() >= self.total_questions
    }

    /// 全部作答记录
    pub fn answers(&self) -> &[QuizAnswer] {
        &self.answers
    }

    /// 汇总本次测验的成绩
    pub fn summary(&self) -> QuizSummary {
        let correct = self.correct_count();
        let percentage = scoring::percentage(correct, self.total_questions);
        QuizSummary {
            correct,
            total: self.total_questions,
            percentage,
            passed: scoring::passed(percentage, scoring::PASS_THRESHOLD),
            xp_total: self.xp_total,
            band: FeedbackBand::for_percentage(percentage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(question_id: u64, is_correct: bool) -> QuizAnswer {
        QuizAnswer {
            question_id,
            selected_option_id: question_id * 10,
            is_correct,
            correct_option_id: question_id * 10 + 1,
        }
    }

    #[test]
    fn test_ledger_accumulates_xp_and_completion() {
        let mut ledger = AnswerLedger::new(3);
        assert!(!ledger.is_completed());

        ledger.record(answer(1, true), 5);
        ledger.record(answer(2, false), 0);
        assert!(!ledger.is_completed());
        assert_eq!(ledger.xp_total(), 5);

        ledger.record(answer(3, true), 5);
        assert!(ledger.is_completed());
        assert_eq!(ledger.xp_total(), 10);
        assert_eq!(ledger.correct_count(), 2);
    }

    #[test]
    fn test_summary_for_two_of_three() {
        let mut ledger = AnswerLedger::new(3);
        ledger.record(answer(1, true), 5);
        ledger.record(answer(2, true), 5);
        ledger.record(answer(3, false), 0);

        let summary = ledger.summary();
        assert_eq!(summary.correct, 2);
        assert_eq!(summary.percentage, 67);
        assert!(summary.passed);
        assert_eq!(summary.xp_total, 10);
        assert_eq!(summary.band, FeedbackBand::Good);
    }

    #[test]
    fn test_empty_ledger_not_completed() {
        let ledger = AnswerLedger::new(0);
        assert!(!ledger.is_completed());
        assert_eq!(ledger.summary().percentage, 0);
    }
}
