//! 判分辅助函数
//!
//! 全部为确定性纯函数，无副作用

/// 每答对一题奖励的经验值
pub const XP_PER_QUESTION: u32 = 5;
/// 及格线（百分比）
pub const PASS_THRESHOLD: u32 = 60;

/// 计算正确率百分比（四舍五入）
///
/// total 为 0 时返回 0
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as u32
}

/// 是否达到及格线
pub fn passed(percentage: u32, threshold: u32) -> bool {
    percentage >= threshold
}

/// 计算获得的经验值
pub fn xp(correct: usize, per_question: u32) -> u32 {
    correct as u32 * per_question
}

/// 成绩反馈档位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackBand {
    /// 100 分
    Perfect,
    /// 80 分及以上
    Excellent,
    /// 60 分及以上（及格）
    Good,
    /// 40 分及以上
    Fair,
    /// 40 分以下
    NeedsPractice,
}

impl FeedbackBand {
    /// 按百分比确定反馈档位
    pub fn for_percentage(percentage: u32) -> Self {
        if percentage >= 100 {
            FeedbackBand::Perfect
        } else if percentage >= 80 {
            FeedbackBand::Excellent
        } else if percentage >= 60 {
            FeedbackBand::Good
        } else if percentage >= 40 {
            FeedbackBand::Fair
        } else {
            FeedbackBand::NeedsPractice
        }
    }

    /// 展示给学员的反馈语
    pub fn message(&self) -> &'static str {
        match self {
            FeedbackBand::Perfect => "满分！完美掌握！",
            FeedbackBand::Excellent => "非常优秀！",
            FeedbackBand::Good => "不错，已通过！",
            FeedbackBand::Fair => "还可以，继续加油！",
            FeedbackBand::NeedsPractice => "还需要多加练习哦",
        }
    }
}
