//! 测验题目领域模型
//!
//! 题目与选项一经生成服务写入后不再修改、不再删除，
//! 编辑和下架由内容管理系统负责，不属于本子系统。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 选项字母，每道题固定四个选项 A-D
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    /// 按选项在数组中的位置分配字母（0 → A，3 → D）
    ///
    /// 字母由服务端按位置分配，不信任 AI 返回的标注
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(OptionLetter::A),
            1 => Some(OptionLetter::B),
            2 => Some(OptionLetter::C),
            3 => Some(OptionLetter::D),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionLetter::A => "A",
            OptionLetter::B => "B",
            OptionLetter::C => "C",
            OptionLetter::D => "D",
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 测验题目
///
/// question_number 在同一材料内从 1 开始连续且唯一
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: u64,
    pub material_id: u64,
    pub topic_id: u64,
    pub question_number: usize,
    pub question_text: String,
}

/// 测验选项
///
/// 每道题恰好 4 个选项，恰好 1 个 is_correct 为 true
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: u64,
    pub question_id: u64,
    pub letter: OptionLetter,
    pub text: String,
    pub is_correct: bool,
}

/// 待写入的题目行（id 由存储层分配）
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub material_id: u64,
    pub topic_id: u64,
    pub question_number: usize,
    pub question_text: String,
}

/// 待写入的选项行（id 由存储层分配）
#[derive(Debug, Clone)]
pub struct NewOption {
    pub question_id: u64,
    pub letter: OptionLetter,
    pub text: String,
    pub is_correct: bool,
}

/// 存储层的读取单元：一道题及其全部选项
#[derive(Debug, Clone)]
pub struct StoredQuestion {
    pub question: QuizQuestion,
    pub options: Vec<QuizOption>,
}

/// 面向答题端的题目视图，已剥离正确性标记
#[derive(Debug, Clone, Serialize)]
pub struct PlayerQuestion {
    pub id: u64,
    pub question_number: usize,
    pub question_text: String,
    pub options: Vec<PlayerOption>,
}

/// 面向答题端的选项视图
#[derive(Debug, Clone, Serialize)]
pub struct PlayerOption {
    pub id: u64,
    pub letter: OptionLetter,
    pub text: String,
}

impl PlayerQuestion {
    /// 从存储行构建答题视图，剥离 is_correct
    pub fn from_stored(stored: &StoredQuestion) -> Self {
        Self {
            id: stored.question.id,
            question_number: stored.question.question_number,
            question_text: stored.question.question_text.clone(),
            options: stored
                .options
                .iter()
                .map(|opt| PlayerOption {
                    id: opt.id,
                    letter: opt.letter,
                    text: opt.text.clone(),
                })
                .collect(),
        }
    }
}

/// 客户端持有的答题记录，仅存在于会话内
#[derive(Debug, Clone)]
pub struct QuizAnswer {
    pub question_id: u64,
    pub selected_option_id: u64,
    pub is_correct: bool,
    pub correct_option_id: u64,
}

/// 提交答案的结果（提交答案边界的返回值）
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_option_id: u64,
    pub xp_earned: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_letter_from_index() {
        assert_eq!(OptionLetter::from_index(0), Some(OptionLetter::A));
        assert_eq!(OptionLetter::from_index(3), Some(OptionLetter::D));
        assert_eq!(OptionLetter::from_index(4), None);
    }

    #[test]
    fn test_player_question_strips_correctness() {
        let stored = StoredQuestion {
            question: QuizQuestion {
                id: 1,
                material_id: 42,
                topic_id: 7,
                question_number: 1,
                question_text: "光合作用发生在植物细胞的哪个结构中？".to_string(),
            },
            options: vec![
                QuizOption {
                    id: 10,
                    question_id: 1,
                    letter: OptionLetter::A,
                    text: "叶绿体".to_string(),
                    is_correct: true,
                },
                QuizOption {
                    id: 11,
                    question_id: 1,
                    letter: OptionLetter::B,
                    text: "线粒体".to_string(),
                    is_correct: false,
                },
            ],
        };

        let player = PlayerQuestion::from_stored(&stored);
        assert_eq!(player.options.len(), 2);
        // 序列化后不应出现正确性标记
        let json = serde_json::to_string(&player).expect("序列化失败");
        assert!(!json.contains("is_correct"));
    }
}
