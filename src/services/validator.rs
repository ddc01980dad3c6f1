//! 题目校验器 - 业务能力层
//!
//! 对 AI 返回的候选题目施加结构契约。纯函数，无副作用，
//! 生成服务入库前必须通过这里；任何一种违规整批作废。
//!
//! 契约：
//! - 恰好 3 道题
//! - 每道题恰好 4 个选项
//! - 每道题恰好 1 个正确选项
//! - 题干和选项文本均非空

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ContractViolation;
use crate::models::{RawQuestion, RawQuizPayload};

/// 每份材料的题目数量
pub const QUESTION_COUNT: usize = 3;
/// 每道题的选项数量
pub const OPTIONS_PER_QUESTION: usize = 4;
/// 每道题的正确选项数量
pub const CORRECT_PER_QUESTION: usize = 1;

static FENCE_RE: OnceLock<Regex> = OnceLock::new();

/// 去掉模型偶尔包裹的 Markdown 代码围栏
fn strip_code_fence(raw: &str) -> &str {
    let re = FENCE_RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("围栏正则无效")
    });
    match re.captures(raw) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(raw),
        None => raw.trim(),
    }
}

/// 把网关返回的原始文本解析为结构化载荷
///
/// 返回的文本一律视为未经验证的输入：解析失败即契约违规，
/// 不做任何补救性猜测，也不允许部分结果通过。
pub fn parse_payload(raw: &str) -> Result<RawQuizPayload, ContractViolation> {
    let cleaned = strip_code_fence(raw);
    serde_json::from_str(cleaned).map_err(|e| ContractViolation::MalformedPayload {
        detail: e.to_string(),
    })
}

/// 校验候选题目批次是否满足结构契约
///
/// # 返回
/// 通过返回 Ok(())；否则返回具体的违规原因
pub fn validate_question_set(questions: &[RawQuestion]) -> Result<(), ContractViolation> {
    if questions.len() != QUESTION_COUNT {
        return Err(ContractViolation::WrongQuestionCount {
            expected: QUESTION_COUNT,
            actual: questions.len(),
        });
    }

    for (index, question) in questions.iter().enumerate() {
        let question_number = index + 1;

        if question.question_text.trim().is_empty() {
            return Err(ContractViolation::EmptyText {
                question_number,
                field: "题干",
            });
        }

        if question.options.len() != OPTIONS_PER_QUESTION {
            return Err(ContractViolation::WrongOptionCount {
                question_number,
                expected: OPTIONS_PER_QUESTION,
                actual: question.options.len(),
            });
        }

        let correct_count = question.options.iter().filter(|o| o.is_correct).count();
        if correct_count != CORRECT_PER_QUESTION {
            return Err(ContractViolation::WrongCorrectCount {
                question_number,
                actual: correct_count,
            });
        }

        if question.options.iter().any(|o| o.text.trim().is_empty()) {
            return Err(ContractViolation::EmptyText {
                question_number,
                field: "选项文本",
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawOption;

    /// 构造一道合法的候选题目
    fn valid_question(text: &str) -> RawQuestion {
        RawQuestion {
            question_text: text.to_string(),
            difficulty: None,
            options: vec![
                RawOption {
                    text: "叶绿体".to_string(),
                    is_correct: true,
                },
                RawOption {
                    text: "线粒体".to_string(),
                    is_correct: false,
                },
                RawOption {
                    text: "细胞核".to_string(),
                    is_correct: false,
                },
                RawOption {
                    text: "液泡".to_string(),
                    is_correct: false,
                },
            ],
        }
    }

    fn valid_batch() -> Vec<RawQuestion> {
        vec![
            valid_question("光合作用发生在哪里？"),
            valid_question("光反应的产物是什么？"),
            valid_question("暗反应固定的是哪种气体？"),
        ]
    }

    #[test]
    fn test_valid_batch_passes() {
        assert!(validate_question_set(&valid_batch()).is_ok());
    }

    #[test]
    fn test_rejects_two_question_batch() {
        let batch = valid_batch()[..2].to_vec();
        assert_eq!(
            validate_question_set(&batch),
            Err(ContractViolation::WrongQuestionCount {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_rejects_four_question_batch() {
        let mut batch = valid_batch();
        batch.push(valid_question("多出来的第四题"));
        assert_eq!(
            validate_question_set(&batch),
            Err(ContractViolation::WrongQuestionCount {
                expected: 3,
                actual: 4
            })
        );
    }

    #[test]
    fn test_rejects_three_option_question() {
        let mut batch = valid_batch();
        batch[1].options.pop();
        assert_eq!(
            validate_question_set(&batch),
            Err(ContractViolation::WrongOptionCount {
                question_number: 2,
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_rejects_zero_correct_options() {
        let mut batch = valid_batch();
        for option in &mut batch[0].options {
            option.is_correct = false;
        }
        assert_eq!(
            validate_question_set(&batch),
            Err(ContractViolation::WrongCorrectCount {
                question_number: 1,
                actual: 0
            })
        );
    }

    #[test]
    fn test_rejects_two_correct_options() {
        let mut batch = valid_batch();
        batch[2].options[1].is_correct = true;
        assert_eq!(
            validate_question_set(&batch),
            Err(ContractViolation::WrongCorrectCount {
                question_number: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_rejects_blank_question_text() {
        let mut batch = valid_batch();
        batch[0].question_text = "   ".to_string();
        assert_eq!(
            validate_question_set(&batch),
            Err(ContractViolation::EmptyText {
                question_number: 1,
                field: "题干"
            })
        );
    }

    #[test]
    fn test_rejects_blank_option_text() {
        let mut batch = valid_batch();
        batch[1].options[2].text = String::new();
        assert_eq!(
            validate_question_set(&batch),
            Err(ContractViolation::EmptyText {
                question_number: 2,
                field: "选项文本"
            })
        );
    }

    #[test]
    fn test_parse_plain_json() {
        let raw = r#"{"questions": []}"#;
        let payload = parse_payload(raw).expect("应能解析");
        assert!(payload.questions.is_empty());
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n{\"questions\": []}\n```";
        let payload = parse_payload(raw).expect("应能解析带围栏的载荷");
        assert!(payload.questions.is_empty());
    }

    #[test]
    fn test_parse_rejects_prose() {
        let raw = "好的，下面是为您生成的题目：第一题……";
        let result = parse_payload(raw);
        assert!(matches!(
            result,
            Err(ContractViolation::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_parse_tolerates_extra_fields() {
        let raw = r#"{
            "questions": [{
                "question_text": "题干",
                "difficulty": "easy",
                "explanation": "模型多给的字段",
                "options": [{"text": "甲", "is_correct": true, "score": 1}]
            }]
        }"#;
        let payload = parse_payload(raw).expect("多余字段应被容忍");
        assert_eq!(payload.questions.len(), 1);
        assert_eq!(payload.questions[0].difficulty.as_deref(), Some("easy"));
    }
}
