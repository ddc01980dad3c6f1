//! AI 返回载荷的反序列化目标
//!
//! 网关返回的文本一律视为未经验证的输入：这里只定义形状，
//! 字段是否齐全、数量是否正确由校验器判定后才允许入库。
//! 对未知字段保持宽容（模型偶尔会多给字段），对必填字段保持严格。

use serde::Deserialize;

/// AI 返回的整包题目载荷
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuizPayload {
    pub questions: Vec<RawQuestion>,
}

/// AI 返回的单道候选题目
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    pub question_text: String,
    /// 提示词要求难度递增，该字段仅供人工检查，不入库
    #[serde(default)]
    pub difficulty: Option<String>,
    pub options: Vec<RawOption>,
}

/// AI 返回的单个候选选项
///
/// 不包含字母字段：字母由服务端按数组位置分配
#[derive(Debug, Clone, Deserialize)]
pub struct RawOption {
    pub text: String,
    pub is_correct: bool,
}
