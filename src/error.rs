use std::fmt;

use crate::models::OptionLetter;

/// 生成服务错误
///
/// 调用方对不同错误的反应不同，因此必须可区分：
/// 缺少字段是调用方的 bug（立即失败，不重试）；
/// 网关错误是暂时性的（客户端可稍后重试）；
/// 契约违规说明 AI 返回了坏数据（客户端可重试整次生成）；
/// 存储错误是基础设施问题（原样上报，不自动重试）。
#[derive(Debug)]
pub enum GenerationError {
    /// 请求缺少必填字段
    InvalidInput { field: &'static str },
    /// AI 网关调用失败
    Gateway(GatewayError),
    /// AI 返回内容不符合结构契约
    Contract(ContractViolation),
    /// 存储层写入或查询失败
    Store(StoreError),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::InvalidInput { field } => {
                write!(f, "缺少必填字段: {}", field)
            }
            GenerationError::Gateway(e) => write!(f, "AI网关错误: {}", e),
            GenerationError::Contract(e) => write!(f, "AI返回内容违反契约: {}", e),
            GenerationError::Store(e) => write!(f, "存储错误: {}", e),
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerationError::InvalidInput { .. } => None,
            GenerationError::Gateway(e) => Some(e),
            GenerationError::Contract(e) => Some(e),
            GenerationError::Store(e) => Some(e),
        }
    }
}

impl From<GatewayError> for GenerationError {
    fn from(err: GatewayError) -> Self {
        GenerationError::Gateway(err)
    }
}

impl From<ContractViolation> for GenerationError {
    fn from(err: ContractViolation) -> Self {
        GenerationError::Contract(err)
    }
}

impl From<StoreError> for GenerationError {
    fn from(err: StoreError) -> Self {
        GenerationError::Store(err)
    }
}

/// AI 网关错误
#[derive(Debug)]
pub enum GatewayError {
    /// API 调用失败
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回结果为空（没有候选）
    EmptyResponse { model: String },
    /// 返回内容为空（候选中没有文本）
    EmptyContent { model: String },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::ApiCallFailed { model, source } => {
                write!(f, "LLM API调用失败 (模型: {}): {}", model, source)
            }
            GatewayError::EmptyResponse { model } => {
                write!(f, "LLM返回结果为空 (模型: {})", model)
            }
            GatewayError::EmptyContent { model } => {
                write!(f, "LLM返回内容为空 (模型: {})", model)
            }
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::ApiCallFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl GatewayError {
    /// 创建 API 调用失败错误
    pub fn api_call_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        GatewayError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

/// 结构契约违规
///
/// 每种违规一个变体，便于测试逐项断言拒绝原因。
/// 任何一种违规都意味着整批作废，不产生部分写入。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    /// 载荷无法解析为结构化数据
    MalformedPayload { detail: String },
    /// 题目数量不对
    WrongQuestionCount { expected: usize, actual: usize },
    /// 某道题的选项数量不对
    WrongOptionCount {
        question_number: usize,
        expected: usize,
        actual: usize,
    },
    /// 某道题的正确选项数量不对
    WrongCorrectCount { question_number: usize, actual: usize },
    /// 题干或选项文本缺失/为空
    EmptyText {
        question_number: usize,
        field: &'static str,
    },
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractViolation::MalformedPayload { detail } => {
                write!(f, "载荷格式错误: {}", detail)
            }
            ContractViolation::WrongQuestionCount { expected, actual } => {
                write!(f, "题目数量错误: 期望 {} 道，实际 {} 道", expected, actual)
            }
            ContractViolation::WrongOptionCount {
                question_number,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "第 {} 题选项数量错误: 期望 {} 个，实际 {} 个",
                    question_number, expected, actual
                )
            }
            ContractViolation::WrongCorrectCount {
                question_number,
                actual,
            } => {
                write!(
                    f,
                    "第 {} 题正确选项数量错误: 期望 1 个，实际 {} 个",
                    question_number, actual
                )
            }
            ContractViolation::EmptyText {
                question_number,
                field,
            } => {
                write!(f, "第 {} 题的 {} 为空", question_number, field)
            }
        }
    }
}

impl std::error::Error for ContractViolation {}

/// 存储层错误
///
/// 选项写入失败时不回滚已写入的题目行（弱一致性，见 DESIGN.md）
#[derive(Debug, Clone)]
pub enum StoreError {
    /// 查询失败
    QueryFailed { material_id: u64, detail: String },
    /// 题目行写入失败
    QuestionInsertFailed {
        material_id: u64,
        question_number: usize,
        detail: String,
    },
    /// 选项行写入失败
    OptionInsertFailed {
        question_id: u64,
        letter: OptionLetter,
        detail: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::QueryFailed {
                material_id,
                detail,
            } => {
                write!(f, "查询材料 {} 的题目失败: {}", material_id, detail)
            }
            StoreError::QuestionInsertFailed {
                material_id,
                question_number,
                detail,
            } => {
                write!(
                    f,
                    "写入材料 {} 的第 {} 题失败: {}",
                    material_id, question_number, detail
                )
            }
            StoreError::OptionInsertFailed {
                question_id,
                letter,
                detail,
            } => {
                write!(
                    f,
                    "写入题目 {} 的选项 {} 失败: {}",
                    question_id, letter, detail
                )
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// 内容服务错误
#[derive(Debug)]
pub enum ContentError {
    /// 材料不存在
    MaterialNotFound { material_id: u64 },
    /// 网络请求失败
    RequestFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回错误响应
    BadResponse {
        endpoint: String,
        code: Option<u64>,
        message: Option<String>,
    },
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentError::MaterialNotFound { material_id } => {
                write!(f, "材料不存在: {}", material_id)
            }
            ContentError::RequestFailed { endpoint, source } => {
                write!(f, "内容API请求失败 ({}): {}", endpoint, source)
            }
            ContentError::BadResponse {
                endpoint,
                code,
                message,
            } => {
                write!(
                    f,
                    "内容API返回错误响应 ({}): code={:?}, message={:?}",
                    endpoint, code, message
                )
            }
        }
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ContentError::RequestFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl ContentError {
    /// 创建网络请求失败错误
    pub fn request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ContentError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }
}

/// 答题读取/提交路径错误
#[derive(Debug, Clone)]
pub enum QuizError {
    /// 题目不存在
    QuestionNotFound { question_id: u64 },
    /// 选项不属于该题目或不存在
    OptionNotFound {
        question_id: u64,
        option_id: u64,
    },
    /// 题目没有正确选项（部分写入留下的孤儿题）
    CorrectOptionMissing { question_id: u64 },
    /// 存储层错误
    Store(StoreError),
}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizError::QuestionNotFound { question_id } => {
                write!(f, "题目不存在: {}", question_id)
            }
            QuizError::OptionNotFound {
                question_id,
                option_id,
            } => {
                write!(f, "题目 {} 中不存在选项 {}", question_id, option_id)
            }
            QuizError::CorrectOptionMissing { question_id } => {
                write!(f, "题目 {} 没有正确选项，无法判分", question_id)
            }
            QuizError::Store(e) => write!(f, "存储错误: {}", e),
        }
    }
}

impl std::error::Error for QuizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuizError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for QuizError {
    fn from(err: StoreError) -> Self {
        QuizError::Store(err)
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    FileReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileReadFailed { path, source } => {
                write!(f, "读取配置文件失败 ({}): {}", path, source)
            }
            ConfigError::TomlParseFailed { path, source } => {
                write!(f, "TOML解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileReadFailed { source, .. }
            | ConfigError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}
