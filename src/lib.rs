//! # Quiz Generation
//!
//! 按需生成测验内容的 Rust 服务：学习材料首次被访问时，
//! 通过生成式服务合成固定形状的单选题，校验后一次性落库，
//! 供多个并发学员取用和作答。
//!
//! ## 架构设计
//!
//! 本系统采用严格的三层架构：
//!
//! ### ① 基础设施层（Clients / Storage）
//! - `clients/` - 持有外部连接，只暴露能力
//! - `AiClient` - AI 补全网关，提示词进、原始文本出
//! - `HttpContentClient` - 按 id 读取学习材料
//! - `storage/` - 持久化存储端口与内存实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单次请求
//! - `GenerationService` - 存在性检查 → 提示词 → AI → 校验 → 落库
//! - `validator` - 对 AI 返回施加结构契约的纯函数
//! - `QuizService` - 取题（剥离答案）与判分能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次测验"的完整客户端流程
//! - `QuizFlow` - 取题或触发生成的状态机（轮询、硬截止、手动重试）
//! - `AnswerLedger` - 会话内的答题台账与成绩汇总
//! - `scoring` - 正确率 / 及格线 / 经验值 / 反馈档位
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{AiClient, CompletionGateway, ContentProvider, HttpContentClient};
pub use config::Config;
pub use error::{ContractViolation, GatewayError, GenerationError, QuizError, StoreError};
pub use models::{PlayerQuestion, QuizAnswer, QuizOption, QuizQuestion};
pub use services::{GenerationOutcome, GenerationRequest, GenerationService, QuizService};
pub use storage::{MemoryQuizStore, QuizStore};
pub use workflow::{AnswerLedger, QuizFlow, QuizPhase, QuizSummary};
