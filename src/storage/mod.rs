//! 持久化存储端口
//!
//! 题目和选项实际存放在平台的关系库里，本子系统只通过这组窄接口访问。
//! 每次生成内，选项行只在所属题目行写入成功后才写入；
//! 跨题目之间只有尽力而为的顺序写入，没有额外保证。

use std::future::Future;

use crate::error::StoreError;
use crate::models::{NewOption, NewQuestion, QuizOption, StoredQuestion};

pub mod memory;

pub use memory::MemoryQuizStore;

/// 测验存储接口
///
/// 实现方应在 (material_id, question_number) 上保证唯一性并把冲突
/// 作为 `StoreError::QuestionInsertFailed` 上报——应用层的存在性检查
/// 只是省成本的快速路径，不是正确性机制。
pub trait QuizStore: Send + Sync + 'static {
    /// 该材料是否已有任何题目（幂等门的存在性检查）
    fn has_questions(
        &self,
        material_id: u64,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// 读取该材料的全部题目及选项
    fn questions_with_options(
        &self,
        material_id: u64,
    ) -> impl Future<Output = Result<Vec<StoredQuestion>, StoreError>> + Send;

    /// 读取某道题的全部选项
    fn options_for_question(
        &self,
        question_id: u64,
    ) -> impl Future<Output = Result<Vec<QuizOption>, StoreError>> + Send;

    /// 写入题目行，返回分配的 id
    fn insert_question(
        &self,
        question: &NewQuestion,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// 写入选项行，返回分配的 id
    fn insert_option(
        &self,
        option: &NewOption,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;
}
