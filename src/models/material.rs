//! 学习材料读取模型
//!
//! 材料本身由内容服务维护，本子系统只读

use serde::{Deserialize, Serialize};

/// 学习材料信息
///
/// 从内容服务按 id 获取，作为生成提示词的输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialInfo {
    pub id: u64,
    pub topic_id: u64,
    pub title: String,
    pub content: String,
}
