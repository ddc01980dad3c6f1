//! 生成预览应用
//!
//! 对单份材料跑通完整流程：取题 → （不存在时）生成 → 就绪，
//! 然后把生成的题目打印出来，用于人工检查出题质量。
//! 题目写入内存存储，不触碰线上数据。

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::clients::{AiClient, HttpContentClient};
use crate::config::Config;
use crate::services::{GenerationService, QuizService};
use crate::storage::MemoryQuizStore;
use crate::utils::logging;
use crate::workflow::{QuizFlow, QuizPhase};

/// 预览时使用的占位学员 id
const PREVIEW_USER_ID: u64 = 0;

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        if config.llm_api_key.is_empty() {
            bail!("缺少 LLM_API_KEY，无法调用生成服务");
        }
        logging::log_startup(&config.llm_model_name);
        Ok(Self { config })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let material_id: u64 = std::env::var("MATERIAL_ID")
            .context("缺少 MATERIAL_ID 环境变量")?
            .parse()
            .context("MATERIAL_ID 必须是数字")?;

        let content = Arc::new(HttpContentClient::new(&self.config));
        let gateway = Arc::new(AiClient::new(&self.config));
        let store = Arc::new(MemoryQuizStore::new());
        let generation = Arc::new(GenerationService::new(gateway, Arc::clone(&store)));
        let quiz = Arc::new(QuizService::new(store));

        let mut flow = QuizFlow::new(content, generation, quiz, PREVIEW_USER_ID, &self.config);
        flow.load(material_id).await;

        match flow.phase() {
            QuizPhase::Ready { questions } => {
                for question in questions {
                    info!("{}", "─".repeat(60));
                    info!("第 {} 题: {}", question.question_number, question.question_text);
                    for option in &question.options {
                        info!("  {}. {}", option.letter, option.text);
                    }
                }
                logging::print_final_stats(material_id, questions.len());
            }
            QuizPhase::Failed { message } | QuizPhase::TimedOut { message } => {
                warn!("⚠️ 预览失败: {}", message);
                bail!("预览失败: {}", message);
            }
            other => bail!("流程停在意外状态: {:?}", other),
        }

        Ok(())
    }
}
