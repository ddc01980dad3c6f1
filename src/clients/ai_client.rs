//! AI 补全网关 - 基础设施层
//!
//! 只负责"把提示词发给生成式服务、拿回原始文本"这一件事，
//! 不关心提示词内容，也不解析返回结果。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use std::future::Future;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::GatewayError;

/// AI 补全网关接口
///
/// 生成服务通过这个接口调用生成式服务，测试时可以换成脚本化实现
pub trait CompletionGateway: Send + Sync + 'static {
    /// 发送一轮补全请求，返回模型的原始文本
    fn complete(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;
}

/// AI 补全客户端
pub struct AiClient {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl AiClient {
    /// 创建新的 AI 补全客户端
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }
}

impl CompletionGateway for AiClient {
    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串，已去除首尾空白）
    async fn complete(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, GatewayError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        // 构建消息列表
        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| GatewayError::api_call_failed(&self.model_name, e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| GatewayError::api_call_failed(&self.model_name, e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求
        // 温度取低档：保持一定变化的同时尽量贴合输出格式要求
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.3)
            .max_tokens(2048u32)
            .build()
            .map_err(|e| GatewayError::api_call_failed(&self.model_name, e))?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            GatewayError::api_call_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let choice = response
            .choices
            .first()
            .ok_or_else(|| GatewayError::EmptyResponse {
                model: self.model_name.clone(),
            })?;

        let content = choice
            .message
            .content
            .clone()
            .ok_or_else(|| GatewayError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}
