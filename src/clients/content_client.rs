//! 内容服务客户端 - 基础设施层
//!
//! 按 id 读取学习材料的标题和正文，作为生成提示词的输入。
//! 材料的编辑和存储由内容服务负责，这里只读。

use std::future::Future;

use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::ContentError;
use crate::models::MaterialInfo;

/// 内容服务接口
pub trait ContentProvider: Send + Sync + 'static {
    /// 按 id 获取学习材料
    fn material(
        &self,
        material_id: u64,
    ) -> impl Future<Output = Result<MaterialInfo, ContentError>> + Send;
}

/// 内容 API 响应外壳
///
/// 平台 API 统一返回 {code, message, data}，code == 200 表示成功
#[derive(Debug, Deserialize)]
struct MaterialResponse {
    code: u64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<MaterialInfo>,
}

/// 基于 HTTP 的内容服务客户端
pub struct HttpContentClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpContentClient {
    /// 创建新的内容服务客户端
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.content_api_base_url.trim_end_matches('/').to_string(),
            token: config.content_api_token.clone(),
        }
    }
}

impl ContentProvider for HttpContentClient {
    async fn material(&self, material_id: u64) -> Result<MaterialInfo, ContentError> {
        let endpoint = format!("{}/materials/{}", self.base_url, material_id);
        debug!("请求材料: {}", endpoint);

        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ContentError::request_failed(&endpoint, e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ContentError::MaterialNotFound { material_id });
        }

        if !response.status().is_success() {
            return Err(ContentError::BadResponse {
                endpoint,
                code: Some(response.status().as_u16() as u64),
                message: None,
            });
        }

        let body: MaterialResponse = response
            .json()
            .await
            .map_err(|e| ContentError::request_failed(&endpoint, e))?;

        if body.code != 200 {
            return Err(ContentError::BadResponse {
                endpoint,
                code: Some(body.code),
                message: body.message,
            });
        }

        body.data.ok_or(ContentError::BadResponse {
            endpoint,
            code: Some(body.code),
            message: Some("响应中没有材料数据".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_material_response() {
        let json = r#"{
            "code": 200,
            "message": "ok",
            "data": {
                "id": 42,
                "topic_id": 7,
                "title": "光合作用",
                "content": "绿色植物通过叶绿体，利用光能……"
            }
        }"#;

        let body: MaterialResponse = serde_json::from_str(json).expect("解析失败");
        assert_eq!(body.code, 200);
        let material = body.data.expect("应有材料数据");
        assert_eq!(material.id, 42);
        assert_eq!(material.title, "光合作用");
    }

    #[test]
    fn test_parse_error_response_without_data() {
        let json = r#"{"code": 500, "message": "内部错误"}"#;
        let body: MaterialResponse = serde_json::from_str(json).expect("解析失败");
        assert_eq!(body.code, 500);
        assert!(body.data.is_none());
    }
}
