//! 题目生成服务 - 业务能力层
//!
//! 编排一次完整的生成：存在性检查 → 构建提示词 → 调用 AI →
//! 解析 → 校验 → 入库。对同一材料的重复调用会在幂等门短路。
//!
//! 各请求之间无共享状态，不同客户端/进程可以并发调用；
//! 首次并发访问的真正去重由存储层的唯一约束兜底（见 DESIGN.md）。

use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::CompletionGateway;
use crate::error::GenerationError;
use crate::models::{MaterialInfo, NewOption, NewQuestion, OptionLetter, QuizQuestion, RawQuestion};
use crate::services::validator;
use crate::storage::QuizStore;
use crate::utils::logging::truncate_text;

/// 生成请求
///
/// 四个字段全部必填，缺任何一个都是调用方的 bug
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub material_id: u64,
    pub topic_id: u64,
    pub material_title: String,
    pub material_content: String,
}

impl GenerationRequest {
    /// 从内容服务返回的材料构建生成请求
    pub fn from_material(material: &MaterialInfo) -> Self {
        Self {
            material_id: material.id,
            topic_id: material.topic_id,
            material_title: material.title.clone(),
            material_content: material.content.clone(),
        }
    }

    /// 校验必填字段
    fn validate(&self) -> Result<(), GenerationError> {
        if self.material_id == 0 {
            return Err(GenerationError::InvalidInput {
                field: "material_id",
            });
        }
        if self.topic_id == 0 {
            return Err(GenerationError::InvalidInput { field: "topic_id" });
        }
        if self.material_title.trim().is_empty() {
            return Err(GenerationError::InvalidInput {
                field: "material_title",
            });
        }
        if self.material_content.trim().is_empty() {
            return Err(GenerationError::InvalidInput {
                field: "material_content",
            });
        }
        Ok(())
    }
}

/// 生成结果
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    /// 该材料已有题目，视为成功，直接使用现有内容
    AlreadyExists,
    /// 本次新生成并写入的题目
    Created(Vec<QuizQuestion>),
}

/// 题目生成服务
pub struct GenerationService<G, S> {
    gateway: Arc<G>,
    store: Arc<S>,
}

impl<G, S> GenerationService<G, S>
where
    G: CompletionGateway,
    S: QuizStore,
{
    /// 创建新的题目生成服务
    pub fn new(gateway: Arc<G>, store: Arc<S>) -> Self {
        Self { gateway, store }
    }

    /// 为一份材料生成一套题目
    ///
    /// # 返回
    /// - `AlreadyExists`: 幂等门命中，未调用 AI
    /// - `Created`: 新写入的题目行
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        request.validate()?;

        // ========== 步骤 1: 幂等门 ==========
        // 快速路径：已有题目就不再花钱调 AI。存在性检查不是原子的，
        // 真正的去重由存储层唯一约束负责。
        if self.store.has_questions(request.material_id).await? {
            info!("[材料 {}] 题目已存在，跳过生成", request.material_id);
            return Ok(GenerationOutcome::AlreadyExists);
        }

        info!(
            "[材料 {}] 🤖 开始生成题目: {}",
            request.material_id,
            truncate_text(&request.material_title, 40)
        );

        // ========== 步骤 2-3: 构建提示词并调用 AI ==========
        let (user_message, system_message) = self.build_generation_messages(&request);
        let raw = self
            .gateway
            .complete(&user_message, Some(&system_message))
            .await?;

        // ========== 步骤 4-5: 解析并校验（均不通过则整批作废） ==========
        let payload = validator::parse_payload(&raw).map_err(|violation| {
            warn!(
                "[材料 {}] ⚠️ AI 返回无法解析: {}",
                request.material_id, violation
            );
            violation
        })?;

        validator::validate_question_set(&payload.questions).map_err(|violation| {
            warn!(
                "[材料 {}] ⚠️ AI 返回违反契约: {}",
                request.material_id, violation
            );
            violation
        })?;

        // ========== 步骤 6: 入库 ==========
        let created = self.persist(&request, &payload.questions).await?;

        info!(
            "[材料 {}] ✓ 生成完成，写入 {} 道题目",
            request.material_id,
            created.len()
        );

        Ok(GenerationOutcome::Created(created))
    }

    /// 构建用于题目生成的消息
    ///
    /// 返回 (user_message, system_message)
    fn build_generation_messages(&self, request: &GenerationRequest) -> (String, String) {
        let system_message = "你是一位资深的教学内容编辑，擅长根据学习材料编写高质量的单项选择题。\
                              你只返回结构化的 JSON 数据，从不输出解释、前言或其他文字。"
            .to_string();

        let user_message = format!(
            r#"请根据下面的学习材料出 {question_count} 道单项选择题。

【材料标题】
{title}

【材料内容】
{content}

【出题要求】
1. 恰好 {question_count} 道题，难度依次递增：第一题简单、第二题中等、第三题困难
2. 每道题恰好 {options_per_question} 个选项，选项按数组顺序对应 A、B、C、D
3. 每道题恰好 1 个选项的 is_correct 为 true，其余为 false
4. 题干和选项必须来自材料内容，不得编造材料中没有的信息

【返回格式】
严格按照如下 JSON 结构返回：
{{
  "questions": [
    {{
      "question_text": "题干",
      "difficulty": "easy",
      "options": [
        {{"text": "选项内容", "is_correct": true}},
        {{"text": "选项内容", "is_correct": false}},
        {{"text": "选项内容", "is_correct": false}},
        {{"text": "选项内容", "is_correct": false}}
      ]
    }}
  ]
}}

只返回 JSON，不要返回任何其他内容。"#,
            question_count = validator::QUESTION_COUNT,
            options_per_question = validator::OPTIONS_PER_QUESTION,
            title = request.material_title,
            content = request.material_content,
        );

        (user_message, system_message)
    }

    /// 把通过校验的候选题目写入存储
    ///
    /// 逐题写入：先写题目行、拿到 id，再写它的 4 个选项行。
    /// 选项写入失败时已写入的题目行不回滚（弱一致性，见 DESIGN.md），
    /// 错误原样上报，由调用方决定下一步。
    async fn persist(
        &self,
        request: &GenerationRequest,
        questions: &[RawQuestion],
    ) -> Result<Vec<QuizQuestion>, GenerationError> {
        let mut created = Vec::with_capacity(questions.len());

        for (index, question) in questions.iter().enumerate() {
            let question_number = index + 1;

            let question_id = self
                .store
                .insert_question(&NewQuestion {
                    material_id: request.material_id,
                    topic_id: request.topic_id,
                    question_number,
                    question_text: question.question_text.clone(),
                })
                .await?;

            for (option_index, option) in question.options.iter().enumerate() {
                // 校验器已保证每题恰好 4 个选项，这里的字母分配不会越界
                let letter = OptionLetter::from_index(option_index).ok_or_else(|| {
                    GenerationError::Contract(crate::error::ContractViolation::WrongOptionCount {
                        question_number,
                        expected: validator::OPTIONS_PER_QUESTION,
                        actual: question.options.len(),
                    })
                })?;

                self.store
                    .insert_option(&NewOption {
                        question_id,
                        letter,
                        text: option.text.clone(),
                        is_correct: option.is_correct,
                    })
                    .await?;
            }

            created.push(QuizQuestion {
                id: question_id,
                material_id: request.material_id,
                topic_id: request.topic_id,
                question_number,
                question_text: question.question_text.clone(),
            });
        }

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ContractViolation, GatewayError};
    use crate::storage::MemoryQuizStore;
    use std::sync::Mutex;

    /// 返回固定文本的脚本化网关
    struct ScriptedGateway {
        responses: Mutex<Vec<Result<String, GatewayError>>>,
        call_count: Mutex<usize>,
    }

    impl ScriptedGateway {
        fn with_response(response: &str) -> Self {
            Self {
                responses: Mutex::new(vec![Ok(response.to_string())]),
                call_count: Mutex::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                responses: Mutex::new(vec![Err(GatewayError::EmptyResponse {
                    model: "test".to_string(),
                })]),
                call_count: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.call_count.lock().expect("锁中毒")
        }
    }

    impl CompletionGateway for ScriptedGateway {
        async fn complete(
            &self,
            _user_message: &str,
            _system_message: Option<&str>,
        ) -> Result<String, GatewayError> {
            *self.call_count.lock().expect("锁中毒") += 1;
            self.responses
                .lock()
                .expect("锁中毒")
                .pop()
                .unwrap_or(Err(GatewayError::EmptyResponse {
                    model: "test".to_string(),
                }))
        }
    }

    fn payload_with_questions(count: usize) -> String {
        let question = r#"{
            "question_text": "光合作用发生在哪个细胞结构中？",
            "difficulty": "easy",
            "options": [
                {"text": "叶绿体", "is_correct": true},
                {"text": "线粒体", "is_correct": false},
                {"text": "细胞核", "is_correct": false},
                {"text": "液泡", "is_correct": false}
            ]
        }"#;
        let questions = vec![question; count].join(",");
        format!(r#"{{"questions": [{}]}}"#, questions)
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            material_id: 42,
            topic_id: 7,
            material_title: "光合作用".to_string(),
            material_content: "绿色植物通过叶绿体，利用光能把二氧化碳和水合成储存能量的有机物，\
                               并释放氧气的过程，叫做光合作用。光合作用分为光反应和暗反应两个阶段，\
                               光反应在类囊体薄膜上进行，暗反应在基质中进行。光合作用是地球上最重要的\
                               能量转换过程，几乎所有生命活动所需的能量都直接或间接来自光合作用。"
                .to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_persists_full_question_set() {
        let gateway = Arc::new(ScriptedGateway::with_response(&payload_with_questions(3)));
        let store = Arc::new(MemoryQuizStore::new());
        let service = GenerationService::new(Arc::clone(&gateway), Arc::clone(&store));

        let outcome = service.generate(request()).await.expect("生成应成功");

        let created = match outcome {
            GenerationOutcome::Created(questions) => questions,
            other => panic!("期望 Created，实际 {:?}", other),
        };
        assert_eq!(created.len(), 3);
        // 题号从 1 开始连续
        let numbers: Vec<usize> = created.iter().map(|q| q.question_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        // 3 道题目行 + 12 条选项行
        assert_eq!(store.question_count().await, 3);
        assert_eq!(store.option_count().await, 12);

        // 每道题恰好 1 个正确选项
        for question in &created {
            let options = store
                .options_for_question(question.id)
                .await
                .expect("查询失败");
            assert_eq!(options.len(), 4);
            assert_eq!(options.iter().filter(|o| o.is_correct).count(), 1);
        }
    }

    #[tokio::test]
    async fn test_generate_twice_hits_idempotency_gate() {
        let gateway = Arc::new(ScriptedGateway::with_response(&payload_with_questions(3)));
        let store = Arc::new(MemoryQuizStore::new());
        let service = GenerationService::new(Arc::clone(&gateway), Arc::clone(&store));

        service.generate(request()).await.expect("首次生成应成功");
        let second = service.generate(request()).await.expect("第二次应成功");

        assert!(matches!(second, GenerationOutcome::AlreadyExists));
        // 零新增行，且第二次没有再调 AI
        assert_eq!(store.question_count().await, 3);
        assert_eq!(store.option_count().await, 12);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_four_question_payload_rejected_with_zero_rows() {
        let gateway = Arc::new(ScriptedGateway::with_response(&payload_with_questions(4)));
        let store = Arc::new(MemoryQuizStore::new());
        let service = GenerationService::new(gateway, Arc::clone(&store));

        let result = service.generate(request()).await;

        assert!(matches!(
            result,
            Err(GenerationError::Contract(
                ContractViolation::WrongQuestionCount {
                    expected: 3,
                    actual: 4
                }
            ))
        ));
        // 失败关闭：一行都不写
        assert_eq!(store.question_count().await, 0);
        assert_eq!(store.option_count().await, 0);
    }

    #[tokio::test]
    async fn test_prose_response_is_contract_violation() {
        let gateway = Arc::new(ScriptedGateway::with_response(
            "好的，下面是为您生成的三道题……",
        ));
        let store = Arc::new(MemoryQuizStore::new());
        let service = GenerationService::new(gateway, Arc::clone(&store));

        let result = service.generate(request()).await;

        assert!(matches!(
            result,
            Err(GenerationError::Contract(
                ContractViolation::MalformedPayload { .. }
            ))
        ));
        assert_eq!(store.question_count().await, 0);
    }

    #[tokio::test]
    async fn test_gateway_failure_surfaces_as_gateway_error() {
        let gateway = Arc::new(ScriptedGateway::failing());
        let store = Arc::new(MemoryQuizStore::new());
        let service = GenerationService::new(gateway, Arc::clone(&store));

        let result = service.generate(request()).await;

        assert!(matches!(result, Err(GenerationError::Gateway(_))));
        assert_eq!(store.question_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_fields_fail_fast() {
        let gateway = Arc::new(ScriptedGateway::with_response(&payload_with_questions(3)));
        let store = Arc::new(MemoryQuizStore::new());
        let service = GenerationService::new(Arc::clone(&gateway), store);

        let mut bad = request();
        bad.material_title = String::new();
        let result = service.generate(bad).await;
        assert!(matches!(
            result,
            Err(GenerationError::InvalidInput {
                field: "material_title"
            })
        ));

        let mut bad = request();
        bad.material_id = 0;
        let result = service.generate(bad).await;
        assert!(matches!(
            result,
            Err(GenerationError::InvalidInput {
                field: "material_id"
            })
        ));

        // 快速失败：没有调用 AI
        assert_eq!(gateway.calls(), 0);
    }

    #[test]
    fn test_generation_messages_carry_material_and_contract() {
        let gateway = Arc::new(ScriptedGateway::with_response(""));
        let store = Arc::new(MemoryQuizStore::new());
        let service = GenerationService::new(gateway, store);

        let (user_message, system_message) = service.build_generation_messages(&request());

        assert!(user_message.contains("光合作用"));
        assert!(user_message.contains("3 道"));
        assert!(user_message.contains("is_correct"));
        assert!(user_message.contains("只返回 JSON"));
        assert!(system_message.contains("JSON"));
    }
}
