//! 内存存储实现
//!
//! 生产环境由平台的关系库承担存储；这个实现用于测试和本地预览，
//! 行为上与关系库对齐：顺序分配 id，并在 (material_id, question_number)
//! 上施加唯一约束。

use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::models::{NewOption, NewQuestion, QuizOption, QuizQuestion, StoredQuestion};
use crate::storage::QuizStore;

#[derive(Debug, Default)]
struct MemoryInner {
    questions: Vec<QuizQuestion>,
    options: Vec<QuizOption>,
    next_question_id: u64,
    next_option_id: u64,
}

/// 内存版测验存储
#[derive(Debug, Default)]
pub struct MemoryQuizStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前题目行总数（测试用）
    pub async fn question_count(&self) -> usize {
        self.inner.lock().await.questions.len()
    }

    /// 当前选项行总数（测试用）
    pub async fn option_count(&self) -> usize {
        self.inner.lock().await.options.len()
    }
}

impl QuizStore for MemoryQuizStore {
    async fn has_questions(&self, material_id: u64) -> Result<bool, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.questions.iter().any(|q| q.material_id == material_id))
    }

    async fn questions_with_options(
        &self,
        material_id: u64,
    ) -> Result<Vec<StoredQuestion>, StoreError> {
        let inner = self.inner.lock().await;
        let mut stored: Vec<StoredQuestion> = inner
            .questions
            .iter()
            .filter(|q| q.material_id == material_id)
            .map(|q| StoredQuestion {
                question: q.clone(),
                options: inner
                    .options
                    .iter()
                    .filter(|o| o.question_id == q.id)
                    .cloned()
                    .collect(),
            })
            .collect();
        stored.sort_by_key(|s| s.question.question_number);
        Ok(stored)
    }

    async fn options_for_question(&self, question_id: u64) -> Result<Vec<QuizOption>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .options
            .iter()
            .filter(|o| o.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn insert_question(&self, question: &NewQuestion) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;

        // 唯一约束：同一材料内题号不可重复
        let duplicate = inner.questions.iter().any(|q| {
            q.material_id == question.material_id && q.question_number == question.question_number
        });
        if duplicate {
            return Err(StoreError::QuestionInsertFailed {
                material_id: question.material_id,
                question_number: question.question_number,
                detail: "违反唯一约束 (material_id, question_number)".to_string(),
            });
        }

        inner.next_question_id += 1;
        let id = inner.next_question_id;
        inner.questions.push(QuizQuestion {
            id,
            material_id: question.material_id,
            topic_id: question.topic_id,
            question_number: question.question_number,
            question_text: question.question_text.clone(),
        });
        Ok(id)
    }

    async fn insert_option(&self, option: &NewOption) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;

        // 选项必须挂在已存在的题目行上
        if !inner.questions.iter().any(|q| q.id == option.question_id) {
            return Err(StoreError::OptionInsertFailed {
                question_id: option.question_id,
                letter: option.letter,
                detail: "题目行不存在".to_string(),
            });
        }

        inner.next_option_id += 1;
        let id = inner.next_option_id;
        inner.options.push(QuizOption {
            id,
            question_id: option.question_id,
            letter: option.letter,
            text: option.text.clone(),
            is_correct: option.is_correct,
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionLetter;

    fn new_question(material_id: u64, number: usize) -> NewQuestion {
        NewQuestion {
            material_id,
            topic_id: 7,
            question_number: number,
            question_text: format!("第 {} 题", number),
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let store = MemoryQuizStore::new();

        let qid = store
            .insert_question(&new_question(42, 1))
            .await
            .expect("写入题目失败");
        store
            .insert_option(&NewOption {
                question_id: qid,
                letter: OptionLetter::A,
                text: "叶绿体".to_string(),
                is_correct: true,
            })
            .await
            .expect("写入选项失败");

        assert!(store.has_questions(42).await.expect("查询失败"));
        assert!(!store.has_questions(43).await.expect("查询失败"));

        let stored = store.questions_with_options(42).await.expect("查询失败");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].options.len(), 1);
        assert_eq!(stored[0].options[0].letter, OptionLetter::A);
    }

    #[tokio::test]
    async fn test_unique_constraint_on_question_number() {
        let store = MemoryQuizStore::new();

        store
            .insert_question(&new_question(42, 1))
            .await
            .expect("首次写入应成功");

        let result = store.insert_question(&new_question(42, 1)).await;
        assert!(matches!(
            result,
            Err(StoreError::QuestionInsertFailed { .. })
        ));
        assert_eq!(store.question_count().await, 1);
    }

    #[tokio::test]
    async fn test_option_requires_existing_question() {
        let store = MemoryQuizStore::new();

        let result = store
            .insert_option(&NewOption {
                question_id: 999,
                letter: OptionLetter::B,
                text: "线粒体".to_string(),
                is_correct: false,
            })
            .await;

        assert!(matches!(result, Err(StoreError::OptionInsertFailed { .. })));
    }

    #[tokio::test]
    async fn test_questions_sorted_by_number() {
        let store = MemoryQuizStore::new();

        store
            .insert_question(&new_question(42, 2))
            .await
            .expect("写入失败");
        store
            .insert_question(&new_question(42, 1))
            .await
            .expect("写入失败");

        let stored = store.questions_with_options(42).await.expect("查询失败");
        let numbers: Vec<usize> = stored.iter().map(|s| s.question.question_number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }
}
