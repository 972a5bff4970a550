//! Advisor
//!
//! Composes retrieval and generation into the two user flows: open-ended
//! question answering and expense classification. Quota metering lives
//! behind the [`UsageGate`] seam; persistence of outcomes is the
//! caller's business.

use super::prompt;
use super::{parse_answer, try_parse_answer, CategoryCode, ParsedAnswer};
use crate::llm::{GenerationRequest, GenerationResult, GenerationRouter};
use crate::search::{RetrievalRouter, SearchFilter};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Answer returned when the user's monthly quota is exhausted
pub const QUOTA_EXHAUSTED_MESSAGE: &str =
    "이번 달 상담 횟수를 모두 사용하셨습니다. 요금제를 업그레이드하시면 더 많은 상담이 가능합니다.";

const FALLBACK_CLASSIFICATION_REASON: &str = "자동 분류 실패, 기타로 분류됨";

const DEFAULT_TOP_K: usize = 3;

/// Quota seam; real metering is an external collaborator
#[async_trait]
pub trait UsageGate: Send + Sync {
    async fn has_remaining_quota(&self, user: &str, action: &str) -> bool;
    async fn record_usage(&self, user: &str, action: &str, channel: &str);
}

/// Gate that never limits anything
pub struct UnmeteredGate;

#[async_trait]
impl UsageGate for UnmeteredGate {
    async fn has_remaining_quota(&self, _user: &str, _action: &str) -> bool {
        true
    }

    async fn record_usage(&self, _user: &str, _action: &str, _channel: &str) {}
}

/// Provider accounting carried alongside an answer
#[derive(Debug, Clone, Serialize)]
pub struct GenerationMeta {
    pub provider: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub latency_ms: u64,
}

impl From<&GenerationResult> for GenerationMeta {
    fn from(result: &GenerationResult) -> Self {
        Self {
            provider: result.provider.clone(),
            model: result.model.clone(),
            input_tokens: result.input_tokens,
            output_tokens: result.output_tokens,
            latency_ms: result.latency_ms,
        }
    }
}

/// Outcome of the question flow
#[derive(Debug, Clone, Serialize)]
pub struct AskOutcome {
    #[serde(flatten)]
    pub answer: ParsedAnswer,
    pub category_name: Option<String>,
    pub references: Vec<String>,
    pub session_id: String,
    pub quota_exhausted: bool,
    pub generation: Option<GenerationMeta>,
}

/// Outcome of the classification flow
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub category_code: CategoryCode,
    pub category_name: String,
    pub is_deductible: bool,
    pub confidence: f32,
    pub reason: String,
    pub generation: GenerationMeta,
}

/// The tax-consultation pipeline
pub struct Advisor {
    retrieval: Arc<RetrievalRouter>,
    generation: Arc<GenerationRouter>,
    gate: Arc<dyn UsageGate>,
    top_k: usize,
}

impl Advisor {
    pub fn new(
        retrieval: Arc<RetrievalRouter>,
        generation: Arc<GenerationRouter>,
        gate: Arc<dyn UsageGate>,
    ) -> Self {
        Self {
            retrieval,
            generation,
            gate,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Answer a tax question with retrieved context
    ///
    /// An exhausted quota short-circuits before retrieval: fixed answer,
    /// no generation call, no usage recorded.
    pub async fn ask(
        &self,
        user: &str,
        question: &str,
        session_id: Option<String>,
        channel: &str,
    ) -> AskOutcome {
        if !self.gate.has_remaining_quota(user, "chat").await {
            tracing::info!(user, "chat quota exhausted");
            return AskOutcome {
                answer: ParsedAnswer::raw(QUOTA_EXHAUSTED_MESSAGE),
                category_name: None,
                references: Vec::new(),
                session_id: session_id.unwrap_or_default(),
                quota_exhausted: true,
                generation: None,
            };
        }

        let session_id = session_id.unwrap_or_else(|| generate_session_id(user, question));

        let documents = self
            .retrieval
            .search(question, self.top_k, &SearchFilter::default())
            .await;
        let context = prompt::format_context(&documents);

        let request = GenerationRequest::new(prompt::build_question_prompt(question, &context))
            .with_system(prompt::SYSTEM_PROMPT)
            .with_temperature(0.3);
        let result = self.generation.generate(&request).await;

        let answer = parse_answer(&result.content);
        let category_name = answer.category_code.map(|c| c.label().to_string());

        let mut references = Vec::new();
        for document in documents.iter().map(|d| &d.document) {
            if let Some(source) = document.source.as_deref().filter(|s| !s.is_empty()) {
                if !references.iter().any(|r| r == source) {
                    references.push(source.to_string());
                }
            }
        }

        self.gate.record_usage(user, "chat", channel).await;

        AskOutcome {
            answer,
            category_name,
            references,
            session_id,
            quota_exhausted: false,
            generation: Some(GenerationMeta::from(&result)),
        }
    }

    /// Classify an expense description into an account category
    ///
    /// No retrieval step. A category of NON forces `is_deductible` to
    /// false regardless of what the model claimed; unparseable output
    /// lands in the low-confidence OTH fallback.
    pub async fn classify(
        &self,
        description: &str,
        amount: Option<f64>,
        vendor: Option<&str>,
    ) -> Classification {
        let request = GenerationRequest::new(prompt::build_classification_prompt(
            description,
            amount,
            vendor,
        ))
        .with_temperature(0.2)
        .with_max_tokens(500);
        let result = self.generation.generate(&request).await;
        let meta = GenerationMeta::from(&result);

        match try_parse_answer(&result.content) {
            Some(parsed) => {
                let category_code = parsed.category_code.unwrap_or(CategoryCode::Other);
                Classification {
                    category_code,
                    category_name: category_code.label().to_string(),
                    is_deductible: parsed.is_deductible.unwrap_or(true)
                        && category_code != CategoryCode::NonDeductible,
                    confidence: parsed.confidence.unwrap_or(0.5),
                    reason: parsed.answer,
                    generation: meta,
                }
            }
            None => {
                tracing::debug!("classification output unparseable; using fallback");
                Classification {
                    category_code: CategoryCode::Other,
                    category_name: CategoryCode::Other.label().to_string(),
                    is_deductible: true,
                    confidence: 0.3,
                    reason: FALLBACK_CLASSIFICATION_REASON.to_string(),
                    generation: meta,
                }
            }
        }
    }
}

/// Opaque session id derived from the caller, question, and clock
fn generate_session_id(user: &str, question: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(user.as_bytes());
    hasher.update(question.as_bytes());
    hasher.update(
        &chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_le_bytes(),
    );
    hasher.finalize().to_hex()[..32].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SemuError};
    use crate::llm::{Embedder, GenerationProvider};
    use crate::search::LocalBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(SemuError::Embedding("model offline".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(SemuError::Embedding("model offline".to_string()))
        }

        fn dimensions(&self) -> usize {
            4
        }

        fn model_name(&self) -> &str {
            "broken"
        }
    }

    /// Provider returning a canned body, counting calls
    struct ScriptedProvider {
        body: String,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(body: impl Into<String>) -> Self {
            Self {
                body: body.into(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GenerationProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model_name(&self) -> &str {
            "scripted-1"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<GenerationResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(GenerationResult {
                content: self.body.clone(),
                provider: "scripted".to_string(),
                model: "scripted-1".to_string(),
                input_tokens: 10,
                output_tokens: 20,
                latency_ms: 5,
            })
        }
    }

    struct DenyGate;

    #[async_trait]
    impl UsageGate for DenyGate {
        async fn has_remaining_quota(&self, _user: &str, _action: &str) -> bool {
            false
        }

        async fn record_usage(&self, _user: &str, _action: &str, _channel: &str) {
            panic!("usage must not be recorded when quota is exhausted");
        }
    }

    struct CountingGate {
        recorded: AtomicUsize,
    }

    #[async_trait]
    impl UsageGate for CountingGate {
        async fn has_remaining_quota(&self, _user: &str, _action: &str) -> bool {
            true
        }

        async fn record_usage(&self, _user: &str, _action: &str, _channel: &str) {
            self.recorded.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn empty_retrieval() -> Arc<RetrievalRouter> {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalBackend::open(
            Arc::new(BrokenEmbedder),
            dir.path().join("knowledge"),
            dir.path().join("vector_store"),
        )
        .await;
        Arc::new(RetrievalRouter::local(Arc::new(local)))
    }

    fn advisor_with(
        retrieval: Arc<RetrievalRouter>,
        provider: Arc<ScriptedProvider>,
        gate: Arc<dyn UsageGate>,
    ) -> Advisor {
        let router = GenerationRouter::new(vec![provider], std::time::Duration::from_secs(5));
        Advisor::new(retrieval, Arc::new(router), gate)
    }

    #[tokio::test]
    async fn test_ask_parses_answer_and_collects_references() {
        let provider = Arc::new(ScriptedProvider::new(
            r#"{"answer": "인정됩니다.", "is_deductible": true, "category_code": "WEL",
                "confidence": 0.8, "legal_basis": "소득세법 제27조"}"#,
        ));
        let gate = Arc::new(CountingGate {
            recorded: AtomicUsize::new(0),
        });
        let advisor = advisor_with(empty_retrieval().await, provider.clone(), gate.clone());

        let outcome = advisor.ask("u1", "직원 점심값은 경비인가요?", None, "cli").await;

        assert!(!outcome.quota_exhausted);
        assert_eq!(outcome.answer.answer, "인정됩니다.");
        assert_eq!(outcome.answer.category_code, Some(CategoryCode::Welfare));
        assert_eq!(outcome.category_name.as_deref(), Some("복리후생비"));
        // degraded retrieval supplies the baseline-principles source
        assert_eq!(outcome.references, vec!["기본 세법 원칙".to_string()]);
        assert!(!outcome.session_id.is_empty());
        assert_eq!(
            outcome.generation.as_ref().map(|g| g.provider.as_str()),
            Some("scripted")
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(gate.recorded.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ask_quota_exhausted_short_circuits() {
        let provider = Arc::new(ScriptedProvider::new("{}"));
        let advisor = advisor_with(empty_retrieval().await, provider.clone(), Arc::new(DenyGate));

        let outcome = advisor.ask("u1", "질문", Some("s-1".to_string()), "cli").await;

        assert!(outcome.quota_exhausted);
        assert_eq!(outcome.answer.answer, QUOTA_EXHAUSTED_MESSAGE);
        assert_eq!(outcome.session_id, "s-1");
        assert!(outcome.generation.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ask_keeps_provided_session_id() {
        let provider = Arc::new(ScriptedProvider::new(r#"{"answer": "ok"}"#));
        let gate = Arc::new(CountingGate {
            recorded: AtomicUsize::new(0),
        });
        let advisor = advisor_with(empty_retrieval().await, provider, gate);

        let outcome = advisor
            .ask("u1", "질문", Some("keep-me".to_string()), "cli")
            .await;
        assert_eq!(outcome.session_id, "keep-me");
    }

    #[tokio::test]
    async fn test_classify_non_deductible_override() {
        let provider = Arc::new(ScriptedProvider::new(
            r#"{"answer": "개인 지출입니다.", "is_deductible": true,
                "category_code": "NON", "confidence": 0.9}"#,
        ));
        let advisor = advisor_with(empty_retrieval().await, provider, Arc::new(UnmeteredGate));

        let classification = advisor.classify("가족 외식", Some(80_000.0), None).await;

        assert_eq!(classification.category_code, CategoryCode::NonDeductible);
        assert_eq!(classification.category_name, "비용처리불가");
        assert!(!classification.is_deductible);
        assert_eq!(classification.reason, "개인 지출입니다.");
    }

    #[tokio::test]
    async fn test_classify_normal() {
        let provider = Arc::new(ScriptedProvider::new(
            r#"{"answer": "사무용품 구매", "is_deductible": true,
                "category_code": "SUP", "confidence": 0.85}"#,
        ));
        let advisor = advisor_with(empty_retrieval().await, provider, Arc::new(UnmeteredGate));

        let classification = advisor.classify("A4 용지 구매", None, Some("문구점")).await;

        assert_eq!(classification.category_code, CategoryCode::Supplies);
        assert!(classification.is_deductible);
        assert!((classification.confidence - 0.85).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_classify_unparseable_falls_back() {
        let provider = Arc::new(ScriptedProvider::new("죄송합니다, 분류할 수 없습니다."));
        let advisor = advisor_with(empty_retrieval().await, provider, Arc::new(UnmeteredGate));

        let classification = advisor.classify("??", None, None).await;

        assert_eq!(classification.category_code, CategoryCode::Other);
        assert_eq!(classification.category_name, "기타");
        assert!(classification.is_deductible);
        assert!((classification.confidence - 0.3).abs() < 1e-6);
        assert_eq!(classification.reason, FALLBACK_CLASSIFICATION_REASON);
    }

    #[test]
    fn test_session_ids_are_distinct() {
        let a = generate_session_id("u1", "q");
        let b = generate_session_id("u1", "q");
        assert_eq!(a.len(), 32);
        // nanosecond clock makes consecutive ids differ
        assert_ne!(a, b);
    }
}
