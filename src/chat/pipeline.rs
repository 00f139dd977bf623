//! The chat pipeline: one request from message to enriched reply.
//!
//! 1. Resolve the caller from the bearer token (anonymous when absent)
//! 2. Classify tradition + language
//! 3. Compose the system prompt and conversation
//! 4. Call the LLM (the only failure that aborts the request)
//! 5. Extract citations and splice in the resolved passages
//! 6. Fire-and-forget: profile write-back and audit entry

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ChatError;
use crate::citations::extract_citations;
use crate::classifier::{
    detect_intent, ClassificationRequest, ClassificationResult, Classifier, HistoryTurn, Intent,
};
use crate::llm::{CompletionClient, CompletionRequest};
use crate::prompt::{compose_prompt, conversation_messages};
use crate::profile::{AuditEntry, AuditSink, DetectionSummary, ProfileStore, UserProfile};
use crate::scripture::{splice, EnrichedCitation, ScriptureEnricher};

/// Overall confidence a classification must exceed to be written back onto
/// the user's profile.
pub const PROFILE_UPDATE_THRESHOLD: f64 = 0.75;

/// A prior conversation turn as sent by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(alias = "content")]
    pub message: String,
    #[serde(default, alias = "senderId")]
    pub sender_id: Option<String>,
}

impl ChatTurn {
    /// Tag the turn relative to the current user. Anonymous callers own the
    /// turns that carry no sender.
    pub fn to_history(&self, current_user: Option<&str>) -> HistoryTurn {
        HistoryTurn {
            message: self.message.clone(),
            sender_is_current_user: self.sender_id.as_deref() == current_user,
        }
    }
}

/// Input for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct ChatInput {
    pub message: String,
    /// Oldest first.
    pub history: Vec<ChatTurn>,
    pub bearer_token: Option<String>,
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub reply: String,
    pub classification: ClassificationResult,
    pub intent: Intent,
    pub enriched: Vec<EnrichedCitation>,
    pub user: Option<UserProfile>,
}

/// Wires the classifier, LLM, enricher and stores together.
#[derive(Clone)]
pub struct ChatPipeline {
    classifier: Arc<dyn Classifier>,
    llm: Arc<dyn CompletionClient>,
    enricher: ScriptureEnricher,
    profiles: Arc<dyn ProfileStore>,
    audit: Arc<dyn AuditSink>,
    web_search: bool,
}

impl ChatPipeline {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        llm: Arc<dyn CompletionClient>,
        enricher: ScriptureEnricher,
        profiles: Arc<dyn ProfileStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            classifier,
            llm,
            enricher,
            profiles,
            audit,
            web_search: true,
        }
    }

    pub fn with_web_search(mut self, web_search: bool) -> Self {
        self.web_search = web_search;
        self
    }

    pub async fn run(&self, input: ChatInput) -> Result<ChatOutcome, ChatError> {
        let message = input.message.trim();
        if message.is_empty() {
            return Err(ChatError::InvalidInput("Message is required".into()));
        }

        let user = self.resolve_user(input.bearer_token.as_deref()).await;
        let user_id = user.as_ref().map(|u| u.id.as_str());
        let history: Vec<HistoryTurn> = input
            .history
            .iter()
            .map(|turn| turn.to_history(user_id))
            .collect();

        let mut request = ClassificationRequest::new(message).with_history(history.clone());
        if let Some(user) = &user {
            request = request.with_declared(user.declared());
        }
        let classification = self.classifier.classify(&request);
        let intent = detect_intent(message);

        tracing::debug!(
            classifier = self.classifier.name(),
            tradition = %classification.tradition,
            language = %classification.language,
            confidence = classification.overall_confidence,
            intent = %intent,
            "message classified"
        );

        let completion = CompletionRequest {
            system_prompt: compose_prompt(&classification, user.as_ref()),
            messages: conversation_messages(&history, message),
            web_search: self.web_search,
        };
        let answer = match self.llm.complete(completion).await.and_then(|o| o.into_text()) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(model = self.llm.model(), error = %e, "completion failed");
                return Err(e.into());
            }
        };

        let citations = extract_citations(&answer, classification.tradition);
        let enriched = self
            .enricher
            .enrich(&citations, classification.language)
            .await;
        tracing::debug!(
            found = citations.len(),
            resolved = enriched.len(),
            "scripture enrichment finished"
        );
        let reply = splice(&answer, &enriched);

        self.spawn_side_effects(
            &classification,
            intent,
            user.as_ref(),
            message,
            &reply,
            enriched.len(),
        );

        Ok(ChatOutcome {
            reply,
            classification,
            intent,
            enriched,
            user,
        })
    }

    /// Unknown tokens and store failures fall back to anonymous mode.
    async fn resolve_user(&self, token: Option<&str>) -> Option<UserProfile> {
        let token = token?;
        match self.profiles.find_by_token(token).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                tracing::debug!("unknown bearer token, continuing anonymously");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "profile lookup failed, continuing anonymously");
                None
            }
        }
    }

    fn spawn_side_effects(
        &self,
        classification: &ClassificationResult,
        intent: Intent,
        user: Option<&UserProfile>,
        message: &str,
        reply: &str,
        scriptures: usize,
    ) {
        if let Some(user) = user {
            if classification.meets_threshold(PROFILE_UPDATE_THRESHOLD) {
                let profiles = Arc::clone(&self.profiles);
                let user_id = user.id.clone();
                let summary = DetectionSummary::from_result(classification);
                tokio::spawn(async move {
                    if let Err(e) = profiles.update_detection(&user_id, summary).await {
                        tracing::warn!(user_id = %user_id, error = %e, "profile update failed");
                    }
                });
            }
        }

        let entry = AuditEntry {
            id: Uuid::new_v4(),
            user_id: user.map(|u| u.id.clone()),
            tradition: classification.tradition,
            language: classification.language,
            confidence: classification.overall_confidence,
            intent,
            message_length: message.chars().count(),
            response_length: reply.chars().count(),
            scriptures_included: scriptures,
            created_at: Utc::now(),
        };
        let audit = Arc::clone(&self.audit);
        tokio::spawn(async move {
            if let Err(e) = audit.record(entry).await {
                tracing::warn!(error = %e, "audit write failed");
            }
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::citations::Citation;
    use crate::classifier::{LanguageCode, PatternClassifier, Tradition};
    use crate::llm::{CompletionError, CompletionOutput};
    use crate::profile::{InMemoryAuditSink, InMemoryProfileStore, StoreError};
    use crate::scripture::{LookupError, Passage, ScriptureSource};

    /// Replies with a fixed payload and remembers the last request.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedLlm {
        pub reply: Option<String>,
        pub last_request: Mutex<Option<CompletionRequest>>,
    }

    impl ScriptedLlm {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                last_request: Mutex::new(None),
            }
        }

        pub fn failing() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedLlm {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionOutput, CompletionError> {
            *self.last_request.lock() = Some(request);
            match &self.reply {
                Some(reply) => Ok(CompletionOutput::Response {
                    response: reply.clone(),
                }),
                None => Err(CompletionError::Status {
                    status: 503,
                    body: "upstream down".into(),
                }),
            }
        }
    }

    /// Resolves every citation except those in `failing`.
    pub(crate) struct StubScripture(pub Vec<String>);

    #[async_trait]
    impl ScriptureSource for StubScripture {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch(
            &self,
            citation: &Citation,
            _language: LanguageCode,
        ) -> Result<Option<Passage>, LookupError> {
            let reference = citation.to_string();
            if self.0.contains(&reference) {
                Err(LookupError::Status(502))
            } else {
                Ok(Some(Passage::new(citation.clone(), format!("passage {}", reference))))
            }
        }
    }

    struct BrokenAudit;

    #[async_trait]
    impl AuditSink for BrokenAudit {
        async fn record(&self, _entry: AuditEntry) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk full".into()))
        }
    }

    pub(crate) fn pipeline_with(
        llm: Arc<dyn CompletionClient>,
        profiles: Arc<dyn ProfileStore>,
        audit: Arc<dyn AuditSink>,
        failing: Vec<String>,
    ) -> ChatPipeline {
        let enricher = ScriptureEnricher::new(
            Arc::new(StubScripture(failing.clone())),
            Arc::new(StubScripture(failing)),
        );
        ChatPipeline::new(Arc::new(PatternClassifier::new()), llm, enricher, profiles, audit)
    }

    fn input(message: &str) -> ChatInput {
        ChatInput {
            message: message.into(),
            ..Default::default()
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let pipeline = pipeline_with(
            Arc::new(ScriptedLlm::replying("x")),
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(InMemoryAuditSink::new()),
            vec![],
        );
        let result = pipeline.run(input("   ")).await;
        assert!(matches!(result, Err(ChatError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_enriches_reply_and_audits() {
        let audit = InMemoryAuditSink::new();
        let llm = Arc::new(ScriptedLlm::replying(
            "Dios es amor: Juan 3:16, Romanos 8:28 y 1 Juan 4:8.",
        ));
        let pipeline = pipeline_with(
            llm.clone(),
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(audit.clone()),
            vec!["Romanos 8:28".into()],
        );

        let outcome = pipeline.run(input("¿Qué dice la Biblia del amor?")).await.unwrap();
        assert_eq!(outcome.classification.tradition, Tradition::Christianity);
        assert_eq!(outcome.enriched.len(), 2);
        assert!(outcome.reply.starts_with("Dios es amor: Juan 3:16"));
        assert!(outcome.reply.contains("1. **Juan 3:16**"));
        assert!(outcome.reply.contains("2. **1 Juan 4:8**"));

        let sent = llm.last_request.lock().clone().unwrap();
        assert!(sent.system_prompt.contains("anonymous/public"));
        assert!(sent.web_search);

        settle().await;
        let entries = audit.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].scriptures_included, 2);
        assert_eq!(entries[0].intent, Intent::Question);
        assert!(entries[0].user_id.is_none());
    }

    #[tokio::test]
    async fn test_completion_failure_is_fatal() {
        let audit = InMemoryAuditSink::new();
        let pipeline = pipeline_with(
            Arc::new(ScriptedLlm::failing()),
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(audit.clone()),
            vec![],
        );
        let result = pipeline.run(input("Hola")).await;
        assert!(matches!(result, Err(ChatError::Completion(_))));
        settle().await;
        assert!(audit.entries().is_empty());
    }

    #[tokio::test]
    async fn test_high_confidence_updates_profile() {
        let profiles = InMemoryProfileStore::new();
        let mut user = UserProfile::new("u-1", "Fátima", "fatima@example.org");
        user.declared_religion = Some(Tradition::Christianity);
        profiles.insert("tok", user);

        let pipeline = pipeline_with(
            Arc::new(ScriptedLlm::replying("Que la paz sea contigo.")),
            Arc::new(profiles.clone()),
            Arc::new(InMemoryAuditSink::new()),
            vec![],
        );
        let outcome = pipeline
            .run(ChatInput {
                message: "¿Qué enseña el Corán sobre el Ramadán?".into(),
                history: vec![],
                bearer_token: Some("tok".into()),
            })
            .await
            .unwrap();
        assert_eq!(outcome.classification.tradition, Tradition::Islam);
        assert!(outcome.classification.overall_confidence > PROFILE_UPDATE_THRESHOLD);

        settle().await;
        let detection = profiles.get("u-1").unwrap().detection.unwrap();
        assert_eq!(detection.religion, Tradition::Islam);
        assert_eq!(detection.language, LanguageCode::Es);
    }

    #[tokio::test]
    async fn test_low_confidence_leaves_profile_alone() {
        let profiles = InMemoryProfileStore::new();
        profiles.insert("tok", UserProfile::new("u-1", "Ana", "ana@example.org"));

        let pipeline = pipeline_with(
            Arc::new(ScriptedLlm::replying("Bendiciones.")),
            Arc::new(profiles.clone()),
            Arc::new(InMemoryAuditSink::new()),
            vec![],
        );
        // No tradition vocabulary: tradition confidence is the neutral 0.5.
        let outcome = pipeline
            .run(ChatInput {
                message: "gracias".into(),
                history: vec![],
                bearer_token: Some("tok".into()),
            })
            .await
            .unwrap();
        assert!(outcome.classification.overall_confidence <= PROFILE_UPDATE_THRESHOLD);

        settle().await;
        assert!(profiles.get("u-1").unwrap().detection.is_none());
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_affect_reply() {
        let pipeline = pipeline_with(
            Arc::new(ScriptedLlm::replying("Paz.")),
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(BrokenAudit),
            vec![],
        );
        let outcome = pipeline.run(input("Hola")).await.unwrap();
        assert_eq!(outcome.reply, "Paz.");
        settle().await;
    }

    #[tokio::test]
    async fn test_history_roles_follow_sender() {
        let profiles = InMemoryProfileStore::new();
        profiles.insert("tok", UserProfile::new("u-1", "Ana", "ana@example.org"));
        let llm = Arc::new(ScriptedLlm::replying("Amén."));
        let pipeline = pipeline_with(
            llm.clone(),
            Arc::new(profiles),
            Arc::new(InMemoryAuditSink::new()),
            vec![],
        )
        .with_web_search(false);

        pipeline
            .run(ChatInput {
                message: "¿Y después?".into(),
                history: vec![
                    ChatTurn {
                        message: "Háblame de Moisés".into(),
                        sender_id: Some("u-1".into()),
                    },
                    ChatTurn {
                        message: "Moisés guió al pueblo de Israel.".into(),
                        sender_id: Some("assistant".into()),
                    },
                ],
                bearer_token: Some("tok".into()),
            })
            .await
            .unwrap();

        let sent = llm.last_request.lock().clone().unwrap();
        let roles: Vec<String> = sent.messages.iter().map(|m| m.role.to_string()).collect();
        assert_eq!(roles, vec!["user", "assistant", "user"]);
        assert!(!sent.web_search);
        assert!(sent.system_prompt.contains("Name: Ana"));
    }

    #[test]
    fn test_anonymous_turn_ownership() {
        let own = ChatTurn {
            message: "hola".into(),
            sender_id: None,
        };
        let bot = ChatTurn {
            message: "hola".into(),
            sender_id: Some("assistant".into()),
        };
        assert!(own.to_history(None).sender_is_current_user);
        assert!(!bot.to_history(None).sender_is_current_user);
        assert!(!own.to_history(Some("u-1")).sender_is_current_user);
    }
}
