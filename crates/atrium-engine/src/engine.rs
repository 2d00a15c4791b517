use atrium_core::{IntentDecision, SessionId};
use atrium_llm::provider::{ChatRequest, LlmProvider};
use atrium_llm::router::ProviderRouter;
use tracing::warn;

use crate::history::ClassificationHistory;
use crate::{content_extractor, routing, stage1, stage2};

/// Intent & Routing Engine: stage 1 pattern table, stage 2 remote
/// classifier, routing-lane assignment, and the optional second-model
/// sequential rendering pass, per §4.1.
pub struct IntentEngine {
    fast_structured: ProviderRouter,
    fast_structured_model: String,
    high_fluency: ProviderRouter,
    high_fluency_model: String,
    history: ClassificationHistory,
}

impl IntentEngine {
    pub fn new(
        fast_structured: ProviderRouter,
        fast_structured_model: impl Into<String>,
        high_fluency: ProviderRouter,
        high_fluency_model: impl Into<String>,
    ) -> Self {
        Self {
            fast_structured,
            fast_structured_model: fast_structured_model.into(),
            high_fluency,
            high_fluency_model: high_fluency_model.into(),
            history: ClassificationHistory::new(),
        }
    }

    /// Runs the full two-stage classification and assigns a routing lane.
    ///
    /// Stage 1's pattern table only ever decides the intent tag. Stage 2
    /// always runs regardless of a stage-1 hit, because it's the only
    /// stage that fills in `parameters`/`dimensions` — a stage-1 hit with
    /// no stage-2 pass would leave every slot empty.
    pub async fn classify(&self, session_id: &SessionId, utterance: &str) -> IntentDecision {
        let stage1_tag = stage1::classify(utterance);
        let mut decision = stage2::classify(&self.fast_structured, &self.fast_structured_model, utterance).await;

        if let Some(tag) = stage1_tag {
            decision.intent_tag = tag;
            decision.explanation = "matched stage-1 pattern table".to_string();
        }
        decision.routing_lane = routing::lane_for(decision.intent_tag);

        self.history.record(session_id, decision.clone());
        decision
    }

    pub fn recent_history(&self, session_id: &SessionId) -> Vec<IntentDecision> {
        self.history.recent(session_id)
    }

    /// Renders a dialogue reply with the `high_fluency` provider, running
    /// the second-model sequential pass when the dimensions call for it
    /// (professional tone + med/high creative requirement). On second-model
    /// failure, degrades to the first provider's output and logs a warning,
    /// per §9 Open Question 1 — it never surfaces the failure to the user.
    pub async fn render_reply(
        &self,
        decision: &IntentDecision,
        system_prompt: &str,
        utterance: &str,
    ) -> String {
        let first = match self
            .high_fluency
            .send(&ChatRequest::new(&self.high_fluency_model, system_prompt).with_user(utterance))
            .await
        {
            Ok(resp) => resp.content,
            Err(e) => {
                warn!(error = %e, "high_fluency provider failed, returning apology");
                return "I'm having trouble generating a reply right now.".to_string();
            }
        };

        if !routing::needs_second_model_pass(&decision.dimensions) {
            return first;
        }

        self.polish_draft(&first, system_prompt).await
    }

    /// Drafts the content for an approval-gated intent (`send_email`,
    /// `generate_post_prompt_package`) with the `high_fluency` provider, then
    /// pulls the structured fields back out of the reply with
    /// `content_extractor` — the same extraction `render_reply`'s polish
    /// pass uses, reused here so a pending action's preview is never a raw,
    /// unparsed model reply.
    pub async fn render_approval_draft(&self, system_prompt: &str, utterance: &str) -> content_extractor::ExtractedContent {
        let draft = match self
            .high_fluency
            .send(&ChatRequest::new(&self.high_fluency_model, system_prompt).with_user(utterance))
            .await
        {
            Ok(resp) => resp.content,
            Err(e) => {
                warn!(error = %e, "high_fluency provider failed while drafting an approval-gated action");
                return content_extractor::ExtractedContent::default();
            }
        };
        content_extractor::extract(&draft)
    }

    async fn polish_draft(&self, first: &str, system_prompt: &str) -> String {
        let polish_prompt = format!(
            "Rewrite the following draft in a professional, polished tone. \
             Respond with 'Subject: ...' then 'Body: ...'.\n\nDraft:\n{first}"
        );
        match self
            .high_fluency
            .send(&ChatRequest::new(&self.high_fluency_model, system_prompt).with_user(polish_prompt))
            .await
        {
            Ok(resp) => {
                let extracted = content_extractor::extract(&resp.content);
                match extracted.subject {
                    Some(subject) => format!("Subject: {subject}\n\n{}", extracted.body),
                    None => extracted.body,
                }
            }
            Err(e) => {
                warn!(error = %e, "second-model pass failed, degrading to first provider's output");
                first.to_string()
            }
        }
    }
}
