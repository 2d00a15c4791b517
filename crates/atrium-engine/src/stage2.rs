//! Stage 2: the remote classifier. Invoked only when stage 1's pattern
//! table misses. Asks the `fast_structured` provider for a single JSON
//! object carrying both the intent tag and the nine-dimension assessment,
//! per §4.1.
//!
//! Malformed JSON is retried once; if the retry also fails to parse, or
//! every provider in the `fast_structured` router is unavailable, the
//! turn falls back to `IntentDecision::classifier_unavailable_default()`.

use std::collections::BTreeMap;

use atrium_core::{
    ContextDependency, CreativeRequirement, Dimensions, EmotionalComplexity, EngagementLevel,
    IntentDecision, IntentTag, ReasoningType, ResponseLength, RoutingLane, TechnicalComplexity,
};
use atrium_llm::provider::{ChatRequest, LlmProvider};
use atrium_llm::router::ProviderRouter;
use serde::Deserialize;
use tracing::warn;

const SYSTEM_PROMPT: &str = "You are an intent classifier. Given a user message, respond with a \
single JSON object: {\"intent_tag\": one of the closed catalogue of tags, \"parameters\": {...}, \
\"confidence\": 0.0-1.0, \"explanation\": \"...\", \"dimensions\": {\"emotional_complexity\": \
\"low|med|high\", \"professional_tone_required\": bool, \"creative_requirement\": \
\"none|low|med|high\", \"technical_complexity\": \"simple|moderate|complex\", \"response_length\": \
\"short|med|long\", \"engagement_level\": \"informational|conversational|interactive\", \
\"context_dependency\": \"none|session|historical\", \"reasoning_type\": \
\"logical|emotional|creative|analytical\"}}. Respond with JSON only, no prose.";

#[derive(Debug, Deserialize)]
struct RawDecision {
    intent_tag: String,
    #[serde(default)]
    parameters: BTreeMap<String, serde_json::Value>,
    confidence: f32,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    dimensions: RawDimensions,
}

#[derive(Debug, Default, Deserialize)]
struct RawDimensions {
    #[serde(default)]
    emotional_complexity: String,
    #[serde(default)]
    professional_tone_required: bool,
    #[serde(default)]
    creative_requirement: String,
    #[serde(default)]
    technical_complexity: String,
    #[serde(default)]
    response_length: String,
    #[serde(default)]
    engagement_level: String,
    #[serde(default)]
    context_dependency: String,
    #[serde(default)]
    reasoning_type: String,
}

impl From<RawDimensions> for Dimensions {
    fn from(raw: RawDimensions) -> Self {
        Dimensions {
            emotional_complexity: match raw.emotional_complexity.as_str() {
                "med" => EmotionalComplexity::Med,
                "high" => EmotionalComplexity::High,
                _ => EmotionalComplexity::Low,
            },
            professional_tone_required: raw.professional_tone_required,
            creative_requirement: match raw.creative_requirement.as_str() {
                "low" => CreativeRequirement::Low,
                "med" => CreativeRequirement::Med,
                "high" => CreativeRequirement::High,
                _ => CreativeRequirement::None,
            },
            technical_complexity: match raw.technical_complexity.as_str() {
                "moderate" => TechnicalComplexity::Moderate,
                "complex" => TechnicalComplexity::Complex,
                _ => TechnicalComplexity::Simple,
            },
            response_length: match raw.response_length.as_str() {
                "med" => ResponseLength::Med,
                "long" => ResponseLength::Long,
                _ => ResponseLength::Short,
            },
            engagement_level: match raw.engagement_level.as_str() {
                "informational" => EngagementLevel::Informational,
                "interactive" => EngagementLevel::Interactive,
                _ => EngagementLevel::Conversational,
            },
            context_dependency: match raw.context_dependency.as_str() {
                "session" => ContextDependency::Session,
                "historical" => ContextDependency::Historical,
                _ => ContextDependency::None,
            },
            reasoning_type: match raw.reasoning_type.as_str() {
                "logical" => ReasoningType::Logical,
                "emotional" => ReasoningType::Emotional,
                "analytical" => ReasoningType::Analytical,
                _ => ReasoningType::Creative,
            },
        }
    }
}

fn parse(text: &str) -> Option<IntentDecision> {
    let raw: RawDecision = serde_json::from_str(text.trim()).ok()?;
    let tag = IntentTag::from_str_tag(&raw.intent_tag)?;
    Some(IntentDecision {
        intent_tag: tag,
        parameters: raw.parameters,
        confidence: raw.confidence,
        routing_lane: RoutingLane::LlmReply, // lane is assigned by the caller via `crate::routing`
        explanation: raw.explanation,
        dimensions: raw.dimensions.into(),
    })
}

/// Runs the remote classification call, with one retry on malformed JSON.
pub async fn classify(router: &ProviderRouter, model: &str, utterance: &str) -> IntentDecision {
    let mut req = ChatRequest::new(model, SYSTEM_PROMPT).with_user(utterance);
    req.json_mode = true;

    for attempt in 0..2 {
        match router.send(&req).await {
            Ok(resp) => match parse(&resp.content) {
                Some(decision) => return decision,
                None => {
                    warn!(attempt, "stage2 classifier returned malformed JSON, retrying");
                    continue;
                }
            },
            Err(e) => {
                warn!(error = %e, "stage2 classifier call failed");
                return IntentDecision::classifier_unavailable_default();
            }
        }
    }

    IntentDecision::classifier_unavailable_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_decision() {
        let json = r#"{"intent_tag":"get_current_weather","parameters":{"city":"Austin"},
            "confidence":0.9,"explanation":"weather request",
            "dimensions":{"emotional_complexity":"low","professional_tone_required":false,
            "creative_requirement":"none","technical_complexity":"simple","response_length":"short",
            "engagement_level":"informational","context_dependency":"none","reasoning_type":"logical"}}"#;
        let decision = parse(json).unwrap();
        assert_eq!(decision.intent_tag, IntentTag::GetCurrentWeather);
        assert_eq!(decision.param_str("city"), Some("Austin"));
    }

    #[test]
    fn rejects_unknown_tag() {
        assert!(parse(r#"{"intent_tag":"not_a_real_tag","confidence":0.5}"#).is_none());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("not json at all").is_none());
    }
}
