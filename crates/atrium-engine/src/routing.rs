//! Routing-lane assignment, per §4.1's rule table:
//! - tag is in the direct-automation set -> `direct_auto`
//! - tag is `send_email` or `generate_post_prompt_package` -> `approval_gated`
//! - everything else -> `llm_reply`

use atrium_core::{IntentTag, RoutingLane};

pub fn lane_for(tag: IntentTag) -> RoutingLane {
    if tag.is_approval_gated() {
        RoutingLane::ApprovalGated
    } else if tag.is_direct_automation() {
        RoutingLane::DirectAuto
    } else {
        RoutingLane::LlmReply
    }
}

/// Whether a decision should take the second-model sequential rendering
/// path: a professional tone is required and the creative requirement is
/// at least "med", per §4.1.
pub fn needs_second_model_pass(dims: &atrium_core::Dimensions) -> bool {
    use atrium_core::CreativeRequirement::*;
    dims.professional_tone_required && matches!(dims.creative_requirement, Med | High)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_email_is_approval_gated() {
        assert_eq!(lane_for(IntentTag::SendEmail), RoutingLane::ApprovalGated);
    }

    #[test]
    fn weather_is_direct_auto() {
        assert_eq!(lane_for(IntentTag::GetCurrentWeather), RoutingLane::DirectAuto);
    }

    #[test]
    fn general_chat_is_llm_reply() {
        assert_eq!(lane_for(IntentTag::GeneralChat), RoutingLane::LlmReply);
    }
}
