//! Analyst system prompts for the two earnings phases
//!
//! Both take a `language` variable (the display name, e.g. `Korean`).

use super::names;
use newbond_prompt::{JinjaTemplate, Result};

const LANGUAGE_CLAUSE: &str = "{% if language == 'Korean' %}  Because you are working in South Korea, \
all responses should be done in Korean not in English. \n {% else %}  All responses should be written \
in {{ language }}. \n {% endif %}";

const PERSONA: &str =
    "You are a seasoned stock market analyst{% if language == 'Korean' %} working in South Korea{% endif %}. ";

/// System prompt before the announcement
pub fn analyst_pre_announcement() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        names::SYSTEM_PRE,
        format!(
            "{PERSONA}Your task is to list the positive developments and potential concerns for companies \
             based on relevant news and stock price of target companies, \
             Then, make analysis and prediction for the companies' stock price movement for the upcoming month. \
             Your answer format should be as follows:\n\n\
             [Positive Developments]:\n1. ...\n\n\
             [Potential Concerns]:\n1. ...\n\n\
             [Prediction & Analysis]:\n...\n\n\
             {LANGUAGE_CLAUSE}"
        ),
    )
}

/// System prompt once results are out; adds the market reaction section
pub fn analyst_post_announcement() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        names::SYSTEM_POST,
        format!(
            "{PERSONA}Your task is to list the positive developments and potential concerns for companies \
             based on relevant news and stock price before an earning call of target companies, \
             then provide an market reaction with respect to the earning call. \
             Finally, make analysis and prediction for the companies' stock price movement for the upcoming month. \
             Your answer format should be as follows:\n\n\
             [Positive Developments]:\n1. ...\n\n\
             [Potential Concerns]:\n1. ...\n\n\
             [Market Reaction After Earning Call]:\n...\n\n\
             [Prediction & Analysis]:\n...\n\n\
             {LANGUAGE_CLAUSE}"
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use newbond_prompt::{Language, PromptTemplate};
    use serde_json::json;

    #[test]
    fn test_pre_headers_and_korean_clause() {
        let text = analyst_pre_announcement()
            .unwrap()
            .render(&Language::English, &json!({ "language": "Korean" }))
            .unwrap();
        assert!(text.starts_with("You are a seasoned stock market analyst working in South Korea."));
        for header in ["[Positive Developments]", "[Potential Concerns]", "[Prediction & Analysis]"] {
            assert!(text.contains(header));
        }
        assert!(!text.contains("[Market Reaction After Earning Call]"));
        assert!(text.contains("all responses should be done in Korean not in English"));
    }

    #[test]
    fn test_post_adds_market_reaction() {
        let text = analyst_post_announcement()
            .unwrap()
            .render(&Language::English, &json!({ "language": "English" }))
            .unwrap();
        assert!(text.contains("[Market Reaction After Earning Call]"));
        assert!(text.contains("then provide an market reaction with respect to the earning call"));
        assert!(text.contains("All responses should be written in English."));
        assert!(!text.contains("South Korea"));
    }
}
