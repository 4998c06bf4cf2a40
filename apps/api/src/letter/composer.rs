//! Prompt Composer — fills the cover letter template and hands it to the model.

use crate::letter::prompts::{COVER_LETTER_PROMPT_TEMPLATE, NO_COURSEWORK, SECTION_RULE};
use crate::llm_client::prompts::TONE_INSTRUCTION;
use crate::llm_client::{ChatModel, LlmError};

/// Every field the cover letter prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct PromptFields<'a> {
    pub job_role: &'a str,
    pub company_name: &'a str,
    pub company_context: &'a str,
    pub candidate_profile: &'a str,
    /// Retrieved coursework context; `None` or blank renders as "None".
    pub course_context: Option<&'a str>,
}

/// Builds the user message with sections in fixed order: company overview,
/// candidate profile, relevant coursework.
///
/// The fields are substituted in a single left-to-right pass, so text inside
/// one field that happens to look like a `{placeholder}` is left untouched.
pub fn build_prompt(fields: &PromptFields<'_>) -> String {
    let course_context = fields
        .course_context
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(NO_COURSEWORK);

    let mut out = String::with_capacity(COVER_LETTER_PROMPT_TEMPLATE.len() + 2048);
    let mut rest = COVER_LETTER_PROMPT_TEMPLATE;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            rest = "";
            break;
        };
        let value = match &after[..close] {
            "job_role" => fields.job_role,
            "company_name" => fields.company_name,
            "rule" => SECTION_RULE,
            "company_context" => fields.company_context,
            "candidate_profile" => fields.candidate_profile,
            "course_context" => course_context,
            "tone_instruction" => TONE_INSTRUCTION,
            _ => &rest[open..open + close + 2],
        };
        out.push_str(value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Composes the prompt and sends it as a single turn.
/// The model's text is returned verbatim.
pub async fn compose_and_generate(
    llm: &dyn ChatModel,
    system: &str,
    fields: &PromptFields<'_>,
) -> Result<String, LlmError> {
    let prompt = build_prompt(fields);
    llm.complete(system, &prompt).await
}
