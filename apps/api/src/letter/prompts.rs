// All LLM prompt constants for the cover letter module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Section separator between labelled prompt sections.
pub const SECTION_RULE: &str = "==================";

/// Rendered in place of the coursework section when no course context exists.
pub const NO_COURSEWORK: &str = "None";

/// Cover letter prompt template.
/// Replace: {job_role}, {company_name}, {rule}, {company_context},
///          {candidate_profile}, {course_context}, {tone_instruction}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"I am applying for the {job_role} position at {company_name}.
{rule}
Company Overview:
{company_context}
{rule}
Candidate Profile:
{candidate_profile}
{rule}
Relevant Coursework (if any):
{course_context}
{rule}
{tone_instruction}"#;
