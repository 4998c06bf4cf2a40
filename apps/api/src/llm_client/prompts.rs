// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System instruction for every cover letter request.
pub const CAREER_COACH_SYSTEM: &str = "You are a seasoned career coach, helping to craft \
    personalized, professional cover letters that highlight the candidate's strengths \
    and experience.";

/// Closing instruction appended to every cover letter prompt.
pub const TONE_INSTRUCTION: &str = "From the above information, please write a compelling, \
    customized cover letter. Ensure the tone is professional and matches the job \
    description, company values, and my skills and experiences.";
