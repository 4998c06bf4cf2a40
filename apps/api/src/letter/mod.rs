// Cover letter generation.
// Implements: prompt composition, the retrieval pipeline, and the HTTP surface.
// All LLM calls go through llm_client — no direct completion API calls here.

pub mod composer;
pub mod generator;
pub mod handlers;
pub mod prompts;
