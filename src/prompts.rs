//! Prompt templates for extraction and conversation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — tweaking an extraction guideline or the
//!    assistant's persona requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the rendered prompts directly
//!    without spinning up a real model, making prompt regressions easy to
//!    catch.

/// Build the one-shot prompt that turns raw PDF text into structured JSON.
pub fn extraction_prompt(pdf_text: &str) -> String {
    format!(
        r#"Please analyze the following form text and extract all fields and their values into a structured JSON format.

Guidelines:
1. Identify all form fields and their values
2. Maintain the hierarchical structure of the form
3. Use null for empty or missing values
4. Preserve field names as they appear in the form
5. Group related fields under appropriate categories
6. Ensure the output is valid JSON without any additional text or markdown formatting

Form Text:
{pdf_text}"#
    )
}

/// Build the system primer that seeds a conversation session.
///
/// `form_summary` is the flattened field digest from
/// [`crate::form::FormData::summary`]; the rest of the template fixes the
/// assistant's role and its licence to admit ignorance.
pub fn system_primer(form_summary: &str) -> String {
    format!(
        r#"You are a helpful assistant that can answer questions about a form. Here is the form data:

{form_summary}

You can help users by:
1. Answering questions about specific fields
2. Explaining the form structure
3. Providing insights about the data
4. Suggesting related information

Please be concise and friendly in your responses. If you don't have enough information to answer a question, say so."#
    )
}
