//! Prompt templates for summarization

use handlebars::Handlebars;
use recap_common::{RecapError, Result};
use serde_json::json;

/// Name of the single substitution slot
const TEXT_SLOT: &str = "text";

/// Per-chunk prompt for uploaded documents
pub const DOCUMENT_MAP_PROMPT: &str = r#"You will be given a single section of a document, delimited by triple backquotes.
Write a concise summary of the section that keeps every fact, figure, name and conclusion a reader would need.
Do not add information that is not in the section.

```{{text}}```

CONCISE SUMMARY:"#;

/// Combine prompt for uploaded documents
pub const DOCUMENT_COMBINE_PROMPT: &str = r#"You will be given a series of summaries of consecutive sections of a document, delimited by triple backquotes.
Merge them into one well organized summary of the whole document.

Guidelines:
- Start with a one paragraph overview.
- Follow with the key points as markdown bullet points, in the order they appear.
- Remove repetition and reconcile overlapping points.
- Use only facts from the summaries.

```{{text}}```

FINAL SUMMARY:"#;

/// Per-chunk prompt for video transcripts
pub const TRANSCRIPT_MAP_PROMPT: &str = r#"You will be given a part of a video transcript, delimited by triple backquotes.
Transcripts are unpunctuated speech and may contain filler words and recognition errors.
Summarize what the speakers say in this part: the topics, claims, examples and any conclusions.

```{{text}}```

SUMMARY OF THIS PART:"#;

/// Combine prompt for video transcripts
pub const TRANSCRIPT_COMBINE_PROMPT: &str = r#"You will be given summaries of consecutive parts of a video, delimited by triple backquotes.
Write a summary of the whole video for someone who has not watched it.

Guidelines:
- Open with two or three sentences on what the video is about.
- List the main points as markdown bullet points in the order they are covered.
- Finish with a short "Takeaways" section.
- Use only facts from the summaries.

```{{text}}```

VIDEO SUMMARY:"#;

/// Static prompt with one `{{text}}` slot
pub struct PromptTemplate {
    name: String,
    registry: Handlebars<'static>,
}

impl PromptTemplate {
    /// Compile a template; it must reference the `text` slot
    pub fn new(name: impl Into<String>, template: &str) -> Result<Self> {
        let name = name.into();

        if !template.contains("{{text}}") && !template.contains("{{ text }}") {
            return Err(RecapError::config(format!(
                "Prompt template '{}' has no {{{{{}}}}} slot",
                name, TEXT_SLOT
            )));
        }

        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        // Prompts are plain text; keep quotes and ampersands intact
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string(&name, template)
            .map_err(|e| RecapError::config(format!("Invalid prompt template '{}': {}", name, e)))?;

        Ok(Self { name, registry })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fill the slot with `text`
    pub fn render(&self, text: &str) -> Result<String> {
        self.registry
            .render(&self.name, &json!({ "text": text }))
            .map_err(|e| RecapError::internal(format!("Failed to render '{}': {}", self.name, e)))
    }
}

/// Map and combine prompts used together
pub struct PromptPair {
    pub map: PromptTemplate,
    pub combine: PromptTemplate,
}

impl PromptPair {
    pub fn new(name: &str, map: &str, combine: &str) -> Result<Self> {
        Ok(Self {
            map: PromptTemplate::new(format!("{}_map", name), map)?,
            combine: PromptTemplate::new(format!("{}_combine", name), combine)?,
        })
    }
}

/// Prompt pairs per input kind
pub struct PromptLibrary {
    pub document: PromptPair,
    pub transcript: PromptPair,
}

impl PromptLibrary {
    /// Built-in prompts
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            document: PromptPair::new("document", DOCUMENT_MAP_PROMPT, DOCUMENT_COMBINE_PROMPT)?,
            transcript: PromptPair::new(
                "transcript",
                TRANSCRIPT_MAP_PROMPT,
                TRANSCRIPT_COMBINE_PROMPT,
            )?,
        })
    }

    /// Pair for a document or a transcript
    pub fn select(&self, is_transcript: bool) -> &PromptPair {
        if is_transcript {
            &self.transcript
        } else {
            &self.document
        }
    }
}
