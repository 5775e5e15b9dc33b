//! HTML pages for the browser form

use handlebars::Handlebars;
use recap_common::{RecapError, Result};
use serde::Serialize;

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Recap</title>
<style>
body { font-family: system-ui, sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
form { display: grid; gap: 0.75rem; }
input[type=text], input[type=password], input[type=url] { padding: 0.5rem; width: 100%; box-sizing: border-box; }
.warning { background: #fff4e5; border-left: 4px solid #f0a020; padding: 0.75rem 1rem; }
.summary { border-top: 1px solid #ddd; margin-top: 1.5rem; padding-top: 1rem; }
.meta { color: #777; font-size: 0.85rem; }
#spinner { display: none; }
#spinner.active { display: block; }
</style>
</head>
<body>
<h1>Recap</h1>
<p>Summarize a document (txt, md, pdf) or a YouTube video transcript.</p>
<form method="post" action="/summarize" enctype="multipart/form-data"
      onsubmit="document.getElementById('spinner').classList.add('active'); this.querySelector('button').disabled = true;">
  <label>YouTube URL <input type="url" name="video_url" value="{{video_url}}" placeholder="https://www.youtube.com/watch?v=..."></label>
  <label>Or upload a file <input type="file" name="file" accept=".txt,.md,.pdf"></label>
  <label>API key <input type="password" name="api_key" autocomplete="off"></label>
  <label><input type="checkbox" name="use_advanced_model"{{#if use_advanced_model}} checked{{/if}}> Use {{advanced_model}} for the final summary</label>
  <label><input type="checkbox" name="find_clusters"{{#if find_clusters}} checked{{/if}}> Summarize representative sections only</label>
  <button type="submit">Summarize</button>
</form>
<p id="spinner">Summarizing, this can take a few minutes...</p>
{{#if warning}}<p class="warning">{{warning}}</p>{{/if}}
{{#if summary_html}}
<section class="summary">
{{{summary_html}}}
<p class="meta">{{model}} &middot; {{chunks_summarized}} of {{chunks_total}} sections &middot; {{generated_at}}</p>
</section>
{{/if}}
</body>
</html>
"#;

/// Values shown on the page; everything except `summary_html` is escaped
#[derive(Debug, Default, Serialize)]
pub struct PageView {
    pub advanced_model: String,
    pub video_url: String,
    pub use_advanced_model: bool,
    pub find_clusters: bool,
    pub warning: Option<String>,
    pub summary_html: Option<String>,
    pub model: Option<String>,
    pub chunks_total: Option<usize>,
    pub chunks_summarized: Option<usize>,
    pub generated_at: Option<String>,
}

/// Compiled page templates
pub struct Pages {
    registry: Handlebars<'static>,
}

impl Pages {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string("page", PAGE_TEMPLATE)
            .map_err(|e| RecapError::config(format!("Invalid page template: {}", e)))?;
        Ok(Self { registry })
    }

    pub fn render(&self, view: &PageView) -> Result<String> {
        self.registry
            .render("page", view)
            .map_err(|e| RecapError::internal(format!("Failed to render page: {}", e)))
    }
}
