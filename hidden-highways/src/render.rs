//! HTML fragments for the results area, rendered with Tera.

use serde::Serialize;
use std::sync::Arc;
use tera::{Context, Tera};

use crate::{
    error::{PipelineFailure, RenderError},
    models::RecommendationSet,
};

/// Returned when even the error template cannot be rendered
pub const FALLBACK_FRAGMENT: &str =
    r#"<div id="results"><div class="error" data-kind="internal"><p>Something went wrong.</p></div></div>"#;

mod templates {
    pub const INDEX: &str = r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>HiddenHighways</title>
  <script src="https://unpkg.com/htmx.org@2.0.3"></script>
</head>
<body>
  <main>
    <h1>HiddenHighways</h1>
    <form>
      <label for="query">Search Query:</label>
      <input id="query" name="query" placeholder="e.g., Coffee in Middlesex VT" required>
      <label for="what_i_want">What are you looking for?</label>
      <input id="what_i_want" name="what_i_want" placeholder="e.g., coffee shop" required>
      <button type="submit" hx-post="/search" hx-trigger="click" hx-target="#results" hx-swap="outerHTML" hx-indicator="#spinner">Find</button>
    </form>
    <div id="spinner" class="htmx-indicator">Loading...</div>
    <div id="results"></div>
  </main>
</body>
</html>
"##;

    pub const RESULTS: &str = r#"<div id="results">
{%- if recommendations | length > 0 %}
{%- for rec in recommendations %}
  <div class="recommendation">
    <h2>{{ rec.name }}</h2>
    <p>Rating: {{ rec.score }} / 10</p>
    <p>{{ rec.reason }}</p>
  </div>
{%- endfor %}
{%- else %}
  <p class="empty-state">None of the places found look like local gems worth recommending.</p>
{%- endif %}
</div>"#;

    pub const NO_RESULTS: &str = r#"<div id="results">
  <p class="empty-state">No places found for "{{ query }}". Try a different or broader search.</p>
</div>"#;

    pub const FAILURE: &str = r#"<div id="results">
  <div class="error" data-kind="{{ kind }}">
    <h2>{{ title }}</h2>
    <p>{{ message }}</p>
  </div>
</div>"#;
}

/// What the results area should show
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Recommendations(RecommendationSet),
    /// The search succeeded but matched nothing
    NoResults { query: String },
    Failed(PipelineFailure),
}

#[derive(Serialize)]
struct RecommendationView<'a> {
    name: &'a str,
    score: String,
    reason: &'a str,
}

/// Escape text content and double-quoted attribute values.
///
/// Apostrophes and slashes are left alone so names like "Joe's Diner" read as typed.
fn escape_fragment_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders pages and fragments; cheap to clone
#[derive(Clone)]
pub struct ResultRenderer {
    tera: Arc<Tera>,
}

impl std::fmt::Debug for ResultRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultRenderer").finish_non_exhaustive()
    }
}

impl ResultRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.set_escape_fn(escape_fragment_text);

        tera.add_raw_templates(vec![
            ("index.html", templates::INDEX),
            ("results.html", templates::RESULTS),
            ("no_results.html", templates::NO_RESULTS),
            ("failure.html", templates::FAILURE),
        ])?;

        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    /// The search page served at `/`
    pub fn render_index(&self) -> Result<String, RenderError> {
        Ok(self.tera.render("index.html", &Context::new())?)
    }

    pub fn render(&self, outcome: &RenderOutcome) -> Result<String, RenderError> {
        let mut context = Context::new();
        let template = match outcome {
            RenderOutcome::Recommendations(recommendations) => {
                let views: Vec<RecommendationView<'_>> = recommendations
                    .iter()
                    .map(|rec| RecommendationView {
                        name: &rec.name,
                        score: rec.rating.to_string(),
                        reason: &rec.reason,
                    })
                    .collect();
                context.insert("recommendations", &views);
                "results.html"
            }
            RenderOutcome::NoResults { query } => {
                context.insert("query", query);
                "no_results.html"
            }
            RenderOutcome::Failed(failure) => {
                context.insert("kind", failure.kind.as_str());
                context.insert("title", failure.kind.title());
                context.insert("message", &failure.message);
                "failure.html"
            }
        };

        Ok(self.tera.render(template, &context)?)
    }

    /// Render a failure, falling back to a fixed fragment if templating itself fails
    pub fn render_failure(&self, failure: PipelineFailure) -> String {
        self.render(&RenderOutcome::Failed(failure))
            .unwrap_or_else(|_| FALLBACK_FRAGMENT.to_string())
    }
}
