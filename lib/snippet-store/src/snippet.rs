//! The snippet record and its single write path.
//!
//! `highlighted` is derived from the other fields and is never editable on
//! its own: `compose` and `apply` are the only ways to produce a `Snippet`
//! with new content, and both finish by re-rendering before any backend gets
//! to persist the record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::highlight::{Highlighter, RenderRequest};
use crate::{Storable, StoreDatetime, StoreError, ValidationErrors};

/// Grammar token assumed when a create omits `language`.
pub const DEFAULT_LANGUAGE: &str = "python";

/// Theme assumed when a create omits `style`.
pub const DEFAULT_STYLE: &str = "InspiredGitHub";

/// A stored unit of source code plus rendering preferences and the derived
/// styled-output document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: Uuid,
    pub created: StoreDatetime,
    pub title: String,
    pub code: String,
    pub linenos: bool,
    pub language: String,
    pub style: String,
    pub owner: Uuid,
    pub highlighted: String,
}

/// Input for creating a snippet. `owner` is required and has no default.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSnippet {
    #[serde(default)]
    pub title: String,
    pub code: String,
    #[serde(default)]
    pub linenos: bool,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_style")]
    pub style: String,
    pub owner: Uuid,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_style() -> String {
    DEFAULT_STYLE.to_string()
}

impl NewSnippet {
    pub fn new(code: impl Into<String>, owner: Uuid) -> Self {
        Self {
            title: String::new(),
            code: code.into(),
            linenos: false,
            language: default_language(),
            style: default_style(),
            owner,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_linenos(mut self, linenos: bool) -> Self {
        self.linenos = linenos;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }
}

/// Partial update of the mutable fields. There is deliberately no way to
/// express a change to `owner`, `created` or `id` here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetPatch {
    pub title: Option<String>,
    pub code: Option<String>,
    pub linenos: Option<bool>,
    pub language: Option<String>,
    pub style: Option<String>,
}

impl SnippetPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_linenos(mut self, linenos: bool) -> Self {
        self.linenos = Some(linenos);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }
}

impl Snippet {
    /// Validate a create input, assign identity and creation time, and render
    /// the derived document. The caller persists the returned record as one
    /// write; on error nothing exists to persist.
    pub fn compose(input: NewSnippet, highlighter: &Highlighter) -> Result<Snippet, StoreError> {
        let mut errors = ValidationErrors::new();
        if input.code.is_empty() {
            errors.push("code", "must not be empty");
        }
        if !highlighter.supports_language(&input.language) {
            errors.push("language", format!("unknown language {:?}", input.language));
        }
        if !highlighter.supports_style(&input.style) {
            errors.push("style", format!("unknown style {:?}", input.style));
        }
        errors.into_result()?;

        let highlighted = highlighter.render(&RenderRequest {
            code: &input.code,
            language: &input.language,
            style: &input.style,
            linenos: input.linenos,
            title: &input.title,
        })?;

        let snippet = Snippet {
            id: Uuid::new_v4(),
            created: StoreDatetime::now(),
            title: input.title,
            code: input.code,
            linenos: input.linenos,
            language: input.language,
            style: input.style,
            owner: input.owner,
            highlighted,
        };
        log::debug!(
            "composed snippet {} ({} rendered bytes)",
            snippet.id,
            snippet.highlighted.len()
        );
        Ok(snippet)
    }

    /// Apply a partial update, then unconditionally re-render the derived
    /// document from the resulting state. Validation runs before any field is
    /// touched, so a rejected patch leaves the record exactly as it was.
    pub fn apply(&mut self, patch: SnippetPatch, highlighter: &Highlighter) -> Result<(), StoreError> {
        let mut errors = ValidationErrors::new();
        if let Some(code) = &patch.code {
            if code.is_empty() {
                errors.push("code", "must not be empty");
            }
        }
        if let Some(language) = &patch.language {
            if !highlighter.supports_language(language) {
                errors.push("language", format!("unknown language {language:?}"));
            }
        }
        if let Some(style) = &patch.style {
            if !highlighter.supports_style(style) {
                errors.push("style", format!("unknown style {style:?}"));
            }
        }
        errors.into_result()?;

        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(code) = patch.code {
            self.code = code;
        }
        if let Some(linenos) = patch.linenos {
            self.linenos = linenos;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(style) = patch.style {
            self.style = style;
        }

        self.highlighted = highlighter.render(&self.render_request())?;
        log::debug!(
            "re-rendered snippet {} ({} rendered bytes)",
            self.id,
            self.highlighted.len()
        );
        Ok(())
    }

    fn render_request(&self) -> RenderRequest<'_> {
        RenderRequest {
            code: &self.code,
            language: &self.language,
            style: &self.style,
            linenos: self.linenos,
            title: &self.title,
        }
    }
}

impl Storable for Snippet {
    fn table_name() -> &'static str {
        "snippets"
    }

    fn columns() -> &'static [&'static str] {
        &[
            "id",
            "created",
            "title",
            "code",
            "linenos",
            "language",
            "style",
            "owner_id",
            "highlighted",
        ]
    }

    fn column_types() -> &'static [&'static str] {
        &[
            "text", "datetime", "text", "text", "boolean", "text", "text", "text", "text",
        ]
    }

    fn json_keys() -> &'static [&'static str] {
        &[
            "id",
            "created",
            "title",
            "code",
            "linenos",
            "language",
            "style",
            "owner",
            "highlighted",
        ]
    }

    fn id(&self) -> String {
        self.id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_fills_defaults() {
        let highlighter = Highlighter::new();
        let input = NewSnippet::new("print(1)", Uuid::new_v4());
        assert_eq!(input.language, DEFAULT_LANGUAGE);
        assert_eq!(input.style, DEFAULT_STYLE);
        assert_eq!(input.title, "");
        assert!(!input.linenos);

        let snippet = Snippet::compose(input, &highlighter).unwrap();
        assert!(!snippet.highlighted.is_empty());
    }

    #[test]
    fn compose_collects_every_bad_field() {
        let highlighter = Highlighter::new();
        let input = NewSnippet::new("", Uuid::new_v4())
            .with_language("not-a-real-language")
            .with_style("not-a-real-style");

        let err = Snippet::compose(input, &highlighter).unwrap_err();
        match err {
            StoreError::Validation(errors) => {
                assert!(errors.contains("code"));
                assert!(errors.contains("language"));
                assert!(errors.contains("style"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejected_patch_leaves_record_untouched() {
        let highlighter = Highlighter::new();
        let mut snippet =
            Snippet::compose(NewSnippet::new("a = 1", Uuid::new_v4()), &highlighter).unwrap();
        let before = snippet.clone();

        let err = snippet
            .apply(
                SnippetPatch::new()
                    .with_code("b = 2")
                    .with_language("not-a-real-language"),
                &highlighter,
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(snippet.code, before.code);
        assert_eq!(snippet.highlighted, before.highlighted);
    }

    #[test]
    fn storable_metadata_is_aligned() {
        assert_eq!(Snippet::columns().len(), Snippet::column_types().len());
        assert_eq!(Snippet::columns().len(), Snippet::json_keys().len());
        assert_eq!(Snippet::column_count(), 9);
    }
}
