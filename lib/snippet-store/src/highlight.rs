//! Grammar and theme registries plus the derived-document renderer.
//!
//! `Highlighter` owns the two enumerated registries the store validates
//! against: syntect's syntax set (the lexer/grammar registry, with
//! lookup-by-token) and theme set (the style registry). Rendering is a pure
//! function of the five source fields, so re-rendering the same state twice
//! produces byte-identical output.

use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, Theme, ThemeSet};
use syntect::html::{
    IncludeBackground, highlighted_html_for_string, styled_line_to_highlighted_html,
};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::{StoreError, ValidationErrors};

/// The five source fields the derived document is computed from.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub code: &'a str,
    pub language: &'a str,
    pub style: &'a str,
    pub linenos: bool,
    pub title: &'a str,
}

pub struct Highlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            themes: ThemeSet::load_defaults(),
        }
    }

    /// Enumerated grammar names accepted as `language`.
    pub fn languages(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .syntaxes
            .syntaxes()
            .iter()
            .map(|syntax| syntax.name.to_ascii_lowercase())
            .collect();
        names.sort();
        names
    }

    /// Enumerated theme names accepted as `style`.
    pub fn styles(&self) -> Vec<String> {
        self.themes.themes.keys().cloned().collect()
    }

    /// Lookup-by-token over the grammar registry. Grammar names and file
    /// extensions both resolve ("python" and "py" name the same grammar).
    pub fn supports_language(&self, token: &str) -> bool {
        self.syntaxes.find_syntax_by_token(token).is_some()
    }

    pub fn supports_style(&self, name: &str) -> bool {
        self.themes.themes.contains_key(name)
    }

    /// Produce the complete, styled, self-contained HTML document for one
    /// snippet state. Invoked by the create and update paths only.
    pub fn render(&self, request: &RenderRequest<'_>) -> Result<String, StoreError> {
        let syntax = self
            .syntaxes
            .find_syntax_by_token(request.language)
            .ok_or_else(|| field_rejection("language", request.language))?;
        let theme = self
            .themes
            .themes
            .get(request.style)
            .ok_or_else(|| field_rejection("style", request.style))?;

        let body = if request.linenos {
            self.render_with_gutter(request.code, syntax, theme)?
        } else {
            highlighted_html_for_string(request.code, &self.syntaxes, syntax, theme)?
        };

        Ok(wrap_document(request.title, theme, &body))
    }

    /// Table-aligned rendering: line numbers in a gutter cell, highlighted
    /// source in the code cell.
    fn render_with_gutter(
        &self,
        code: &str,
        syntax: &SyntaxReference,
        theme: &Theme,
    ) -> Result<String, StoreError> {
        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut gutter = String::new();
        let mut rendered = String::new();
        for (index, line) in LinesWithEndings::from(code).enumerate() {
            let regions = highlighter.highlight_line(line, &self.syntaxes)?;
            gutter.push_str(&format!("{}\n", index + 1));
            rendered.push_str(&styled_line_to_highlighted_html(
                &regions,
                IncludeBackground::No,
            )?);
        }

        let background = css_color(theme.settings.background);
        Ok(format!(
            "<table class=\"highlighttable\"><tbody><tr>\
             <td class=\"linenos\"><pre>{gutter}</pre></td>\
             <td class=\"code\"><pre style=\"background-color:{background};\">{rendered}</pre></td>\
             </tr></tbody></table>"
        ))
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

fn field_rejection(field: &'static str, value: &str) -> StoreError {
    let mut errors = ValidationErrors::new();
    errors.push(field, format!("unknown {field} {value:?}"));
    StoreError::Validation(errors)
}

fn wrap_document(title: &str, theme: &Theme, body: &str) -> String {
    let background = css_color(theme.settings.background);
    let document_title = if title.is_empty() { "snippet" } else { title };
    let heading = if title.is_empty() {
        String::new()
    } else {
        format!(
            "<div class=\"snippet-title\">{}</div>\n",
            escape_html(title)
        )
    };
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>{}</title></head>\n\
         <body style=\"background-color:{};\">\n\
         {}{}\n\
         </body>\n\
         </html>\n",
        escape_html(document_title),
        background,
        heading,
        body
    )
}

fn css_color(color: Option<Color>) -> String {
    match color {
        Some(c) => format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b),
        None => "#ffffff".to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registries_expose_known_entries() {
        let highlighter = Highlighter::new();
        assert!(highlighter.supports_language("python"));
        assert!(highlighter.supports_language("rs"));
        assert!(!highlighter.supports_language("not-a-real-language"));
        assert!(highlighter.supports_style("InspiredGitHub"));
        assert!(!highlighter.supports_style("not-a-real-style"));
        assert!(!highlighter.languages().is_empty());
        assert!(!highlighter.styles().is_empty());
    }

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(escape_html("a<b> & \"c\""), "a&lt;b&gt; &amp; &quot;c&quot;");
    }
}
