#![allow(clippy::unwrap_used, clippy::expect_used, clippy::unwrap_in_result)]

use anyhow::Result;
use uuid::Uuid;

use snippet_store::{Highlighter, NewSnippet, Snippet, SnippetPatch, StoreError};

/// Text content of an HTML fragment with tags dropped, for assertions that
/// hold regardless of how the highlighter splits spans.
fn text_content(html: &str) -> String {
    let mut text = String::new();
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

#[test]
fn create_renders_code_without_gutter() -> Result<()> {
    let highlighter = Highlighter::new();
    let snippet = Snippet::compose(NewSnippet::new("print(1)", Uuid::new_v4()), &highlighter)?;

    assert!(!snippet.highlighted.is_empty());
    assert!(text_content(&snippet.highlighted).contains("print(1)"));
    assert!(!snippet.highlighted.contains("class=\"linenos\""));
    Ok(())
}

#[test]
fn create_with_linenos_renders_gutter() -> Result<()> {
    let highlighter = Highlighter::new();
    let snippet = Snippet::compose(
        NewSnippet::new("a = 1\nb = 2\n", Uuid::new_v4()).with_linenos(true),
        &highlighter,
    )?;

    assert!(snippet.highlighted.contains("class=\"linenos\""));
    let gutter_start = snippet.highlighted.find("class=\"linenos\"").unwrap();
    let gutter = &snippet.highlighted[gutter_start..];
    assert!(gutter.contains("1\n2\n"));
    Ok(())
}

#[test]
fn title_becomes_an_escaped_heading() -> Result<()> {
    let highlighter = Highlighter::new();
    let owner = Uuid::new_v4();

    let untitled = Snippet::compose(NewSnippet::new("a = 1", owner), &highlighter)?;
    assert!(!untitled.highlighted.contains("snippet-title"));

    let titled = Snippet::compose(
        NewSnippet::new("a = 1", owner).with_title("my <script>"),
        &highlighter,
    )?;
    assert!(titled.highlighted.contains("class=\"snippet-title\""));
    assert!(titled.highlighted.contains("my &lt;script&gt;"));
    assert!(!titled.highlighted.contains("my <script>"));
    Ok(())
}

#[test]
fn update_replaces_the_rendering() -> Result<()> {
    let highlighter = Highlighter::new();
    let mut snippet = Snippet::compose(NewSnippet::new("print(1)", Uuid::new_v4()), &highlighter)?;

    snippet.apply(SnippetPatch::new().with_code("print(2)"), &highlighter)?;

    let text = text_content(&snippet.highlighted);
    assert!(text.contains("print(2)"));
    assert!(!text.contains("print(1)"));
    Ok(())
}

#[test]
fn rendering_is_a_pure_function_of_field_state() -> Result<()> {
    let highlighter = Highlighter::new();
    let mut snippet = Snippet::compose(
        NewSnippet::new("a = 1\n", Uuid::new_v4()).with_linenos(true),
        &highlighter,
    )?;

    let patch = SnippetPatch::new().with_code("b = 2\n").with_linenos(false);
    snippet.apply(patch.clone(), &highlighter)?;
    let first = snippet.highlighted.clone();
    snippet.apply(patch, &highlighter)?;

    assert_eq!(first, snippet.highlighted);
    Ok(())
}

#[test]
fn every_advertised_style_renders() -> Result<()> {
    let highlighter = Highlighter::new();
    let owner = Uuid::new_v4();
    for style in highlighter.styles() {
        let snippet = Snippet::compose(
            NewSnippet::new("print(1)", owner).with_style(&style),
            &highlighter,
        )?;
        assert!(!snippet.highlighted.is_empty(), "style {style} rendered empty");
    }
    Ok(())
}

#[test]
fn unknown_language_is_a_structured_rejection() {
    let highlighter = Highlighter::new();
    let err = Snippet::compose(
        NewSnippet::new("print(1)", Uuid::new_v4()).with_language("not-a-real-language"),
        &highlighter,
    )
    .unwrap_err();

    match err {
        StoreError::Validation(errors) => {
            assert!(errors.contains("language"));
            assert!(!errors.contains("code"));
        }
        other => unreachable!("expected validation error, got {other:?}"),
    }
}
