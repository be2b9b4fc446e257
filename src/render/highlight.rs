// stream_reply — Incremental terminal rendering for streamed assistant replies
// Copyright (C) 2025  The stream-reply contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::error::HighlightError;
use crate::stream::CodeHighlighter;
use crate::stream::segment::DEFAULT_LANGUAGE;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use std::sync::LazyLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SynStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEMES: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Code highlighter backed by syntect's bundled grammars and themes.
#[derive(Debug, Clone)]
pub struct SyntectHighlighter {
    theme: String,
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self::with_theme(DEFAULT_THEME)
    }

    pub fn with_theme(theme: impl Into<String>) -> Self {
        Self { theme: theme.into() }
    }

    fn theme(&self) -> Result<&'static Theme, HighlightError> {
        THEMES
            .themes
            .get(&self.theme)
            .ok_or_else(|| HighlightError::Engine(format!("unknown theme `{}`", self.theme)))
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeHighlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<Vec<Line<'static>>, HighlightError> {
        let syntaxes = &*SYNTAXES;
        let syntax = resolve_syntax(syntaxes, code, language);
        let mut highlighter = HighlightLines::new(syntax, self.theme()?);

        let mut out = Vec::new();
        for line in LinesWithEndings::from(code) {
            let ranges = highlighter.highlight_line(line, syntaxes)?;
            out.push(Line::from(ranges.into_iter().map(span_from_syn).collect::<Vec<_>>()));
        }
        Ok(out)
    }
}

/// Syntax for a fence tag, falling back to detection from the code itself.
fn resolve_syntax<'a>(syntaxes: &'a SyntaxSet, code: &str, language: &str) -> &'a SyntaxReference {
    let labelled = if language.is_empty() || language == DEFAULT_LANGUAGE {
        None
    } else {
        find_syntax(syntaxes, language)
    };

    labelled
        .or_else(|| {
            first_non_empty_line(code).and_then(|line| syntaxes.find_syntax_by_first_line(line))
        })
        .or_else(|| detect_language(code).and_then(|detected| find_syntax(syntaxes, detected)))
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text())
}

fn find_syntax<'a>(syntaxes: &'a SyntaxSet, language: &str) -> Option<&'a SyntaxReference> {
    let language = normalize_language(language);
    syntaxes
        .find_syntax_by_token(language)
        .or_else(|| syntaxes.find_syntax_by_extension(language))
        .or_else(|| syntaxes.find_syntax_by_name(language))
}

fn first_non_empty_line(code: &str) -> Option<&str> {
    code.lines().find(|line| !line.trim().is_empty())
}

/// Map common fence tags onto names the bundled grammars know.
pub fn normalize_language(language: &str) -> &str {
    match language {
        "sh" | "bash" | "zsh" | "shell" | "console" => "bash",
        "js" | "javascript" | "mjs" | "cjs" | "jsx" => "js",
        "ts" | "typescript" | "tsx" => "ts",
        "py" | "python" | "py3" => "py",
        "rs" | "rust" => "rs",
        "c++" | "cpp" | "cxx" | "cc" | "hpp" => "cpp",
        "cs" | "csharp" | "c#" => "cs",
        "rb" | "ruby" => "rb",
        "yml" | "yaml" => "yaml",
        "md" | "markdown" => "md",
        "htm" | "html" | "xhtml" => "html",
        "golang" | "go" => "go",
        other => other,
    }
}

/// Keyword sniffing for untagged blocks, checked in a fixed order.
pub fn detect_language(code: &str) -> Option<&'static str> {
    let sample: String = code.lines().take(24).collect::<Vec<_>>().join("\n");
    let trimmed = sample.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let lower = sample.to_ascii_lowercase();
    let has = |needles: &[&str]| needles.iter().filter(|needle| sample.contains(**needle)).count();

    if trimmed.starts_with("<?php") {
        return Some("php");
    }
    let start = trimmed.to_ascii_lowercase();
    if ["<!doctype html", "<html", "<div"].iter().any(|tag| start.starts_with(tag)) {
        return Some("html");
    }
    let rust_hits = has(&["fn ", "let mut ", "impl ", "pub fn", "use std::", "-> "]);
    if rust_hits >= 2 && sample.contains('{') {
        return Some("rust");
    }
    if has(&["package main", "func ", ":= ", "fmt."]) >= 2 {
        return Some("go");
    }
    if has(&["public class ", "public static void", "System.out.", "private "]) >= 2 {
        return Some("java");
    }
    if has(&["#include", "std::", "int main(", "cout <<"]) >= 2 {
        return Some("cpp");
    }
    if has(&["def ", "import ", "self.", "elif ", "print("]) >= 2 && !sample.contains(';') {
        return Some("python");
    }
    if has(&["function ", "const ", "=> ", "console.log", "document."]) >= 2 {
        return Some("javascript");
    }
    if ["select ", "insert into", "create table", "update ", "delete from"]
        .iter()
        .any(|keyword| lower.contains(keyword))
        && sample.contains(';')
    {
        return Some("sql");
    }
    None
}

fn span_from_syn((style, text): (SynStyle, &str)) -> Span<'static> {
    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    let content = text.strip_suffix('\n').unwrap_or(text);
    let content = content.strip_suffix('\r').unwrap_or(content);
    Span::styled(content.to_owned(), out)
}
