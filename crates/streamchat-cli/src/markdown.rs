//! Markdown to styled terminal lines.
//!
//! Uses the same parser options as the HTML renderer in `streamchat-core`
//! so both frontends agree on what a message looks like. Fenced code blocks
//! are highlighted with syntect.

use std::sync::OnceLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

const THEME: &str = "base16-ocean.dark";

/// Render markdown as styled lines no wider than `width` for code blocks.
///
/// Prose lines are left for the paragraph widget to wrap.
#[must_use]
pub fn render_lines(text: &str, width: usize) -> Vec<Line<'static>> {
    LineBuilder::new(width).render(text)
}

/// Syntax sets are expensive to load, so they are shared by every render.
struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    fn shared() -> &'static Self {
        static HIGHLIGHTER: OnceLock<Highlighter> = OnceLock::new();
        HIGHLIGHTER.get_or_init(|| {
            let mut themes = ThemeSet::load_defaults();
            let theme = themes.themes.remove(THEME).unwrap_or_default();
            Self {
                syntaxes: SyntaxSet::load_defaults_newlines(),
                theme,
            }
        })
    }

    /// Highlight `code` and return one span list per source line.
    fn highlight(&self, code: &str, lang: &str) -> Vec<Vec<Span<'static>>> {
        let syntax = self
            .syntaxes
            .find_syntax_by_token(lang)
            .or_else(|| self.syntaxes.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());
        let mut lines = HighlightLines::new(syntax, &self.theme);

        LinesWithEndings::from(code)
            .map(|line| match lines.highlight_line(line, &self.syntaxes) {
                Ok(ranges) => ranges
                    .into_iter()
                    .filter_map(|(style, piece)| {
                        let piece = piece.trim_end_matches(['\n', '\r']);
                        (!piece.is_empty()).then(|| Span::styled(piece.to_string(), to_ratatui(style)))
                    })
                    .collect(),
                Err(e) => {
                    tracing::debug!(error = %e, lang, "Highlighting failed");
                    vec![Span::styled(
                        line.trim_end_matches(['\n', '\r']).to_string(),
                        Style::default().fg(Color::Yellow),
                    )]
                }
            })
            .collect()
    }
}

fn to_ratatui(style: syntect::highlighting::Style) -> Style {
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
    out
}

/// Accumulates lines while walking parser events.
struct LineBuilder {
    width: usize,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    styles: Vec<Style>,
    code: Option<CodeBlock>,
    /// One entry per open list: the next number for ordered lists.
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    link: Option<String>,
    table_cell: usize,
}

struct CodeBlock {
    lang: String,
    source: String,
}

impl LineBuilder {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
            spans: Vec::new(),
            styles: vec![Style::default()],
            code: None,
            lists: Vec::new(),
            quote_depth: 0,
            link: None,
            table_cell: 0,
        }
    }

    fn render(mut self, text: &str) -> Vec<Line<'static>> {
        let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
        for event in Parser::new_ext(text, options) {
            match event {
                Event::Start(tag) => self.start(tag),
                Event::End(tag) => self.end(tag),
                Event::Text(text) => self.text(&text),
                Event::Code(code) => self.spans.push(Span::styled(
                    format!("`{code}`"),
                    Style::default().fg(Color::Yellow).bg(Color::Rgb(40, 40, 40)),
                )),
                Event::SoftBreak | Event::HardBreak => self.flush(),
                Event::Rule => {
                    self.flush();
                    self.lines.push(Line::styled(
                        "─".repeat(self.width.min(60)),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                _ => {}
            }
        }
        self.flush();

        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, style: Style) {
        self.styles.push(self.style().patch(style));
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
    }

    fn blank(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    /// Start a new visual line inside a block quote.
    fn quote_prefix(&mut self) {
        if self.quote_depth > 0 && self.spans.is_empty() {
            self.spans.push(Span::styled(
                "│ ".repeat(self.quote_depth),
                Style::default().fg(Color::Blue),
            ));
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code.as_mut() {
            code.source.push_str(text);
            return;
        }
        let style = self.style();
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                self.flush();
            }
            if !part.is_empty() {
                self.quote_prefix();
                self.spans.push(Span::styled(part.to_string(), style));
            }
        }
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => {
                self.blank();
                let marker = match level {
                    HeadingLevel::H1 => "# ",
                    HeadingLevel::H2 => "## ",
                    HeadingLevel::H3 => "### ",
                    _ => "#### ",
                };
                let style = Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD);
                self.spans.push(Span::styled(marker, style));
                self.push_style(style);
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
                self.push_style(Style::default().fg(Color::Blue));
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.split_whitespace().next().unwrap_or("").to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.code = Some(CodeBlock {
                    lang,
                    source: String::new(),
                });
            }
            Tag::List(first) => {
                self.flush();
                self.lists.push(first);
            }
            Tag::Item => {
                self.flush();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let bullet = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let bullet = format!("{indent}{n}. ");
                        *n += 1;
                        bullet
                    }
                    _ => format!("{indent}• "),
                };
                self.quote_prefix();
                self.spans
                    .push(Span::styled(bullet, Style::default().fg(Color::Cyan)));
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT));
            }
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.into_string());
                self.push_style(
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            Tag::TableHead => {
                self.table_cell = 0;
                self.push_style(Style::default().add_modifier(Modifier::BOLD));
            }
            Tag::TableRow => self.table_cell = 0,
            Tag::TableCell => {
                if self.table_cell > 0 {
                    self.spans
                        .push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
                }
                self.table_cell += 1;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.pop_style();
                self.flush();
            }
            TagEnd::Paragraph => self.blank(),
            TagEnd::BlockQuote(_) => {
                self.pop_style();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank();
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    self.code_block(&code);
                }
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link.take() {
                    self.spans.push(Span::styled(
                        format!(" ({url})"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            TagEnd::TableHead => {
                self.pop_style();
                self.flush();
            }
            TagEnd::TableRow => self.flush(),
            TagEnd::Table => self.blank(),
            _ => {}
        }
    }

    /// Draw a fenced block with a language header, line numbers and
    /// truncation instead of wrapping.
    fn code_block(&mut self, code: &CodeBlock) {
        let gutter = Style::default().fg(Color::DarkGray);
        let rule_width = self.width.saturating_sub(2).min(44);

        if code.lang.is_empty() {
            self.lines.push(Line::from(vec![
                Span::styled("┌", gutter),
                Span::styled("─".repeat(rule_width), gutter),
            ]));
        } else {
            self.lines.push(Line::from(vec![
                Span::styled("┌─ ", gutter),
                Span::styled(
                    code.lang.clone(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" ", gutter),
                Span::styled(
                    "─".repeat(self.width.saturating_sub(code.lang.len() + 5).min(40)),
                    gutter,
                ),
            ]));
        }

        let highlighted = Highlighter::shared().highlight(&code.source, &code.lang);
        let number_width = highlighted.len().to_string().len();
        let numbered = highlighted.len() > 1;
        let prefix_width = if numbered { number_width + 5 } else { 4 };
        let max_width = self.width.saturating_sub(prefix_width + 2);

        for (i, spans) in highlighted.into_iter().enumerate() {
            let mut line = vec![Span::styled("│ ", gutter)];
            if numbered {
                line.push(Span::styled(
                    format!("{:>number_width$}", i + 1),
                    Style::default().fg(Color::Rgb(100, 100, 100)),
                ));
                line.push(Span::styled(" │ ", gutter));
            }
            line.extend(truncate(spans, max_width));
            self.lines.push(Line::from(line));
        }

        self.lines.push(Line::from(vec![
            Span::styled("└", gutter),
            Span::styled("─".repeat(rule_width), gutter),
        ]));
        self.lines.push(Line::default());
    }
}

/// Cut spans to `max` characters, marking the cut with an ellipsis.
fn truncate(spans: Vec<Span<'static>>, max: usize) -> Vec<Span<'static>> {
    let total: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    if total <= max {
        return spans;
    }

    let mut remaining = max.saturating_sub(1);
    let mut out = Vec::new();
    for span in spans {
        if remaining == 0 {
            break;
        }
        let len = span.content.chars().count();
        if len <= remaining {
            remaining -= len;
            out.push(span);
        } else {
            let cut: String = span.content.chars().take(remaining).collect();
            out.push(Span::styled(cut, span.style));
            remaining = 0;
        }
    }
    out.push(Span::styled("…", Style::default().fg(Color::DarkGray)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn simple_paragraph() {
        let lines = render_lines("Hello world", 80);
        assert_eq!(plain(&lines), vec!["Hello world"]);
    }

    #[test]
    fn paragraphs_are_separated_by_blank_line() {
        let lines = render_lines("one\n\ntwo", 80);
        assert_eq!(plain(&lines), vec!["one", "", "two"]);
    }

    #[test]
    fn strong_is_bold() {
        let lines = render_lines("**bold** text", 80);
        let bold = &lines[0].spans[0];
        assert_eq!(bold.content, "bold");
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        assert!(!lines[0].spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn bullet_and_ordered_lists() {
        let lines = render_lines("- a\n- b\n\n3. x\n4. y", 80);
        let text = plain(&lines);
        assert!(text.contains(&"• a".to_string()));
        assert!(text.contains(&"• b".to_string()));
        assert!(text.contains(&"3. x".to_string()));
        assert!(text.contains(&"4. y".to_string()));
    }

    #[test]
    fn code_block_has_frame_and_numbers() {
        let lines = render_lines("```rust\nfn main() {}\nlet x = 1;\n```", 80);
        let text = plain(&lines);
        assert!(text[0].starts_with("┌─ rust"));
        assert!(text[1].starts_with("│ 1 │ fn main"));
        assert!(text[2].starts_with("│ 2 │ let x"));
        assert!(text[3].starts_with('└'));
    }

    #[test]
    fn long_code_lines_are_truncated() {
        let source = format!("```\n{}\n```", "x".repeat(200));
        let lines = render_lines(&source, 40);
        assert!(lines.iter().all(|l| l.width() <= 40));
        assert!(plain(&lines)[1].ends_with('…'));
    }

    #[test]
    fn link_shows_destination() {
        let lines = render_lines("[docs](https://example.com)", 80);
        assert_eq!(plain(&lines), vec!["docs (https://example.com)"]);
    }

    #[test]
    fn table_cells_are_separated() {
        let lines = render_lines("| a | b |\n|---|---|\n| 1 | 2 |", 80);
        assert_eq!(plain(&lines), vec!["a │ b", "1 │ 2"]);
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(render_lines("", 80).is_empty());
    }
}
