//! Summaries arrive as markdown and are displayed in GTK labels, so they are
//! turned into Pango markup. Only the subset the summarizer prompts ask for
//! is handled: headings, lists, block quotes, rules, code and emphasis.

/// Converts markdown to Pango markup.
pub trait MarkdownRenderer {
    fn to_markup(&self, source: &str) -> String;
}

/// Render with `renderer`, or fall back to escaped text with line breaks kept.
pub fn render(source: &str, renderer: Option<&dyn MarkdownRenderer>) -> String {
    match renderer {
        Some(r) => r.to_markup(source),
        None => plain_markup(source),
    }
}

/// Escaped text with every line break preserved.
pub fn plain_markup(text: &str) -> String {
    escape(&text.replace("\r\n", "\n").replace('\r', "\n"))
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Line-oriented markdown renderer producing Pango markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct PangoMarkdown;

impl MarkdownRenderer for PangoMarkdown {
    fn to_markup(&self, source: &str) -> String {
        let mut lines = Vec::new();
        let mut in_code_block = false;

        for raw in source.replace("\r\n", "\n").lines() {
            let trimmed = raw.trim_start();

            if trimmed.starts_with("```") {
                in_code_block = !in_code_block;
                continue;
            }
            if in_code_block {
                lines.push(format!("<tt>{}</tt>", escape(raw)));
                continue;
            }

            lines.push(render_block_line(trimmed));
        }

        lines.join("\n")
    }
}

fn render_block_line(line: &str) -> String {
    if line.is_empty() {
        return String::new();
    }

    if is_rule(line) {
        return "<span alpha=\"50%\">────────────────</span>".to_string();
    }

    let hashes = line.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) && line[hashes..].starts_with(' ') {
        let size = match hashes {
            1 => "xx-large",
            2 => "x-large",
            3 => "large",
            _ => "medium",
        };
        return format!(
            "<span size=\"{size}\" weight=\"bold\">{}</span>",
            render_inline(line[hashes..].trim())
        );
    }

    if let Some(rest) = line.strip_prefix('>') {
        return format!("<span alpha=\"70%\">┃ </span><i>{}</i>", render_inline(rest.trim_start()));
    }

    for bullet in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return format!("  • {}", render_inline(rest));
        }
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && line[digits..].starts_with(". ") {
        return format!(
            "  {}. {}",
            &line[..digits],
            render_inline(&line[digits + 2..])
        );
    }

    render_inline(line)
}

fn is_rule(line: &str) -> bool {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|&m| compact.chars().all(|c| c == m))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Style {
    Bold,
    Italic,
}

impl Style {
    fn open(&self) -> &'static str {
        match self {
            Style::Bold => "<b>",
            Style::Italic => "<i>",
        }
    }

    fn close(&self) -> &'static str {
        match self {
            Style::Bold => "</b>",
            Style::Italic => "</i>",
        }
    }
}

/// Emphasis and inline code. Tags are always emitted properly nested and
/// anything left open is closed at the end of the line.
fn render_inline(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::new();
    let mut stack: Vec<Style> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '`' {
            if let Some(end) = chars[i + 1..].iter().position(|&x| x == '`') {
                let code: String = chars[i + 1..i + 1 + end].iter().collect();
                out.push_str("<tt>");
                out.push_str(&escape(&code));
                out.push_str("</tt>");
                i += end + 2;
                continue;
            }
        }

        if (c == '*' || c == '_') && chars.get(i + 1) == Some(&c) {
            toggle(&mut out, &mut stack, Style::Bold);
            i += 2;
            continue;
        }

        let marks_italic = match c {
            '*' => !spaced(&chars, i),
            '_' => word_boundary(&chars, i),
            _ => false,
        };
        if marks_italic {
            toggle(&mut out, &mut stack, Style::Italic);
            i += 1;
            continue;
        }

        out.push_str(&escape(&c.to_string()));
        i += 1;
    }

    for style in stack.iter().rev() {
        out.push_str(style.close());
    }
    out
}

/// `_` only marks emphasis at a word edge, so snake_case stays intact.
fn word_boundary(chars: &[char], i: usize) -> bool {
    let before = i.checked_sub(1).and_then(|j| chars.get(j));
    let after = chars.get(i + 1);
    let is_word = |c: Option<&char>| c.is_some_and(|c| c.is_alphanumeric());
    !(is_word(before) && is_word(after))
}

/// A `*` with blanks on both sides is arithmetic, not emphasis.
fn spaced(chars: &[char], i: usize) -> bool {
    let before = i.checked_sub(1).and_then(|j| chars.get(j));
    let after = chars.get(i + 1);
    let is_blank = |c: Option<&char>| c.map_or(true, |c| c.is_whitespace());
    is_blank(before) && is_blank(after)
}

fn toggle(out: &mut String, stack: &mut Vec<Style>, style: Style) {
    let Some(pos) = stack.iter().rposition(|&s| s == style) else {
        out.push_str(style.open());
        stack.push(style);
        return;
    };
    let reopen: Vec<Style> = stack.drain(pos + 1..).collect();
    for s in reopen.iter().rev() {
        out.push_str(s.close());
    }
    out.push_str(style.close());
    stack.pop();
    for s in &reopen {
        out.push_str(s.open());
        stack.push(*s);
    }
}
