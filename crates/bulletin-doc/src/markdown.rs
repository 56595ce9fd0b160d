//! Markdown round-trip: parse source into the typed tree, write the tree
//! back out as markdown.
//!
//! Parsing normalizes as it goes (adjacent same-style runs merge, tight list
//! items gain an explicit paragraph), so `parse(write(doc)) == doc` holds for
//! any document that came out of `parse`. The writer escapes text that would
//! otherwise read as markup, which keeps literal asterisks and list-like
//! prose intact across the trip.
//!
//! Tables and strikethrough are enabled; footnotes and task lists are not.

use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, HeadingLevel as MdHeadingLevel, Options, Parser, Tag, TagEnd,
};

use crate::document::{Document, text_pieces};
use crate::node::{
    Block, ColumnAlign, HeadingLevel, Inline, ListItem, push_inline, TableCell, TableRow, TextRun,
    TextStyle,
};

/// Parse markdown source into a document. Unknown or disabled constructs
/// degrade to plain text rather than failing.
pub fn parse(src: &str) -> Document {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let mut builder = TreeBuilder::default();
    for event in Parser::new_ext(src, options) {
        builder.event(event);
    }
    builder.finish()
}

/// Serialize a document to markdown. Inverse of [`parse`] for parsed trees.
pub fn write(doc: &Document) -> String {
    let mut out = String::new();
    for (i, block) in doc.blocks().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_block(&mut out, block, "", "");
    }
    out
}

// ── Parsing ─────────────────────────────────────────────────────────────────

struct LinkFrame {
    image: bool,
    url: String,
    title: Option<String>,
}

struct ListFrame {
    start: Option<u64>,
    items: Vec<ListItem>,
}

struct TableFrame {
    aligns: Vec<ColumnAlign>,
    header: TableRow,
    rows: Vec<TableRow>,
    current: Vec<TableCell>,
}

struct CodeFrame {
    language: Option<String>,
    text: String,
}

/// Event-walk state. `frames` collects blocks per open container (root,
/// quote, list item); `inline_stack` collects runs per open inline scope
/// (paragraph, heading, table cell, link children). Tight list items carry
/// bare text, which lands in an implicit scope flushed at the next block
/// boundary.
struct TreeBuilder {
    frames: Vec<Vec<Block>>,
    inline_stack: Vec<Vec<Inline>>,
    implicit_open: bool,
    links: Vec<LinkFrame>,
    lists: Vec<ListFrame>,
    table: Option<TableFrame>,
    code: Option<CodeFrame>,
    bold: usize,
    italic: usize,
    strike: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            frames: vec![Vec::new()],
            inline_stack: Vec::new(),
            implicit_open: false,
            links: Vec::new(),
            lists: Vec::new(),
            table: None,
            code: None,
            bold: 0,
            italic: 0,
            strike: 0,
        }
    }
}

impl TreeBuilder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(code) = &mut self.code {
                    code.text.push_str(&text);
                } else {
                    let style = self.style();
                    for piece in text_pieces(&text, style) {
                        self.push_inline_ev(piece);
                    }
                }
            }
            Event::Code(text) => {
                let mut style = self.style();
                style.code = true;
                self.push_inline_ev(Inline::Text(TextRun::styled(text.to_string(), style)));
            }
            Event::SoftBreak => {
                let style = self.style();
                self.push_inline_ev(Inline::Text(TextRun::styled(" ", style)));
            }
            Event::HardBreak => self.push_inline_ev(Inline::HardBreak),
            Event::Rule => {
                self.flush_implicit();
                self.push_block(Block::Rule);
            }
            // Raw HTML degrades to visible text.
            Event::Html(text) | Event::InlineHtml(text) => {
                let style = self.style();
                for piece in text_pieces(&text, style) {
                    self.push_inline_ev(piece);
                }
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph | Tag::Heading { .. } | Tag::HtmlBlock => {
                self.flush_implicit();
                self.inline_stack.push(Vec::new());
            }
            Tag::BlockQuote(_) => {
                self.flush_implicit();
                self.frames.push(Vec::new());
            }
            Tag::CodeBlock(kind) => {
                self.flush_implicit();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        let lang = info.split_whitespace().next().unwrap_or("");
                        (!lang.is_empty()).then(|| lang.to_string())
                    }
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeFrame {
                    language,
                    text: String::new(),
                });
            }
            Tag::List(start) => {
                self.flush_implicit();
                self.lists.push(ListFrame {
                    start,
                    items: Vec::new(),
                });
            }
            Tag::Item => self.frames.push(Vec::new()),
            Tag::Table(aligns) => {
                self.flush_implicit();
                self.table = Some(TableFrame {
                    aligns: aligns.iter().map(map_align).collect(),
                    header: TableRow::default(),
                    rows: Vec::new(),
                    current: Vec::new(),
                });
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = &mut self.table {
                    table.current.clear();
                }
            }
            Tag::TableCell => self.inline_stack.push(Vec::new()),
            Tag::Emphasis => self.italic += 1,
            Tag::Strong => self.bold += 1,
            Tag::Strikethrough => self.strike += 1,
            Tag::Link {
                dest_url, title, ..
            } => {
                self.links.push(LinkFrame {
                    image: false,
                    url: dest_url.to_string(),
                    title: non_empty(&title),
                });
                self.inline_stack.push(Vec::new());
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.links.push(LinkFrame {
                    image: true,
                    url: dest_url.to_string(),
                    title: non_empty(&title),
                });
                self.inline_stack.push(Vec::new());
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if let Some(inlines) = self.inline_stack.pop() {
                    self.push_block(Block::Paragraph { inlines });
                }
            }
            TagEnd::Heading(level) => {
                if let Some(inlines) = self.inline_stack.pop() {
                    self.push_block(Block::Heading {
                        level: HeadingLevel::new(heading_level_to_u8(level)),
                        inlines,
                    });
                }
            }
            TagEnd::HtmlBlock => {
                if let Some(inlines) = self.inline_stack.pop() {
                    if !inlines.is_empty() {
                        self.push_block(Block::Paragraph { inlines });
                    }
                }
            }
            TagEnd::BlockQuote(_) => {
                self.flush_implicit();
                if let Some(blocks) = self.frames.pop() {
                    self.push_block(Block::Quote { blocks });
                }
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    self.push_block(Block::CodeBlock {
                        language: code.language,
                        text: code.text,
                    });
                }
            }
            TagEnd::Item => {
                self.flush_implicit();
                if let Some(blocks) = self.frames.pop() {
                    if let Some(list) = self.lists.last_mut() {
                        list.items.push(ListItem::new(blocks));
                    }
                }
            }
            TagEnd::List(_) => {
                if let Some(list) = self.lists.pop() {
                    self.push_block(Block::List {
                        start: list.start,
                        items: list.items,
                    });
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.push_block(Block::Table {
                        aligns: table.aligns,
                        header: table.header,
                        rows: table.rows,
                    });
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = &mut self.table {
                    table.header = TableRow::new(std::mem::take(&mut table.current));
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = &mut self.table {
                    table.rows.push(TableRow::new(std::mem::take(&mut table.current)));
                }
            }
            TagEnd::TableCell => {
                if let Some(inlines) = self.inline_stack.pop() {
                    if let Some(table) = &mut self.table {
                        table.current.push(TableCell { inlines });
                    }
                }
            }
            TagEnd::Emphasis => self.italic = self.italic.saturating_sub(1),
            TagEnd::Strong => self.bold = self.bold.saturating_sub(1),
            TagEnd::Strikethrough => self.strike = self.strike.saturating_sub(1),
            TagEnd::Link | TagEnd::Image => {
                let children = self.inline_stack.pop().unwrap_or_default();
                if let Some(frame) = self.links.pop() {
                    let inline = if frame.image {
                        let mut alt = String::new();
                        for child in &children {
                            child.plain_text_into(&mut alt);
                        }
                        Inline::Image {
                            src: frame.url,
                            alt,
                            title: frame.title,
                        }
                    } else {
                        Inline::Link {
                            url: frame.url,
                            title: frame.title,
                            children,
                        }
                    };
                    self.push_inline_ev(inline);
                }
            }
            _ => {}
        }
    }

    fn style(&self) -> TextStyle {
        TextStyle {
            bold: self.bold > 0,
            italic: self.italic > 0,
            code: false,
            strikethrough: self.strike > 0,
        }
    }

    fn push_block(&mut self, block: Block) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(block);
        }
    }

    fn push_inline_ev(&mut self, inline: Inline) {
        if self.inline_stack.is_empty() {
            self.inline_stack.push(Vec::new());
            self.implicit_open = true;
        }
        if let Some(top) = self.inline_stack.last_mut() {
            push_inline(top, inline);
        }
    }

    /// Close the implicit inline scope of a tight list item, wrapping its
    /// runs in a paragraph.
    fn flush_implicit(&mut self) {
        if self.implicit_open && self.inline_stack.len() == 1 {
            self.implicit_open = false;
            if let Some(inlines) = self.inline_stack.pop() {
                if !inlines.is_empty() {
                    self.push_block(Block::Paragraph { inlines });
                }
            }
        }
    }

    fn finish(mut self) -> Document {
        self.flush_implicit();
        Document::from_blocks(self.frames.pop().unwrap_or_default())
    }
}

fn heading_level_to_u8(level: MdHeadingLevel) -> u8 {
    match level {
        MdHeadingLevel::H1 => 1,
        MdHeadingLevel::H2 => 2,
        MdHeadingLevel::H3 => 3,
        MdHeadingLevel::H4 => 4,
        MdHeadingLevel::H5 => 5,
        MdHeadingLevel::H6 => 6,
    }
}

fn map_align(align: &Alignment) -> ColumnAlign {
    match align {
        Alignment::None => ColumnAlign::None,
        Alignment::Left => ColumnAlign::Left,
        Alignment::Center => ColumnAlign::Center,
        Alignment::Right => ColumnAlign::Right,
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

// ── Writing ─────────────────────────────────────────────────────────────────

/// Write one block. `first` prefixes the first output line, `cont` every
/// later one; both carry the enclosing quote/list context. Output always
/// ends with a newline.
fn write_block(out: &mut String, block: &Block, first: &str, cont: &str) {
    match block {
        Block::Paragraph { inlines } => {
            if inlines.is_empty() {
                return;
            }
            let parts = render_inlines(inlines, true);
            let mut parts = parts.iter();
            out.push_str(first);
            if let Some(part) = parts.next() {
                out.push_str(&escape_line_start(part));
            }
            for part in parts {
                out.push_str("\\\n");
                out.push_str(cont);
                out.push_str(&escape_line_start(part));
            }
            out.push('\n');
        }
        Block::Heading { level, inlines } => {
            let text = render_inlines(inlines, false).pop().unwrap_or_default();
            out.push_str(first);
            for _ in 0..level.get() {
                out.push('#');
            }
            if !text.is_empty() {
                out.push(' ');
                out.push_str(&escape_trailing_hash(&text));
            }
            out.push('\n');
        }
        Block::List { start, items } => {
            for (i, item) in items.iter().enumerate() {
                let marker = match start {
                    Some(n) => format!("{}. ", n + i as u64),
                    None => "- ".to_string(),
                };
                let lead = if i == 0 { first } else { cont };
                let item_first = format!("{lead}{marker}");
                let item_cont = format!("{cont}{}", " ".repeat(marker.len()));
                if item.blocks.is_empty() {
                    out.push_str(item_first.trim_end());
                    out.push('\n');
                    continue;
                }
                for (j, child) in item.blocks.iter().enumerate() {
                    if j == 0 {
                        write_block(out, child, &item_first, &item_cont);
                    } else {
                        out.push('\n');
                        write_block(out, child, &item_cont, &item_cont);
                    }
                }
            }
        }
        Block::Quote { blocks } => {
            let quote_first = format!("{first}> ");
            let quote_cont = format!("{cont}> ");
            if blocks.is_empty() {
                out.push_str(quote_first.trim_end());
                out.push('\n');
                return;
            }
            for (j, child) in blocks.iter().enumerate() {
                if j == 0 {
                    write_block(out, child, &quote_first, &quote_cont);
                } else {
                    out.push_str(quote_cont.trim_end());
                    out.push('\n');
                    write_block(out, child, &quote_cont, &quote_cont);
                }
            }
        }
        Block::CodeBlock { language, text } => {
            let fence = "`".repeat((longest_run(text, '`') + 1).max(3));
            out.push_str(first);
            out.push_str(&fence);
            if let Some(lang) = language {
                out.push_str(lang);
            }
            out.push('\n');
            for line in text.lines() {
                out.push_str(cont);
                out.push_str(line);
                out.push('\n');
            }
            out.push_str(cont);
            out.push_str(&fence);
            out.push('\n');
        }
        Block::Table {
            aligns,
            header,
            rows,
        } => {
            write_table_row(out, first, header);
            out.push_str(cont);
            out.push('|');
            for i in 0..header.cells.len() {
                let align = aligns.get(i).copied().unwrap_or_default();
                out.push_str(match align {
                    ColumnAlign::None => " --- |",
                    ColumnAlign::Left => " :--- |",
                    ColumnAlign::Center => " :---: |",
                    ColumnAlign::Right => " ---: |",
                });
            }
            out.push('\n');
            for row in rows {
                write_table_row(out, cont, row);
            }
        }
        Block::Rule => {
            out.push_str(first);
            out.push_str("---\n");
        }
    }
}

fn write_table_row(out: &mut String, prefix: &str, row: &TableRow) {
    out.push_str(prefix);
    out.push('|');
    for cell in &row.cells {
        let text = render_inlines(&cell.inlines, false).pop().unwrap_or_default();
        out.push(' ');
        out.push_str(&text);
        out.push_str(" |");
    }
    out.push('\n');
}

/// Render runs into line parts. Hard breaks split parts when allowed and
/// flatten to spaces where markdown has no break syntax (headings, cells,
/// link text).
fn render_inlines(inlines: &[Inline], allow_breaks: bool) -> Vec<String> {
    let mut parts = vec![String::new()];
    render_into(&mut parts, inlines, allow_breaks);
    parts
}

fn render_into(parts: &mut Vec<String>, inlines: &[Inline], allow_breaks: bool) {
    for inline in inlines {
        match inline {
            Inline::Text(run) => {
                let rendered = render_run(run);
                if let Some(part) = parts.last_mut() {
                    part.push_str(&rendered);
                }
            }
            Inline::HardBreak => {
                if allow_breaks {
                    parts.push(String::new());
                } else if let Some(part) = parts.last_mut() {
                    part.push(' ');
                }
            }
            Inline::Link {
                url,
                title,
                children,
            } => {
                let text = render_inlines(children, false).pop().unwrap_or_default();
                if let Some(part) = parts.last_mut() {
                    part.push('[');
                    part.push_str(&text);
                    part.push_str("](");
                    part.push_str(&render_url(url));
                    push_title(part, title.as_deref());
                    part.push(')');
                }
            }
            Inline::Image { src, alt, title } => {
                if let Some(part) = parts.last_mut() {
                    part.push_str("![");
                    part.push_str(&escape_text(alt));
                    part.push_str("](");
                    part.push_str(&render_url(src));
                    push_title(part, title.as_deref());
                    part.push(')');
                }
            }
        }
    }
}

fn render_run(run: &TextRun) -> String {
    let mut text = if run.style.code {
        code_span(&run.text)
    } else {
        escape_text(&run.text)
    };
    if run.style.bold {
        text = format!("**{text}**");
    }
    if run.style.italic {
        text = format!("*{text}*");
    }
    if run.style.strikethrough {
        text = format!("~~{text}~~");
    }
    text
}

/// Wrap text in a code span, growing the delimiter past any backtick run in
/// the content and padding when the content touches the delimiters.
fn code_span(text: &str) -> String {
    if text.is_empty() {
        return "` `".to_string();
    }
    let delim = "`".repeat(longest_run(text, '`') + 1);
    let pad = text.starts_with('`')
        || text.ends_with('`')
        || text.starts_with(' ')
        || text.ends_with(' ');
    if pad {
        format!("{delim} {text} {delim}")
    } else {
        format!("{delim}{text}{delim}")
    }
}

/// Backslash-escape chars that would open inline markup.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '~' | '&' | '|') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape a rendered line that would otherwise read as a block construct
/// (list marker, heading, quote, thematic break, setext underline).
fn escape_line_start(part: &str) -> String {
    let digits = part.chars().take_while(char::is_ascii_digit).count();
    if (1..=9).contains(&digits) {
        let after = &part[digits..];
        if let Some(rest) = after.strip_prefix(['.', ')']) {
            if rest.is_empty() || rest.starts_with(' ') {
                return format!("{}\\{}", &part[..digits], after);
            }
        }
    }
    let Some(first) = part.chars().next() else {
        return String::new();
    };
    let rest = &part[first.len_utf8()..];
    let needs_escape = match first {
        '-' | '+' => rest.is_empty() || rest.starts_with(' ') || part.chars().all(|c| c == first),
        '>' => true,
        '#' => {
            let hashes = part.chars().take_while(|&c| c == '#').count();
            let after = &part[hashes..];
            hashes <= 6 && (after.is_empty() || after.starts_with(' '))
        }
        '=' => part.chars().all(|c| c == '='),
        _ => false,
    };
    if needs_escape {
        format!("\\{part}")
    } else {
        part.to_string()
    }
}

/// Keep a trailing `#` in a heading from reading as a closing sequence.
fn escape_trailing_hash(text: &str) -> String {
    match text.strip_suffix('#') {
        Some(head) => format!("{head}\\#"),
        None => text.to_string(),
    }
}

fn render_url(url: &str) -> String {
    if url.is_empty() || url.contains([' ', '(', ')']) {
        format!("<{url}>")
    } else {
        url.to_string()
    }
}

fn push_title(out: &mut String, title: Option<&str>) {
    if let Some(title) = title {
        out.push_str(" \"");
        out.push_str(&title.replace('"', "\\\""));
        out.push('"');
    }
}

fn longest_run(text: &str, target: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == target {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(src: &str) -> Document {
        let doc = parse(src);
        let rendered = write(&doc);
        let reparsed = parse(&rendered);
        assert_eq!(doc, reparsed, "unstable round trip via:\n{rendered}");
        doc
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse("").is_empty());
        assert_eq!(write(&Document::new()), "");
    }

    #[test]
    fn test_parse_basic_blocks() {
        let doc = parse("# Bulletin\n\nPremier paragraphe.\n\n---\n");
        assert_eq!(doc.block_count(), 3);
        assert_eq!(
            doc.blocks()[0],
            Block::Heading {
                level: HeadingLevel::new(1),
                inlines: vec![Inline::text("Bulletin")],
            }
        );
        assert_eq!(doc.blocks()[2], Block::Rule);
    }

    #[test]
    fn test_parse_styles() {
        let doc = parse("**gras** et *italique* et `code` et ~~barré~~");
        let Block::Paragraph { inlines } = &doc.blocks()[0] else {
            panic!("expected paragraph");
        };
        let styles: Vec<TextStyle> = inlines
            .iter()
            .filter_map(|i| match i {
                Inline::Text(run) => Some(run.style),
                _ => None,
            })
            .collect();
        assert!(styles[0].bold);
        assert!(styles[2].italic);
        assert!(styles[4].code);
        assert!(styles[6].strikethrough);
        assert_eq!(doc.plain_text(), "gras et italique et code et barré");
    }

    #[test]
    fn test_nested_emphasis_sets_both_flags() {
        let doc = parse("***très important***");
        let Block::Paragraph { inlines } = &doc.blocks()[0] else {
            panic!("expected paragraph");
        };
        let Inline::Text(run) = &inlines[0] else {
            panic!("expected run");
        };
        assert!(run.style.bold && run.style.italic);
        round_trip("***très important***");
    }

    #[test]
    fn test_tight_list_items_gain_paragraphs() {
        let doc = parse("- pommes\n- poires\n");
        let Block::List { start, items } = &doc.blocks()[0] else {
            panic!("expected list");
        };
        assert_eq!(*start, None);
        assert_eq!(items[0].blocks, vec![Block::paragraph("pommes")]);
        assert_eq!(items[1].blocks, vec![Block::paragraph("poires")]);
    }

    #[test]
    fn test_ordered_list_start_preserved() {
        let doc = round_trip("3. mars\n4. avril\n");
        let Block::List { start, .. } = &doc.blocks()[0] else {
            panic!("expected list");
        };
        assert_eq!(*start, Some(3));
    }

    #[test]
    fn test_nested_list_round_trip() {
        round_trip("- fruits\n  - pommes\n  - poires\n- légumes\n");
    }

    #[test]
    fn test_loose_item_with_two_paragraphs() {
        let doc = round_trip("- premier alinéa\n\n  second alinéa\n");
        let Block::List { items, .. } = &doc.blocks()[0] else {
            panic!("expected list");
        };
        assert_eq!(items[0].blocks.len(), 2);
    }

    #[test]
    fn test_quote_round_trip() {
        let doc = round_trip("> avis de gel\n>\n> protéger les jeunes plants\n");
        let Block::Quote { blocks } = &doc.blocks()[0] else {
            panic!("expected quote");
        };
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_code_block_keeps_language_and_content() {
        let doc = round_trip("```rust\nfn main() {}\n```\n");
        assert_eq!(
            doc.blocks()[0],
            Block::CodeBlock {
                language: Some("rust".into()),
                text: "fn main() {}\n".into(),
            }
        );
    }

    #[test]
    fn test_code_block_with_backticks_grows_fence() {
        let doc = parse("````\n``` pas une fin\n````\n");
        let rendered = write(&doc);
        assert!(rendered.starts_with("````"));
        assert_eq!(parse(&rendered), doc);
    }

    #[test]
    fn test_table_round_trip_with_alignment() {
        let doc = round_trip(
            "| Jour | T° min | T° max |\n| :--- | ---: | ---: |\n| lundi | 3 | 11 |\n| mardi | 5 | 14 |\n",
        );
        let Block::Table { aligns, rows, .. } = &doc.blocks()[0] else {
            panic!("expected table");
        };
        assert_eq!(
            aligns,
            &vec![ColumnAlign::Left, ColumnAlign::Right, ColumnAlign::Right]
        );
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_link_round_trip_with_title() {
        let doc = round_trip("[le relevé](https://example.org/releve \"station météo\")");
        let Block::Paragraph { inlines } = &doc.blocks()[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(
            inlines[0],
            Inline::Link {
                url: "https://example.org/releve".into(),
                title: Some("station météo".into()),
                children: vec![Inline::text("le relevé")],
            }
        );
    }

    #[test]
    fn test_image_flattens_alt_text() {
        let doc = round_trip("![rangée de *vignes*](vigne.png)");
        let Block::Paragraph { inlines } = &doc.blocks()[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(
            inlines[0],
            Inline::Image {
                src: "vigne.png".into(),
                alt: "rangée de vignes".into(),
                title: None,
            }
        );
    }

    #[test]
    fn test_hard_break_round_trip() {
        let doc = round_trip("ligne une\\\nligne deux\n");
        let Block::Paragraph { inlines } = &doc.blocks()[0] else {
            panic!("expected paragraph");
        };
        assert!(inlines.contains(&Inline::HardBreak));
    }

    #[test]
    fn test_soft_break_becomes_space() {
        let doc = parse("ligne une\nligne deux\n");
        assert_eq!(doc.plain_text(), "ligne une ligne deux");
    }

    #[test]
    fn test_literal_markers_survive_the_trip() {
        let doc = Document::from_blocks(vec![
            Block::paragraph("2. pas une énumération"),
            Block::paragraph("- pas une liste"),
            Block::paragraph("**pas du gras**"),
            Block::paragraph("# pas un titre"),
            Block::paragraph("> pas une citation"),
        ]);
        let reparsed = parse(&write(&doc));
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_multi_block_document_round_trip() {
        round_trip(
            "# Bulletin de la semaine\n\n\
             Les températures montent **nettement** depuis lundi.\n\n\
             ## Observations\n\n\
             - floraison des cerisiers\n\
             - retour des *hirondelles*\n\n\
             > Penser à pailler les semis.\n\n\
             ---\n\n\
             Fin du bulletin.\n",
        );
    }

    #[test]
    fn test_html_degrades_to_text() {
        let doc = parse("un <em>mot</em> en ligne\n");
        assert_eq!(doc.plain_text(), "un <em>mot</em> en ligne");
    }
}

