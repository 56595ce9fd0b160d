//! Content node types: the typed tree a bulletin document is made of.
//!
//! A document is a sequence of [`Block`]s; leaf content lives in [`Inline`]
//! runs. All offsets in this crate count Unicode scalar values (`char`s), not
//! bytes, so multi-byte text (accented French prose included) addresses
//! cleanly.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ── Inline content ──────────────────────────────────────────────────────────

/// Character-level formatting carried by a [`TextRun`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub strikethrough: bool,
}

impl TextStyle {
    /// No formatting at all.
    pub const PLAIN: TextStyle = TextStyle {
        bold: false,
        italic: false,
        code: false,
        strikethrough: false,
    };

    pub fn is_plain(&self) -> bool {
        *self == Self::PLAIN
    }
}

/// A run of text with one uniform style.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default)]
    pub style: TextStyle,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::PLAIN,
        }
    }

    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Length in chars, not bytes.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Inline-level content inside a paragraph, heading, or table cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inline {
    /// A styled text run.
    Text(TextRun),
    /// A hyperlink wrapping further inline content.
    Link {
        url: String,
        title: Option<String>,
        children: Vec<Inline>,
    },
    /// An embedded image. Contributes nothing to plain text.
    Image {
        src: String,
        alt: String,
        title: Option<String>,
    },
    /// An explicit line break within a block.
    HardBreak,
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(TextRun::plain(text))
    }

    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Inline::Text(TextRun::styled(text, style))
    }

    /// Flattened length in chars. Images are zero-width; breaks count as one.
    pub fn char_len(&self) -> usize {
        match self {
            Inline::Text(run) => run.char_len(),
            Inline::Link { children, .. } => children.iter().map(Inline::char_len).sum(),
            Inline::Image { .. } => 0,
            Inline::HardBreak => 1,
        }
    }

    /// Append this inline's plain-text projection to `out`.
    pub fn plain_text_into(&self, out: &mut String) {
        match self {
            Inline::Text(run) => out.push_str(&run.text),
            Inline::Link { children, .. } => {
                for child in children {
                    child.plain_text_into(out);
                }
            }
            Inline::Image { .. } => {}
            Inline::HardBreak => out.push('\n'),
        }
    }
}

/// Push an inline onto a run list, merging adjacent text runs that share a
/// style so equivalent content always has one canonical shape.
pub(crate) fn push_inline(inlines: &mut Vec<Inline>, inline: Inline) {
    if let (Some(Inline::Text(last)), Inline::Text(run)) = (inlines.last_mut(), &inline) {
        if last.style == run.style {
            last.text.push_str(&run.text);
            return;
        }
    }
    inlines.push(inline);
}

// ── Block content ───────────────────────────────────────────────────────────

/// Heading depth, kept within the markdown range 1..=6.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub fn new(level: u8) -> Self {
        Self(level.clamp(1, 6))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl From<u8> for HeadingLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

/// One entry of a list. Items hold full blocks so nested lists and
/// multi-paragraph items are representable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub blocks: Vec<Block>,
}

impl ListItem {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// A single-paragraph item, the common case.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            blocks: vec![Block::paragraph(text)],
        }
    }
}

/// Horizontal alignment of one table column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnAlign {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// One cell of a table row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    pub inlines: Vec<Inline>,
}

impl TableCell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            inlines: vec![Inline::text(text)],
        }
    }
}

/// One row of a table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }
}

/// Coarse block classification, used in logs and errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Heading,
    List,
    Quote,
    CodeBlock,
    Table,
    Rule,
}

/// Top-level document content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    /// A run of inline content.
    Paragraph { inlines: Vec<Inline> },
    /// A heading with depth 1..=6.
    Heading {
        level: HeadingLevel,
        inlines: Vec<Inline>,
    },
    /// Ordered (`start` is the first number) or bullet (`start` is `None`).
    List {
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    /// A block quote wrapping further blocks.
    Quote { blocks: Vec<Block> },
    /// Fenced code. `text` keeps its trailing newline.
    CodeBlock {
        language: Option<String>,
        text: String,
    },
    /// A pipe table with one header row.
    Table {
        aligns: Vec<ColumnAlign>,
        header: TableRow,
        rows: Vec<TableRow>,
    },
    /// A thematic break.
    Rule,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        let text = text.into();
        let inlines = if text.is_empty() {
            Vec::new()
        } else {
            vec![Inline::text(text)]
        };
        Block::Paragraph { inlines }
    }

    pub fn empty_paragraph() -> Self {
        Block::Paragraph {
            inlines: Vec::new(),
        }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level: HeadingLevel::new(level),
            inlines: vec![Inline::text(text)],
        }
    }

    /// Fenced code with a normalized trailing newline.
    pub fn code(language: Option<&str>, text: impl Into<String>) -> Self {
        let mut text = text.into();
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        Block::CodeBlock {
            language: language.map(str::to_owned),
            text,
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Paragraph { .. } => BlockKind::Paragraph,
            Block::Heading { .. } => BlockKind::Heading,
            Block::List { .. } => BlockKind::List,
            Block::Quote { .. } => BlockKind::Quote,
            Block::CodeBlock { .. } => BlockKind::CodeBlock,
            Block::Table { .. } => BlockKind::Table,
            Block::Rule => BlockKind::Rule,
        }
    }

    /// Flattened length in chars, consistent with [`Block::plain_text_into`].
    pub fn char_len(&self) -> usize {
        match self {
            Block::Paragraph { inlines } | Block::Heading { inlines, .. } => {
                inlines.iter().map(Inline::char_len).sum()
            }
            Block::List { items, .. } => {
                let mut total = 0;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        total += 1;
                    }
                    for (j, block) in item.blocks.iter().enumerate() {
                        if j > 0 {
                            total += 1;
                        }
                        total += block.char_len();
                    }
                }
                total
            }
            Block::Quote { blocks } => {
                let mut total = 0;
                for (i, block) in blocks.iter().enumerate() {
                    if i > 0 {
                        total += 1;
                    }
                    total += block.char_len();
                }
                total
            }
            Block::CodeBlock { text, .. } => text.trim_end_matches('\n').chars().count(),
            Block::Table { header, rows, .. } => {
                let row_len = |row: &TableRow| {
                    let mut len = 0;
                    for (i, cell) in row.cells.iter().enumerate() {
                        if i > 0 {
                            len += 1;
                        }
                        len += cell.inlines.iter().map(Inline::char_len).sum::<usize>();
                    }
                    len
                };
                let mut total = row_len(header);
                for row in rows {
                    total += 1 + row_len(row);
                }
                total
            }
            Block::Rule => 0,
        }
    }

    /// Append this block's plain-text projection to `out`. Nested blocks and
    /// table cells are separated by single newlines / tabs.
    pub fn plain_text_into(&self, out: &mut String) {
        match self {
            Block::Paragraph { inlines } | Block::Heading { inlines, .. } => {
                for inline in inlines {
                    inline.plain_text_into(out);
                }
            }
            Block::List { items, .. } => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    for (j, block) in item.blocks.iter().enumerate() {
                        if j > 0 {
                            out.push('\n');
                        }
                        block.plain_text_into(out);
                    }
                }
            }
            Block::Quote { blocks } => {
                for (i, block) in blocks.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    block.plain_text_into(out);
                }
            }
            Block::CodeBlock { text, .. } => {
                out.push_str(text.trim_end_matches('\n'));
            }
            Block::Table { header, rows, .. } => {
                let row_into = |row: &TableRow, out: &mut String| {
                    for (i, cell) in row.cells.iter().enumerate() {
                        if i > 0 {
                            out.push('\t');
                        }
                        for inline in &cell.inlines {
                            inline.plain_text_into(out);
                        }
                    }
                };
                row_into(header, out);
                for row in rows {
                    out.push('\n');
                    row_into(row, out);
                }
            }
            Block::Rule => {}
        }
    }

    pub fn is_empty_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph { inlines } if inlines.is_empty())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_len_counts_chars_not_bytes() {
        let block = Block::paragraph("météo à l'aube");
        assert_eq!(block.char_len(), 14);
    }

    #[test]
    fn test_plain_text_flattens_links_and_breaks() {
        let block = Block::Paragraph {
            inlines: vec![
                Inline::text("voir "),
                Inline::Link {
                    url: "https://example.org".into(),
                    title: None,
                    children: vec![Inline::text("le relevé")],
                },
                Inline::HardBreak,
                Inline::text("suite"),
            ],
        };
        let mut out = String::new();
        block.plain_text_into(&mut out);
        assert_eq!(out, "voir le relevé\nsuite");
        assert_eq!(block.char_len(), out.chars().count());
    }

    #[test]
    fn test_image_is_zero_width() {
        let img = Inline::Image {
            src: "vigne.png".into(),
            alt: "parcelle".into(),
            title: None,
        };
        assert_eq!(img.char_len(), 0);
        let mut out = String::new();
        img.plain_text_into(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_heading_level_clamps() {
        assert_eq!(HeadingLevel::new(0).get(), 1);
        assert_eq!(HeadingLevel::new(3).get(), 3);
        assert_eq!(HeadingLevel::new(9).get(), 6);
    }

    #[test]
    fn test_push_inline_merges_same_style_runs() {
        let mut inlines = vec![Inline::text("Bonjour")];
        push_inline(&mut inlines, Inline::text(" le monde"));
        assert_eq!(inlines, vec![Inline::text("Bonjour le monde")]);

        let bold = TextStyle {
            bold: true,
            ..TextStyle::PLAIN
        };
        push_inline(&mut inlines, Inline::styled("!", bold));
        assert_eq!(inlines.len(), 2);
    }

    #[test]
    fn test_code_constructor_normalizes_trailing_newline() {
        let Block::CodeBlock { text, .. } = Block::code(Some("rust"), "fn main() {}") else {
            panic!("expected code block");
        };
        assert_eq!(text, "fn main() {}\n");
    }

    #[test]
    fn test_block_kind_display() {
        assert_eq!(Block::Rule.kind().to_string(), "rule");
        assert_eq!(Block::paragraph("x").kind().to_string(), "paragraph");
    }
}
