//! Rendering projector: one chapter's sections -> a presentation layout
//!
//! Layouts are plain data (serializable) so any front end can draw them.
//! Every function here is pure over (sections, mode, options).

mod segments;

use crate::align::PageAnnotations;
use crate::corpus::{Chapter, Section};
use crate::pages::PageId;
use crate::tokens::{Script, WordForm, LINE_BREAK_STR};
use segments::{needs_separator, ruby_segments, script_segments, TextSource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// Romanized and Han blocks side by side with one verse-number gutter
    #[default]
    Dual,
    /// Han base with Romanized annotation above each word
    Ruby,
    #[serde(alias = "han")]
    HanOnly,
    #[serde(alias = "rom")]
    RomOnly,
}

impl RenderMode {
    pub fn single_script(&self) -> Option<Script> {
        match self {
            RenderMode::HanOnly => Some(Script::Han),
            RenderMode::RomOnly => Some(Script::Rom),
            RenderMode::Dual | RenderMode::Ruby => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Word {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        form: Option<WordForm>,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        proper_name: bool,
    },
    Punct {
        text: String,
    },
    Ruby {
        base: String,
        annotation: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        form: Option<WordForm>,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        proper_name: bool,
    },
    /// A line of a flattened string, used when no token stream is available
    Text {
        text: String,
    },
    Break,
    /// Synthesized inter-verse space; not part of the verse's own text
    Separator,
}

impl Segment {
    /// This segment's contribution to its verse's flattened text
    pub fn text(&self) -> &str {
        match self {
            Segment::Word { text, .. } | Segment::Punct { text } | Segment::Text { text } => text,
            Segment::Ruby { base, .. } => base,
            Segment::Break => LINE_BREAK_STR,
            Segment::Separator => "",
        }
    }
}

/// Concatenated text of a segment run, synthesized separators excluded
pub fn segments_text(segments: &[Segment]) -> String {
    segments.iter().map(Segment::text).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum VerseBody {
    Dual { rom: Vec<Segment>, han: Vec<Segment> },
    Inline { segments: Vec<Segment> },
    /// Nothing to show for this verse
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum Block {
    Verse {
        number: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        page: Option<PageId>,
        body: VerseBody,
    },
    /// Foreword heading
    Heading { body: VerseBody },
    /// Foreword paragraph: consecutive sections without numbers or page links
    Paragraph { bodies: Vec<VerseBody> },
    /// The chapter has no content to render
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub mode: RenderMode,
    pub foreword: bool,
    pub blocks: Vec<Block>,
}

impl Layout {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.blocks.as_slice(), [Block::Placeholder])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions<'a> {
    /// Front matter: paragraphs, no verse numbers, no page links
    pub foreword: bool,
    pub annotations: Option<&'a PageAnnotations>,
}

/// Render a chapter; a missing chapter renders as a placeholder
pub fn render_chapter(chapter: Option<&Chapter>, mode: RenderMode, options: RenderOptions<'_>) -> Layout {
    let sections = chapter.map(|c| c.sections.as_slice()).unwrap_or_default();
    render_sections(sections, mode, options)
}

pub fn render_sections(sections: &[Section], mode: RenderMode, options: RenderOptions<'_>) -> Layout {
    let blocks = if options.foreword {
        foreword_blocks(sections, mode)
    } else {
        verse_blocks(sections, mode, options.annotations)
    };

    let blocks = if blocks.is_empty() { vec![Block::Placeholder] } else { blocks };
    Layout { mode, foreword: options.foreword, blocks }
}

fn verse_blocks(sections: &[Section], mode: RenderMode, annotations: Option<&PageAnnotations>) -> Vec<Block> {
    sections
        .iter()
        .filter_map(|s| match s {
            Section::Verse(v) => Some(v),
            Section::Heading(_) => None,
        })
        .map(|v| Block::Verse {
            number: v.verse,
            page: annotations.and_then(|a| a.get(v.verse)).cloned(),
            body: body(v.into(), mode, true),
        })
        .collect()
}

fn foreword_blocks(sections: &[Section], mode: RenderMode) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<VerseBody> = Vec::new();

    for section in sections {
        match section {
            Section::Heading(h) => {
                if !paragraph.is_empty() {
                    blocks.push(Block::Paragraph { bodies: std::mem::take(&mut paragraph) });
                }
                blocks.push(Block::Heading { body: body(h.into(), mode, false) });
            }
            Section::Verse(v) => paragraph.push(body(v.into(), mode, false)),
        }
    }
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph { bodies: paragraph });
    }
    blocks
}

fn body(src: TextSource<'_>, mode: RenderMode, separate: bool) -> VerseBody {
    let body = match mode {
        RenderMode::Dual => VerseBody::Dual {
            rom: script_segments(src, Script::Rom),
            han: script_segments(src, Script::Han),
        },
        RenderMode::Ruby => VerseBody::Inline { segments: ruby_segments(src) },
        RenderMode::HanOnly => VerseBody::Inline { segments: script_segments(src, Script::Han) },
        RenderMode::RomOnly => {
            let mut segments = script_segments(src, Script::Rom);
            if separate && needs_separator(src, &segments_text(&segments)) {
                segments.push(Segment::Separator);
            }
            VerseBody::Inline { segments }
        }
    };

    let empty = match &body {
        VerseBody::Dual { rom, han } => rom.is_empty() && han.is_empty(),
        VerseBody::Inline { segments } => segments.is_empty(),
        VerseBody::Empty => true,
    };
    if empty {
        VerseBody::Empty
    } else {
        body
    }
}
