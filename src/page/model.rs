/*!
 * Data types shared by the PAGE extraction stages.
 */

use serde::{Deserialize, Serialize};

/// Region type from the PAGE controlled vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Header,
    Heading,
    Credit,
    SignatureMark,
    TocEntry,
    Paragraph,
    CatchWord,
    Caption,
    /// Any type outside the vocabulary (or a region without a type)
    Other,
}

impl RegionKind {
    /// Parse the `type` attribute of a `TextRegion`
    pub fn from_page_type(value: &str) -> Self {
        match value {
            "header" => Self::Header,
            "heading" => Self::Heading,
            "credit" => Self::Credit,
            "signature-mark" => Self::SignatureMark,
            "TOC-entry" => Self::TocEntry,
            "paragraph" => Self::Paragraph,
            "catch-word" => Self::CatchWord,
            "caption" => Self::Caption,
            _ => Self::Other,
        }
    }

    /// EzDrama marker attached to every line of a region of this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Header => "#",
            Self::Heading => "##",
            Self::Credit => "@",
            Self::SignatureMark => "$",
            Self::CatchWord => "^",
            Self::TocEntry | Self::Paragraph | Self::Caption | Self::Other => "",
        }
    }
}

/// One OCR text line with its position on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLine {
    /// Mean y of the line polygon
    pub vertical_position: f64,

    /// Minimum x of the line polygon
    pub horizontal_position: f64,

    /// Line text with its region prefix attached
    pub text: String,

    pub region_kind: RegionKind,
}

impl RawLine {
    pub fn new(vertical_position: f64, horizontal_position: f64, text: impl Into<String>, region_kind: RegionKind) -> Self {
        Self {
            vertical_position,
            horizontal_position,
            text: text.into(),
            region_kind,
        }
    }
}

/// Lines believed to form one reading row
#[derive(Debug, Clone, PartialEq)]
pub struct LineRow {
    /// Vertical position of the line that opened the row
    pub anchor: f64,

    /// Members in horizontal order
    pub members: Vec<RawLine>,
}

impl LineRow {
    pub fn new(anchor: f64) -> Self {
        Self {
            anchor,
            members: Vec::new(),
        }
    }

    /// Sort members left to right, breaking ties by text
    pub fn sort_members(&mut self) {
        self.members.sort_by(|a, b| {
            a.horizontal_position
                .total_cmp(&b.horizontal_position)
                .then_with(|| a.text.cmp(&b.text))
        });
    }
}
