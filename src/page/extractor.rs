/*!
 * PAGE-XML line extraction.
 *
 * Reads one PAGE document and yields its text lines with the geometry needed
 * to rebuild reading order. Elements are matched by local name so every PAGE
 * schema revision (2013, 2017, 2019 namespaces) is accepted.
 */

use std::path::{Path, PathBuf};

use log::{debug, warn};
use roxmltree::Node;

use crate::errors::PageError;
use crate::page::model::{RawLine, RegionKind};

/// Marker prepended to the lines of the first table-of-contents region
pub const TOC_MARKER: char = '~';

/// A text line as found in the document
#[derive(Debug, Clone, PartialEq)]
pub struct PageTextLine {
    /// Chosen reading, untrimmed
    pub text: String,

    /// (vertical centre, horizontal minimum); `None` when the polygon is missing or malformed
    pub position: Option<(f64, f64)>,
}

/// A `TextRegion` with its lines in document order
#[derive(Debug, Clone, PartialEq)]
pub struct PageRegion {
    pub kind: RegionKind,
    pub lines: Vec<PageTextLine>,
}

/// One parsed PAGE document
#[derive(Debug, Clone)]
pub struct PageDocument {
    /// File the document was read from (used in log messages)
    pub source: PathBuf,
    pub regions: Vec<PageRegion>,
}

impl PageDocument {
    /// Read and parse a PAGE file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PageError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| PageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse PAGE XML held in memory
    pub fn parse(xml: &str, source: &Path) -> Result<Self, PageError> {
        let doc = roxmltree::Document::parse(xml).map_err(|e| PageError::Xml {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?;

        let regions: Vec<PageRegion> = doc
            .descendants()
            .filter(|n| n.has_tag_name("TextRegion"))
            .map(|region| PageRegion {
                kind: RegionKind::from_page_type(region.attribute("type").unwrap_or("")),
                lines: region
                    .children()
                    .filter(|n| n.has_tag_name("TextLine"))
                    .filter_map(|line| read_line(line, source))
                    .collect(),
            })
            .collect();

        debug!("Parsed {} regions from {:?}", regions.len(), source);

        Ok(Self {
            source: source.to_path_buf(),
            regions,
        })
    }

    /// Positioned lines with their region prefixes, in discovery order.
    ///
    /// Lines without usable geometry are skipped. Caption regions get their
    /// lines wrapped in parentheses and the first TOC region gets the `~` marker.
    pub fn raw_lines(&self) -> Vec<RawLine> {
        let mut result = Vec::new();
        let mut toc_seen = false;

        for region in &self.regions {
            let first_toc = region.kind == RegionKind::TocEntry && !toc_seen;
            if region.kind == RegionKind::TocEntry {
                toc_seen = true;
            }

            let usable: Vec<(f64, f64, &str)> = region
                .lines
                .iter()
                .filter_map(|line| match line.position {
                    Some((y, x)) => Some((y, x, line.text.as_str())),
                    None => {
                        warn!("Skipping line without usable coordinates in {:?}: {:?}", self.source, line.text);
                        None
                    }
                })
                .collect();

            let count = usable.len();
            for (index, (y, x, text)) in usable.into_iter().enumerate() {
                let mut annotated = String::new();
                if first_toc {
                    annotated.push(TOC_MARKER);
                }
                annotated.push_str(region.kind.prefix());
                if region.kind == RegionKind::Caption {
                    annotated.push_str(&wrap_caption_line(text, index, count));
                } else {
                    annotated.push_str(text);
                }
                result.push(RawLine::new(y, x, annotated, region.kind));
            }
        }

        result
    }

    /// Trimmed text of every line in every TOC region, geometry not required
    pub fn toc_lines(&self) -> Vec<String> {
        self.regions
            .iter()
            .filter(|r| r.kind == RegionKind::TocEntry)
            .flat_map(|r| r.lines.iter())
            .map(|line| line.text.trim().to_string())
            .collect()
    }

    /// Unprefixed text of positioned lines inside paragraph regions
    pub fn paragraph_lines(&self) -> Vec<String> {
        self.regions
            .iter()
            .filter(|r| r.kind == RegionKind::Paragraph)
            .flat_map(|r| r.lines.iter())
            .filter(|line| line.position.is_some())
            .map(|line| line.text.clone())
            .collect()
    }
}

fn wrap_caption_line(text: &str, index: usize, count: usize) -> String {
    match (index == 0, index + 1 == count) {
        (true, true) => format!("({})", text),
        (true, false) => format!("({}", text),
        (false, true) => format!("{})", text),
        (false, false) => text.to_string(),
    }
}

fn read_line(line: Node, source: &Path) -> Option<PageTextLine> {
    let Some(text) = choose_reading(line) else {
        debug!("Skipping line {:?} without a Unicode reading in {:?}", line.attribute("id").unwrap_or("?"), source);
        return None;
    };
    let position = line
        .children()
        .find(|n| n.has_tag_name("Coords"))
        .and_then(|coords| {
            let parsed = polygon_points(coords);
            if parsed.is_none() {
                debug!("Malformed Coords in {:?} for line {:?}", source, text);
            }
            parsed
        })
        .and_then(|points| line_position(&points));

    Some(PageTextLine { text, position })
}

/// Prefer the reading with `index="0"`, else the last alternative
fn choose_reading(line: Node) -> Option<String> {
    let equivs: Vec<Node> = line.children().filter(|n| n.has_tag_name("TextEquiv")).collect();
    let chosen = equivs
        .iter()
        .find(|te| te.attribute("index") == Some("0"))
        .or_else(|| equivs.last())?;

    chosen
        .children()
        .find(|n| n.has_tag_name("Unicode"))
        .and_then(|u| u.text())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

/// Points from `@points`, or from legacy `<Point x= y=/>` children
fn polygon_points(coords: Node) -> Option<Vec<(f64, f64)>> {
    if let Some(points) = coords.attribute("points") {
        return parse_points(points);
    }

    let legacy: Option<Vec<(f64, f64)>> = coords
        .children()
        .filter(|n| n.has_tag_name("Point"))
        .map(|p| {
            let x: f64 = p.attribute("x")?.trim().parse().ok()?;
            let y: f64 = p.attribute("y")?.trim().parse().ok()?;
            Some((x, y))
        })
        .collect();
    legacy.filter(|pts| !pts.is_empty())
}

/// Parse a `"x,y x,y ..."` point list
pub fn parse_points(points: &str) -> Option<Vec<(f64, f64)>> {
    let parsed: Option<Vec<(f64, f64)>> = points
        .split_whitespace()
        .map(|pair| {
            let (x, y) = pair.split_once(',')?;
            let x: f64 = x.trim().parse().ok()?;
            let y: f64 = y.trim().parse().ok()?;
            Some((x, y))
        })
        .collect();
    parsed.filter(|pts| !pts.is_empty())
}

/// (mean y, min x) of a polygon
fn line_position(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let x_min = points.iter().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
    let y_center = points.iter().map(|(_, y)| *y).sum::<f64>() / points.len() as f64;
    Some((y_center, x_min))
}
