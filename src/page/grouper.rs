/*!
 * Reading-order reconstruction.
 *
 * Lines from one page are clustered into rows by vertical proximity, rows are
 * ordered top to bottom and their members left to right. Known speaker names
 * at the start of a line are split off into `@` speaker lines.
 */

use log::debug;

use crate::app_config::{DramaMetadata, ExtractionConfig};
use crate::page::model::{LineRow, RawLine};

/// Clusters positioned lines into reading rows
#[derive(Debug, Clone)]
pub struct ParagraphGrouper {
    gap_factor: f64,
    bucket_size: f64,
}

impl Default for ParagraphGrouper {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl ParagraphGrouper {
    pub fn new(gap_factor: f64, bucket_size: f64) -> Self {
        Self { gap_factor, bucket_size }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.gap_factor, config.bucket_size)
    }

    /// Maximum vertical distance between a line and its row anchor
    pub fn threshold(&self, lines: &[RawLine]) -> f64 {
        let mut positions: Vec<f64> = lines.iter().map(|l| l.vertical_position).collect();
        positions.sort_by(f64::total_cmp);
        positions.dedup();

        let mut gaps: Vec<f64> = positions.windows(2).map(|w| w[1] - w[0]).collect();
        gaps.sort_by(f64::total_cmp);

        let median = match gaps.len() {
            0 => 0.0,
            n if n % 2 == 1 => gaps[n / 2],
            n => (gaps[n / 2 - 1] + gaps[n / 2]) / 2.0,
        };

        median * self.gap_factor
    }

    /// Group lines into rows ordered by anchor, members ordered by x
    pub fn group(&self, mut lines: Vec<RawLine>) -> Vec<LineRow> {
        let threshold = self.threshold(&lines);
        let bucket = self.bucket_size;

        lines.sort_by(|a, b| {
            let ka = (a.vertical_position / bucket).round_ties_even() * bucket;
            let kb = (b.vertical_position / bucket).round_ties_even() * bucket;
            ka.total_cmp(&kb)
                .then_with(|| a.horizontal_position.total_cmp(&b.horizontal_position))
        });

        let mut rows: Vec<LineRow> = Vec::new();
        for line in lines {
            let y = line.vertical_position;
            let mut closest: Option<(usize, f64)> = None;
            for (index, row) in rows.iter().enumerate() {
                let distance = (y - row.anchor).abs();
                if distance > threshold {
                    continue;
                }
                // strict comparison keeps the earliest row on ties
                if closest.is_none_or(|(_, best)| distance < best) {
                    closest = Some((index, distance));
                }
            }

            match closest {
                Some((index, _)) => rows[index].members.push(line),
                None => {
                    let mut row = LineRow::new(y);
                    row.members.push(line);
                    rows.push(row);
                }
            }
        }

        rows.sort_by(|a, b| a.anchor.total_cmp(&b.anchor));
        for row in &mut rows {
            row.sort_members();
        }

        debug!("Grouped lines into {} rows (threshold {:.2})", rows.len(), threshold);
        rows
    }

    /// Row-ordered line texts with speaker prefixes split off
    pub fn ordered_lines(&self, lines: Vec<RawLine>, speakers: &[String]) -> Vec<String> {
        let texts: Vec<String> = self
            .group(lines)
            .into_iter()
            .flat_map(|row| row.members.into_iter().map(|m| m.text))
            .collect();
        tag_speakers(&texts, speakers)
    }
}

/// Split lines that start with a known speaker into `@speaker` and the remainder.
///
/// The first name in list order wins. An empty remainder produces no line.
pub fn tag_speakers(lines: &[String], speakers: &[String]) -> Vec<String> {
    let mut output = Vec::with_capacity(lines.len());

    for line in lines {
        let trimmed = line.trim_start();
        let matched = speakers
            .iter()
            .filter(|name| !name.is_empty())
            .find(|name| line.trim().starts_with(name.as_str()));

        match matched {
            Some(name) => {
                let (label, rest) = trimmed.split_at(name.len());
                output.push(format!("@{}", label));
                let rest = rest.trim_start();
                if !rest.is_empty() {
                    output.push(rest.to_string());
                }
            }
            None => output.push(line.clone()),
        }
    }

    output
}

/// Metadata block, a blank line, then one line per entry
pub fn assemble_ezdrama(metadata: &DramaMetadata, lines: &[String]) -> String {
    let mut text = metadata.to_ezdrama_block();
    text.push_str("\n\n");
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}
