/*!
 * EzDrama cleanup pass.
 *
 * Walks the curated EzDrama text line by line and:
 * - merges consecutive prose lines into one paragraph line, joining words
 *   broken at a line-end hyphen
 * - keeps verse lines (after a `~` marker) one per line
 * - merges multi-line `$` stage directions
 * - attaches a parenthesized aside on the line after a speaker label
 * - replaces historical letter forms with their modern equivalents
 */

use log::debug;

/// Literal replacements applied in order to every emitted line
pub const ORTHOGRAPHY: &[(&str, &str)] = &[
    ("ſ", "s"),
    ("ʒ", "z"),
    ("Ʒ", "Z"),
    ("a\u{364}", "ä"),
    ("o\u{364}", "ö"),
    ("u\u{364}", "ü"),
    ("ﬀ", "ff"),
    ("ﬁ", "fi"),
    ("ﬂ", "fl"),
    ("ﬃ", "ffi"),
    ("ﬄ", "ffl"),
    ("ﬅ", "st"),
    ("ﬆ", "st"),
    ("Jch", "Ich"),
    ("Jtzt", "Itzt"),
    ("Jst", "Ist"),
    ("Jn", "In"),
    ("Jm", "Im"),
    ("Jhm", "Ihm"),
    ("Jhn", "Ihn"),
    ("Jhr", "Ihr"),
    ("Jr", "Ir"),
];

/// Prefixes that end verse mode when they open a line
const STRUCTURAL_PREFIXES: &[char] = &['@', '#', '^', '$', '~', '('];

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Apply the orthography table
pub fn modernize(text: &str) -> String {
    ORTHOGRAPHY
        .iter()
        .fold(text.to_string(), |acc, (old, new)| acc.replace(old, new))
}

/// Split off a line-end hyphen.
///
/// `raw` must still carry its trailing spaces: `"Frei- "` is not a broken
/// word, `"Freu-"` is. Returns the trimmed text and whether the word continues
/// on the next line.
pub fn split_hyphen(raw: &str) -> (String, bool) {
    let broken = raw.ends_with('-') && !raw.ends_with(" -") && !raw.ends_with("--");
    let text = raw.trim();
    if broken {
        (text[..text.len() - 1].to_string(), true)
    } else {
        (text.to_string(), false)
    }
}

/// Line that takes part in paragraph merging
fn is_plain(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && !trimmed.starts_with(['@', '#', '^', '$', '~'])
        && !trimmed.starts_with(COMMENT_OPEN)
}

/// Line-classification state machine
#[derive(Debug, Default)]
struct TextNormalizer {
    verse_mode: bool,
    in_comment: bool,
    buffer: String,
    output: Vec<String>,
}

impl TextNormalizer {
    fn flush(&mut self) {
        let paragraph = self.buffer.trim();
        if !paragraph.is_empty() {
            self.output.push(paragraph.to_string());
        }
        self.buffer.clear();
    }

    fn emit(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    fn run(mut self, lines: &[&str]) -> Vec<String> {
        let mut i = 0;
        while i < lines.len() {
            let raw = lines[i];
            let line = raw.trim();

            if self.in_comment {
                self.emit(line);
                self.in_comment = !line.contains(COMMENT_CLOSE);
                i += 1;
                continue;
            }

            if line.is_empty() {
                i += 1;
                continue;
            }

            if line.starts_with('~') {
                self.flush();
                self.verse_mode = true;
                self.emit(line);
                i += 1;
                continue;
            }

            if self.verse_mode {
                if !line.starts_with(STRUCTURAL_PREFIXES) {
                    self.emit(line);
                    i += 1;
                    continue;
                }
                self.verse_mode = false;
            }

            if line.starts_with('@') {
                self.flush();
                let mut speaker_line = line.to_string();
                i += 1;
                if let Some(next) = lines.get(i).map(|l| l.trim()) {
                    if next.starts_with('(') && next.ends_with(')') {
                        speaker_line.push(' ');
                        speaker_line.push_str(next);
                        i += 1;
                    }
                }
                self.emit(speaker_line);
                continue;
            }

            if let Some(content) = stage_content(raw) {
                let (mut combined, mut broken) = split_hyphen(content);
                i += 1;
                while let Some(next_content) = lines.get(i).and_then(|next| stage_content(next)) {
                    let (text, next_broken) = split_hyphen(next_content);
                    if !broken {
                        combined.push(' ');
                    }
                    combined.push_str(&text);
                    broken = next_broken;
                    i += 1;
                }
                if broken {
                    combined.push('-');
                }
                self.flush();
                self.emit(format!("${}", combined.trim()));
                continue;
            }

            if line.starts_with(['#', '^']) || line.starts_with(COMMENT_OPEN) {
                self.flush();
                self.emit(line);
                self.in_comment = line.starts_with(COMMENT_OPEN) && !line.contains(COMMENT_CLOSE);
                i += 1;
                continue;
            }

            let (text, mut broken) = split_hyphen(raw);
            self.buffer.push(' ');
            self.buffer.push_str(&text);
            while broken {
                if !lines.get(i + 1).is_some_and(|next| is_plain(next)) {
                    // nothing to join onto, keep the hyphen
                    self.buffer.push('-');
                    break;
                }
                i += 1;
                let (text, next_broken) = split_hyphen(lines[i]);
                self.buffer.push_str(&text);
                broken = next_broken;
            }
            i += 1;
        }

        self.flush();
        self.output.iter().map(|line| modernize(line)).collect()
    }
}

/// Text after the `$` marker, trailing spaces kept
fn stage_content(raw: &str) -> Option<&str> {
    raw.trim_start().strip_prefix('$').map(str::trim_start)
}

/// Normalize a sequence of EzDrama lines
pub fn normalize_lines(lines: &[&str]) -> Vec<String> {
    let output = TextNormalizer::default().run(lines);
    debug!("Normalized {} input lines into {} lines", lines.len(), output.len());
    output
}

/// Normalize EzDrama text; the result ends with a newline
pub fn normalize_text(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut result = normalize_lines(&lines).join("\n");
    result.push('\n');
    result
}
