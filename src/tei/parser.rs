/*!
 * EzDrama to TEI document tree.
 *
 * The parser is a line-driven state machine: every line either opens a new
 * node (speech, stage direction, division, cast list, comment) or appends its
 * text to the current insertion node. Speeches and cast lists are kept as raw
 * text while reading and split into their TEI structure in a post-processing
 * pass once the whole play is known.
 *
 * Line markers:
 * - `@title`, `@subtitle`, `@author`: header metadata
 * - `@`: speech, the rest of the line is the speaker label
 * - `$`: stage direction
 * - `#`, `##`, ...: act, scene, subscene headings
 * - `^`: cast list
 * - `<!--`: comment, may span lines until `-->`
 * - `%` (inside speeches): stage direction line
 * - `~` (inside speeches): toggles prose and verse
 */

use std::collections::HashSet;

use chrono::{Local, NaiveDate};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::TeiConfig;
use crate::language_utils;
use crate::tei::boilerplate::{Skeleton, add_revision_desc, build_skeleton};
use crate::tei::speaker_id::{self, Sex};
use crate::tei::tree::{DocumentTree, NodeId};

/// Speaker label with a parenthesized aside: `Hans (leise).`
static SPEAKER_ASIDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^()]+)(\(.+?\))([.,:!;])?").expect("Invalid speaker aside regex"));

/// Parenthesized run inside a speech line, with trailing punctuation
static INLINE_STAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(.+?\)[.,:!;]?").expect("Invalid inline stage regex"));

static COMMENT_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-->\s*$").expect("Invalid comment end regex"));

static COMMENT_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<?!--|-->").expect("Invalid comment marker regex"));

/// Conversion settings
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    /// Parenthesized runs in speeches become stage directions
    pub bracket_stages: bool,

    /// Speech lines start out as prose (`p`) rather than verse (`l`)
    pub prose: bool,

    pub document_id: String,
    pub language: String,

    /// Date written into `standOff` and `revisionDesc`
    pub date: NaiveDate,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::from_config(&TeiConfig::default())
    }
}

impl ParseOptions {
    /// Options from configuration, dated today.
    /// The language is written as its two-letter code when one exists.
    pub fn from_config(config: &TeiConfig) -> Self {
        let language = language_utils::normalize_to_part1_or_part2t(&config.language).unwrap_or_else(|e| {
            warn!("Keeping language code {:?} as configured: {}", config.language, e);
            config.language.clone()
        });
        Self {
            bracket_stages: config.bracket_stages,
            prose: config.prose,
            document_id: config.document_id.clone(),
            language,
            date: Local::now().date_naive(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }
}

/// A character referenced by at least one speech
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: String,
    pub display_name: String,
    pub sex: Sex,
}

/// Mutable state while reading lines
struct ParserState {
    tree: DocumentTree,
    skeleton: Skeleton,
    /// Node that receives plain lines
    current_tag: NodeId,
    /// Innermost open division (or `body`)
    current_div: NodeId,
    pending_comment: bool,
}

impl ParserState {
    fn new(options: &ParseOptions) -> Self {
        let (mut tree, skeleton) = build_skeleton(&options.document_id, &options.language, options.date);
        tree.set_attr(skeleton.body, "level", "0");
        Self {
            tree,
            skeleton,
            current_tag: skeleton.body,
            current_div: skeleton.body,
            pending_comment: false,
        }
    }

    fn feed(&mut self, line: &str) {
        if let Some(rest) = line.strip_prefix("@author") {
            let author = self.tree.append_text_element(self.skeleton.title_stmt, "author", rest.trim());
            debug!("Author: {}", self.tree.text(author));
        } else if let Some(rest) = line.strip_prefix("@title") {
            let title = self.tree.append_text_element(self.skeleton.title_stmt, "title", rest.trim());
            self.tree.set_attr(title, "type", "main");
        } else if let Some(rest) = line.strip_prefix("@subtitle") {
            let title = self.tree.append_text_element(self.skeleton.title_stmt, "title", rest.trim());
            self.tree.set_attr(title, "type", "sub");
        } else if let Some(rest) = line.strip_prefix('$') {
            let stage = self.tree.append_element(self.current_div, "stage");
            self.tree.append_text(stage, &format!("{}\n", rest.trim()));
            self.current_tag = stage;
        } else if let Some(rest) = line.strip_prefix('@') {
            let sp = self.tree.append_element(self.current_div, "sp");
            self.tree.append_text(sp, &format!("{}\n", rest));
            self.current_tag = sp;
        } else if let Some(rest) = line.strip_prefix('^') {
            let cast_list = self.tree.append_element(self.skeleton.front, "castList");
            self.tree.append_text(cast_list, &format!("{}\n", rest));
            self.current_tag = cast_list;
        } else if let Some(rest) = line.strip_prefix('#') {
            self.open_division(rest);
        } else if let Some(rest) = line.strip_prefix('<') {
            if rest.starts_with("!--") {
                self.open_comment(rest);
            } else {
                self.tree.append_text(self.current_tag, &format!("{}\n", rest));
            }
        } else if self.pending_comment && COMMENT_END.is_match(line) {
            let text = COMMENT_MARKERS.replace_all(line, "");
            self.tree.append_text(self.current_tag, &format!("{}\n", text));
            self.current_tag = self.current_div;
            self.pending_comment = false;
        } else {
            self.tree.append_text(self.current_tag, &format!("{}\n", line));
        }
    }

    fn open_comment(&mut self, rest: &str) {
        let comment = self.tree.append_comment(self.current_div);
        if !COMMENT_END.is_match(rest) {
            self.pending_comment = true;
            self.current_tag = comment;
        }
        let text = COMMENT_MARKERS.replace_all(rest, "");
        self.tree.append_text(comment, &format!("{}\n", text));
    }

    /// `rest` is the heading line without its first `#`
    fn open_division(&mut self, rest: &str) {
        let level = 1 + rest.chars().take_while(|c| *c == '#').count();
        let heading = rest.trim_matches(|c: char| c == '#' || c.is_whitespace());

        let parent = if level > self.level_of(self.current_div) {
            Some(self.current_div)
        } else if level == self.level_of(self.current_div) {
            self.tree.parent(self.current_div)
        } else {
            let mut candidate = Some(self.current_div);
            while let Some(node) = candidate {
                if self.level_of(node) < level {
                    break;
                }
                candidate = self.tree.parent(node);
            }
            candidate
        };

        let parent = parent.unwrap_or_else(|| {
            warn!("No enclosing division for level {} heading {:?}, attaching to body", level, heading);
            self.skeleton.body
        });

        let div = self.tree.append_element(parent, "div");
        self.tree.set_attr(div, "level", &level.to_string());
        self.tree.append_text_element(div, "head", heading);

        self.current_div = div;
        self.current_tag = div;
    }

    fn level_of(&self, node: NodeId) -> usize {
        self.tree
            .attr(node, "level")
            .and_then(|l| l.parse().ok())
            .unwrap_or(0)
    }
}

/// Parse EzDrama lines into a TEI tree
pub fn parse_lines<S: AsRef<str>>(lines: &[S], options: &ParseOptions) -> DocumentTree {
    let mut state = ParserState::new(options);
    for line in lines {
        state.feed(line.as_ref().trim_end_matches(['\r', '\n']));
    }
    if state.pending_comment {
        debug!("Comment left open at end of input");
    }

    let ParserState { mut tree, skeleton, .. } = state;
    post_process(&mut tree, &skeleton, options);
    tree
}

/// Parse EzDrama text into a TEI tree
pub fn parse_text(text: &str, options: &ParseOptions) -> DocumentTree {
    let lines: Vec<&str> = text.lines().collect();
    parse_lines(&lines, options)
}

fn post_process(tree: &mut DocumentTree, skeleton: &Skeleton, options: &ParseOptions) {
    add_cast_items(tree, skeleton.front);
    tree.remove_attr(skeleton.body, "level");

    let mut persons: Vec<Person> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for sp in tree.elements_named(tree.root(), "sp") {
        if let Some(person) = restructure_speech(tree, sp, options) {
            if seen.insert(person.id.clone()) {
                persons.push(person);
            }
        }
    }

    for node in tree.descendants(tree.root()) {
        let collapsible = tree.name(node).is_none_or(|name| matches!(name, "stage" | "head" | "div" | "body"));
        if collapsible {
            tree.map_text_children(node, collapse_lines);
        }
    }

    for div in tree.elements_named(tree.root(), "div") {
        let level = tree.attr(div, "level").and_then(|l| l.parse::<usize>().ok());
        tree.clear_attrs(div);
        match level {
            Some(1) => tree.set_attr(div, "type", "act"),
            Some(2) => tree.set_attr(div, "type", "scene"),
            Some(3) => tree.set_attr(div, "type", "subscene"),
            _ => {}
        }
    }

    add_partic_desc(tree, skeleton.header, &persons);
    add_revision_desc(tree, skeleton.header, options.date);

    debug!("Built TEI tree with {} characters", persons.len());
}

/// Join non-blank lines with single spaces
fn collapse_lines(text: &str) -> Option<String> {
    let joined = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

/// First non-blank line becomes `head`, the others `castItem`s
fn add_cast_items(tree: &mut DocumentTree, front: NodeId) {
    let cast_lists: Vec<NodeId> = tree
        .child_nodes(front)
        .filter(|id| tree.is_element(*id, "castList"))
        .collect();

    for cast_list in cast_lists {
        let text = tree.text(cast_list);
        tree.clear(cast_list);
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        if let Some(head) = lines.next() {
            tree.append_text_element(cast_list, "head", head);
        }
        for item in lines {
            tree.append_text_element(cast_list, "castItem", item);
        }
    }
}

/// Split a raw speech into speaker, stage directions and `p`/`l` lines
fn restructure_speech(tree: &mut DocumentTree, sp: NodeId, options: &ParseOptions) -> Option<Person> {
    let text = tree.text(sp);
    tree.clear(sp);

    let mut lines = text.split('\n');
    let first_line = lines.next().unwrap_or("");
    let mut speech_lines: Vec<String> = Vec::new();

    let aside = options
        .bracket_stages
        .then(|| SPEAKER_ASIDE.captures(first_line))
        .flatten();

    let speaker_text = match aside {
        Some(caps) => {
            let mut speaker = caps[1].trim().to_string();
            if let Some(punct) = caps.get(3) {
                speaker.push_str(punct.as_str().trim());
            }
            append_speaker(tree, sp, &speaker);
            tree.append_text_element(sp, "stage", caps[2].trim());

            let end = caps.get(0).map_or(0, |m| m.end());
            let remainder = first_line[end..].trim();
            if !remainder.is_empty() {
                speech_lines.push(remainder.to_string());
            }
            speaker
        }
        None => {
            let speaker = first_line.trim().to_string();
            append_speaker(tree, sp, &speaker);
            speaker
        }
    };
    speech_lines.extend(lines.map(str::to_string));

    let mut prose = options.prose;
    for line in &speech_lines {
        if line.starts_with('%') {
            tree.append_text_element(sp, "stage", line.trim_matches('%').trim());
        } else if line.starts_with('~') {
            prose = !prose;
            add_speech_line(tree, sp, line.trim_matches('~'), prose, options.bracket_stages);
        } else {
            add_speech_line(tree, sp, line, prose, options.bracket_stages);
        }
    }

    if speaker_text.trim().is_empty() {
        return None;
    }

    let reference = speaker_id::speaker_reference(&speaker_text);
    tree.set_attr(sp, "who", &reference);
    let id = reference.trim_start_matches('#').to_string();
    Some(Person {
        sex: speaker_id::guess_sex(&id),
        display_name: speaker_id::display_name(&speaker_text).to_string(),
        id,
    })
}

fn append_speaker(tree: &mut DocumentTree, sp: NodeId, speaker: &str) {
    if !speaker.is_empty() {
        tree.append_text_element(sp, "speaker", speaker);
    }
}

fn add_speech_line(tree: &mut DocumentTree, sp: NodeId, line: &str, prose: bool, bracket_stages: bool) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    let element = tree.append_element(sp, if prose { "p" } else { "l" });
    if !bracket_stages || !INLINE_STAGE.is_match(line) {
        tree.append_text(element, line);
        return;
    }

    let mut last = 0;
    for m in INLINE_STAGE.find_iter(line) {
        push_run(tree, element, &line[last..m.start()]);
        let stage = tree.append_text_element(element, "stage", m.as_str().trim());
        tree.set_attr(stage, "type", "inline");
        last = m.end();
    }
    push_run(tree, element, &line[last..]);
}

/// Text between inline stages, trimmed; the serializer restores the spacing
fn push_run(tree: &mut DocumentTree, element: NodeId, run: &str) {
    let run = run.trim();
    if !run.is_empty() {
        tree.append_text(element, run);
    }
}

fn add_partic_desc(tree: &mut DocumentTree, header: NodeId, persons: &[Person]) {
    let profile_desc = tree.append_element(header, "profileDesc");
    let partic_desc = tree.append_element(profile_desc, "particDesc");
    let list_person = tree.append_element(partic_desc, "listPerson");

    for person in persons {
        let node = tree.append_element(list_person, "person");
        tree.set_attr(node, "xml:id", &person.id);
        tree.set_attr(node, "sex", &person.sex.to_string());
        tree.append_text_element(node, "persName", &person.display_name);
    }
}

/// Persons listed in the tree's `particDesc`, in document order
pub fn persons(tree: &DocumentTree) -> Vec<Person> {
    tree.elements_named(tree.root(), "person")
        .into_iter()
        .map(|node| Person {
            id: tree.attr(node, "xml:id").unwrap_or_default().to_string(),
            display_name: tree.text(node),
            sex: match tree.attr(node, "sex") {
                Some("FEMALE") => Sex::Female,
                _ => Sex::Male,
            },
        })
        .collect()
}
