/*!
 * Speaker label to person id resolution.
 *
 * Ids must be usable as `xml:id` values, so labels in Cyrillic or Hebrew
 * script are romanized first (Ukrainian national transliteration, YIVO for
 * Yiddish) and anything outside `[a-z0-9_.-]` is folded or dropped.
 */

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Characters trimmed from both ends of a speaker label
const LABEL_PUNCTUATION: &[char] = &['.', ',', ':', '!', ';', ' '];

/// Lowercase letters whose presence marks a label as Cyrillic
const CYRILLIC_MARKERS: &str = "йцукенгшщзхъфывапролджэячсмитью";

const FEMALE_SUFFIXES: &[&str] = &[
    "a", "e", "ine", "ene", "ette", "ett", "elle", "ia", "ie", "ea", "traud", "gard", "ique", "ise",
];

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+.*?)(_)(.+)").expect("Invalid leading number regex"));

/// Ukrainian to Latin, per lowercase letter
const UKRAINIAN: &[(char, &str)] = &[
    ('а', "a"),
    ('б', "b"),
    ('в', "v"),
    ('г', "h"),
    ('ґ', "g"),
    ('д', "d"),
    ('е', "e"),
    ('є', "je"),
    ('ж', "zh"),
    ('з', "z"),
    ('и', "y"),
    ('і', "i"),
    ('ї', "ji"),
    ('й', "j"),
    ('к', "k"),
    ('л', "l"),
    ('м', "m"),
    ('н', "n"),
    ('о', "o"),
    ('п', "p"),
    ('р', "r"),
    ('с', "s"),
    ('т', "t"),
    ('у', "u"),
    ('ф', "f"),
    ('х', "kh"),
    ('ц', "ts"),
    ('ч', "ch"),
    ('ш', "sh"),
    ('щ', "shch"),
    ('ь', "'"),
    ('ю', "ju"),
    ('я', "ja"),
    ('ы', "y"),
    ('э', "e"),
    ('ъ', ""),
    ('ё', "jo"),
];

/// Replacements applied after transliteration
const CLEANUP: &[(&str, &str)] = &[
    ("і", "i"),
    ("ї", "i"),
    ("є", "e"),
    ("ы", "y"),
    ("'", ""),
    ("’", ""),
    ("«", ""),
    ("»", ""),
    ("′", ""),
    ("\"", ""),
    (" ", "_"),
    ("ä", "ae"),
    ("ö", "oe"),
    ("ü", "ue"),
    ("ß", "ss"),
    ("æ", "ae"),
    ("œ", "oe"),
];

/// Single-letter folds for accented Latin letters
const ACCENT_FOLDS: &[(&str, char)] = &[
    ("àáâãåāąă", 'a'),
    ("çćč", 'c'),
    ("ďđ", 'd'),
    ("èéêëēęě", 'e'),
    ("ìíîïī", 'i'),
    ("ł", 'l'),
    ("ñńň", 'n'),
    ("òóôõøōő", 'o'),
    ("ř", 'r'),
    ("śšş", 's'),
    ("ťţ", 't'),
    ("ùúûūůű", 'u'),
    ("ýÿ", 'y'),
    ("źżž", 'z'),
];

/// Guessed sex of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "MALE"),
            Self::Female => write!(f, "FEMALE"),
        }
    }
}

/// Guess from an id: `frau` anywhere or a typically female ending
pub fn guess_sex(id: &str) -> Sex {
    let lowered = id.to_lowercase();
    if lowered.contains("frau") || FEMALE_SUFFIXES.iter().any(|s| lowered.ends_with(s)) {
        Sex::Female
    } else {
        Sex::Male
    }
}

/// Label without surrounding punctuation, as shown in `persName`
pub fn display_name(label: &str) -> &str {
    label.trim_matches(LABEL_PUNCTUATION)
}

/// Reference id (with leading `#`) for a speaker label
pub fn speaker_reference(label: &str) -> String {
    format!("#{}", speaker_id(label))
}

/// Bare `xml:id` for a speaker label
pub fn speaker_id(label: &str) -> String {
    let stripped = display_name(label);
    let lowered = stripped.to_lowercase();

    let romanized = if lowered.chars().any(|c| CYRILLIC_MARKERS.contains(c)) {
        transliterate_ukrainian(&lowered)
    } else if stripped.chars().any(is_hebrew_letter) {
        romanize_yiddish(stripped).to_lowercase()
    } else {
        lowered
    };

    let cleaned = fold_to_ascii(romanized.trim_matches(LABEL_PUNCTUATION));
    let rotated = rotate_leading_number(&cleaned);

    match rotated.chars().next() {
        None => "unknown".to_string(),
        Some(c) if c.is_ascii_lowercase() || c == '_' => rotated,
        Some(_) => format!("_{}", rotated),
    }
}

fn transliterate_ukrainian(text: &str) -> String {
    text.chars()
        .map(|c| {
            UKRAINIAN
                .iter()
                .find(|(from, _)| *from == c)
                .map_or_else(|| c.to_string(), |(_, to)| to.to_string())
        })
        .collect()
}

fn fold_to_ascii(text: &str) -> String {
    let replaced = CLEANUP
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to));

    replaced
        .chars()
        .map(|c| {
            ACCENT_FOLDS
                .iter()
                .find(|(accented, _)| accented.contains(c))
                .map_or(c, |(_, plain)| *plain)
        })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(*c, '_' | '.' | '-'))
        .collect()
}

/// `1_ja_divchyna` becomes `ja_divchyna_1`
fn rotate_leading_number(id: &str) -> String {
    match LEADING_NUMBER.captures(id) {
        Some(caps) => format!("{}{}{}", &caps[3], &caps[2], &caps[1]),
        None => id.to_string(),
    }
}

fn is_hebrew_letter(c: char) -> bool {
    matches!(c, '\u{05D0}'..='\u{05EA}' | '\u{05F0}'..='\u{05F2}' | '\u{FB1D}'..='\u{FB4F}')
}

const PATAH: char = '\u{05B7}';
const QAMATS: char = '\u{05B8}';
const HIRIQ: char = '\u{05B4}';
const DAGESH: char = '\u{05BC}';
const RAFE: char = '\u{05BF}';
const SIN_DOT: char = '\u{05C2}';

/// Precomposed presentation forms as base letter plus point
fn decompose(c: char) -> Option<(char, char)> {
    let pair = match c {
        '\u{FB2E}' => ('א', PATAH),
        '\u{FB2F}' => ('א', QAMATS),
        '\u{FB31}' => ('ב', DAGESH),
        '\u{FB4C}' => ('ב', RAFE),
        '\u{FB35}' => ('ו', DAGESH),
        '\u{FB1D}' => ('י', HIRIQ),
        '\u{FB1F}' => ('ײ', PATAH),
        '\u{FB3B}' => ('כ', DAGESH),
        '\u{FB44}' => ('פ', DAGESH),
        '\u{FB4E}' => ('פ', RAFE),
        '\u{FB2B}' => ('ש', SIN_DOT),
        '\u{FB4A}' => ('ת', DAGESH),
        _ => return None,
    };
    Some(pair)
}

fn is_point(c: char) -> bool {
    matches!(c, '\u{0591}'..='\u{05BD}' | '\u{05BF}' | '\u{05C1}' | '\u{05C2}' | '\u{05C4}' | '\u{05C5}' | '\u{05C7}')
}

/// A Hebrew letter with the points that follow it
#[derive(Debug, Clone)]
struct Glyph {
    base: char,
    points: Vec<char>,
}

impl Glyph {
    fn has(&self, point: char) -> bool {
        self.points.contains(&point)
    }

    fn is_plain(&self, base: char) -> bool {
        self.base == base && self.points.is_empty()
    }

    fn is_vowel(&self) -> bool {
        matches!(self.base, 'א' | 'ו' | 'ע' | 'ײ' | 'ױ') || (self.base == 'י' && self.has(HIRIQ))
    }
}

fn glyphs(text: &str) -> Vec<Glyph> {
    let mut result: Vec<Glyph> = Vec::new();
    for c in text.chars() {
        if let Some((base, point)) = decompose(c) {
            result.push(Glyph {
                base,
                points: vec![point],
            });
        } else if is_point(c) {
            // points on a non-letter are dropped
            if let Some(last) = result.last_mut().filter(|g| is_hebrew_letter(g.base)) {
                last.points.push(c);
            }
        } else {
            result.push(Glyph {
                base: c,
                points: Vec::new(),
            });
        }
    }
    result
}

/// YIVO romanization of Yiddish in Hebrew script
fn romanize_yiddish(text: &str) -> String {
    let glyphs = glyphs(text);
    let mut out = String::new();
    let mut i = 0;

    while i < glyphs.len() {
        let g = &glyphs[i];
        let next = glyphs.get(i + 1);
        let after = glyphs.get(i + 2);
        let at_word_start = i == 0 || !is_hebrew_letter(glyphs[i - 1].base);
        let mut consumed = 1;

        let latin: &str = match g.base {
            'א' if g.has(PATAH) => "a",
            'א' if g.has(QAMATS) => "o",
            'א' => "",
            'ב' if g.has(RAFE) => "v",
            'ב' => "b",
            'ג' => "g",
            'ד' if next.is_some_and(|n| n.is_plain('ז')) && after.is_some_and(|n| n.is_plain('ש')) => {
                consumed = 3;
                "dzh"
            }
            'ד' => "d",
            'ה' => "h",
            'ו' if g.has(DAGESH) => "u",
            'ו' if g.points.is_empty() && next.is_some_and(|n| n.is_plain('ו')) => {
                consumed = 2;
                "v"
            }
            'ו' if g.points.is_empty() && next.is_some_and(|n| n.is_plain('י')) => {
                consumed = 2;
                "oy"
            }
            'ו' => "u",
            'װ' => "v",
            'ױ' => "oy",
            'ײ' if g.has(PATAH) => "ay",
            'ײ' => "ey",
            'ז' if next.is_some_and(|n| n.is_plain('ש')) => {
                consumed = 2;
                "zh"
            }
            'ז' => "z",
            'ח' => "kh",
            'ט' if next.is_some_and(|n| n.is_plain('ש')) => {
                consumed = 2;
                "tsh"
            }
            'ט' => "t",
            'י' if g.has(HIRIQ) => "i",
            'י' if g.points.is_empty() && next.is_some_and(|n| n.base == 'י' && !n.has(HIRIQ)) => {
                consumed = 2;
                if next.is_some_and(|n| n.has(PATAH)) { "ay" } else { "ey" }
            }
            'י' if at_word_start || next.is_some_and(Glyph::is_vowel) => "y",
            'י' => "i",
            'כ' if g.has(DAGESH) => "k",
            'כ' | 'ך' => "kh",
            'ל' => "l",
            'מ' | 'ם' => "m",
            'נ' | 'ן' => "n",
            'ס' => "s",
            'ע' => "e",
            'פ' if g.has(DAGESH) => "p",
            'פ' | 'ף' => "f",
            'צ' | 'ץ' => "ts",
            'ק' => "k",
            'ר' => "r",
            'ש' if g.has(SIN_DOT) => "s",
            'ש' => "sh",
            'ת' if g.has(DAGESH) => "t",
            'ת' => "s",
            '\u{05BE}' => "-",
            '\u{05F3}' => "'",
            '\u{05C0}' | '\u{05C3}' | '\u{05C6}' | '\u{05F4}' => "",
            _ => {
                out.push(g.base);
                i += 1;
                continue;
            }
        };

        out.push_str(latin);
        i += consumed;
    }

    out
}
