/*!
 * EzDrama to DraCor TEI conversion.
 *
 * - `tree`: arena document tree the parser builds into
 * - `boilerplate`: fixed header, standOff and revision scaffolding
 * - `parser`: line-driven EzDrama reader and structural post-processing
 * - `speaker_id`: speaker identifiers and sex guessing
 * - `serializer`: DraCor house-style rendering and verification
 */

pub mod boilerplate;
pub mod parser;
pub mod serializer;
pub mod speaker_id;
pub mod tree;

pub use parser::{ParseOptions, Person, parse_lines, parse_text, persons};
pub use serializer::{serialize, verify};
pub use speaker_id::{Sex, speaker_id};
pub use tree::{DocumentTree, NodeId};

use crate::errors::SerializeError;

/// Parse EzDrama text and render it as verified TEI
pub fn convert(text: &str, options: &ParseOptions) -> Result<String, SerializeError> {
    let tree = parse_text(text, options);
    serialize(&tree)
}
