/*!
 * # ezdrama - PAGE-XML to EzDrama to TEI
 *
 * A Rust library for turning OCR output of historical plays into
 * DraCor-style TEI editions.
 *
 * ## Features
 *
 * - Reading order reconstruction from PAGE-XML line geometry
 * - Speaker label detection with fuzzy matching against the dramatis personae
 * - Cleanup of hyphenated words, verse passages and historical orthography
 * - EzDrama to TEI conversion with act/scene nesting, speeches and stage directions
 * - Speaker ids transliterated from Cyrillic and Hebrew script
 * - House-style pretty printing verified by re-parsing
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `page`: PAGE-XML extraction:
 *   - `page::extractor`: Lines and regions of one PAGE document
 *   - `page::grouper`: Reading-order rows and speaker tagging
 * - `speakers`: Speaker label candidates and fuzzy matching
 * - `curation`: Operator correction steps as pure transforms
 * - `normalizer`: EzDrama cleanup pass
 * - `tei`: EzDrama to TEI:
 *   - `tei::parser`: Line-driven parser and post-processing
 *   - `tei::speaker_id`: Speaker ids and sex guessing
 *   - `tei::serializer`: House-style rendering
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod curation;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod normalizer;
pub mod page;
pub mod speakers;
pub mod tei;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{PageError, SerializeError};
pub use normalizer::normalize_text;
pub use page::{PageDocument, ParagraphGrouper};
pub use speakers::{SpeakerCandidate, SpeakerMatcher};
pub use tei::{ParseOptions, convert};
