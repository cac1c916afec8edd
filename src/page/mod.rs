/*!
 * PAGE-XML to EzDrama extraction.
 *
 * - `model`: positioned lines and rows
 * - `extractor`: one PAGE document to annotated lines
 * - `grouper`: reading-order rows and speaker tagging
 */

pub mod extractor;
pub mod grouper;
pub mod model;

pub use extractor::{PageDocument, PageRegion, PageTextLine, TOC_MARKER};
pub use grouper::{ParagraphGrouper, assemble_ezdrama, tag_speakers};
pub use model::{LineRow, RawLine, RegionKind};
