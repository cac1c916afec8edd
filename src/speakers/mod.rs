/*!
 * Speaker detection.
 *
 * - `figures`: character names from the dramatis personae
 * - `matcher`: gestalt similarity between labels and names
 * - `candidates`: label harvesting and ranking
 */

pub mod candidates;
pub mod figures;
pub mod matcher;

pub use candidates::{LabelHarvest, SpeakerCandidate, accepted_labels, rank_candidates};
pub use figures::{dramatis_personae, extract_figures};
pub use matcher::{SpeakerMatcher, Verdict, clean_label, gestalt_ratio};
