/*!
 * Common test utilities for the ezdrama test suite
 */

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;
use tempfile::TempDir;

/// Routes `log` output through the test harness; repeated calls are no-ops
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// A text line for a PAGE fixture: text, left edge, vertical centre
pub type FixtureLine<'a> = (&'a str, f64, f64);

/// Builds a PAGE 2019 document with one `TextRegion` per entry.
///
/// Every line polygon is a 10px high box, 200px wide, so its vertical centre is
/// exactly the given y and its horizontal minimum the given x.
pub fn page_xml(regions: &[(&str, Vec<FixtureLine>)]) -> String {
    let mut body = String::new();
    for (index, (kind, lines)) in regions.iter().enumerate() {
        body.push_str(&format!("    <TextRegion id=\"r{}\" type=\"{}\">\n", index, kind));
        for (line_index, (text, x, y)) in lines.iter().enumerate() {
            body.push_str(&format!(
                "      <TextLine id=\"r{}l{}\">\n        <Coords points=\"{x},{top} {right},{top} {right},{bottom} {x},{bottom}\"/>\n        <TextEquiv><Unicode>{text}</Unicode></TextEquiv>\n      </TextLine>\n",
                index,
                line_index,
                x = x,
                right = x + 200.0,
                top = y - 5.0,
                bottom = y + 5.0,
                text = escape(text),
            ));
        }
        body.push_str("    </TextRegion>\n");
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<PcGts xmlns=\"http://schema.primaresearch.org/PAGE/gts/pagecontent/2019-07-15\">\n  <Page imageFilename=\"page.jpg\" imageWidth=\"1000\" imageHeight=\"1500\">\n{}  </Page>\n</PcGts>\n",
        body
    )
}

/// Writes a PAGE fixture into `dir`
pub fn create_page_file(dir: &Path, filename: &str, regions: &[(&str, Vec<FixtureLine>)]) -> Result<PathBuf> {
    create_test_file(dir, filename, &page_xml(regions))
}

/// A small two-page play: dramatis personae on the first page, dialogue after
pub fn create_sample_play(dir: &Path) -> Result<()> {
    create_page_file(
        dir,
        "0001.xml",
        &[
            ("heading", vec![("Der Bauer", 100.0, 100.0)]),
            ("TOC-entry", vec![("Personen.", 100.0, 200.0), ("Hans, ein Bauer.", 100.0, 240.0), ("Grete, seine Frau.", 100.0, 280.0)]),
        ],
    )?;
    create_page_file(
        dir,
        "0002.xml",
        &[
            ("header", vec![("Erster Aufzug.", 300.0, 100.0)]),
            (
                "paragraph",
                vec![
                    ("Hans. Guten Tag, mein lie-", 100.0, 200.0),
                    ("bes Weib.", 100.0, 240.0),
                    ("Grete. Guten Tag (lacht).", 100.0, 300.0),
                ],
            ),
        ],
    )?;
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
