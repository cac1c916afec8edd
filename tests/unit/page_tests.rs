/*!
 * Tests for PAGE-XML extraction and reading order reconstruction
 */

use std::path::Path;
use anyhow::Result;
use ezdrama::app_config::DramaMetadata;
use ezdrama::errors::PageError;
use ezdrama::page::{PageDocument, ParagraphGrouper, RawLine, RegionKind, assemble_ezdrama, tag_speakers};
use crate::common;

fn parse(regions: &[(&str, Vec<common::FixtureLine>)]) -> PageDocument {
    PageDocument::parse(&common::page_xml(regions), Path::new("fixture.xml")).unwrap()
}

fn texts(lines: &[RawLine]) -> Vec<&str> {
    lines.iter().map(|l| l.text.as_str()).collect()
}

#[test]
fn test_raw_lines_withRegionTypes_shouldPrefixLines() {
    let document = parse(&[
        ("header", vec![("Erster Akt", 100.0, 50.0)]),
        ("heading", vec![("Erste Szene", 100.0, 80.0)]),
        ("credit", vec![("Hans.", 100.0, 110.0)]),
        ("signature-mark", vec![("Er geht ab.", 100.0, 140.0)]),
        ("paragraph", vec![("Guten Tag.", 100.0, 170.0)]),
        ("catch-word", vec![("Anna", 100.0, 200.0)]),
        ("marginalia", vec![("3", 10.0, 230.0)]),
    ]);

    let lines = document.raw_lines();
    assert_eq!(
        texts(&lines),
        vec!["#Erster Akt", "##Erste Szene", "@Hans.", "$Er geht ab.", "Guten Tag.", "^Anna", "3"]
    );
    assert_eq!(lines[6].region_kind, RegionKind::Other);
    assert_eq!(lines[0].vertical_position, 50.0);
    assert_eq!(lines[0].horizontal_position, 100.0);
}

#[test]
fn test_raw_lines_withCaption_shouldWrapInParentheses() {
    let document = parse(&[
        ("caption", vec![("Ein Zimmer", 100.0, 50.0), ("mit Tisch", 100.0, 80.0), ("und Stuhl", 100.0, 110.0)]),
        ("caption", vec![("Nacht", 100.0, 140.0)]),
    ]);

    assert_eq!(texts(&document.raw_lines()), vec!["(Ein Zimmer", "mit Tisch", "und Stuhl)", "(Nacht)"]);
}

#[test]
fn test_raw_lines_withTwoTocRegions_shouldMarkOnlyTheFirst() {
    let document = parse(&[
        ("TOC-entry", vec![("Personen", 100.0, 50.0), ("Hans, ein Bauer", 100.0, 80.0)]),
        ("TOC-entry", vec![("Anna, seine Frau", 100.0, 110.0)]),
    ]);

    assert_eq!(texts(&document.raw_lines()), vec!["~Personen", "~Hans, ein Bauer", "Anna, seine Frau"]);
    assert_eq!(document.toc_lines(), vec!["Personen", "Hans, ein Bauer", "Anna, seine Frau"]);
}

#[test]
fn test_parse_withBrokenCoords_shouldSkipOnlyThatLine() {
    let xml = r#"<PcGts xmlns="http://schema.primaresearch.org/PAGE/gts/pagecontent/2013-07-15">
  <Page>
    <TextRegion type="paragraph">
      <TextLine><Coords points="10,a 20,b"/><TextEquiv><Unicode>kaputt</Unicode></TextEquiv></TextLine>
      <TextLine><TextEquiv><Unicode>ohne Koordinaten</Unicode></TextEquiv></TextLine>
      <TextLine><Coords points="10,10 50,10 50,20 10,20"/><TextEquiv><Unicode>heil</Unicode></TextEquiv></TextLine>
      <TextLine><Coords points="10,30 50,40"/><TextEquiv><Unicode></Unicode></TextEquiv></TextLine>
    </TextRegion>
  </Page>
</PcGts>"#;
    let document = PageDocument::parse(xml, Path::new("broken.xml")).unwrap();

    assert_eq!(document.regions[0].lines.len(), 3);
    let lines = document.raw_lines();
    assert_eq!(texts(&lines), vec!["heil"]);
    assert_eq!(lines[0].vertical_position, 15.0);
    assert_eq!(document.paragraph_lines(), vec!["heil"]);
}

#[test]
fn test_parse_withLegacyPoints_shouldReadCoordinates() {
    let xml = r#"<PcGts xmlns="http://schema.primaresearch.org/PAGE/gts/pagecontent/2010-03-19">
  <Page>
    <TextRegion type="paragraph">
      <TextLine>
        <Coords><Point x="40" y="100"/><Point x="90" y="100"/><Point x="90" y="120"/><Point x="40" y="120"/></Coords>
        <TextEquiv index="1"><Unicode>zweite Lesart</Unicode></TextEquiv>
        <TextEquiv index="0"><Unicode>erste Lesart</Unicode></TextEquiv>
      </TextLine>
    </TextRegion>
  </Page>
</PcGts>"#;
    let document = PageDocument::parse(xml, Path::new("legacy.xml")).unwrap();
    let lines = document.raw_lines();

    assert_eq!(texts(&lines), vec!["erste Lesart"]);
    assert_eq!(lines[0].vertical_position, 110.0);
    assert_eq!(lines[0].horizontal_position, 40.0);
}

#[test]
fn test_load_withMalformedXml_shouldReturnXmlError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "bad.xml", "<PcGts><Page></PcGts>")?;

    match PageDocument::load(&path) {
        Err(PageError::Xml { path: failed, .. }) => assert_eq!(failed, path),
        other => panic!("expected XML error, got {:?}", other.map(|d| d.regions.len())),
    }
    assert!(matches!(PageDocument::load(temp_dir.path().join("missing.xml")), Err(PageError::Io { .. })));
    Ok(())
}

#[test]
fn test_group_withTwoColumns_shouldReadRowsLeftToRight() {
    let document = parse(&[
        ("paragraph", vec![("links oben", 100.0, 100.0), ("links mitte", 100.0, 200.0), ("links unten", 100.0, 300.0)]),
        ("paragraph", vec![("rechts oben", 500.0, 100.0), ("rechts mitte", 500.0, 203.0)]),
    ]);

    let rows = ParagraphGrouper::default().group(document.raw_lines());
    let ordered: Vec<Vec<&str>> = rows
        .iter()
        .map(|row| row.members.iter().map(|m| m.text.as_str()).collect())
        .collect();
    assert_eq!(
        ordered,
        vec![vec!["links oben", "rechts oben"], vec!["links mitte", "rechts mitte"], vec!["links unten"]]
    );
}

#[test]
fn test_group_withZeroThreshold_shouldKeepSinglePositionInOneRow() {
    let lines = vec![
        RawLine::new(100.0, 300.0, "c", RegionKind::Paragraph),
        RawLine::new(100.0, 100.0, "a", RegionKind::Paragraph),
        RawLine::new(100.0, 200.0, "b", RegionKind::Paragraph),
    ];

    let grouper = ParagraphGrouper::new(0.0, 5.0);
    assert_eq!(grouper.threshold(&lines), 0.0);
    let rows = grouper.group(lines);
    assert_eq!(rows.len(), 1);
    assert_eq!(texts(&rows[0].members), vec!["a", "b", "c"]);
}

#[test]
fn test_ordered_lines_withApprovedSpeakers_shouldSplitLabels() {
    let document = parse(&[(
        "paragraph",
        vec![("Hans. Guten Tag.", 100.0, 100.0), ("Wie geht es?", 100.0, 140.0), ("Anna. Gut.", 100.0, 180.0)],
    )]);
    let speakers = vec!["Anna.".to_string(), "Hans.".to_string()];

    let lines = ParagraphGrouper::default().ordered_lines(document.raw_lines(), &speakers);
    assert_eq!(lines, vec!["@Hans.", "Guten Tag.", "Wie geht es?", "@Anna.", "Gut."]);
}

#[test]
fn test_tag_speakers_withLabelOnlyLine_shouldNotEmitEmptyRemainder() {
    let lines = vec!["  Hans.  ".to_string(), "Hansi spricht".to_string()];
    let tagged = tag_speakers(&lines, &["Hans.".to_string()]);
    assert_eq!(tagged, vec!["@Hans.", "Hansi spricht"]);
}

#[test]
fn test_assemble_ezdrama_shouldPutMetadataFirst() {
    let metadata = DramaMetadata {
        title: "Der Bauer".to_string(),
        subtitle: String::new(),
        author: "Anonym".to_string(),
    };
    let text = assemble_ezdrama(&metadata, &["#Akt 1".to_string(), "@Hans.".to_string()]);
    assert_eq!(text, "@title Der Bauer\n@author Anonym\n\n#Akt 1\n@Hans.\n");
}
