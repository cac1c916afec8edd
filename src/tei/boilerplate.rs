/*!
 * Fixed TEI scaffolding for a new DraCor edition.
 *
 * Placeholders (`INSERT`, `ENTER SOURCE URL HERE`, `DESCRIBE CHANGE`) are
 * meant to be filled in by the editor after conversion.
 */

use chrono::{Datelike, NaiveDate};

use crate::tei::tree::{DocumentTree, NodeId};

pub const TEI_NAMESPACE: &str = "http://www.tei-c.org/ns/1.0";
const LICENCE_URL: &str = "https://creativecommons.org/publicdomain/zero/1.0/";

/// Handles of the scaffolding nodes the parser writes into
#[derive(Debug, Clone, Copy)]
pub struct Skeleton {
    pub header: NodeId,
    pub title_stmt: NodeId,
    pub front: NodeId,
    pub body: NodeId,
}

/// Build `TEI` with header, standOff and an empty `text/front`+`text/body`
pub fn build_skeleton(document_id: &str, language: &str, date: NaiveDate) -> (DocumentTree, Skeleton) {
    let mut tree = DocumentTree::new("TEI");
    let root = tree.root();
    tree.set_attr(root, "xmlns", TEI_NAMESPACE);
    tree.set_attr(root, "xml:id", document_id);
    tree.set_attr(root, "xml:lang", language);

    let header = tree.append_element(root, "teiHeader");
    let file_desc = tree.append_element(header, "fileDesc");
    let title_stmt = tree.append_element(file_desc, "titleStmt");
    add_publication_stmt(&mut tree, file_desc);
    add_source_desc(&mut tree, file_desc);

    add_stand_off(&mut tree, root, date.year());

    let text = tree.append_element(root, "text");
    let front = tree.append_element(text, "front");
    let body = tree.append_element(text, "body");

    (
        tree,
        Skeleton {
            header,
            title_stmt,
            front,
            body,
        },
    )
}

fn add_publication_stmt(tree: &mut DocumentTree, file_desc: NodeId) {
    let stmt = tree.append_element(file_desc, "publicationStmt");
    let publisher = tree.append_text_element(stmt, "publisher", "DraCor");
    tree.set_attr(publisher, "xml:id", "dracor");
    let idno = tree.append_text_element(stmt, "idno", "https://dracor.org");
    tree.set_attr(idno, "type", "URL");

    let availability = tree.append_element(stmt, "availability");
    let licence = tree.append_element(availability, "licence");
    tree.append_text_element(licence, "ab", "CC0 1.0");
    let reference = tree.append_text_element(licence, "ref", "Licence");
    tree.set_attr(reference, "target", LICENCE_URL);
}

fn add_source_desc(tree: &mut DocumentTree, file_desc: NodeId) {
    let source_desc = tree.append_element(file_desc, "sourceDesc");
    let bibl = tree.append_element(source_desc, "bibl");
    tree.set_attr(bibl, "type", "digitalSource");
    tree.append_text_element(bibl, "name", "oenb");
    let idno = tree.append_text_element(bibl, "idno", "ENTER SOURCE URL HERE");
    tree.set_attr(idno, "type", "URL");
    let availability = tree.append_element(bibl, "availability");
    tree.set_attr(availability, "status", "free");
    tree.append_text_element(availability, "p", "In the public domain.");
}

fn add_stand_off(tree: &mut DocumentTree, root: NodeId, year: i32) {
    let stand_off = tree.append_element(root, "standOff");
    let list_event = tree.append_element(stand_off, "listEvent");
    let year = year.to_string();
    for kind in ["print", "premiere", "written"] {
        let event = tree.append_element(list_event, "event");
        tree.set_attr(event, "type", kind);
        tree.set_attr(event, "when", &year);
        tree.append_element(event, "desc");
    }

    let list_relation = tree.append_element(stand_off, "listRelation");
    let relation = tree.append_element(list_relation, "relation");
    tree.set_attr(relation, "name", "wikidata");
    tree.set_attr(relation, "active", "INSERT");
    tree.set_attr(relation, "passive", "INSERT");
}

/// `revisionDesc/listChange/change` dated `date`
pub fn add_revision_desc(tree: &mut DocumentTree, header: NodeId, date: NaiveDate) {
    let revision = tree.append_element(header, "revisionDesc");
    let list_change = tree.append_element(revision, "listChange");
    let change = tree.append_text_element(list_change, "change", "DESCRIBE CHANGE");
    tree.set_attr(change, "when", &date.format("%Y-%m-%d").to_string());
}
