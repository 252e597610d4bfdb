#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::doc::ElementKind;

fn sample() -> String {
    json!([
        {
            "id": "p1",
            "title": "Cover",
            "backgroundColor": "#ffffff",
            "elements": [
                { "id": "t1", "type": "text", "content": "Hi", "x": 10, "y": 10, "width": 200, "height": 40, "styles": {} },
                {
                    "id": "g1", "type": "group", "x": 0, "y": 100, "width": 300, "height": 50, "styles": {},
                    "groupChildren": [
                        { "id": "s1", "type": "shape", "x": 0, "y": 0, "width": 100, "height": 50, "styles": {} },
                        { "id": "s2", "type": "shape", "x": 200, "y": 0, "width": 100, "height": 50, "locked": true, "styles": {} }
                    ]
                }
            ]
        },
        {
            "id": "p2",
            "title": "Inside",
            "contentArea": { "margin": 40, "backgroundColor": "#f8fafc" },
            "elements": []
        }
    ])
    .to_string()
}

#[test]
fn decodes_valid_project() {
    let pages = decode_pages(&sample()).unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].elements[1].children().len(), 2);
    assert_eq!(pages[1].background_color, "#ffffff");
    assert_eq!(pages[1].content_area.as_ref().unwrap().margin, 40.0);
}

#[test]
fn rejects_invalid_json() {
    assert!(matches!(decode_pages("{not json"), Err(ProjectError::Json(_))));
}

#[test]
fn rejects_non_array() {
    assert!(matches!(decode_pages(r#"{"id":"p1"}"#), Err(ProjectError::NotAnArray)));
}

#[test]
fn rejects_empty_document() {
    assert!(matches!(decode_pages("[]"), Err(ProjectError::Empty)));
}

#[test]
fn rejects_page_without_title() {
    let text = json!([{ "id": "p1", "title": "", "elements": [] }]).to_string();
    let err = decode_pages(&text).unwrap_err();
    assert!(matches!(err, ProjectError::MalformedPage { index: 0, reason: "missing title" }));
}

#[test]
fn rejects_page_with_non_array_elements() {
    let text = json!([
        { "id": "p1", "title": "A", "elements": [] },
        { "id": "p2", "title": "B", "elements": {} }
    ])
    .to_string();
    let err = decode_pages(&text).unwrap_err();
    assert!(matches!(err, ProjectError::MalformedPage { index: 1, .. }));
    assert_eq!(err.to_string(), "page 1 is malformed: elements is not an array");
}

#[test]
fn rejects_unknown_element_kind() {
    let text = json!([{ "id": "p1", "title": "A", "elements": [
        { "id": "x", "type": "sticker", "x": 0, "y": 0, "width": 1, "height": 1 }
    ] }])
    .to_string();
    assert!(matches!(decode_pages(&text), Err(ProjectError::Json(_))));
}

#[test]
fn rejects_duplicate_nested_id() {
    let text = json!([{ "id": "p1", "title": "A", "elements": [
        { "id": "a", "type": "shape", "x": 0, "y": 0, "width": 1, "height": 1 },
        { "id": "g", "type": "group", "x": 0, "y": 0, "width": 1, "height": 1, "groupChildren": [
            { "id": "a", "type": "shape", "x": 0, "y": 0, "width": 1, "height": 1 }
        ] }
    ] }])
    .to_string();
    let err = decode_pages(&text).unwrap_err();
    assert!(matches!(err, ProjectError::DuplicateId(ref id) if id == "a"));
}

#[test]
fn encode_then_decode_preserves_pages() {
    let pages = decode_pages(&sample()).unwrap();
    let text = encode_pages(&pages).unwrap();
    assert!(text.contains("\"groupChildren\""));
    assert_eq!(decode_pages(&text).unwrap(), pages);
}

#[test]
fn summary_counts_nested_children() {
    let pages = decode_pages(&sample()).unwrap();
    let summary = summarize(&pages);
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.elements, 2);
    assert_eq!(summary.grouped, 2);
    assert_eq!(summary.locked, 1);
    assert_eq!(summary.by_kind.get(ElementKind::Shape.as_str()), Some(&2));
    assert_eq!(summary.by_kind.get("group"), Some(&1));
    assert_eq!(summary.by_kind.get("text"), Some(&1));
}
