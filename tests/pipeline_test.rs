//! Integration tests for the assembly pipeline and Markdown rendering.

use serde_json::json;
use unlayout::model::{ElementKind, PageImage, PageImages, Span};
use unlayout::render::{merge_adjacent_text, to_json, ContentBlock};
use unlayout::{
    AnalysisResult, Error, ImageMode, JsonFormat, PageSelection, RenderOptions, Unlayout,
};

/// Two pages. Page 1 has a title, an intro paragraph, a table whose cell
/// text is repeated as a paragraph, and a checkbox paragraph. Page 2 has one
/// paragraph with its words.
fn sample_json() -> serde_json::Value {
    json!({
        "analyzeResult": {
            "apiVersion": "2024-11-30",
            "modelId": "prebuilt-layout",
            "content": "Report\nIntro text here.\nName Qty\nApple 3\n:selected: Agree\nPage two body.",
            "pages": [
                {
                    "pageNumber": 1,
                    "spans": [{"offset": 0, "length": 57}],
                    "lines": [
                        {"content": "Report", "spans": [{"offset": 0, "length": 6}]},
                        {"content": "Intro text here.", "spans": [{"offset": 7, "length": 16}]},
                        {"content": "Name Qty", "spans": [{"offset": 24, "length": 8}]},
                        {"content": "Apple 3", "spans": [{"offset": 33, "length": 7}]},
                        {"content": ":selected: Agree", "spans": [{"offset": 41, "length": 16}]}
                    ],
                    "selectionMarks": [
                        {"state": "selected", "span": {"offset": 41, "length": 10}}
                    ]
                },
                {
                    "pageNumber": 2,
                    "spans": [{"offset": 58, "length": 14}],
                    "lines": [
                        {"content": "Page two body.", "spans": [{"offset": 58, "length": 14}]}
                    ],
                    "words": [
                        {"content": "Page", "span": {"offset": 58, "length": 4}},
                        {"content": "two", "span": {"offset": 63, "length": 3}},
                        {"content": "body.", "span": {"offset": 67, "length": 5}}
                    ]
                }
            ],
            "sections": [
                {
                    "spans": [{"offset": 0, "length": 72}],
                    "elements": ["/paragraphs/0", "/sections/1"]
                },
                {
                    "spans": [{"offset": 7, "length": 65}],
                    "elements": ["/paragraphs/1", "/tables/0", "/paragraphs/3", "/paragraphs/4"]
                }
            ],
            "paragraphs": [
                {"role": "title", "content": "Report", "spans": [{"offset": 0, "length": 6}]},
                {"content": "Intro text here.", "spans": [{"offset": 7, "length": 16}]},
                {"content": "Apple", "spans": [{"offset": 33, "length": 5}]},
                {"content": ":selected: Agree", "spans": [{"offset": 41, "length": 16}]},
                {"content": "Page two body.", "spans": [{"offset": 58, "length": 14}]}
            ],
            "tables": [
                {
                    "rowCount": 2,
                    "columnCount": 2,
                    "spans": [{"offset": 24, "length": 16}],
                    "cells": [
                        {"kind": "columnHeader", "rowIndex": 0, "columnIndex": 0, "content": "Name",
                         "spans": [{"offset": 24, "length": 4}]},
                        {"kind": "columnHeader", "rowIndex": 0, "columnIndex": 1, "content": "Qty",
                         "spans": [{"offset": 29, "length": 3}]},
                        {"rowIndex": 1, "columnIndex": 0, "content": "Apple",
                         "spans": [{"offset": 33, "length": 5}]},
                        {"rowIndex": 1, "columnIndex": 1, "content": "3",
                         "spans": [{"offset": 39, "length": 1}]}
                    ]
                }
            ]
        }
    })
}

fn sample() -> AnalysisResult {
    AnalysisResult::from_json(&sample_json().to_string()).unwrap()
}

fn position(texts: &[&str], needle: &str) -> usize {
    texts
        .iter()
        .position(|t| t.contains(needle))
        .unwrap_or_else(|| panic!("no unit containing {:?} in {:?}", needle, texts))
}

#[test]
fn test_reading_order() {
    let output = Unlayout::new().process(&sample(), None).unwrap();
    let texts: Vec<&str> = output.units.iter().filter_map(|u| u.text_content()).collect();

    let order = [
        "*Page 1 content:*",
        "**Report**",
        "Intro text here.",
        "**Table 1 Info**",
        "| Name | Qty |",
        "[X] Agree",
        "*Page 2 content:*",
        "Page two body.",
    ];
    let positions: Vec<usize> = order.iter().map(|n| position(&texts, n)).collect();
    assert!(
        positions.windows(2).all(|w| w[0] < w[1]),
        "out of order: {:?}",
        texts
    );
}

#[test]
fn test_covered_elements_suppressed() {
    let output = Unlayout::new().process(&sample(), None).unwrap();

    assert!(output
        .units
        .iter()
        .all(|u| !matches!(u.meta.element_kind, ElementKind::Line | ElementKind::Word)));
    assert!(output
        .units
        .iter()
        .all(|u| u.meta.element_id != "/paragraphs/2"));
    assert!(output.report.skipped.is_empty());
    assert_eq!(output.report.unprocessed_total(), 0);
    assert_eq!(output.report.units_emitted, output.units.len());
}

#[test]
fn test_skip_trace() {
    let output = Unlayout::new()
        .trace_skipped(true)
        .process(&sample(), None)
        .unwrap();

    let apple = output
        .report
        .skipped
        .iter()
        .find(|s| s.element_id == "/paragraphs/2")
        .unwrap();
    assert_eq!(apple.covered_by, Span::new(24, 16));
    assert!(output
        .report
        .skipped
        .iter()
        .any(|s| s.element_id == "/pages/1/words/2"));
}

#[test]
fn test_units_carry_page_and_numbering() {
    let output = Unlayout::new().process(&sample(), None).unwrap();

    let intro = output
        .units
        .iter()
        .find(|u| u.meta.element_id == "/paragraphs/1")
        .unwrap();
    assert_eq!(intro.meta.page_number, 1);
    assert_eq!(intro.meta.section_numbering.as_ref().unwrap().levels(), &[1]);

    let last = output.units.last().unwrap();
    assert_eq!(last.meta.element_id, "/paragraphs/4");
    assert_eq!(last.meta.page_number, 2);
}

#[test]
fn test_markdown_output() {
    let markdown = Unlayout::new().to_markdown(&sample()).unwrap();
    assert!(markdown.contains("| Name | Qty |\n|---|---|\n| Apple | 3 |"));
    assert!(markdown.contains("[X] Agree"));
    assert!(markdown.ends_with("Page two body."));
    assert_eq!(markdown, markdown.trim());
}

#[test]
fn test_markdown_page_selection() {
    let markdown = Unlayout::new()
        .with_pages(PageSelection::parse("2").unwrap())
        .without_page_units()
        .to_markdown(&sample())
        .unwrap();
    assert_eq!(markdown, "Page two body.");
}

#[test]
fn test_strict_mode_rejects_lists() {
    let mut value = sample_json();
    value["analyzeResult"]["lists"] = json!([{"spans": [{"offset": 7, "length": 16}]}]);
    let result = AnalysisResult::from_json(&value.to_string()).unwrap();

    let lenient = Unlayout::new().process(&result, None).unwrap();
    assert_eq!(lenient.report.unprocessed.get("list"), Some(&1));

    let strict = Unlayout::new().strict().process(&result, None);
    assert!(matches!(strict, Err(Error::UnsupportedElement { .. })));
}

#[test]
fn test_format_config() {
    let config = r#"{
        "page": { "startFormats": ["--- page {page_number} ---"] },
        "paragraph": { "general": "> {content}", "title": null },
        "table": { "beforeFormats": [] }
    }"#;
    let markdown = Unlayout::new()
        .with_format_config(config)
        .unwrap()
        .to_markdown(&sample())
        .unwrap();

    assert!(markdown.starts_with("--- page 1 ---"));
    assert!(markdown.contains("> Intro text here."));
    assert!(!markdown.contains("Report"));
    assert!(!markdown.contains("Table 1 Info"));
}

#[test]
fn test_invalid_format_config() {
    let config = r#"{ "paragraph": { "general": "{unknown}" } }"#;
    assert!(matches!(
        Unlayout::new().with_format_config(config),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn test_page_images_must_match_pages() {
    let mut images = PageImages::new();
    images.insert(1, PageImage::png(vec![0x89, 0x50], 10, 10));
    let result = Unlayout::new().process(&sample(), Some(&images));
    assert!(matches!(result, Err(Error::Consistency(_))));
}

#[test]
fn test_page_images_rendered() {
    let mut images = PageImages::new();
    images.insert(1, PageImage::png(vec![1, 2, 3], 10, 10));
    images.insert(2, PageImage::png(vec![4, 5, 6], 10, 10));
    let unlayout = Unlayout::new();
    let output = unlayout.process(&sample(), Some(&images)).unwrap();
    assert_eq!(output.units.iter().filter(|u| u.is_image()).count(), 2);

    let embedded = unlayout.render(&output.units).unwrap();
    assert!(embedded.contains("*Page 1 Image:*"));
    assert!(embedded.contains("data:image/png;base64,AQID"));

    let omitted = unlayout::render::to_markdown(
        &output.units,
        &RenderOptions::new().with_image_mode(ImageMode::Omit),
    )
    .unwrap();
    assert!(!omitted.contains("Page 1 Image"));
    assert!(!omitted.contains("base64"));
}

#[test]
fn test_merge_adjacent_text() {
    let mut images = PageImages::new();
    images.insert(1, PageImage::png(vec![1], 4, 4));
    images.insert(2, PageImage::png(vec![2], 4, 4));
    let output = Unlayout::new().process(&sample(), Some(&images)).unwrap();

    let blocks = merge_adjacent_text(&output.units, "\n");
    let kinds: Vec<&str> = blocks
        .iter()
        .map(|b| match b {
            ContentBlock::Text(_) => "text",
            ContentBlock::Image(_) => "image",
        })
        .collect();
    assert_eq!(kinds, vec!["text", "image", "text", "image"]);
}

#[test]
fn test_units_json() {
    let output = Unlayout::new().process(&sample(), None).unwrap();
    let json = to_json(&output, JsonFormat::Compact).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["units"][0]["id"], "/pages/0_text");
    assert_eq!(value["report"]["unprocessed"], json!({}));
}
