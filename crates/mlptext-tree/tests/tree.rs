use mlptext_tree::{plain_text, MarkupNode, Page, TemplateArgument};

#[test]
fn page_deserializes_from_parser_json() {
    let json = r#"{
        "title": "Pythagorean theorem",
        "content": [
            {"kind": "paragraph", "children": [
                {"kind": "text", "content": "In a right triangle "},
                {"kind": "tag_extension", "name": "math", "body": "a^2+b^2=c^2"},
                {"kind": "whitespace"},
                {"kind": "internal_link", "target": "Hypotenuse"}
            ]},
            {"kind": "template", "name": "mvar", "args": [
                {"value": [{"kind": "text", "content": "x"}]}
            ]},
            {"kind": "span_marker", "name": "unknown"}
        ]
    }"#;

    // unknown kinds must be given as `other`; everything else is typed
    let result: Result<Page, _> = serde_json::from_str(json);
    assert!(result.is_err());

    let json = json.replace(r#"{"kind": "span_marker", "name": "unknown"}"#, r#"{"kind": "other", "name": "span"}"#);
    let page: Page = serde_json::from_str(&json).unwrap();
    assert_eq!(page.title, "Pythagorean theorem");
    assert_eq!(page.content.len(), 3);
    match &page.content[0] {
        MarkupNode::Paragraph { children } => {
            assert_eq!(children[1], MarkupNode::tag_extension("math", "a^2+b^2=c^2"));
            assert_eq!(children[3], MarkupNode::internal_link("Hypotenuse", vec![]));
        }
        other => panic!("expected paragraph, got {:?}", other),
    }
    assert_eq!(page.content[2].kind_name(), "span");
}

#[test]
fn template_source_round_trips_arguments() {
    let node = MarkupNode::template(
        "dlmf",
        vec![
            TemplateArgument::named("id", vec![MarkupNode::text("5.2.1")]),
            TemplateArgument::positional(vec![MarkupNode::text("Gamma")]),
        ],
    );
    assert_eq!(node.to_source(), "{{dlmf|id=5.2.1|Gamma}}");
}

#[test]
fn tag_extension_source_keeps_attributes() {
    let node = MarkupNode::tag_extension("ref", "Knuth 1984").with_attribute("name", "knuth");
    assert_eq!(node.to_source(), "<ref name=\"knuth\">Knuth 1984</ref>");
}

#[test]
fn single_text_argument() {
    let arg = TemplateArgument::positional(vec![MarkupNode::text("x")]);
    assert_eq!(arg.single_text(), Some("x"));

    let arg = TemplateArgument::positional(vec![MarkupNode::text("x"), MarkupNode::Whitespace]);
    assert_eq!(arg.single_text(), None);
}

#[test]
fn plain_text_flattens_markup() {
    let nodes = vec![
        MarkupNode::bold(vec![MarkupNode::text("bold")]),
        MarkupNode::Whitespace,
        MarkupNode::internal_link("Target", vec![MarkupNode::text("shown")]),
    ];
    assert_eq!(plain_text(&nodes), "bold shown");
}
