mod common;

use common::TestResult;
use common::fixtures::feed_parsing;
use serde_json::json;
use std::thread;
use unxml::{Parser, ParserRef};

#[test]
fn test_one_parser_many_threads_same_document() -> TestResult {
    let parsing = feed_parsing();
    let doc = parsing.xml().parse(include_str!("xml/homer.xml"))?;
    let parser: ParserRef = std::sync::Arc::new(
        parsing
            .arr(
                "/a:feed/a:entry",
                parsing
                    .obj()
                    .attribute_with("id", "@id", parsing.simple().integer_parser())
                    .attribute("name", "a:name"),
            )
            .build(),
    );
    let expected = parser.apply(doc.root_node())?;

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| parser.apply(doc.root_node()).map_err(|e| e.to_string())))
            .collect();
        for handle in handles {
            let result = handle.join().expect("worker panicked");
            assert_eq!(result, Ok(expected.clone()));
        }
    });
    Ok(())
}

#[test]
fn test_recursive_parser_across_threads_and_documents() {
    let parsing = feed_parsing();
    let tree = parsing.simple().node_tree_parser();

    thread::scope(|scope| {
        for depth in 1..=4usize {
            let tree = tree.clone();
            let loader = parsing.xml();
            scope.spawn(move || {
                let xml = format!("{}{}", "<n>".repeat(depth), "</n>".repeat(depth));
                let doc = loader.parse(&xml).expect("well-formed");
                let mut json = tree.apply(doc.root_element()).expect("applies");
                for _ in 1..depth {
                    assert_eq!(json["nodeType"], json!("n"));
                    json = json["children"][0].take();
                }
                assert_eq!(json, json!({"nodeType": "n", "children": []}));
            });
        }
    });
}
