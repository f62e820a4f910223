//! Object graph integration tests: building a small page tree and walking it

use pretty_assertions::assert_eq;
use sealpdf::objects::ObjectKind;
use sealpdf::{
    Literal, LiteralConfig, Object, ObjectGraph, ObjectId, Operator, PdfError, WriterConfig,
};

struct Document {
    graph: ObjectGraph,
    page: ObjectId,
    content: ObjectId,
}

fn one_page_document() -> Document {
    let mut graph = ObjectGraph::new();
    let pages = graph.next_ref();
    let page = graph.next_ref();

    let content = graph
        .content_stream(
            vec![
                Operator::new(
                    "cm",
                    vec![1.into(), 0.into(), 0.into(), 1.into(), 72.into(), 72.into()],
                ),
                Operator::new("re", vec![0.into(), 0.into(), 100.into(), 50.5.into()]),
                Operator::of("f"),
            ],
            Literal::Absent,
        )
        .unwrap();
    let content = graph.register(content);

    let page_dict = graph.obj(Literal::dict([
        ("Type", Literal::from("Page")),
        ("Parent", Literal::from(pages)),
        (
            "MediaBox",
            Literal::array([0.into(), 0.into(), 612.into(), 792.into()]),
        ),
        ("Contents", Literal::from(content)),
        ("Rotate", Literal::Absent),
    ]));
    graph.assign(page, page_dict).unwrap();

    let tree = graph.obj(Literal::dict([
        ("Type", Literal::from("Pages")),
        ("Kids", Literal::array([Literal::from(page)])),
        ("Count", Literal::from(1)),
    ]));
    graph.assign(pages, tree).unwrap();

    let catalog = graph.obj(Literal::dict([
        ("Type", Literal::from("Catalog")),
        ("Pages", Literal::from(pages)),
    ]));
    let root = graph.register(catalog);
    graph.trailer_mut().root = Some(root);

    Document {
        graph,
        page,
        content,
    }
}

#[test]
fn test_walk_page_tree_from_root() {
    let doc = one_page_document();
    let graph = &doc.graph;

    let root = Object::Reference(graph.trailer().root.unwrap());
    let catalog = graph.lookup_dict(&root).unwrap();
    let pages = graph.lookup_dict(catalog.get("Pages").unwrap()).unwrap();
    assert_eq!(graph.lookup_name(pages.get("Type").unwrap()).unwrap(), "Pages");

    let kids = graph.lookup_array(pages.get("Kids").unwrap()).unwrap();
    assert_eq!(kids, &[Object::Reference(doc.page)]);

    let page = graph.lookup_dict(&kids[0]).unwrap();
    assert!(!page.contains_key("Rotate"));
    let media_box = graph.lookup_array(page.get("MediaBox").unwrap()).unwrap();
    let numbers: Vec<f64> = media_box
        .iter()
        .map(|n| graph.lookup_number(n).unwrap())
        .collect();
    assert_eq!(numbers, vec![0.0, 0.0, 612.0, 792.0]);

    let content = graph.lookup_stream(page.get("Contents").unwrap()).unwrap();
    assert_eq!(content.operators().map(<[Operator]>::len), Some(3));
    assert_eq!(graph.get_object_ref(graph.get(doc.content).unwrap()), Some(doc.content));
}

#[test]
fn test_objects_enumerate_in_reference_order() {
    let doc = one_page_document();
    let ids: Vec<u32> = doc
        .graph
        .enumerate_indirect_objects()
        .iter()
        .map(|(id, _)| id.number())
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(doc.graph.largest_object_number(), 4);
}

#[test]
fn test_optional_lookups() {
    let mut graph = ObjectGraph::new();
    let missing = Object::Reference(ObjectId::new(40, 0));
    let null = graph.register(Object::Null);

    assert_eq!(graph.lookup_dict_maybe(&missing).unwrap(), None);
    assert_eq!(graph.lookup_bool_maybe(&Object::Reference(null)).unwrap(), None);
    assert_eq!(graph.lookup_bool_maybe(&Object::Boolean(true)).unwrap(), Some(true));
    assert!(matches!(
        graph.lookup_name_maybe(&Object::Integer(1)),
        Err(PdfError::TypeMismatch { .. })
    ));
    assert_eq!(
        graph
            .lookup(&Object::Reference(null), &[ObjectKind::Null])
            .unwrap(),
        &Object::Null
    );
}

#[test]
fn test_literal_views_of_a_page() {
    let doc = one_page_document();
    let page = doc.graph.get(doc.page).unwrap();

    let shallow = doc.graph.get_literal(
        page,
        LiteralConfig {
            literal_ref: true,
            ..LiteralConfig::default()
        },
    );
    let Literal::Dict(entries) = shallow else {
        panic!("page is a dictionary");
    };
    assert_eq!(entries["Type"], Literal::Str("Page".to_string()));
    assert_eq!(entries["Contents"], Literal::Integer(doc.content.number() as i64));
    assert_eq!(
        entries["MediaBox"],
        Literal::array([0.into(), 0.into(), 612.into(), 792.into()])
    );

    // Converting back reproduces the dictionary when references stay objects
    let round = doc.graph.get_literal(page, LiteralConfig::default());
    assert_eq!(doc.graph.obj(round), page.clone());
}

#[test]
fn test_stream_dict_literal() {
    let doc = one_page_document();
    let content = doc.graph.get(doc.content).unwrap();

    let as_dict = doc.graph.get_literal(
        content,
        LiteralConfig {
            literal_stream_dict: true,
            ..LiteralConfig::default()
        },
    );
    assert_eq!(as_dict, Literal::Dict(Default::default()));

    let as_object = doc.graph.get_literal(content, LiteralConfig::default());
    assert_eq!(as_object, Literal::Object(content.clone()));
}

#[test]
fn test_shared_graphics_state_streams_wrap_page_content() {
    let mut doc = one_page_document();
    let push = doc.graph.push_graphics_state_content_stream();
    let pop = doc.graph.pop_graphics_state_content_stream();
    assert_eq!(doc.graph.push_graphics_state_content_stream(), push);

    let contents = Object::Array(vec![push.into(), doc.content.into(), pop.into()]);
    if let Some(Object::Dictionary(page)) = doc.graph.get_mut(doc.page) {
        page.set("Contents", contents);
    }

    let bytes = sealpdf::save_to_bytes(
        &mut doc.graph,
        None,
        WriterConfig {
            compress_content_streams: false,
            binary_comment: false,
        },
    )
    .unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains(&format!("/Contents [{push} {} {pop}]", doc.content)));
    assert!(text.contains("stream\n1 0 0 1 72 72 cm\n0 0 100 50.5 re\nf\n\nendstream"));
    assert!(text.contains("stream\nq\n\nendstream"));
    assert!(text.contains("stream\nQ\n\nendstream"));
}

#[test]
fn test_random_suffixes_repeat_across_graphs() {
    let mut first = ObjectGraph::new();
    let mut second = ObjectGraph::new();

    let a: Vec<String> = (0..5).map(|_| first.add_random_suffix("Im", 4)).collect();
    let b: Vec<String> = (0..5).map(|_| second.add_random_suffix("Im", 4)).collect();

    assert_eq!(a, b);
    for name in &a {
        let (prefix, digits) = name.split_once('-').unwrap();
        assert_eq!(prefix, "Im");
        assert!(digits.parse::<u32>().unwrap() < 10_000);
    }
}
