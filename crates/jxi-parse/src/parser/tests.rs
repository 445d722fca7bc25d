use super::*;
use crate::{parse, parse_with_options};
use facet_testhelpers::test;
use jxi_tokenizer::LexErrorKind;
use jxi_tree::Reference;

fn first(source: &str) -> Value {
    let doc = parse(source).unwrap();
    doc.elements()[0].clone()
}

fn parse_error(source: &str) -> ParseError {
    match parse(source) {
        Err(Error::Parse(e)) => e,
        other => panic!("expected a parse error, got {other:?}"),
    }
}

fn link_error(source: &str) -> LinkError {
    match parse(source) {
        Err(Error::Link(e)) => e,
        other => panic!("expected a link error, got {other:?}"),
    }
}

#[test]
fn test_empty_document() {
    assert!(parse("").unwrap().is_empty());
    assert!(parse("  ,, \n ").unwrap().is_empty());
}

#[test]
fn test_literals() {
    let doc = parse(r#"1 -2.5 "s" 's' `raw` true false null"#).unwrap();
    assert_eq!(
        doc.elements(),
        [
            Value::Int(1),
            Value::Float(-2.5),
            Value::from("s"),
            Value::from("s"),
            Value::RawString("raw".into()),
            Value::Bool(true),
            Value::Bool(false),
            Value::Null,
        ]
    );
}

#[test]
fn test_number_canonicalisation() {
    assert_eq!(first("007"), Value::Int(7));
    assert_eq!(first("-0.500"), Value::Float(-0.5));
    assert_eq!(first("10e3"), Value::Float(10000.0));
}

#[test]
fn test_strict_numbers() {
    let options = ParseOptions::new().strict_numbers(true);
    match parse_with_options("007", &options) {
        Err(Error::Lex(e)) => assert!(matches!(e.kind, LexErrorKind::MalformedNumber(_))),
        other => panic!("expected a lex error, got {other:?}"),
    }
    assert!(parse_with_options("0 7", &options).is_ok());
}

#[test]
fn test_raw_string_escape() {
    assert_eq!(first(r"`a\`b`"), Value::RawString("a`b".into()));
    assert_eq!(first(r"`a\nb`"), Value::RawString(r"a\nb".into()));
}

#[test]
fn test_self_closing_tag() {
    let value = first("<empty/>");
    let entity = value.as_entity().unwrap();
    assert_eq!(entity.name(), "empty");
    assert!(entity.is_empty());
    assert!(entity.attributes().is_empty());
}

#[test]
fn test_example_person() {
    let source = r#"
<person firstName="John" lastName="Smith" age=25
  address={street:"21 2nd Street", city:"New York", state:"NY", postalCode:"10021"}
  phoneNumbers=[{type:"home", number:"212 555-1234"}, {type:"fax", number:"646 555-4567"}]
/>"#;
    let doc = parse(source).unwrap();
    let person = doc.get("person").unwrap();
    assert_eq!(person.attr("firstName"), Some(&Value::from("John")));
    assert_eq!(person.attr("age"), Some(&Value::Int(25)));
    let address = person.attr("address").and_then(Value::as_dict).unwrap();
    assert_eq!(address.get(&"city".into()), Some(&Value::from("New York")));
    let phones = person.attr("phoneNumbers").and_then(Value::as_list).unwrap();
    assert_eq!(phones.len(), 2);
    assert_eq!(
        phones[1].as_dict().and_then(|d| d.get(&"type".into())),
        Some(&Value::from("fax"))
    );
}

#[test]
fn test_children_and_groups() {
    let doc = parse("<list><item n=1/><other/><item n=2/>\"text\" 3</list>").unwrap();
    let list = doc.get("list").unwrap();
    assert_eq!(list.len(), 5);
    let items = list.get_all("item");
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].attr("n"), Some(&Value::Int(2)));
    assert_eq!(list.get_index(3), Some(&Value::from("text")));
    assert_eq!(list.get_index(4), Some(&Value::Int(3)));
}

#[test]
fn test_nested_tags() {
    let doc = parse("<a><b><c x=1/></b></a>").unwrap();
    let c = doc.get("a").and_then(|a| a.get("b")).and_then(|b| b.get("c"));
    assert_eq!(c.and_then(|c| c.attr("x")), Some(&Value::Int(1)));
}

#[test]
fn test_self_valued_tag() {
    let value = first("<x=5 y=6/>");
    let entity = value.as_entity().unwrap();
    assert_eq!(entity.attr("x"), Some(&Value::Int(5)));
    assert_eq!(entity.attr("y"), Some(&Value::Int(6)));
    let names: Vec<_> = entity.attributes().names().collect();
    assert_eq!(names, ["x", "y"]);
}

#[test]
fn test_tag_valued_attribute() {
    let value = first("<a inner=<b v=1/>/>");
    let inner = value.as_entity().and_then(|a| a.attr("inner")).and_then(Value::as_entity);
    assert_eq!(inner.map(Entity::name), Some("b"));
}

#[test]
fn test_duplicate_attribute_overwrites() {
    let value = first("<a x=1 y=2 x=3/>");
    let entity = value.as_entity().unwrap();
    assert_eq!(entity.attr("x"), Some(&Value::Int(3)));
    assert_eq!(entity.attributes().len(), 2);
}

#[test]
fn test_collections() {
    assert_eq!(
        first("[1, [2 3] {}]"),
        Value::List(vec![
            Value::Int(1),
            Value::List(vec![Value::Int(2), Value::Int(3)]),
            Value::Dict(Dict::new()),
        ])
    );

    let dict = first(r#"{a: 1, 2: "two", "q k": null, `r`: true}"#);
    let dict = dict.as_dict().unwrap();
    assert_eq!(dict.len(), 4);
    assert_eq!(dict.get(&Key::Int(2)), Some(&Value::from("two")));
    assert_eq!(dict.get(&"q k".into()), Some(&Value::Null));
    assert_eq!(dict.get(&"r".into()), Some(&Value::Bool(true)));

    let set = first("(1 2 2 \"a\" 1)");
    assert_eq!(set.as_set().map(Set::len), Some(3));
}

#[test]
fn test_duplicate_dict_key_keeps_first_position() {
    let dict = first("{a: 1, b: 2, a: 3}");
    let dict = dict.as_dict().unwrap();
    let keys: Vec<_> = dict.keys().map(ToString::to_string).collect();
    assert_eq!(keys, ["a", "b"]);
    assert_eq!(dict.get(&"a".into()), Some(&Value::Int(3)));
}

#[test]
fn test_sets_disabled() {
    let options = ParseOptions::new().sets(false);
    match parse_with_options("(1)", &options) {
        Err(Error::Lex(e)) => assert_eq!(e.kind, LexErrorKind::IllegalCharacter('(')),
        other => panic!("expected a lex error, got {other:?}"),
    }
}

#[test]
fn test_unhashable_set_member() {
    let err = parse_error("(1 [2])");
    assert_eq!(err.kind, ParseErrorKind::UnhashableSetMember("list"));
    assert_eq!(err.span, Span::new(3, 6));
}

#[test]
fn test_mismatched_closing_tag() {
    let err = parse_error("<tag></other>");
    assert_eq!(
        err.kind,
        ParseErrorKind::MismatchedClosingTag {
            open: "tag".into(),
            close: "other".into(),
        }
    );
    assert_eq!(err.line, 1);
    assert_eq!(err.span, Span::new(7, 12));
}

#[test]
fn test_unterminated_string_line() {
    match parse("<tag a=\"unterminated>") {
        Err(Error::Lex(e)) => {
            assert_eq!(e.kind, LexErrorKind::UnterminatedString);
            assert_eq!(e.line, 1);
        }
        other => panic!("expected a lex error, got {other:?}"),
    }
}

#[test]
fn test_errors_carry_line() {
    let err = parse_error("<a>\n  <b>\n  </a>\n</b>");
    assert!(matches!(err.kind, ParseErrorKind::MismatchedClosingTag { .. }));
    assert_eq!(err.line, 3);
}

#[test]
fn test_unexpected_eof() {
    for source in ["<tag>", "<tag", "[1 2", "{a:", "{a: 1", "(1", "<a x=", "<a x=1"] {
        let err = parse_error(source);
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof, "{source}");
    }
}

#[test]
fn test_unexpected_tokens() {
    let err = parse_error("<a x 1/>");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }), "{err}");

    let err = parse_error("<a =/>");
    assert!(matches!(err.kind, ParseErrorKind::ExpectedValue { .. }), "{err}");

    let err = parse_error("<1/>");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }), "{err}");

    let err = parse_error("<a] ");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }), "{err}");

    let err = parse_error("]");
    assert!(matches!(err.kind, ParseErrorKind::ExpectedValue { .. }), "{err}");

    let err = parse_error("word");
    assert!(matches!(err.kind, ParseErrorKind::ExpectedValue { .. }), "{err}");
}

#[test]
fn test_invalid_dict_key() {
    let err = parse_error("{1.5: 2}");
    assert!(matches!(err.kind, ParseErrorKind::InvalidDictKey { .. }), "{err}");
    let err = parse_error("{[a]: 2}");
    assert!(matches!(err.kind, ParseErrorKind::InvalidDictKey { .. }), "{err}");
}

#[test]
fn test_link_steps() {
    let (doc, pending) = Parser::new(r#"@>a>b[2].c[0][key]["q"][`r`];"#).parse().unwrap();
    assert_eq!(pending.len(), 1);
    let link = doc.elements()[0].as_link().unwrap();
    assert_eq!(
        link.steps,
        [
            Step::tag("a"),
            Step::tag_at("b", 2),
            Step::attr("c"),
            Step::index(0),
            Step::index("key"),
            Step::index("q"),
            Step::index("r"),
        ]
    );
    assert_eq!(pending[0].span, Span::new(0, 29));
    assert_eq!(pending[0].slots, [Slot::Index(0)]);
}

#[test]
fn test_link_slots() {
    let (_, pending) = Parser::new("<a x=[1 {k: @>z;}]><b/>@>z;</a>").parse().unwrap();
    assert_eq!(
        pending[0].slots,
        [
            Slot::Index(0),
            Slot::Attr("x".into()),
            Slot::Index(1),
            Slot::Key("k".into()),
        ]
    );
    assert_eq!(pending[1].slots, [Slot::Index(0), Slot::Index(1)]);
    assert_ne!(pending[0].link.id, pending[1].link.id);
}

#[test]
fn test_malformed_links() {
    for source in ["@;", "@a;", "@>;", "@>a", "@>a.;", "@>a[;", "@>a[1;", "@>a[1.5];", "@.a b"] {
        let err = link_error(source);
        assert!(matches!(err.kind, LinkErrorKind::MalformedSyntax(_)), "{source}: {err}");
        assert_eq!(err.step, None);
    }
}

#[test]
fn test_malformed_link_line() {
    let err = link_error("<a>\n\n@>b c</a>");
    assert_eq!(err.line, 3);
}

#[test]
fn test_link_resolution() {
    let doc = parse("<root><a v=1/><b ref=@>a.v;/></root>").unwrap();
    let b = doc.get("root").and_then(|root| root.get("b")).unwrap();
    assert_eq!(b.attr("ref"), Some(&Value::Int(1)));
}

#[test]
fn test_link_to_composite() {
    let doc = parse("<root><a v=[1 2]/><b ref=@>root>a.v;/></root>").unwrap();
    let b = doc.get("root").and_then(|root| root.get("b")).unwrap();
    assert_eq!(
        b.attr("ref"),
        Some(&Value::Ref(Reference::new(vec![
            Step::tag_at("root", 0),
            Step::tag_at("a", 0),
            Step::attr("v"),
        ])))
    );
    let target = b.attr("ref").and_then(|r| doc.follow(r));
    assert_eq!(target, Some(&Value::List(vec![Value::Int(1), Value::Int(2)])));
}

#[test]
fn test_link_cycle() {
    let err = link_error("<x a=@>y.a;/><y a=@>x.a;/>");
    assert!(matches!(err.kind, LinkErrorKind::UnresolvedCycle { .. }));
}

#[test]
fn test_no_placeholders_remain() {
    let doc = parse("<a x=@>b.y;><c z=@>b;/></a><b y=\"v\"/>").unwrap();
    fn assert_resolved(value: &Value) {
        match value {
            Value::Link(link) => panic!("unresolved link {link}"),
            Value::List(items) => items.iter().for_each(assert_resolved),
            Value::Set(set) => set.iter().for_each(assert_resolved),
            Value::Dict(dict) => dict.values().for_each(assert_resolved),
            Value::Entity(entity) => {
                entity.attributes().iter().for_each(|(_, v)| assert_resolved(v));
                entity.children().iter().for_each(assert_resolved);
            }
            _ => {}
        }
    }
    doc.elements().iter().for_each(assert_resolved);
}

#[test]
fn test_parsers_are_independent() {
    let sources = ["<a x=@>b.y;/><b y=1/>", "<c><d/></c>"];
    let handles: Vec<_> = sources
        .iter()
        .map(|source| {
            let source = source.to_string();
            std::thread::spawn(move || parse(&source).map(|doc| doc.len()))
        })
        .collect();
    let lens: Vec<_> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
    assert_eq!(lens, [2, 1]);
}
