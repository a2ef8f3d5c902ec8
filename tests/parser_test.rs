use pretty_assertions::assert_eq;
use rift::{
    parse, parse_reader, BinaryOperator, Body, Error, Node, Numeric, Parser, ParserConfig, Ref,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn lines(input: &str) -> Vec<Node> {
    let source = parse(input).expect("parse");
    assert_eq!(source.len(), 1);
    source.rifts()[0].lines().to_vec()
}

fn int(value: i64) -> Node {
    Node::Numeric(Numeric::Integer(value))
}

fn local(name: &str) -> Node {
    Node::Reference(Ref::local(name))
}

#[test]
fn it_parses_a_small_program() {
    let source = parse("main => { x = 1 + 2 foo(x) }").unwrap();
    assert_eq!(source.len(), 1);
    let main = &source.rifts()[0];
    assert_eq!(main.name(), "main");
    assert!(!main.has_gravity());
    assert_eq!(main.lines().len(), 2);

    let assignment = main.lines()[0].as_assignment().expect("assignment");
    assert_eq!(assignment.target(), &Ref::local("x"));
    let operation = assignment.value().as_operation().expect("operation");
    assert_eq!(operation.operands(), vec![&int(1), &int(2)]);
    assert_eq!(operation.operators(), vec![BinaryOperator::Add]);

    let apply = main.lines()[1].as_func_apply().expect("function apply");
    assert_eq!(apply.callee(), &Ref::local("foo"));
    assert_eq!(apply.args(), &[local("x")]);

    assert_eq!(
        source.to_string(),
        "(rift (reference main) (block \
         (assignment (reference x) (operation (numeric 1) + (numeric 2))) \
         (function-apply (reference foo) (tuple (reference x)))))"
    );
}

#[test]
fn it_parses_reference_shapes() {
    let refs: Vec<Ref> = lines("m => { a a:b @a:b @a a1_b }")
        .iter()
        .map(|line| line.as_ref_node().expect("reference").clone())
        .collect();
    assert_eq!(
        refs,
        vec![
            Ref::local("a"),
            Ref::qualified("a", "b"),
            Ref::qualified("@a", "b"),
            Ref::local("@a"),
            Ref::local("a1_b"),
        ]
    );
    assert_eq!(refs[0].rift(), "_");
    assert_eq!(refs[2].rift(), "@a");
    assert_eq!(refs[2].name(), "b");
    assert!(refs[2].has_gravity());
    assert_eq!(refs[3].name(), "a");
    assert!(refs[3].has_gravity());
}

#[test]
fn it_parses_numerics() {
    let list = lines("m => { [0, -12, 3.14, 1e10, 2.5e-3, 7.] }");
    let Node::List(items) = &list[0] else {
        panic!("expected a list, got {}", list[0]);
    };
    assert_eq!(items[0], int(0));
    assert_eq!(items[1], int(-12));
    assert_eq!(items[2], Node::Numeric(Numeric::Decimal(3.14)));
    assert_eq!(items[3], Node::Numeric(Numeric::Scientific(1e10)));
    assert_eq!(items[4], Node::Numeric(Numeric::Scientific(0.0025)));
    assert_eq!(items[5], Node::Numeric(Numeric::Decimal(7.0)));
}

#[test]
fn it_rejects_leading_zeros() {
    let result = parse("m => { x = 01 }");
    assert!(matches!(result, Err(Error::Syntax(_))));
}

#[test]
fn it_rejects_incomplete_input() {
    for input in ["", "   ", "m => { 1 } ?", "m => { 1 ", "m { 1 }", "=> { 1 }"] {
        let result = parse(input);
        assert!(
            matches!(result, Err(Error::Syntax(_))),
            "{input:?} should fail, got {result:?}"
        );
    }
}

#[test]
fn it_reads_a_cross_unit_call() {
    let source = parse(
        "@helper => { id = (x) -> x }\n\
         run => { y = helper:id(5) }",
    )
    .unwrap();
    assert_eq!(source.len(), 2);

    let helper = source.rift("helper").expect("helper rift");
    assert!(helper.has_gravity());
    assert_eq!(helper.raw_name(), "@helper");
    let protocol = helper.protocol();
    let id = protocol.get("id").expect("id in protocol");
    assert_eq!(id.params(), &[Ref::local("x")]);
    assert_eq!(id.lines(), &[local("x")]);

    let run = source.rift("run").expect("run rift");
    assert!(run.protocol().is_empty());
    let assignment = run.lines()[0].as_assignment().expect("assignment");
    let apply = assignment.value().as_func_apply().expect("apply");
    assert_eq!(apply.callee(), &Ref::qualified("helper", "id"));
    assert_eq!(apply.callee().rift(), "helper");
    assert_eq!(apply.arity(), 1);
    assert_eq!(apply.args(), &[int(5)]);
}

#[test]
fn it_parses_block_bodied_functions() {
    let lines = lines("m => { f = (a, b) -> { c = a + b\n c } }");
    let func = lines[0]
        .as_assignment()
        .and_then(|assignment| assignment.value().as_func())
        .expect("function");
    assert_eq!(func.params(), &[Ref::local("a"), Ref::local("b")]);
    assert!(matches!(func.body, Body::Block(_)));
    assert_eq!(func.lines().len(), 2);
    assert_eq!(func.lines()[1], local("c"));
}

#[test]
fn it_parses_if_and_else() {
    let lines = lines("m => { if flag { y = 1 } else { y = 2 }\n if ok { z } }");
    let first = lines[0].as_if().expect("if");
    assert_eq!(first.condition(), &local("flag"));
    assert!(first.has_else());
    assert_eq!(first.lines().len(), 1);
    assert_eq!(first.else_lines().len(), 1);
    assert_eq!(
        lines[0].to_string(),
        "(if (reference flag) (block (assignment (reference y) (numeric 1))) \
         (block (assignment (reference y) (numeric 2))))"
    );

    let second = lines[1].as_if().expect("if");
    assert!(!second.has_else());
    assert!(second.else_lines().is_empty());
}

#[test]
fn it_does_not_mistake_names_for_keywords() {
    let lines = lines("m => { iffy = true truest }");
    let assignment = lines[0].as_assignment().expect("assignment");
    assert_eq!(assignment.target(), &Ref::local("iffy"));
    assert_eq!(assignment.value(), &Node::Boolean(true));
    assert_eq!(lines[1], local("truest"));
}

#[test]
fn it_decodes_strings() {
    let lines = lines(r#"m => { s = "a\tb\"c" "" }"#);
    let assignment = lines[0].as_assignment().expect("assignment");
    assert_eq!(assignment.value(), &Node::String("a\tb\"c".to_string()));
    assert_eq!(lines[1], Node::String(String::new()));
}

#[test]
fn it_parses_containers() {
    let lines = lines(r#"m => { {"k": 1, 2: true, key: [x, (y)]} () }"#);
    let Node::Map(entries) = &lines[0] else {
        panic!("expected a map, got {}", lines[0]);
    };
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].key, Node::String("k".to_string()));
    assert_eq!(entries[1].key, int(2));
    assert_eq!(entries[1].value, Node::Boolean(true));
    assert_eq!(entries[2].key, local("key"));
    assert_eq!(
        entries[2].value,
        Node::List(vec![local("x"), Node::Tuple(vec![local("y")])])
    );
    assert_eq!(lines[1], Node::Tuple(vec![]));
}

#[test]
fn it_keeps_operator_chains_flat() {
    let lines = lines("m => { 2 ** 3 * 4 % f(1) }");
    let operation = lines[0].as_operation().expect("operation");
    assert_eq!(
        operation.operators(),
        vec![
            BinaryOperator::Power,
            BinaryOperator::Multiply,
            BinaryOperator::Modulo
        ]
    );
    assert_eq!(operation.operands().len(), 4);
    assert!(operation.operands()[3].as_func_apply().is_some());
}

#[test]
fn it_skips_comments() {
    let source = parse("# leading\nm => { x = 1 # trailing\n y = 2 }\n# done").unwrap();
    assert_eq!(source.rifts()[0].lines().len(), 2);
}

#[test]
fn it_serializes_the_ast() {
    let lines = lines("m => { x = 1 }");
    let json = serde_json::to_value(&lines[0]).unwrap();
    assert_eq!(json["kind"], "assignment");
    assert_eq!(json["value"]["target"]["local"], "x");
    assert_eq!(json["value"]["value"]["kind"], "numeric");
}

#[test]
fn it_parses_from_a_reader() {
    let source = parse_reader("a => { b }\nc => { d }".as_bytes()).unwrap();
    let names: Vec<&str> = source.rifts().iter().map(|rift| rift.name()).collect();
    assert_eq!(names, vec!["a", "c"]);
}

#[test]
fn it_exposes_the_recognized_token_stream() {
    let input = "m => { x = [1, 2] }";
    let parser = Parser::new(ParserConfig::default());
    let recognized = parser.recognize(input).unwrap();

    let tree = recognized.syntax_tree();
    let root = tree.root().expect("root");
    assert_eq!(tree.node(root).token.symbol().to_string(), "Source");
    assert_eq!(tree.node(root).token.end(), input.chars().count());
    assert_eq!(recognized.leaf_text(), input);
    assert!(recognized.render_syntax_tree().starts_with("Source "));

    let source = recognized.execute().unwrap();
    assert_eq!(source.rifts()[0].lines().len(), 1);
}

#[test]
fn it_parses_forty_levels_of_nesting() {
    const LEVELS: usize = 40;

    let calls = format!("m => {{ {}1{} }}", "f(".repeat(LEVELS), ")".repeat(LEVELS));
    let parsed = lines(&calls);
    let mut node = &parsed[0];
    let mut depth = 0;
    while let Some(apply) = node.as_func_apply() {
        assert_eq!(apply.callee(), &Ref::local("f"));
        assert_eq!(apply.arity(), 1);
        node = &apply.args()[0];
        depth += 1;
    }
    assert_eq!(depth, LEVELS);
    assert_eq!(node, &int(1));

    let lists = format!("m => {{ x = {}2 + 3{} }}", "[".repeat(LEVELS), "]".repeat(LEVELS));
    let lines = lines(&lists);
    let mut node = lines[0].as_assignment().expect("assignment").value();
    let mut depth = 0;
    while let Node::List(items) = node {
        assert_eq!(items.len(), 1);
        node = &items[0];
        depth += 1;
    }
    assert_eq!(depth, LEVELS);
    assert_eq!(node.as_operation().expect("operation").operands(), vec![&int(2), &int(3)]);
}
