use pretty_assertions::assert_eq;
use rift::peg::{Rule, Symbol};
use rift::{parse, Error, Parser, ParserConfig, Position, SyntaxError};

fn syntax_error(parser: &Parser, input: &str) -> SyntaxError {
    match parser.recognize(input) {
        Ok(_) => panic!("{input:?} should not parse"),
        Err(error) => error,
    }
}

#[test]
fn it_locates_a_missing_right_hand_side() {
    let input = "main => { x = }";
    let error = match parse(input) {
        Err(Error::Syntax(error)) => error,
        other => panic!("expected a syntax error, got {other:?}"),
    };

    assert!(!error.diagnostics().is_empty());
    let depths: Vec<usize> = error.diagnostics().iter().map(|d| d.depth).collect();
    assert!(depths.windows(2).all(|pair| pair[0] > pair[1]), "{depths:?}");
    for diagnostic in error.diagnostics() {
        assert_eq!(diagnostic.begin.line, 1);
        assert_eq!(diagnostic.end.line, 1);
        assert!(diagnostic.begin <= diagnostic.end);
    }
    assert_eq!(error.farthest(), Position { line: 1, column: 15 });
    assert_eq!(error.farthest_offset(), 14);
    assert!(error.message().starts_with("parse error near "));
    assert!(error.anchor().is_some());
}

#[test]
fn it_anchors_at_the_assignment_not_the_abandoned_expression() {
    let error = syntax_error(&Parser::default(), "main => { x = }");
    let anchor = error.anchor().expect("anchor");
    assert_eq!(anchor.symbol, Symbol::Rule(Rule::Assignment));
    assert_eq!(anchor.text, "x = ");
    assert_eq!(anchor.begin, Position { line: 1, column: 11 });
    assert_eq!(anchor.end, Position { line: 1, column: 15 });

    let symbols: Vec<String> = error
        .diagnostics()
        .iter()
        .map(|d| d.symbol.to_string())
        .collect();
    assert_eq!(symbols, vec!["Assignment", "Line", "RiftName", "Rift", "Source"]);
    for diagnostic in error.diagnostics() {
        assert!(diagnostic.depth <= anchor.depth);
        let rule = diagnostic.symbol.rule().expect("rule");
        assert!(!rule.is_trivia(), "{rule}");
        assert!(![Rule::Expr, Rule::Value, Rule::Ref, Rule::Name].contains(&rule));
    }
}

#[test]
fn it_anchors_inside_a_nested_container() {
    let error = syntax_error(&Parser::default(), "m => { x = [1, (2, ] }");
    let anchor = error.anchor().expect("anchor");
    assert_eq!(anchor.symbol, Symbol::Rule(Rule::Tuple));
    assert_eq!(anchor.begin, Position { line: 1, column: 16 });
    assert_eq!(error.farthest(), Position { line: 1, column: 20 });
}

#[test]
fn it_reports_positions_on_later_lines() {
    let parser = Parser::default();
    let error = syntax_error(&parser, "a => { b }\nc => {\n  d = [1,\n}");
    assert_eq!(error.farthest().line, 4);
    assert_eq!(error.farthest().column, 1);
}

#[test]
fn it_honours_the_diagnostic_limit_and_colour() {
    let parser = Parser::new(ParserConfig {
        colorize_diagnostics: true,
        max_diagnostics: Some(2),
        ..ParserConfig::default()
    });
    let error = syntax_error(&parser, "main => { x = }");
    assert!(error.diagnostics().len() <= 2);
    assert!(error.message().contains("\x1b[34m"));
    assert!(error.message().contains("\x1b[m"));
}

#[test]
fn it_wraps_syntax_errors() {
    let error = parse("nope").unwrap_err();
    let syntax = error.as_syntax().expect("syntax error");
    assert_eq!(error.to_string(), format!("Syntax error: {}", syntax));
}
