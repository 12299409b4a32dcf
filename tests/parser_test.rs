use treelox::parser::{
    expression::{ExpressionNode, InfixOperator, Literal},
    formatter::{BasicParserFormatter, ParserFormatter},
    statement::Statement,
    Ast, Parser, ParserErrorKind,
};

fn parse_errors(source: &str) -> Vec<String> {
    let mut ast = Ast::new();
    let errors = Parser::new(source, &mut ast)
        .parse()
        .expect_err("test program has syntax errors");
    let formatter = BasicParserFormatter::new(source);
    errors.iter().map(|e| formatter.format_error(e)).collect()
}

#[test]
fn smoke_test() {
    let mut ast = Ast::new();
    let statements = Parser::new("", &mut ast).parse().unwrap();
    assert!(statements.is_empty());
}

#[test]
fn factor_binds_tighter_than_term() {
    let mut ast = Ast::new();
    let statements = Parser::new("1 + 2 * 3;", &mut ast).parse().unwrap();
    let Statement::Expression(expr) = &ast[statements[0]] else {
        panic!("expected an expression statement");
    };
    let ExpressionNode::Infix { operator, lhs, rhs } = &ast[*expr].node else {
        panic!("expected an infix expression");
    };
    assert_eq!(*operator, InfixOperator::Add);
    assert!(matches!(ast[*lhs].node, ExpressionNode::Literal(Literal::Number(v)) if v == 1.0));
    assert!(matches!(
        ast[*rhs].node,
        ExpressionNode::Infix {
            operator: InfixOperator::Multiply,
            ..
        }
    ));
}

#[test]
fn assignment_is_right_associative() {
    let mut ast = Ast::new();
    let statements = Parser::new("a = b = c;", &mut ast).parse().unwrap();
    let Statement::Expression(expr) = &ast[statements[0]] else {
        panic!("expected an expression statement");
    };
    let ExpressionNode::Assign { name, value } = &ast[*expr].node else {
        panic!("expected an assignment");
    };
    assert_eq!(name.as_str(), "a");
    assert!(matches!(&ast[*value].node, ExpressionNode::Assign { name, .. } if name.as_str() == "b"));
}

#[test]
fn property_assignment_becomes_set() {
    let mut ast = Ast::new();
    let statements = Parser::new("a.b.c = 1;", &mut ast).parse().unwrap();
    let Statement::Expression(expr) = &ast[statements[0]] else {
        panic!("expected an expression statement");
    };
    let ExpressionNode::Set { object, name, .. } = &ast[*expr].node else {
        panic!("expected a property assignment");
    };
    assert_eq!(name.as_str(), "c");
    assert!(matches!(&ast[*object].node, ExpressionNode::Get { name, .. } if name.as_str() == "b"));
}

#[test]
fn for_loop_is_desugared() {
    let mut ast = Ast::new();
    let statements = Parser::new("for (var i = 0; i < 3; i = i + 1) print i;", &mut ast)
        .parse()
        .unwrap();
    let Statement::Block(outer) = &ast[statements[0]] else {
        panic!("for with an initializer becomes a block");
    };
    assert!(matches!(ast[outer[0]], Statement::VariableDecl { .. }));
    let Statement::While { body, .. } = &ast[outer[1]] else {
        panic!("the loop itself becomes a while");
    };
    let Statement::Block(body) = &ast[*body] else {
        panic!("the increment is appended to the body");
    };
    assert_eq!(body.len(), 2);
}

#[test]
fn class_with_superclass_and_methods() {
    let mut ast = Ast::new();
    let statements = Parser::new("class B < A { f() {} init(x) {} }", &mut ast)
        .parse()
        .unwrap();
    let Statement::ClassDecl {
        name,
        super_class,
        methods,
    } = &ast[statements[0]]
    else {
        panic!("expected a class declaration");
    };
    assert_eq!(name.as_str(), "B");
    assert!(super_class.is_some());
    let arities: Vec<_> = methods
        .iter()
        .map(|method| ast[*method].parameters.len())
        .collect();
    assert_eq!(arities, vec![0, 1]);
}

#[test]
fn recovers_and_reports_every_statement_error() {
    let errors = parse_errors("var 1 = 2;\nprint (1;\nprint 3;\nx = ;");
    assert_eq!(
        errors,
        vec![
            "[line 1] Error at '1': Expect variable name.",
            "[line 2] Error at ';': Expect ')' after expression.",
            "[line 4] Error at ';': Expect expression.",
        ]
    );
}

#[test]
fn error_at_end_of_input() {
    assert_eq!(
        parse_errors("print 1"),
        vec!["[line 1] Error at end: Expect ';' after value."]
    );
}

#[test]
fn invalid_assignment_does_not_stop_parsing() {
    let errors = parse_errors("1 = 2;\n(a) = 3;");
    assert_eq!(
        errors,
        vec![
            "[line 1] Error at '=': Invalid assignment target.",
            "[line 2] Error at '=': Invalid assignment target.",
        ]
    );
}

#[test]
fn too_many_arguments_and_parameters() {
    let arguments = (0..256).map(|i| i.to_string()).collect::<Vec<_>>().join(", ");
    let parameters = (0..256).map(|i| format!("p{i}")).collect::<Vec<_>>().join(", ");
    let source = format!("f({arguments});\nfun g({parameters}) {{}}");

    let mut ast = Ast::new();
    let errors = Parser::new(&source, &mut ast)
        .parse()
        .expect_err("limits are exceeded");
    let kinds: Vec<_> = errors.into_iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ParserErrorKind::TooManyArguments(255),
            ParserErrorKind::TooManyParameters(255),
        ]
    );
}

#[test]
fn lexical_errors_come_first() {
    let errors = parse_errors("print 1;\nvar @ = 2;");
    assert_eq!(
        errors,
        vec![
            "[line 2] Error: Unexpected character.",
            "[line 2] Error at '=': Expect variable name.",
        ]
    );
}

#[test]
fn nodes_accumulate_in_a_shared_arena() {
    let mut ast = Ast::new();
    let first = "var a = 1;";
    Parser::new(first, &mut ast).parse().unwrap();
    let after_first = ast.expression_count();

    let source = format!("{first}\nprint a + 1;");
    let statements = Parser::starting_at(&source, first.len(), &mut ast)
        .parse()
        .unwrap();
    assert_eq!(statements.len(), 1);
    assert!(ast.expression_count() > after_first);
}
