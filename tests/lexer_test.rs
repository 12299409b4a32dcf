use proptest::prelude::*;
use treelox::lexer::{LexicalErrorKind, Lexer, LineBreaks, Token, TokenKind};

fn lex_all(input: &str) -> (Vec<Token>, Vec<LexicalErrorKind>) {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    loop {
        match lexer.next_token() {
            Ok(token) => {
                tokens.push(token);
                if token.kind == TokenKind::Eof {
                    break;
                }
            }
            Err(error) => errors.push(error.kind),
        }
    }
    (tokens, errors)
}

fn kinds(input: &str) -> Vec<TokenKind> {
    lex_all(input).0.into_iter().map(|token| token.kind).collect()
}

#[test]
fn smoke_test() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
}

#[test]
fn keywords_and_identifiers() {
    assert_eq!(
        kinds("class classy _under or orchid"),
        vec![
            TokenKind::KeywordClass,
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::KeywordOr,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn string_lexeme_keeps_quotes() {
    let source = "print \"hi there\";";
    let mut lexer = Lexer::new(source);
    lexer.next_token().expect("keyword");
    let string = lexer.next_token().expect("string literal");
    assert_eq!(string.kind, TokenKind::StringLiteral);
    assert_eq!(lexer.get_lexeme(&string.span), Some("\"hi there\""));
}

#[test]
fn lexing_continues_after_unexpected_character() {
    let (tokens, errors) = lex_all("1 @ 2 # 3");
    assert_eq!(
        errors,
        vec![
            LexicalErrorKind::Unrecognized('@'),
            LexicalErrorKind::Unrecognized('#')
        ]
    );
    let numbers = tokens
        .iter()
        .filter(|token| token.kind == TokenKind::NumericLiteral)
        .count();
    assert_eq!(numbers, 3);
}

#[test]
fn multiline_string_reports_line_of_its_end() {
    let source = "var a = \"one\ntwo\nthree";
    let mut lexer = Lexer::new(source);
    let error = loop {
        match lexer.next_token() {
            Ok(token) if token.kind == TokenKind::Eof => panic!("expected an unterminated string"),
            Ok(_) => continue,
            Err(error) => break error,
        }
    };
    let breaks = LineBreaks::new(source);
    assert_eq!(breaks.get_line(error.report_offset()), 3);
}

#[test]
fn eof_token_is_empty_and_at_the_end() {
    let source = "print 1;\n";
    let (tokens, _) = lex_all(source);
    let eof = tokens.last().expect("always ends with eof");
    assert_eq!(eof.kind, TokenKind::Eof);
    assert!(eof.span.is_empty());
    assert_eq!(eof.span.start as usize, source.len());
}

// Property-based tests

fn symbol_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("(".to_string()),
        Just(")".to_string()),
        Just("{".to_string()),
        Just("}".to_string()),
        Just(",".to_string()),
        Just(".".to_string()),
        Just("-".to_string()),
        Just("+".to_string()),
        Just(";".to_string()),
        Just("*".to_string()),
        Just("!".to_string()),
        Just("!=".to_string()),
        Just("=".to_string()),
        Just("==".to_string()),
        Just("<".to_string()),
        Just("<=".to_string()),
        Just(">".to_string()),
        Just(">=".to_string()),
        Just("/".to_string()),
    ]
}

fn numeric_literal_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["[0-9]+", "[0-9]+\\.[0-9]+"]
}

fn string_literal_strategy() -> impl Strategy<Value = String> {
    "[^\"]*".prop_map(|s: String| format!("\"{s}\""))
}

fn identifier_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]*"
}

fn keyword_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(
        treelox::lexer::KEYWORD_HASHMAP
            .keys()
            .map(|keyword| keyword.to_string())
            .collect::<Vec<_>>(),
    )
}

fn comment_strategy() -> impl Strategy<Value = String> {
    "[^\n]*".prop_map(|s: String| format!("//{s}\n"))
}

fn token_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        symbol_strategy(),
        numeric_literal_strategy(),
        string_literal_strategy(),
        identifier_strategy(),
        keyword_strategy(),
    ]
}

proptest! {
    #[test]
    fn lexer_handles_valid_tokens_without_comments(
        input in prop::collection::vec(token_strategy(), 1..100)
    ) {
        let expected_num_tokens = input.len() + 1;
        let (tokens, errors) = lex_all(&input.join(" "));
        prop_assert!(errors.is_empty());
        prop_assert_eq!(tokens.len(), expected_num_tokens);
    }

    #[test]
    fn lexer_skips_comments(
        input in prop::collection::vec(token_strategy(), 1..50),
        comment in comment_strategy(),
    ) {
        let plain = input.join(" ");
        let commented = format!("{comment}{}", input.join(&format!(" {comment}")));
        prop_assert_eq!(kinds(&plain), kinds(&commented));
    }

    #[test]
    fn token_lexemes_round_trip(
        input in prop::collection::vec(token_strategy(), 1..50)
    ) {
        let source = input.join(" ");
        let mut lexer = Lexer::new(&source);
        for expected in input.iter() {
            let token = lexer.next_token().expect("only valid tokens are generated");
            prop_assert_eq!(lexer.get_lexeme(&token.span), Some(expected.as_str()));
        }
    }
}
