#[cfg(test)]
mod scanner_tests {
    use pretty_assertions::assert_eq;

    use rox::error::LoxError;
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_two_character_operators() {
        assert_token_sequence(
            "!= == <= >= += -= *= /= ++ -- ! = < > /",
            &[
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::PLUS_EQUAL, "+="),
                (TokenType::MINUS_EQUAL, "-="),
                (TokenType::STAR_EQUAL, "*="),
                (TokenType::SLASH_EQUAL, "/="),
                (TokenType::PLUS_PLUS, "++"),
                (TokenType::MINUS_MINUS, "--"),
                (TokenType::BANG, "!"),
                (TokenType::EQUAL, "="),
                (TokenType::LESS, "<"),
                (TokenType::GREATER, ">"),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "while breaker break continue _tmp1 class",
            &[
                (TokenType::WHILE, "while"),
                (TokenType::IDENTIFIER, "breaker"),
                (TokenType::BREAK, "break"),
                (TokenType::CONTINUE, "continue"),
                (TokenType::IDENTIFIER, "_tmp1"),
                (TokenType::CLASS, "class"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let results: Vec<_> = Scanner::new(",.$(#").collect();

        // COMMA, DOT, error, LEFT_PAREN, error, EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        let kinds: Vec<Option<TokenType>> = results
            .iter()
            .map(|r| r.as_ref().ok().map(|t| t.token_type.clone()))
            .collect();

        assert_eq!(
            kinds,
            vec![
                Some(TokenType::COMMA),
                Some(TokenType::DOT),
                None,
                Some(TokenType::LEFT_PAREN),
                None,
                Some(TokenType::EOF),
            ]
        );

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(
            errors,
            vec![
                "[line 1] Error: Unexpected character: $",
                "[line 1] Error: Unexpected character: #",
            ]
        );
    }

    #[test]
    fn non_ascii_character_is_one_error() {
        let (tokens, errors) = scan("é;");

        assert_eq!(errors.len(), 1);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].token_type, TokenType::SEMICOLON);
    }

    #[test]
    fn numbers_carry_decoded_values() {
        let (tokens, errors) = scan("123.456 7 1.");
        assert!(errors.is_empty());

        let values: Vec<f64> = tokens
            .iter()
            .filter_map(|t| match t.token_type {
                TokenType::NUMBER(n) => Some(n),
                _ => None,
            })
            .collect();

        assert_eq!(values, vec![123.456, 7.0, 1.0]);
        // A trailing dot is not part of the number.
        assert_eq!(tokens[3].token_type, TokenType::DOT);
    }

    #[test]
    fn negative_literal_is_minus_then_number() {
        assert_token_sequence(
            "-0.001",
            &[
                (TokenType::MINUS, "-"),
                (TokenType::NUMBER(0.0), "0.001"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn strings_keep_escapes_raw() {
        let (tokens, errors) = scan(r#""say \"hi\"\n""#);
        assert!(errors.is_empty());

        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, r#"say \"hi\"\n"#),
            other => panic!("expected a string, got {:?}", other),
        }
    }

    #[test]
    fn unterminated_string_is_dropped() {
        let (tokens, errors) = scan("\"abc\nprint");

        assert_eq!(messages(&errors), vec!["[line 2] Error: Unterminated string."]);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::EOF);
    }

    #[test]
    fn multi_line_string_advances_line_counter() {
        let (tokens, _) = scan("\"a\nb\"\nx");

        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn comments_are_skipped() {
        assert_token_sequence(
            "a // line comment\n/* outer /* inner */ still\n comment */ b",
            &[
                (TokenType::IDENTIFIER, "a"),
                (TokenType::IDENTIFIER, "b"),
                (TokenType::EOF, ""),
            ],
        );

        let (tokens, _) = scan("/* one\ntwo\n*/ c");
        assert_eq!(tokens[0].line, 3);
    }

    #[test]
    fn unterminated_block_comment_stops_at_eof() {
        let (tokens, errors) = scan("x /* open /* nested */\n");

        assert_eq!(
            messages(&errors),
            vec!["[line 2] Error: Unterminated block comment."]
        );
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].token_type, TokenType::EOF);
    }

    #[test]
    fn token_display_matches_tokenize_format() {
        let (tokens, _) = scan("3 3.5 \"hi\" and");

        let lines: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

        assert_eq!(
            lines,
            vec![
                "NUMBER 3 3.0",
                "NUMBER 3.5 3.5",
                "STRING \"hi\" hi",
                "AND and null",
                "EOF  null",
            ]
        );
    }

    fn messages(errors: &[LoxError]) -> Vec<String> {
        errors.iter().map(|e| e.to_string()).collect()
    }
}
