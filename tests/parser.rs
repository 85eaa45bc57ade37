mod common;

#[cfg(test)]
mod parser_tests {
    use pretty_assertions::assert_eq;

    use rox::ast::Stmt;
    use rox::ast_printer::AstPrinter;

    use crate::common::{messages, parse};

    fn printed(source: &str) -> String {
        let statements: Vec<Stmt> = parse(source).unwrap_or_else(|errors| {
            panic!("unexpected parse errors: {:?}", messages(&errors))
        });

        AstPrinter::print_program(&statements)
    }

    fn parse_errors(source: &str) -> Vec<String> {
        match parse(source) {
            Ok(statements) => panic!(
                "expected parse errors, got {}",
                AstPrinter::print_program(&statements)
            ),
            Err(errors) => messages(&errors),
        }
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(printed("1 + 2 * 3;"), "(expr (+ 1.0 (* 2.0 3.0)))");
        assert_eq!(printed("1 - 2 - 3;"), "(expr (- (- 1.0 2.0) 3.0))");
        assert_eq!(printed("print 1 < 2 == true;"), "(print (== (< 1.0 2.0) true))");
        assert_eq!(printed("print a or b and c;"), "(print (or a (and b c)))");
        assert_eq!(printed("print !-x;"), "(print (! (- x)))");
        assert_eq!(printed("print -0.001;"), "(print (- 0.001))");
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(printed("a = b = 1;"), "(expr (= a (= b 1.0)))");
        assert_eq!(printed("o.f = 1;"), "(expr (= (. o f) 1.0))");
    }

    #[test]
    fn calls_and_property_chains() {
        assert_eq!(
            printed("print (f(1, 2)).g;"),
            "(print (. (group (call f 1.0 2.0)) g))"
        );
        assert_eq!(printed("a.b().c;"), "(expr (. (call (. a b)) c))");
    }

    #[test]
    fn control_flow_statements() {
        assert_eq!(
            printed("if (a) print 1; else print 2;"),
            "(if a (print 1.0) (print 2.0))"
        );
        assert_eq!(
            printed("while (x) { x = false; continue; }"),
            "(while x (block (expr (= x false)) (continue)))"
        );
    }

    #[test]
    fn for_loop_lowers_to_while_with_increment() {
        assert_eq!(
            printed("for (var i = 0; i < 3; i = i + 1) print i;"),
            "(block (var i 0.0) (while (< i 3.0) (print i) (= i (+ i 1.0))))"
        );
        assert_eq!(printed("for (;;) break;"), "(while true (break))");
    }

    #[test]
    fn compound_assignment_is_desugared() {
        assert_eq!(printed("x += 2;"), "(expr (= x (+ x 2.0)))");
        assert_eq!(printed("x /= 4;"), "(expr (= x (/ x 4.0)))");
        assert_eq!(
            printed("o.n -= 1;"),
            "(expr (= (. o n) (- (. o n) 1.0)))"
        );
        assert_eq!(printed("i++;"), "(expr (= i (+ i 1.0)))");
        assert_eq!(printed("--i;"), "(expr (= i (- i 1.0)))");
    }

    #[test]
    fn functions_and_classes() {
        assert_eq!(
            printed("fun add(a, b) { return a + b; }"),
            "(fun add (a b) (return (+ a b)))"
        );
        assert_eq!(
            printed("class B < A { init(x) { this.x = x; } }"),
            "(class B < A (fun init (x) (expr (= (. this x) x))))"
        );
        assert_eq!(
            printed("class B < A { m() { return super.m(); } }"),
            "(class B < A (fun m () (return (call (super m)))))"
        );
    }

    #[test]
    fn invalid_assignment_target() {
        assert_eq!(
            parse_errors("1 = 2;"),
            vec!["[line 1] Error at '=': Invalid assignment target"]
        );
        assert_eq!(
            parse_errors("a + b = c;"),
            vec!["[line 1] Error at '=': Invalid assignment target"]
        );
        assert_eq!(
            parse_errors("1++;"),
            vec!["[line 1] Error at '++': Invalid increment target"]
        );
    }

    #[test]
    fn recovers_and_reports_every_statement_error() {
        let errors = parse_errors("var = 1;\nprint 2;\nvar x = ;\n");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at '=': Expected variable name",
                "[line 3] Error at ';': Expected expression",
            ]
        );
    }

    #[test]
    fn error_at_end_of_file() {
        assert_eq!(
            parse_errors("print 1"),
            vec!["[line 1] Error at end of file: Expected ';' after value"]
        );
    }

    #[test]
    fn too_many_parameters_is_reported_once() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("fun f({}) {{}}", params.join(", "));

        assert_eq!(
            parse_errors(&source),
            vec!["[line 1] Error at 'p255': Can't have more than 255 parameters"]
        );
    }

    #[test]
    fn too_many_arguments_is_reported_once() {
        let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let source = format!("f({});", args.join(", "));

        assert_eq!(
            parse_errors(&source),
            vec!["[line 1] Error at '255': Can't have more than 255 arguments"]
        );
    }
}
