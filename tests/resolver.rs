mod common;

#[cfg(test)]
mod resolver_tests {
    use pretty_assertions::assert_eq;

    use rox::resolver::{Resolutions, Resolver};

    use crate::common::{messages, parse};

    fn resolve(source: &str) -> Result<Resolutions, Vec<String>> {
        let statements = parse(source).expect("source should parse");
        Resolver::new()
            .resolve(&statements)
            .map_err(|errors| messages(&errors))
    }

    fn resolve_errors(source: &str) -> Vec<String> {
        resolve(source).expect_err("expected resolve errors")
    }

    fn distances(source: &str) -> Vec<usize> {
        let mut values: Vec<usize> = resolve(source)
            .expect("expected a clean resolve")
            .into_values()
            .collect();
        values.sort_unstable();
        values
    }

    #[test]
    fn globals_are_left_out_of_the_table() {
        assert_eq!(distances("var a = 1; print a; a = 2;"), Vec::<usize>::new());
    }

    #[test]
    fn locals_record_scope_hops() {
        assert_eq!(distances("{ var a = 1; { print a; } }"), vec![1]);
        assert_eq!(
            distances("fun outer() { var x = 1; fun inner() { return x; } return inner(); }"),
            vec![0, 1]
        );
    }

    #[test]
    fn later_shadowing_does_not_rebind_closure() {
        // `a` inside show() resolves to the global, both calls to the block.
        let source = r#"
            var a = "global";
            {
                fun show() { print a; }
                show();
                var a = "block";
                show();
            }
        "#;

        assert_eq!(distances(source), vec![0, 0]);
    }

    #[test]
    fn this_and_super_hops() {
        let source = r#"
            class A { m() { return 1; } }
            class B < A {
                m() { return super.m() + this.n; }
            }
        "#;

        // super: body → this frame → super frame; this: body → this frame.
        assert_eq!(distances(source), vec![1, 2]);
    }

    #[test]
    fn reading_local_in_own_initializer() {
        assert_eq!(
            resolve_errors("{ var x = x; }"),
            vec!["[line 1] Error at 'x': Can't read local variable in its own initializer"]
        );
    }

    #[test]
    fn global_self_reference_is_allowed() {
        assert!(resolve("var x = x;").is_ok());
    }

    #[test]
    fn redeclaring_local() {
        assert_eq!(
            resolve_errors("{ var a = 1; var a = 2; }"),
            vec!["[line 1] Error at 'a': Already a variable with this name in this scope"]
        );
        assert_eq!(
            resolve_errors("fun f(a, a) {}"),
            vec!["[line 1] Error at 'a': Already a variable with this name in this scope"]
        );
        assert!(resolve("var a = 1; var a = 2;").is_ok());
    }

    #[test]
    fn return_rules() {
        assert_eq!(
            resolve_errors("return 1;"),
            vec!["[line 1] Error at 'return': Can't return from top-level code"]
        );
        assert_eq!(
            resolve_errors("class A { init() { return 1; } }"),
            vec!["[line 1] Error at 'return': Can't return a value from an initializer"]
        );
        assert!(resolve("class A { init() { return; } }").is_ok());
    }

    #[test]
    fn this_and_super_outside_classes() {
        assert_eq!(
            resolve_errors("print this;"),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class"]
        );
        assert_eq!(
            resolve_errors("fun f() { return this; }"),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class"]
        );
        assert_eq!(
            resolve_errors("super.foo();"),
            vec!["[line 1] Error at 'super': Can't use 'super' outside of a class"]
        );
        assert_eq!(
            resolve_errors("class A { f() { super.f(); } }"),
            vec!["[line 1] Error at 'super': Can't use 'super' in a class with no superclass"]
        );
    }

    #[test]
    fn class_inheriting_from_itself() {
        assert_eq!(
            resolve_errors("class A < A {}"),
            vec!["[line 1] Error at 'A': A class can't inherit from itself"]
        );
    }

    #[test]
    fn loop_control_outside_loops() {
        assert_eq!(
            resolve_errors("break;"),
            vec!["[line 1] Error at 'break': Can't use 'break' outside of a loop"]
        );
        assert_eq!(
            resolve_errors("while (true) { fun f() { continue; } }"),
            vec!["[line 1] Error at 'continue': Can't use 'continue' outside of a loop"]
        );
        assert!(resolve("for (;;) { if (true) break; else continue; }").is_ok());
    }

    #[test]
    fn collects_every_error() {
        let errors = resolve_errors("return 1;\nbreak;\nprint this;");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at 'return': Can't return from top-level code",
                "[line 2] Error at 'break': Can't use 'break' outside of a loop",
                "[line 3] Error at 'this': Can't use 'this' outside of a class",
            ]
        );
    }
}
