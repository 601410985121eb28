//! Expansion behavior observed through source text in, source text out.

mod common;

use std::sync::Arc;

use common::{expand, expand_err, expand_recursive, expansion};
use gomacro::ast::{Decl, Expr, Span, Stmt};
use gomacro::engine::ExpansionPipeline;
use gomacro::macros::ExpanderConfig;
use gomacro::syntax::printer::format_stmts;
use gomacro::{ErrorType, ExpandError};

#[test]
fn code_without_macros_is_only_reformatted() {
    let source = "package main

import \"fmt\"

// entry point
func main() {
	total := 0
	for i := 0; i < 10; i++ {
		total += i
	}
	if total > 5 {
		fmt.Println(\"big\", total)
	}
}
";
    assert_eq!(expand(source), source);
}

#[test]
fn macro_definitions_are_removed() {
    let source = "package main

func MACRO_first(x int) {
	use(x)
}

var count = 1

func MACRO_second() {
	noop()
}

func main() {
	run()
}
";
    let output = expand(source);
    assert!(!output.contains("MACRO_"));
    assert_eq!(
        output,
        "package main\n\nvar count = 1\n\nfunc main() {\n\trun()\n}\n"
    );
}

#[test]
fn parameters_are_substituted_positionally() {
    let source = "package main

func MACRO_mul(a, b int) {
	c = a * b
}

func main() {
	mul(x+1, y)
}
";
    assert_eq!(
        expand(source),
        "package main\n\nfunc main() {\n\tc = (x + 1) * y\n}\n"
    );
}

#[test]
fn bare_call_is_replaced_by_every_body_statement() {
    let source = "package main

func MACRO_pair(a, b int) {
	first(a)
	second(b)
}

func main() {
	before()
	pair(x, y)
	after()
}
";
    assert_eq!(
        expand(source),
        "package main\n\nfunc main() {\n\tbefore()\n\tfirst(x)\n\tsecond(y)\n\tafter()\n}\n"
    );
}

#[test]
fn whole_enclosing_statement_is_replaced() {
    let source = "package main

func MACRO_m(v int) {
	log(v)
}

func main() {
	z = 1 + m(x)
}
";
    let output = expand(source);
    assert_eq!(output, "package main\n\nfunc main() {\n\tlog(x)\n}\n");
    assert!(!output.contains('z'));
}

#[test]
fn recursive_mode_inlines_earlier_macros_into_later_ones() {
    let source = "package main

func MACRO_inc(v int) {
	v = v + 1
}

func MACRO_twice(w int) {
	inc(w)
	inc(w)
}

func main() {
	twice(n)
}
";
    assert_eq!(
        expand_recursive(source),
        "package main\n\nfunc main() {\n\tn = n + 1\n\tn = n + 1\n}\n"
    );
    // Without pre-expansion the spliced calls are left for a later run.
    assert_eq!(
        expand(source),
        "package main\n\nfunc main() {\n\tinc(n)\n\tinc(n)\n}\n"
    );
}

#[test]
fn recursive_mode_ignores_macros_defined_later() {
    let source = "package main

func MACRO_outer(v int) {
	inner(v)
}

func MACRO_inner(w int) {
	w = w * 2
}

func main() {
	outer(n)
}
";
    let pipeline = ExpansionPipeline::new(ExpanderConfig::default().recursive(true));
    let expansion = pipeline.expand_source("test.go", source).unwrap();

    // `inner` did not exist yet when `outer` was pre-expanded.
    let outer = expansion.macros.lookup("outer").unwrap();
    assert_eq!(format_stmts(&outer.body.stmts), "inner(v)\n");
    assert_eq!(
        expand_recursive(source),
        "package main\n\nfunc main() {\n\tinner(n)\n}\n"
    );
}

#[test]
fn unsupported_statement_in_macro_body_is_fatal() {
    let source = "package main

func MACRO_guard(x int) {
	if x > 0 {
		y = 1
	}
}

func main() {
	guard(1)
}
";
    let err = expand_err(source);
    assert!(matches!(
        err,
        ExpandError::UnsupportedStmt {
            kind: "if statement",
            ..
        }
    ));
    assert_eq!(err.error_type(), ErrorType::Unsupported);
}

#[test]
fn unsupported_expression_in_macro_body_is_fatal() {
    let source = "package main

func MACRO_show(x int) {
	fmt.Println(x)
}

func main() {
	show(1)
}
";
    let err = expand_err(source);
    assert!(matches!(
        err,
        ExpandError::UnsupportedExpr {
            kind: "selector expression",
            ..
        }
    ));
    assert!(err.to_string().contains("in macro 'show'"));
}

#[test]
fn unsupported_body_is_fine_while_unused() {
    let source = "package main

func MACRO_show(x int) {
	fmt.Println(x)
}

func main() {
	run()
}
";
    assert_eq!(expand(source), "package main\n\nfunc main() {\n\trun()\n}\n");
}

#[test]
fn nested_block_expansion_leaves_siblings_in_place() {
    let source = "package main

func MACRO_inc(v int) {
	v = v + 1
}

func main() {
	before()
	if ok {
		inc(n)
		log(n)
	} else {
		inc(m)
	}
	after()
}
";
    assert_eq!(
        expand(source),
        "package main

func main() {
	before()
	if ok {
		n = n + 1
		log(n)
	} else {
		m = m + 1
	}
	after()
}
"
    );
}

#[test]
fn arity_mismatch_is_fatal_and_points_at_the_call() {
    let source = "package main

func MACRO_inc(v int) {
	v = v + 1
}

func main() {
	inc(a, b)
}
";
    let err = expand_err(source);
    assert!(matches!(
        err,
        ExpandError::Arity {
            expected: 1,
            actual: 2,
            ..
        }
    ));
    let start = source.find("inc(a, b)").unwrap();
    assert_eq!(
        err.span(),
        Some(Span {
            start,
            end: start + "inc(a, b)".len()
        })
    );
}

#[test]
fn macro_used_before_its_definition_is_left_alone() {
    let source = "package main

func main() {
	inc(n)
}

func MACRO_inc(v int) {
	v = v + 1
}
";
    assert_eq!(expand(source), "package main\n\nfunc main() {\n\tinc(n)\n}\n");
}

#[test]
fn repeated_parameter_shares_one_argument_node() {
    let source = "package main

func MACRO_square(a int) {
	r = a * a
}

func main() {
	square(x + 2)
}
";
    let result = expansion(source);
    let main = result.program.functions().next().unwrap();
    let Stmt::Assign { rhs, .. } = &main.body.stmts[0].value else {
        panic!("expected assignment");
    };
    let Expr::Binary { left, right, .. } = &*rhs[0].value else {
        panic!("expected binary expression");
    };
    assert!(Arc::ptr_eq(&left.value, &right.value));
    // The argument keeps its call-site span; rebuilt nodes have none.
    assert!(left.span.is_some());
    assert!(rhs[0].span.is_none());
}

#[test]
fn later_definition_replaces_earlier_one() {
    let source = "package main

func MACRO_m() {
	one()
}

func main() {
	m()
}

func MACRO_m() {
	two()
}

func after() {
	m()
}
";
    let output = expand(source);
    assert_eq!(
        output,
        "package main\n\nfunc main() {\n\tone()\n}\n\nfunc after() {\n\ttwo()\n}\n"
    );
}

#[test]
fn selector_callee_is_not_a_macro_call() {
    let source = "package main

func MACRO_inc(v int) {
	v = v + 1
}

func main() {
	pkg.inc(n)
}
";
    assert_eq!(expand(source), "package main\n\nfunc main() {\n\tpkg.inc(n)\n}\n");
}

#[test]
fn trace_records_each_splice() {
    let source = "package main

func MACRO_inc(v int) {
	v = v + 1
}

func main() {
	inc(a)
	inc(b)
}
";
    let result = expansion(source);
    assert_eq!(result.trace.len(), 2);
    assert!(result.trace.iter().all(|step| step.macro_name == "inc"));
    assert_eq!(result.trace[1].output.len(), 1);
    assert!(result
        .program
        .decls
        .iter()
        .all(|decl| !matches!(&decl.value, Decl::Func(f) if f.name.starts_with("MACRO_"))));
}

#[test]
fn macro_body_comments_are_copied() {
    let source = "package main

func MACRO_step(v int) {
	// step
	v = v + 1
}

func main() {
	step(n)
}
";
    assert_eq!(
        expand(source),
        "package main\n\nfunc main() {\n\t// step\n\tn = n + 1\n}\n"
    );
}

#[test]
fn statements_kept_as_written_are_rejected_in_macro_bodies() {
    let source = "package main

func MACRO_wait(ch int) {
	select {
	case <-ch:
	}
}

func main() {
	wait(done)
}
";
    let err = expand_err(source);
    assert!(matches!(
        err,
        ExpandError::UnsupportedStmt {
            kind: "select statement",
            ..
        }
    ));

    let source = source.replace(
        "select {\n\tcase <-ch:\n\t}",
        "switch ch {\n\tcase 1:\n\t}",
    );
    let err = expand_err(&source);
    assert!(matches!(
        err,
        ExpandError::UnsupportedStmt {
            kind: "switch statement",
            ..
        }
    ));
}

#[test]
fn case_bodies_and_closures_are_nested_blocks() {
    let source = "package main

func MACRO_inc(v int) {
	v = v + 1
}

func (c *Counter) Run(kind int) {
	switch kind {
	case 1:
		inc(c.n)
	}
	go func() {
		inc(c.m)
	}()
}
";
    assert_eq!(
        expand(source),
        "package main

func (c *Counter) Run(kind int) {
	switch kind {
	case 1:
		c.n = c.n + 1
	}
	go func() {
		c.m = c.m + 1
	}()
}
"
    );
}

#[test]
fn comment_closing_a_definition_is_removed_with_it() {
    let source = "package main

func MACRO_reset(v int) {
	v = 0
} // reset

func main() {
	reset(x)
}
";
    assert_eq!(expand(source), "package main\n\nfunc main() {\n\tx = 0\n}\n");
}
