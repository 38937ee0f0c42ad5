use attrlr::{
    derivation::left_parse,
    eval::{evaluate_bottom_up, evaluate_top_down, EvalError},
    grammar::Grammar,
    runtime::parser::Parser,
    table::ParseTable,
};
use attrlr_tests::{ast::Ast, grammars, input::scan};

fn bottom_up(input: &str) -> anyhow::Result<Option<Ast>> {
    let g = Grammar::<Ast>::define(grammars::arithmetic)?;
    let table = ParseTable::compile(&g)?;
    let tokens = scan(&g, input)?;
    let output = Parser::new(&table).parse(&tokens)?;
    Ok(evaluate_bottom_up(
        &g,
        &output.reductions,
        &output.operations,
        &tokens,
    )?)
}

fn top_down(input: &str) -> anyhow::Result<Option<Ast>> {
    let g = Grammar::<Ast>::define(grammars::arithmetic_ll)?;
    let table = ParseTable::compile(&g)?;
    assert!(table.conflicts().is_empty());
    let tokens = scan(&g, input)?;
    let output = Parser::new(&table).parse(&tokens)?;
    let derivation = left_parse(&g, &output.reductions)?;
    Ok(evaluate_top_down(&g, &derivation, &tokens)?)
}

#[test]
fn l_attributed_matches_s_attributed() -> anyhow::Result<()> {
    for input in ["1+2*3", "8-4-2", "8/4/2", "(1+2)*3", "2*(3+4)-5", "7"] {
        let expected = bottom_up(input)?;
        assert!(expected.is_some());
        assert_eq!(top_down(input)?, expected, "input: {}", input);
    }
    assert_eq!(
        top_down("1+2*3")?.map(|v| v.to_string()).as_deref(),
        Some("(+ 1 (* 2 3))")
    );
    Ok(())
}

#[test]
fn s_attribution_guard() -> anyhow::Result<()> {
    let g = Grammar::<Ast>::define(grammars::arithmetic_ll)?;
    let table = ParseTable::compile(&g)?;
    let tokens = scan(&g, "1+2")?;
    let output = Parser::new(&table).parse(&tokens)?;

    let err = evaluate_bottom_up(&g, &output.reductions, &output.operations, &tokens)
        .unwrap_err();
    match err {
        EvalError::NotSAttributed { production } => {
            let production = g.production(production).unwrap();
            assert!(!production.attributes().is_s_attributed());
        }
        err => panic!("unexpected error: {}", err),
    }
    Ok(())
}

#[test]
fn top_down_requires_leftmost_derivation() -> anyhow::Result<()> {
    let g = Grammar::<Ast>::define(grammars::arithmetic_ll)?;
    let table = ParseTable::compile(&g)?;
    let tokens = scan(&g, "1+2")?;
    let output = Parser::new(&table).parse(&tokens)?;

    // The reduction trace starts with `F -> NUM`, which covers only the
    // first token.
    let err = evaluate_top_down(&g, &output.reductions, &tokens).unwrap_err();
    assert!(matches!(err, EvalError::TrailingTokens));
    Ok(())
}
