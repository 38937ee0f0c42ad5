use attrlr::{
    grammar::{Grammar, GrammarDef, GrammarError},
    runtime::parser::Parser,
    table::ParseTable,
};
use attrlr_tests::{ast::Ast, grammars, input::scan};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

criterion_main!(benches);
criterion_group!(benches, bench_compile, bench_parse);

type Define = fn(&mut GrammarDef<Ast>) -> Result<(), GrammarError>;

fn bench_compile(c: &mut Criterion) {
    bench_table_gen(c, "brackets", grammars::brackets);
    bench_table_gen(c, "arithmetic", grammars::arithmetic);
    bench_table_gen(c, "arithmetic_ll", grammars::arithmetic_ll);
    bench_table_gen(c, "dangling_else", grammars::dangling_else);
}

fn bench_table_gen(c: &mut Criterion, name: &str, f: Define) {
    let grammar = Grammar::define(f).expect("invalid grammar");
    c.bench_function(name, |b| {
        b.iter(|| {
            let _table = black_box(ParseTable::compile(&grammar));
        });
    });
}

fn bench_parse(c: &mut Criterion) {
    let grammar = Grammar::define(grammars::arithmetic as Define).expect("invalid grammar");
    let table = ParseTable::compile(&grammar).expect("failed to compile");
    let input = ["1+2*3-(4/5+6)*7-8*9"; 16].join("+");
    let tokens = scan(&grammar, &input).expect("failed to scan");
    let parser = Parser::new(&table);
    c.bench_function("parse_arithmetic", |b| {
        b.iter(|| {
            let _output = black_box(parser.parse(&tokens));
        });
    });
}
