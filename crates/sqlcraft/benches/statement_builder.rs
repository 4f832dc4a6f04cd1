use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlcraft::{Dialect, Predicate, SqlValue, StatementBuilder, TableSchema};

/// Table with `n` INT columns: col0, col1, ...
fn wide_table(n: usize) -> TableSchema {
    let mut builder = TableSchema::builder("t");
    for i in 0..n {
        builder = builder.column(&format!("col{i}"), "INT");
    }
    builder.build().expect("valid schema")
}

/// col0 = ? AND col1 = ? AND ...
fn conjunction(n: usize) -> Predicate {
    Predicate::all((0..n).map(|i| Predicate::eq(format!("col{i}"), i as i64)))
        .expect("at least one column")
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/select");

    for n in [1, 5, 10, 50, 100] {
        let table = wide_table(n);
        let pred = conjunction(n);
        for dialect in [Dialect::Generic, Dialect::Postgres] {
            let sb = StatementBuilder::new(dialect);
            group.bench_with_input(
                BenchmarkId::new(dialect.name(), n),
                &(&table, &pred),
                |b, (table, pred)| {
                    b.iter(|| black_box(sb.select(table, ["*"], Some(*pred))));
                },
            );
        }
    }

    group.finish();
}

fn bench_insert_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/insert_many");
    let table = wide_table(8);
    let columns = table.column_names();
    let sb = StatementBuilder::new(Dialect::Postgres);

    for rows in [1, 10, 100, 500] {
        let values: Vec<Vec<SqlValue>> = (0..rows)
            .map(|r| (0..8).map(|c| SqlValue::Int(r * 8 + c)).collect())
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(rows), &values, |b, values| {
            b.iter(|| black_box(sb.insert_many(&table, &columns, values.clone())));
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/in_list");
    let table = wide_table(1);

    for n in [5, 20, 100, 500] {
        let pred = Predicate::in_list("col0", 0..n as i64);
        group.bench_with_input(BenchmarkId::from_parameter(n), &pred, |b, pred| {
            b.iter(|| black_box(pred.render(&table, Dialect::Generic)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_select, bench_insert_many, bench_in_list);
criterion_main!(benches);
