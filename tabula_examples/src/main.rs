// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Example binary for `tabula_transforms`.
//!
//! Run with `RUST_LOG=tabula_transforms=debug` to see per-operation events.

use tabula_core::{Dataset, Value, row};
use tabula_transforms::{
    AggregateOp, AggregateSpec, Pivot, Predicate, SortKey, SortOrder, Transform, Unpivot, Window,
    aggregate, combine, dedup, filter, join, reshape, sort, window,
};

/// A transform list as it would appear in a configuration file.
const REPORT: &str = r#"[
    { "op": "filter", "predicate": { "op": "not_null", "field": "amount" } },
    { "op": "aggregate", "group_by": ["region"],
      "fields": [
        { "output": "revenue", "op": "sum", "input": "amount" },
        { "output": "orders", "op": "count", "input": "order" }
      ] },
    { "op": "sort", "keys": [{ "field": "revenue", "order": "desc" }] }
]"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .ok();

    let orders = Dataset::new(
        ["order", "customer", "region", "month", "amount"],
        vec![
            row![1, 10, "East", "Jan", 100],
            row![2, 11, "West", "Jan", 120],
            row![3, 10, "East", "Feb", 200],
            row![4, 12, "North", "Feb", Value::Null],
            row![5, 11, "West", "Feb", 80],
        ],
    );
    let customers = Dataset::new(
        ["id", "name"],
        vec![row![10, "Alice"], row![11, "Bob"], row![13, "Cid"]],
    );
    tracing::info!(rows = orders.row_count(), "loaded orders");

    let named = join::left(&orders, &customers, join::JoinKeys::new(["customer"], ["id"]))?;
    print("left join", &named);

    let per_region = aggregate::aggregate(
        &orders,
        &["region"],
        &AggregateSpec::new()
            .named_on("revenue", AggregateOp::Sum, "amount")
            .named_on("best", AggregateOp::Max, "amount")
            .custom("months", |g| Value::from(g.column("month").count())),
    )?;
    print("aggregate", &per_region);

    let wide = reshape::pivot(
        &orders,
        &Pivot::new("region", "month", "amount").with_aggregator(AggregateOp::Sum),
    )?;
    print("pivot", &wide);
    print("unpivot", &reshape::unpivot(&wide, &Unpivot::new(["region"]))?);
    print("transpose", &reshape::transpose(&wide));

    let by_region = Window::new().partition_by("region").order_by("month");
    let ranked = window::rank(&orders, &Window::new(), "amount", "rank", SortOrder::Desc)?;
    let ranked = window::lag(&ranked, &by_region, "amount", "prev", 1, Value::Null)?;
    print("window", &ranked);

    let big = filter::filter_where(
        &orders,
        &Predicate::greater_than("amount", 90).and(Predicate::like("region", "%st")),
    )?;
    print("filter", &big);
    print(
        "sort",
        &sort::sort(&orders, &[SortKey::asc("region"), SortKey::desc("amount")])?,
    );

    print(
        "duplicates",
        &dedup::count_distinct(&orders, Some(&["customer"]), "orders")?,
    );
    print("merge", &combine::merge(&[&orders, &customers])?);

    let steps: Vec<Transform> = serde_json::from_str(REPORT)?;
    let mut report = orders.clone();
    for step in &steps {
        report = step.apply(&report)?;
    }
    print("configured report", &report);
    Ok(())
}

fn print(title: &str, ds: &Dataset) {
    println!("== {title} ({} rows)", ds.row_count());
    for row in ds.to_matrix() {
        let cells: Vec<String> = row.iter().map(Value::to_string).collect();
        println!("  {}", cells.join(" | "));
    }
}
