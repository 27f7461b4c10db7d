use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sqlpretty::parser::parse_statements;
use sqlpretty::{format_string, pretty_print, Mode};

const SMALL: &str = "SELECT a, b, c FROM my_table WHERE x = 1 AND y > 2 ORDER BY a";

const MEDIUM: &str = "\
with recent_orders as (
    select o.id, o.customer_id, o.total, o.created_at
    from orders o
    where o.created_at > date '2024-01-01' and o.status <> 'cancelled'
),
customer_totals as (
    select customer_id, sum(total) as revenue, count(*) as order_count
    from recent_orders
    group by customer_id
    having sum(total) > 1000
)
select c.id, c.name, ct.revenue, ct.order_count,
    case when ct.revenue > 10000 then 'gold' when ct.revenue > 5000 then 'silver' else 'bronze' end as tier,
    rank() over (partition by c.region order by ct.revenue desc) as region_rank
from customers c
join customer_totals ct on ct.customer_id = c.id
left join regions r on r.id = c.region
where c.active and r.name in ('north', 'south', 'east')
order by ct.revenue desc, c.name
limit 100;
";

/// A script of `copies` medium-sized statements.
fn large(copies: usize) -> String {
    vec![MEDIUM; copies].join("\n")
}

fn deeply_nested(depth: usize) -> String {
    format!("select {}1{}", "(".repeat(depth), ")".repeat(depth))
}

fn bench_format_small(c: &mut Criterion) {
    c.bench_function("format_small", |b| {
        b.iter(|| pretty_print(black_box(SMALL), black_box(80)).unwrap())
    });
}

fn bench_format_medium(c: &mut Criterion) {
    c.bench_function("format_medium", |b| {
        b.iter(|| pretty_print(black_box(MEDIUM), black_box(80)).unwrap())
    });
}

fn bench_format_large(c: &mut Criterion) {
    let sql = large(50);
    c.bench_function("format_large", |b| {
        b.iter(|| pretty_print(black_box(&sql), black_box(80)).unwrap())
    });
}

fn bench_parse_only(c: &mut Criterion) {
    let sql = large(50);
    c.bench_function("parse_only", |b| {
        b.iter(|| parse_statements(black_box(&sql)).unwrap())
    });
}

fn bench_widths(c: &mut Criterion) {
    let mut group = c.benchmark_group("widths");
    for width in [20usize, 40, 80, 160] {
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            b.iter(|| pretty_print(black_box(MEDIUM), width).unwrap())
        });
    }
    group.finish();
}

/// Both paths side by side so the cost of the reparse shows in the report.
fn bench_safety_check_overhead(c: &mut Criterion) {
    let sql = large(10);

    let mut group = c.benchmark_group("safety_check_overhead");

    let mode_with = Mode::default();
    group.bench_function("with_safety", |b| {
        b.iter(|| format_string(black_box(&sql), black_box(&mode_with)).unwrap())
    });

    let mode_without = Mode {
        fast: true,
        ..Mode::default()
    };
    group.bench_function("without_safety", |b| {
        b.iter(|| format_string(black_box(&sql), black_box(&mode_without)).unwrap())
    });

    group.finish();
}

/// Measures the stack guard on input that forces at least one regrowth.
fn bench_deep_nesting(c: &mut Criterion) {
    let sql = deeply_nested(5_000);
    let mode = Mode {
        stack_size: 256 * 1024,
        fast: true,
        ..Mode::default()
    };
    c.bench_function("deep_nesting", |b| {
        b.iter(|| format_string(black_box(&sql), black_box(&mode)).unwrap())
    });
}

fn bench_format_idempotent(c: &mut Criterion) {
    let formatted = pretty_print(MEDIUM, 80).unwrap();
    c.bench_function("format_idempotent", |b| {
        b.iter(|| pretty_print(black_box(&formatted), black_box(80)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_format_small,
    bench_format_medium,
    bench_format_large,
    bench_parse_only,
    bench_widths,
    bench_safety_check_overhead,
    bench_deep_nesting,
    bench_format_idempotent
);
criterion_main!(benches);
