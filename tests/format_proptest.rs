use proptest::prelude::*;
use sqlpretty::{format_string, pretty_print, Mode};

fn identifier_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec!["a", "b", "total", "user_id", "created_at"])
            .prop_map(String::from),
        prop::sample::select(vec!["t.price", "o.status", "c.name"]).prop_map(String::from),
    ]
}

fn column_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "total", "user_id", "created_at"]).prop_map(String::from)
}

fn table_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["orders", "customers", "line_items", "s.invoices"])
        .prop_map(String::from)
}

fn atom_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        identifier_strategy(),
        (0u32..10_000).prop_map(|n| n.to_string()),
        "[a-z ]{0,8}".prop_map(|s| format!("'{}'", s)),
    ]
}

fn operator_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["+", "-", "*", "/", "=", "<>", "<", ">=", "and", "or", "||"])
}

fn expr_strategy() -> impl Strategy<Value = String> {
    atom_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (inner.clone(), operator_strategy(), inner.clone())
                .prop_map(|(l, op, r)| format!("{} {} {}", l, op, r)),
            inner.clone().prop_map(|e| format!("({})", e)),
            prop::collection::vec(inner.clone(), 1..4)
                .prop_map(|args| format!("coalesce({})", args.join(", "))),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(c, t, e)| format!("case when {} then {} else {} end", c, t, e)),
            (inner.clone(), any::<bool>(), atom_strategy(), atom_strategy()).prop_map(
                |(e, negated, low, high)| {
                    let not = if negated { "not " } else { "" };
                    format!("{} {}between {} and {}", e, not, low, high)
                }
            ),
            (inner.clone(), prop::collection::vec(atom_strategy(), 1..5))
                .prop_map(|(e, list)| format!("{} in ({})", e, list.join(", "))),
            (inner, column_strategy(), column_strategy()).prop_map(|(arg, part, order)| {
                format!(
                    "sum({}) over (partition by {} order by {} rows between unbounded preceding and current row)",
                    arg, part, order
                )
            }),
        ]
    })
}

fn select_item_strategy() -> impl Strategy<Value = String> {
    (
        expr_strategy(),
        prop::option::of(prop::sample::select(vec!["x1", "amount", "label"])),
    )
        .prop_map(|(expr, alias)| match alias {
            Some(alias) => format!("{} as {}", expr, alias),
            None => expr,
        })
}

fn join_strategy() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["join", "left join", "right outer join", "full join"]),
        table_strategy(),
        prop::sample::select(vec!["o", "c", "li"]),
        expr_strategy(),
    )
        .prop_map(|(kind, table, alias, on)| format!(" {} {} {} on {}", kind, table, alias, on))
}

fn query_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(select_item_strategy(), 1..5),
        prop::collection::vec(join_strategy(), 0..3),
        prop::option::of(expr_strategy()),
        prop::option::of(identifier_strategy()),
    )
        .prop_map(|(items, joins, selection, order)| {
            let mut sql = format!("select {} from t{}", items.join(", "), joins.concat());
            if let Some(selection) = selection {
                sql.push_str(&format!(" where {}", selection));
            }
            if let Some(order) = order {
                sql.push_str(&format!(" order by {} desc", order));
            }
            sql
        })
}

fn column_def_strategy() -> impl Strategy<Value = String> {
    (
        column_strategy(),
        prop::sample::select(vec!["int", "bigint", "text", "boolean"]),
        prop::sample::select(vec!["", " not null", " primary key", " default 0", " unique not null"]),
    )
        .prop_map(|(name, data_type, options)| format!("{} {}{}", name, data_type, options))
}

fn ddl_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (table_strategy(), prop::collection::vec(column_def_strategy(), 1..5))
            .prop_map(|(table, columns)| format!("create table {} ({})", table, columns.join(", "))),
        (
            any::<bool>(),
            prop::collection::vec(table_strategy(), 1..5),
            any::<bool>()
        )
            .prop_map(|(if_exists, tables, cascade)| {
                format!(
                    "drop table {}{}{}",
                    if if_exists { "if exists " } else { "" },
                    tables.join(", "),
                    if cascade { " cascade" } else { "" }
                )
            }),
        (table_strategy(), column_strategy(), column_strategy()).prop_map(|(table, old, new)| {
            format!(
                "alter table {} rename column {} to {}, alter column {} type text, add column {} int not null",
                table, old, new, old, new
            )
        }),
    ]
}

fn statement_strategy() -> impl Strategy<Value = String> {
    prop_oneof![3 => query_strategy(), 1 => ddl_strategy()]
}

/// Identifiers and literals on a line: whitespace-separated words holding a
/// lowercase letter, a digit or a quote. A quoted string is one word.
fn operand_count(line: &str) -> usize {
    let mut count = 0;
    let mut quoted = false;
    let mut operand = false;
    for c in line.chars().chain(std::iter::once(' ')) {
        if c == '\'' {
            quoted = !quoted;
        }
        if c.is_whitespace() && !quoted {
            count += usize::from(operand);
            operand = false;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '\'' || c == '"' {
            operand = true;
        }
    }
    count
}

#[cfg(test)]
mod proptest_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_formatting_is_idempotent(sql in statement_strategy(), width in 10usize..120) {
            let once = pretty_print(&sql, width);
            prop_assert!(once.is_ok(), "Failed to format: {}", sql);
            let once = once.unwrap();
            let twice = pretty_print(&once, width).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn test_formatting_preserves_meaning(sql in statement_strategy(), width in 10usize..120) {
            let mode = Mode::with_width(width);
            let result = format_string(&sql, &mode);
            prop_assert!(result.is_ok(), "Safety check failed for {}: {:?}", sql, result.err());
        }

        #[test]
        fn test_formatting_is_deterministic(sql in statement_strategy(), width in 10usize..120) {
            prop_assert_eq!(pretty_print(&sql, width).unwrap(), pretty_print(&sql, width).unwrap());
        }

        #[test]
        fn test_fitting_query_stays_on_one_line(sql in statement_strategy(), width in 10usize..120) {
            let flat = pretty_print(&sql, usize::MAX / 2).unwrap();
            prop_assert!(!flat.contains('\n'));
            if flat.chars().count() <= width {
                prop_assert_eq!(pretty_print(&sql, width).unwrap(), flat);
            }
        }

        #[test]
        fn test_lines_fit_unless_indivisible(sql in statement_strategy(), width in 1usize..80) {
            let out = pretty_print(&sql, width).unwrap();
            for line in out.lines() {
                if line.chars().count() > width {
                    prop_assert!(
                        operand_count(line) <= 1,
                        "line {:?} of {:?} exceeds width {}",
                        line,
                        sql,
                        width
                    );
                }
            }
        }

        #[test]
        fn test_no_trailing_whitespace(sql in statement_strategy(), width in 10usize..120) {
            let out = pretty_print(&sql, width).unwrap();
            for line in out.lines() {
                prop_assert_eq!(line, line.trim_end());
            }
        }
    }
}
