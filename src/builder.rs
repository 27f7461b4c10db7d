use crate::ast::*;
use crate::doc::Doc;
use crate::error::Result;
use crate::stack::StackProbe;

pub const DEFAULT_INDENT: usize = 2;

/// Build the document for one statement, including its `;` when the source
/// had one.
pub fn build_statement(statement: &Statement, probe: &StackProbe<'_>, indent: usize) -> Result<Doc> {
    let builder = DocBuilder::new(probe, indent);
    let body = builder.statement(&statement.body)?;
    if statement.terminated {
        Ok(body.append(Doc::text(";")))
    } else {
        Ok(body)
    }
}

/// Syntax tree to [`Doc`].
///
/// Keywords come out uppercase. Identifiers, literals, function names and
/// type names come out exactly as the lexer saw them.
pub struct DocBuilder<'a> {
    probe: &'a StackProbe<'a>,
    indent: usize,
}

impl<'a> DocBuilder<'a> {
    pub fn new(probe: &'a StackProbe<'a>, indent: usize) -> Self {
        Self { probe, indent }
    }

    // ---- Shapes ----

    /// `head`, then `body` on its own indented line when broken.
    fn clause(&self, head: Doc, body: Doc) -> Doc {
        Doc::concat([head, Doc::nest(self.indent, Doc::concat([Doc::line(), body]))])
    }

    fn keyword_clause(&self, keyword: &str, body: Doc) -> Doc {
        self.clause(Doc::text(keyword), body)
    }

    fn bracket(&self, inner: Doc) -> Doc {
        Doc::bracket("(", inner, ")", self.indent)
    }

    fn list<T>(&self, items: &[T], f: impl Fn(&Self, &T) -> Result<Doc>) -> Result<Doc> {
        let docs = items
            .iter()
            .map(|item| f(self, item))
            .collect::<Result<Vec<_>>>()?;
        Ok(Doc::comma_separated(docs))
    }

    fn ident_list(&self, idents: &[Ident]) -> Doc {
        self.bracket(Doc::comma_separated(
            idents.iter().map(|ident| Doc::text(ident.value.clone())),
        ))
    }

    /// `head`, then `tail` on an indented line, in a group of its own.
    fn continued(&self, head: Doc, tail: Doc) -> Doc {
        Doc::group(Doc::concat([head, Doc::nest(self.indent, Doc::concat([Doc::line(), tail]))]))
    }

    fn with_alias(&self, doc: Doc, alias: &Option<Ident>) -> Doc {
        match alias {
            Some(alias) => doc.append(Doc::group(Doc::nest(
                self.indent,
                Doc::concat([Doc::line(), Doc::text(format!("AS {}", alias))]),
            ))),
            None => doc,
        }
    }

    // ---- Statements ----

    pub fn statement(&self, body: &StatementBody) -> Result<Doc> {
        match body {
            StatementBody::Query(query) => self.query(query),
            StatementBody::Insert(insert) => self.insert(insert),
            StatementBody::Update(update) => self.update(update),
            StatementBody::Delete(delete) => self.delete(delete),
            StatementBody::CreateTable(create) => self.create_table(create),
            StatementBody::CreateView(create) => self.create_view(create),
            StatementBody::CreateIndex(create) => self.create_index(create),
            StatementBody::AlterTable(alter) => self.alter_table(alter),
            StatementBody::Drop(drop) => Ok(self.drop_objects(drop)),
        }
    }

    // ---- Queries ----

    /// One group holding every clause of the query, so they all break
    /// together.
    pub fn query(&self, query: &Query) -> Result<Doc> {
        self.probe.check()?;
        let mut clauses = Vec::new();
        if let Some(with) = &query.with {
            clauses.push(self.with(with)?);
        }
        match &query.body {
            SetExpr::Select(select) => clauses.extend(self.select_clauses(select)?),
            other => clauses.push(self.set_expr(other)?),
        }
        if !query.order_by.is_empty() {
            clauses.push(self.keyword_clause("ORDER BY", self.list(&query.order_by, Self::order_by_expr)?));
        }
        match &query.limit {
            Some(Limit::All) => clauses.push(Doc::text("LIMIT ALL")),
            Some(Limit::Count(count)) => clauses.push(self.keyword_clause("LIMIT", self.expr(count)?)),
            None => {}
        }
        if let Some(offset) = &query.offset {
            let value = self.expr(&offset.value)?;
            let value = match offset.rows {
                OffsetRows::None => value,
                OffsetRows::Row => value.append(Doc::text(" ROW")),
                OffsetRows::Rows => value.append(Doc::text(" ROWS")),
            };
            clauses.push(self.keyword_clause("OFFSET", value));
        }
        Ok(Doc::group(Doc::join(clauses, Doc::line())))
    }

    fn with(&self, with: &With) -> Result<Doc> {
        let ctes = with
            .ctes
            .iter()
            .map(|cte| {
                let mut head = Doc::text(cte.name.value.clone());
                if !cte.columns.is_empty() {
                    head = head.append(Doc::text(" ")).append(self.ident_list(&cte.columns));
                }
                Ok(head
                    .append(Doc::text(" AS "))
                    .append(self.bracket(self.query(&cte.query)?)))
            })
            .collect::<Result<Vec<_>>>()?;
        let keyword = if with.recursive { "WITH RECURSIVE " } else { "WITH " };
        Ok(Doc::concat([
            Doc::text(keyword),
            Doc::join(ctes, Doc::concat([Doc::text(","), Doc::line()])),
        ]))
    }

    /// Set operation chains are left-deep; walk them iteratively.
    fn set_expr(&self, set: &SetExpr) -> Result<Doc> {
        self.probe.check()?;
        let mut tail = Vec::new();
        let mut current = set;
        while let SetExpr::SetOperation {
            op,
            quantifier,
            left,
            right,
        } = current
        {
            tail.push((*op, *quantifier, right.as_ref()));
            current = left.as_ref();
        }
        let mut parts = vec![self.set_operand(current)?];
        for (op, quantifier, right) in tail.into_iter().rev() {
            let keyword = match quantifier {
                SetQuantifier::None => op.keyword().to_string(),
                SetQuantifier::All => format!("{} ALL", op.keyword()),
                SetQuantifier::Distinct => format!("{} DISTINCT", op.keyword()),
            };
            parts.push(Doc::line());
            parts.push(Doc::text(keyword));
            parts.push(Doc::line());
            parts.push(self.set_operand(right)?);
        }
        Ok(Doc::concat(parts))
    }

    fn set_operand(&self, set: &SetExpr) -> Result<Doc> {
        match set {
            SetExpr::Select(select) => {
                Ok(Doc::group(Doc::join(self.select_clauses(select)?, Doc::line())))
            }
            SetExpr::Values(values) => self.values(values),
            SetExpr::Query(query) => Ok(self.bracket(self.query(query)?)),
            SetExpr::SetOperation { .. } => self.set_expr(set),
        }
    }

    fn values(&self, values: &Values) -> Result<Doc> {
        let rows = values
            .rows
            .iter()
            .map(|row| Ok(self.bracket(self.list(row, Self::expr)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.keyword_clause("VALUES", Doc::comma_separated(rows)))
    }

    fn select_clauses(&self, select: &Select) -> Result<Vec<Doc>> {
        let head = match &select.distinct {
            None => Doc::text("SELECT"),
            Some(Distinct::All) => Doc::text("SELECT ALL"),
            Some(Distinct::Distinct) => Doc::text("SELECT DISTINCT"),
            Some(Distinct::On(exprs)) => Doc::concat([
                Doc::text("SELECT DISTINCT ON "),
                self.bracket(self.list(exprs, Self::expr)?),
            ]),
        };
        let mut clauses = vec![self.clause(head, self.list(&select.projection, Self::select_item)?)];
        if !select.from.is_empty() {
            clauses.push(self.keyword_clause("FROM", self.list(&select.from, Self::table_with_joins)?));
        }
        if let Some(selection) = &select.selection {
            clauses.push(self.keyword_clause("WHERE", self.expr(selection)?));
        }
        if !select.group_by.is_empty() {
            clauses.push(self.keyword_clause("GROUP BY", self.list(&select.group_by, Self::expr)?));
        }
        if let Some(having) = &select.having {
            clauses.push(self.keyword_clause("HAVING", self.expr(having)?));
        }
        Ok(clauses)
    }

    fn select_item(&self, item: &SelectItem) -> Result<Doc> {
        match item {
            SelectItem::Wildcard => Ok(Doc::text("*")),
            SelectItem::Expr { expr, alias } => Ok(self.with_alias(self.expr(expr)?, alias)),
        }
    }

    fn order_by_expr(&self, order: &OrderByExpr) -> Result<Doc> {
        let mut doc = self.expr(&order.expr)?;
        match order.asc {
            Some(true) => doc = doc.append(Doc::text(" ASC")),
            Some(false) => doc = doc.append(Doc::text(" DESC")),
            None => {}
        }
        match order.nulls_first {
            Some(true) => doc = doc.append(Doc::text(" NULLS FIRST")),
            Some(false) => doc = doc.append(Doc::text(" NULLS LAST")),
            None => {}
        }
        Ok(doc)
    }

    fn table_with_joins(&self, table: &TableWithJoins) -> Result<Doc> {
        let mut parts = vec![self.table_factor(&table.relation)?];
        for join in &table.joins {
            parts.push(Doc::line());
            parts.push(self.join(join)?);
        }
        Ok(Doc::concat(parts))
    }

    /// Each join is its own group, so a long chain breaks one join at a time.
    fn join(&self, join: &Join) -> Result<Doc> {
        let keyword = if join.natural {
            format!("NATURAL {}", join.operator.keyword())
        } else {
            join.operator.keyword().to_string()
        };
        let head = self.continued(Doc::text(keyword), self.table_factor(&join.relation)?);
        let constraint = match &join.constraint {
            JoinConstraint::On(expr) => Doc::concat([Doc::text("ON "), self.expr(expr)?]),
            JoinConstraint::Using(columns) => {
                Doc::concat([Doc::text("USING "), self.ident_list(columns)])
            }
            JoinConstraint::None => return Ok(Doc::group(head)),
        };
        Ok(Doc::group(self.clause(head, constraint)))
    }

    fn table_factor(&self, factor: &TableFactor) -> Result<Doc> {
        self.probe.check()?;
        match factor {
            TableFactor::Table { name, alias } => {
                Ok(self.with_alias(Doc::text(name.to_string()), alias))
            }
            TableFactor::Function { call, alias } => {
                Ok(self.with_alias(self.function(call)?, alias))
            }
            TableFactor::Derived {
                lateral,
                subquery,
                alias,
            } => {
                let doc = self.bracket(self.query(subquery)?);
                let doc = if *lateral {
                    Doc::text("LATERAL ").append(doc)
                } else {
                    doc
                };
                Ok(self.with_alias(doc, alias))
            }
            TableFactor::NestedJoin { join, alias } => {
                Ok(self.with_alias(self.bracket(self.table_with_joins(join)?), alias))
            }
        }
    }

    // ---- Expressions ----

    pub fn expr(&self, expr: &Expr) -> Result<Doc> {
        self.probe.check()?;
        match &expr.kind {
            ExprKind::Identifier(ident) => Ok(Doc::text(ident.value.clone())),
            ExprKind::CompoundIdentifier(name) => Ok(Doc::text(name.to_string())),
            ExprKind::QualifiedWildcard(name) => Ok(Doc::text(format!("{}.*", name))),
            ExprKind::Value(value) => Ok(Doc::text(match value {
                Value::Number(n) => n.clone(),
                Value::String(s) => s.clone(),
                Value::Placeholder(p) => p.clone(),
                Value::Boolean(true) => "TRUE".into(),
                Value::Boolean(false) => "FALSE".into(),
                Value::Null => "NULL".into(),
            })),
            ExprKind::TypedString { data_type, value } => {
                Ok(Doc::text(format!("{} {}", data_type, value)))
            }
            ExprKind::BinaryOp { .. } => self.binary_chain(expr),
            ExprKind::UnaryOp { op, expr: operand } => {
                let prefix = match op {
                    UnaryOperator::Not => "NOT ",
                    // `- -x` must not lex as a comment.
                    UnaryOperator::Minus if is_signed(operand) => "- ",
                    UnaryOperator::Plus if is_signed(operand) => "+ ",
                    UnaryOperator::Minus => "-",
                    UnaryOperator::Plus => "+",
                };
                Ok(Doc::text(prefix).append(self.expr(operand)?))
            }
            ExprKind::Is {
                expr: operand,
                negated,
                test,
            } => {
                let mut tail = String::from(if *negated { "IS NOT " } else { "IS " });
                let test = match test {
                    IsTest::Null => Doc::text(tail + "NULL"),
                    IsTest::True => Doc::text(tail + "TRUE"),
                    IsTest::False => Doc::text(tail + "FALSE"),
                    IsTest::Unknown => Doc::text(tail + "UNKNOWN"),
                    IsTest::DistinctFrom(other) => {
                        tail.push_str("DISTINCT FROM ");
                        Doc::text(tail).append(self.expr(other)?)
                    }
                };
                Ok(self.infix_tail(self.expr(operand)?, test))
            }
            ExprKind::Between {
                expr: operand,
                negated,
                low,
                high,
            } => {
                let keyword = if *negated { "NOT BETWEEN " } else { "BETWEEN " };
                let range = self.continued(
                    Doc::text(keyword).append(self.expr(low)?),
                    Doc::text("AND ").append(self.expr(high)?),
                );
                Ok(self.infix_tail(self.expr(operand)?, range))
            }
            ExprKind::InList {
                expr: operand,
                negated,
                list,
            } => {
                let keyword = if *negated { " NOT IN " } else { " IN " };
                Ok(Doc::concat([
                    self.expr(operand)?,
                    Doc::text(keyword),
                    self.bracket(self.list(list, Self::expr)?),
                ]))
            }
            ExprKind::InSubquery {
                expr: operand,
                negated,
                subquery,
            } => {
                let keyword = if *negated { " NOT IN " } else { " IN " };
                Ok(Doc::concat([
                    self.expr(operand)?,
                    Doc::text(keyword),
                    self.bracket(self.query(subquery)?),
                ]))
            }
            ExprKind::Like {
                expr: operand,
                negated,
                case_insensitive,
                pattern,
            } => {
                let keyword = match (*negated, *case_insensitive) {
                    (false, false) => "LIKE ",
                    (false, true) => "ILIKE ",
                    (true, false) => "NOT LIKE ",
                    (true, true) => "NOT ILIKE ",
                };
                let tail = Doc::text(keyword).append(self.expr(pattern)?);
                Ok(self.infix_tail(self.expr(operand)?, tail))
            }
            ExprKind::Cast {
                expr: operand,
                data_type,
            } => Ok(Doc::bracket(
                "CAST(",
                Doc::concat([
                    self.expr(operand)?,
                    Doc::line(),
                    Doc::text(format!("AS {}", data_type)),
                ]),
                ")",
                self.indent,
            )),
            ExprKind::DoubleColonCast {
                expr: operand,
                data_type,
            } => Ok(self.expr(operand)?.append(Doc::text(format!("::{}", data_type)))),
            ExprKind::Case {
                operand,
                whens,
                else_result,
            } => self.case(operand.as_deref(), whens, else_result.as_deref()),
            ExprKind::Exists(query) => Ok(Doc::text("EXISTS ").append(self.bracket(self.query(query)?))),
            ExprKind::Subquery(query) => Ok(self.bracket(self.query(query)?)),
            ExprKind::Nested(inner) => Ok(Doc::group(Doc::concat([
                Doc::text("("),
                Doc::nest(1, self.expr(inner)?),
                Doc::text(")"),
            ]))),
            ExprKind::Tuple(items) => Ok(self.bracket(self.list(items, Self::expr)?)),
            ExprKind::Function(function) => self.function(function),
        }
    }

    /// `left`, then `tail` on an indented continuation line when broken.
    fn infix_tail(&self, left: Doc, tail: Doc) -> Doc {
        Doc::group(self.clause(left, tail))
    }

    /// A left-deep run of operators of the same precedence becomes one group
    /// with the operator leading each indented continuation line:
    ///
    /// ```text
    /// a          or      a AND b AND c
    ///   AND b
    ///   AND c
    /// ```
    fn binary_chain(&self, expr: &Expr) -> Result<Doc> {
        let ExprKind::BinaryOp { op, .. } = &expr.kind else {
            return self.expr(expr);
        };
        let precedence = op.precedence();
        let mut tail = Vec::new();
        let mut current = expr;
        while let ExprKind::BinaryOp { left, op, right } = &current.kind {
            if op.precedence() != precedence {
                break;
            }
            tail.push((op, right.as_ref()));
            current = left.as_ref();
        }

        let first = self.expr(current)?;
        let mut rest = Vec::with_capacity(tail.len() * 3);
        for (op, right) in tail.into_iter().rev() {
            rest.push(Doc::line());
            rest.push(Doc::text(format!("{} ", op.as_str())));
            rest.push(self.expr(right)?);
        }
        Ok(Doc::group(Doc::concat([first, Doc::nest(self.indent, Doc::concat(rest))])))
    }

    fn case(
        &self,
        operand: Option<&Expr>,
        whens: &[WhenClause],
        else_result: Option<&Expr>,
    ) -> Result<Doc> {
        let mut parts = vec![Doc::text("CASE")];
        if let Some(operand) = operand {
            parts.push(Doc::text(" "));
            parts.push(self.expr(operand)?);
        }
        for when in whens {
            let arm = self.continued(
                Doc::text("WHEN ").append(self.expr(&when.condition)?),
                Doc::text("THEN ").append(self.expr(&when.result)?),
            );
            parts.push(Doc::nest(self.indent, Doc::concat([Doc::line(), arm])));
        }
        if let Some(else_result) = else_result {
            parts.push(Doc::nest(
                self.indent,
                Doc::concat([Doc::line(), Doc::text("ELSE "), self.expr(else_result)?]),
            ));
        }
        parts.push(Doc::line());
        parts.push(Doc::text("END"));
        Ok(Doc::group(Doc::concat(parts)))
    }

    fn function(&self, function: &Function) -> Result<Doc> {
        let name = Doc::text(function.name.to_string());
        let args = match &function.args {
            FunctionArgs::Star => Doc::text("(*)"),
            FunctionArgs::List {
                distinct,
                args,
                order_by,
            } => {
                if args.is_empty() && order_by.is_empty() && !*distinct {
                    Doc::text("()")
                } else if let ([Expr {
                    kind: ExprKind::Subquery(query),
                    ..
                }], false, true) =
                    (args.as_slice(), *distinct, order_by.is_empty())
                {
                    self.bracket(self.query(query)?)
                } else {
                    let mut inner = self.list(args, Self::expr)?;
                    if *distinct {
                        inner = Doc::text("DISTINCT ").append(inner);
                    }
                    if !order_by.is_empty() {
                        inner = inner.append(Doc::line()).append(
                            self.keyword_clause("ORDER BY", self.list(order_by, Self::order_by_expr)?),
                        );
                    }
                    self.bracket(inner)
                }
            }
        };
        let mut doc = Doc::concat([name, args]);
        if let Some(filter) = &function.filter {
            doc = doc.append(Doc::text(" FILTER ")).append(Doc::bracket(
                "(",
                Doc::text("WHERE ").append(self.expr(filter)?),
                ")",
                self.indent,
            ));
        }
        match &function.over {
            Some(WindowRef::Named(name)) => {
                doc = doc.append(Doc::group(Doc::nest(
                    self.indent,
                    Doc::concat([Doc::line(), Doc::text(format!("OVER {}", name))]),
                )));
            }
            Some(WindowRef::Spec(spec)) => {
                doc = doc.append(Doc::text(" OVER ")).append(self.window_spec(spec)?);
            }
            None => {}
        }
        Ok(doc)
    }

    fn window_spec(&self, spec: &WindowSpec) -> Result<Doc> {
        let mut parts = Vec::new();
        if !spec.partition_by.is_empty() {
            parts.push(self.keyword_clause("PARTITION BY", self.list(&spec.partition_by, Self::expr)?));
        }
        if !spec.order_by.is_empty() {
            parts.push(self.keyword_clause("ORDER BY", self.list(&spec.order_by, Self::order_by_expr)?));
        }
        if let Some(frame) = &spec.frame {
            parts.push(self.window_frame(frame)?);
        }
        if parts.is_empty() {
            return Ok(Doc::text("()"));
        }
        Ok(self.bracket(Doc::join(parts, Doc::line())))
    }

    fn window_frame(&self, frame: &WindowFrame) -> Result<Doc> {
        let units = match frame.units {
            FrameUnits::Rows => "ROWS",
            FrameUnits::Range => "RANGE",
        };
        match &frame.end {
            Some(end) => Ok(self.continued(
                Doc::text(format!("{} BETWEEN", units)),
                Doc::concat([
                    self.frame_bound(&frame.start)?,
                    Doc::line(),
                    Doc::text("AND "),
                    self.frame_bound(end)?,
                ]),
            )),
            None => Ok(self.continued(Doc::text(units), self.frame_bound(&frame.start)?)),
        }
    }

    fn frame_bound(&self, bound: &FrameBound) -> Result<Doc> {
        Ok(match bound {
            FrameBound::UnboundedPreceding => Doc::text("UNBOUNDED PRECEDING"),
            FrameBound::UnboundedFollowing => Doc::text("UNBOUNDED FOLLOWING"),
            FrameBound::CurrentRow => Doc::text("CURRENT ROW"),
            FrameBound::Preceding(offset) => self.expr(offset)?.append(Doc::text(" PRECEDING")),
            FrameBound::Following(offset) => self.expr(offset)?.append(Doc::text(" FOLLOWING")),
        })
    }

    // ---- DML ----

    fn returning(&self, items: &[SelectItem]) -> Result<Option<Doc>> {
        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.keyword_clause("RETURNING", self.list(items, Self::select_item)?)))
    }

    fn insert(&self, insert: &Insert) -> Result<Doc> {
        let mut head = Doc::text(format!("INSERT INTO {}", insert.table));
        if !insert.columns.is_empty() {
            head = head.append(Doc::text(" ")).append(self.ident_list(&insert.columns));
        }
        let source = match &insert.source {
            InsertSource::Query(query) => self.query(query)?,
            InsertSource::DefaultValues => Doc::text("DEFAULT VALUES"),
        };
        let mut clauses = vec![head, source];
        clauses.extend(self.returning(&insert.returning)?);
        Ok(Doc::group(Doc::join(clauses, Doc::line())))
    }

    fn update(&self, update: &Update) -> Result<Doc> {
        let head = self.with_alias(Doc::text(format!("UPDATE {}", update.table)), &update.alias);
        let assignments = self.list(&update.assignments, |b, assignment| {
            Ok(b.continued(
                Doc::text(assignment.column.value.clone()),
                Doc::text("= ").append(b.expr(&assignment.value)?),
            ))
        })?;
        let mut clauses = vec![head, self.keyword_clause("SET", assignments)];
        if !update.from.is_empty() {
            clauses.push(self.keyword_clause("FROM", self.list(&update.from, Self::table_with_joins)?));
        }
        if let Some(selection) = &update.selection {
            clauses.push(self.keyword_clause("WHERE", self.expr(selection)?));
        }
        clauses.extend(self.returning(&update.returning)?);
        Ok(Doc::group(Doc::join(clauses, Doc::line())))
    }

    fn delete(&self, delete: &Delete) -> Result<Doc> {
        let head = self.with_alias(Doc::text(format!("DELETE FROM {}", delete.table)), &delete.alias);
        let mut clauses = vec![head];
        if !delete.using.is_empty() {
            clauses.push(self.keyword_clause("USING", self.list(&delete.using, Self::table_with_joins)?));
        }
        if let Some(selection) = &delete.selection {
            clauses.push(self.keyword_clause("WHERE", self.expr(selection)?));
        }
        clauses.extend(self.returning(&delete.returning)?);
        Ok(Doc::group(Doc::join(clauses, Doc::line())))
    }

    // ---- DDL ----

    fn create_table(&self, create: &CreateTable) -> Result<Doc> {
        let mut head = String::from("CREATE ");
        if create.temporary {
            head.push_str("TEMPORARY ");
        }
        head.push_str("TABLE ");
        if create.if_not_exists {
            head.push_str("IF NOT EXISTS ");
        }
        head.push_str(&create.name.to_string());

        if let Some(query) = &create.query {
            return Ok(Doc::group(Doc::concat([
                Doc::text(head + " AS"),
                Doc::line(),
                self.query(query)?,
            ])));
        }
        let elements = self.list(&create.elements, |b, element| match element {
            TableElement::Column(column) => b.column_def(column),
            TableElement::Constraint(constraint) => b.table_constraint(constraint),
        })?;
        Ok(Doc::text(head + " ").append(self.bracket(elements)))
    }

    /// The name, then the type and each option on its own indented line when
    /// the definition does not fit.
    fn column_def(&self, column: &ColumnDef) -> Result<Doc> {
        let mut parts = vec![Doc::text(column.data_type.to_string())];
        for option in &column.options {
            parts.push(Doc::line());
            parts.push(match option {
                ColumnOption::Null => Doc::text("NULL"),
                ColumnOption::NotNull => Doc::text("NOT NULL"),
                ColumnOption::Default(expr) => Doc::text("DEFAULT ").append(self.expr(expr)?),
                ColumnOption::PrimaryKey => Doc::text("PRIMARY KEY"),
                ColumnOption::Unique => Doc::text("UNIQUE"),
                ColumnOption::Check(expr) => Doc::text("CHECK ").append(self.bracket(self.expr(expr)?)),
                ColumnOption::References { table, columns } => self.references(table, columns),
            });
        }
        Ok(self.continued(Doc::text(column.name.value.clone()), Doc::concat(parts)))
    }

    fn references(&self, table: &ObjectName, columns: &[Ident]) -> Doc {
        let doc = Doc::text(format!("REFERENCES {}", table));
        if columns.is_empty() {
            doc
        } else {
            doc.append(Doc::text(" ")).append(self.ident_list(columns))
        }
    }

    fn table_constraint(&self, constraint: &TableConstraint) -> Result<Doc> {
        let head = match &constraint.name {
            Some(name) => format!("CONSTRAINT {} ", name),
            None => String::new(),
        };
        let body = match &constraint.kind {
            ConstraintKind::PrimaryKey(columns) => {
                Doc::text(head + "PRIMARY KEY ").append(self.ident_list(columns))
            }
            ConstraintKind::Unique(columns) => Doc::text(head + "UNIQUE ").append(self.ident_list(columns)),
            ConstraintKind::ForeignKey {
                columns,
                foreign_table,
                referred_columns,
            } => Doc::concat([
                Doc::text(head + "FOREIGN KEY "),
                self.ident_list(columns),
                Doc::text(" "),
                self.references(foreign_table, referred_columns),
            ]),
            ConstraintKind::Check(expr) => Doc::text(head + "CHECK ").append(self.bracket(self.expr(expr)?)),
        };
        Ok(body)
    }

    fn create_view(&self, create: &CreateView) -> Result<Doc> {
        let mut head = String::from("CREATE ");
        if create.or_replace {
            head.push_str("OR REPLACE ");
        }
        if create.temporary {
            head.push_str("TEMPORARY ");
        }
        if create.materialized {
            head.push_str("MATERIALIZED ");
        }
        head.push_str("VIEW ");
        if create.if_not_exists {
            head.push_str("IF NOT EXISTS ");
        }
        head.push_str(&create.name.to_string());

        let mut head = Doc::text(head);
        if !create.columns.is_empty() {
            head = head.append(Doc::text(" ")).append(self.ident_list(&create.columns));
        }
        Ok(Doc::group(Doc::concat([
            head,
            Doc::text(" AS"),
            Doc::line(),
            self.query(&create.query)?,
        ])))
    }

    fn create_index(&self, create: &CreateIndex) -> Result<Doc> {
        let mut head = String::from("CREATE ");
        if create.unique {
            head.push_str("UNIQUE ");
        }
        head.push_str("INDEX ");
        if create.if_not_exists {
            head.push_str("IF NOT EXISTS ");
        }
        if let Some(name) = &create.name {
            head.push_str(&name.value);
        }
        let mut target = vec![Doc::text(format!("ON {}", create.table))];
        if let Some(using) = &create.using {
            target.push(Doc::line());
            target.push(Doc::text(format!("USING {}", using)));
        }
        target.push(Doc::text(" "));
        target.push(self.bracket(self.list(&create.columns, Self::order_by_expr)?));
        Ok(self.continued(Doc::text(head.trim_end().to_string()), Doc::concat(target)))
    }

    fn alter_table(&self, alter: &AlterTable) -> Result<Doc> {
        let head = if alter.if_exists {
            format!("ALTER TABLE IF EXISTS {}", alter.name)
        } else {
            format!("ALTER TABLE {}", alter.name)
        };
        let actions = self.list(&alter.actions, Self::alter_table_action)?;
        Ok(Doc::group(self.clause(Doc::text(head), actions)))
    }

    fn alter_table_action(&self, action: &AlterTableAction) -> Result<Doc> {
        Ok(match action {
            AlterTableAction::AddColumn(column) => Doc::text("ADD COLUMN ").append(self.column_def(column)?),
            AlterTableAction::AddConstraint(constraint) => {
                Doc::text("ADD ").append(self.table_constraint(constraint)?)
            }
            AlterTableAction::DropColumn {
                if_exists,
                name,
                behavior,
            } => {
                let mut text = String::from("DROP COLUMN ");
                if *if_exists {
                    text.push_str("IF EXISTS ");
                }
                text.push_str(&name.value);
                if let Some(behavior) = behavior {
                    text.push(' ');
                    text.push_str(behavior.keyword());
                }
                Doc::text(text)
            }
            AlterTableAction::RenameColumn { old, new } => self.continued(
                Doc::text(format!("RENAME COLUMN {}", old)),
                Doc::text(format!("TO {}", new)),
            ),
            AlterTableAction::RenameTable(name) => Doc::text(format!("RENAME TO {}", name)),
            AlterTableAction::AlterColumn { name, op } => {
                let change = match op {
                    AlterColumnOp::SetDefault(expr) => {
                        Doc::text("SET DEFAULT ").append(self.expr(expr)?)
                    }
                    AlterColumnOp::DropDefault => Doc::text("DROP DEFAULT"),
                    AlterColumnOp::SetNotNull => Doc::text("SET NOT NULL"),
                    AlterColumnOp::DropNotNull => Doc::text("DROP NOT NULL"),
                    AlterColumnOp::SetDataType(data_type) => Doc::text(format!("TYPE {}", data_type)),
                };
                self.continued(Doc::text(format!("ALTER COLUMN {}", name)), change)
            }
        })
    }

    /// The object names break one per line under the keyword when they do
    /// not fit.
    fn drop_objects(&self, drop: &DropObjects) -> Doc {
        let mut head = format!("DROP {}", drop.object_type.keyword());
        if drop.if_exists {
            head.push_str(" IF EXISTS");
        }
        let mut names =
            Doc::comma_separated(drop.names.iter().map(|name| Doc::text(name.to_string())));
        if let Some(behavior) = drop.behavior {
            names = names.append(Doc::text(format!(" {}", behavior.keyword())));
        }
        self.continued(Doc::text(head), names)
    }
}

fn is_signed(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::UnaryOp {
            op: UnaryOperator::Minus | UnaryOperator::Plus,
            ..
        }
    )
}
