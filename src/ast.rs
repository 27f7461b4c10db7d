use std::fmt;
use std::mem;

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::token::Pos;

/// Byte range of a node in the source text.
///
/// Equality of [`Query`], [`Select`] and [`Expr`] ignores spans, so two parses
/// of differently formatted text compare equal whenever they have the same
/// structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub body: StatementBody,
    pub span: Span,
    /// Whether the source ended this statement with `;`.
    pub terminated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementBody {
    Query(Box<Query>),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    CreateTable(CreateTable),
    CreateView(CreateView),
    CreateIndex(CreateIndex),
    AlterTable(AlterTable),
    Drop(DropObjects),
}

/// An identifier exactly as written, quotes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub value: CompactString,
}

impl Ident {
    pub fn new(value: &str) -> Self {
        Self {
            value: CompactString::from(value),
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A possibly qualified name such as `schema.table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectName(pub SmallVec<[Ident; 2]>);

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&part.value)?;
        }
        Ok(())
    }
}

/// A type name with optional modifiers, e.g. `numeric(10, 2)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataType {
    /// Type words as written, joined by single spaces.
    pub name: CompactString,
    pub args: Vec<CompactString>,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            write!(f, "({})", self.args.join(", "))?;
        }
        Ok(())
    }
}

// ---- Queries ----

#[derive(Debug, Clone)]
pub struct Query {
    pub with: Option<With>,
    pub body: SetExpr,
    pub order_by: Vec<OrderByExpr>,
    pub limit: Option<Limit>,
    pub offset: Option<Offset>,
    pub span: Span,
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.with == other.with
            && self.body == other.body
            && self.order_by == other.order_by
            && self.limit == other.limit
            && self.offset == other.offset
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct With {
    pub recursive: bool,
    pub ctes: Vec<Cte>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub name: Ident,
    pub columns: Vec<Ident>,
    pub query: Query,
}

/// Set operations nest to the left, one level per operator, without a
/// matching level of parser recursion. Drop and equality walk them with an
/// explicit stack.
#[derive(Debug, Clone)]
pub enum SetExpr {
    Select(Box<Select>),
    Values(Values),
    /// A parenthesized query.
    Query(Box<Query>),
    SetOperation {
        op: SetOperator,
        quantifier: SetQuantifier,
        left: Box<SetExpr>,
        right: Box<SetExpr>,
    },
}

impl SetExpr {
    fn placeholder() -> Self {
        SetExpr::Values(Values { rows: Vec::new() })
    }
}

impl PartialEq for SetExpr {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            let same = match (a, b) {
                (SetExpr::Select(x), SetExpr::Select(y)) => x == y,
                (SetExpr::Values(x), SetExpr::Values(y)) => x == y,
                (SetExpr::Query(x), SetExpr::Query(y)) => x == y,
                (
                    SetExpr::SetOperation {
                        op: op_a,
                        quantifier: q_a,
                        left: left_a,
                        right: right_a,
                    },
                    SetExpr::SetOperation {
                        op: op_b,
                        quantifier: q_b,
                        left: left_b,
                        right: right_b,
                    },
                ) => {
                    pending.push((&**left_a, &**left_b));
                    pending.push((&**right_a, &**right_b));
                    op_a == op_b && q_a == q_b
                }
                _ => false,
            };
            if !same {
                return false;
            }
        }
        true
    }
}

impl Drop for SetExpr {
    fn drop(&mut self) {
        let SetExpr::SetOperation { left, right, .. } = self else {
            return;
        };
        let mut stack = vec![
            mem::replace(left.as_mut(), SetExpr::placeholder()),
            mem::replace(right.as_mut(), SetExpr::placeholder()),
        ];
        while let Some(mut set) = stack.pop() {
            if let SetExpr::SetOperation { left, right, .. } = &mut set {
                stack.push(mem::replace(left.as_mut(), SetExpr::placeholder()));
                stack.push(mem::replace(right.as_mut(), SetExpr::placeholder()));
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    Intersect,
    Except,
}

impl SetOperator {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetQuantifier {
    None,
    All,
    Distinct,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Values {
    pub rows: Vec<Vec<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Limit {
    Count(Expr),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetRows {
    None,
    Row,
    Rows,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Offset {
    pub value: Expr,
    pub rows: OffsetRows,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expr,
    /// `Some(true)` for ASC, `Some(false)` for DESC.
    pub asc: Option<bool>,
    /// `Some(true)` for NULLS FIRST, `Some(false)` for NULLS LAST.
    pub nulls_first: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Distinct {
    All,
    Distinct,
    On(Vec<Expr>),
}

#[derive(Debug, Clone)]
pub struct Select {
    pub distinct: Option<Distinct>,
    pub projection: Vec<SelectItem>,
    pub from: Vec<TableWithJoins>,
    pub selection: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub span: Span,
}

impl PartialEq for Select {
    fn eq(&self, other: &Self) -> bool {
        self.distinct == other.distinct
            && self.projection == other.projection
            && self.from == other.from
            && self.selection == other.selection
            && self.group_by == other.group_by
            && self.having == other.having
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Wildcard,
    Expr { expr: Expr, alias: Option<Ident> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableWithJoins {
    pub relation: TableFactor,
    pub joins: Vec<Join>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableFactor {
    Table {
        name: ObjectName,
        alias: Option<Ident>,
    },
    Function {
        call: Box<Function>,
        alias: Option<Ident>,
    },
    Derived {
        lateral: bool,
        subquery: Box<Query>,
        alias: Option<Ident>,
    },
    NestedJoin {
        join: Box<TableWithJoins>,
        alias: Option<Ident>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub natural: bool,
    pub operator: JoinOperator,
    pub relation: TableFactor,
    pub constraint: JoinConstraint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOperator {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinOperator {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Inner => "JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<Ident>),
    None,
}

// ---- Expressions ----

/// An expression and the source bytes it was parsed from.
///
/// Left-associative operator chains nest one `Box` per operator without a
/// matching level of parser recursion, so drop and equality walk the tree
/// with an explicit stack instead of recursing.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Identifier(Ident),
    CompoundIdentifier(ObjectName),
    /// `t.*`
    QualifiedWildcard(ObjectName),
    Value(Value),
    /// `DATE '2024-01-01'`, `INTERVAL '1 day'`
    TypedString {
        data_type: CompactString,
        value: CompactString,
    },
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOperator,
        expr: Box<Expr>,
    },
    Is {
        expr: Box<Expr>,
        negated: bool,
        test: IsTest,
    },
    Between {
        expr: Box<Expr>,
        negated: bool,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    InList {
        expr: Box<Expr>,
        negated: bool,
        list: Vec<Expr>,
    },
    InSubquery {
        expr: Box<Expr>,
        negated: bool,
        subquery: Box<Query>,
    },
    Like {
        expr: Box<Expr>,
        negated: bool,
        case_insensitive: bool,
        pattern: Box<Expr>,
    },
    /// `CAST(expr AS type)`
    Cast {
        expr: Box<Expr>,
        data_type: DataType,
    },
    /// `expr::type`
    DoubleColonCast {
        expr: Box<Expr>,
        data_type: DataType,
    },
    Case {
        operand: Option<Box<Expr>>,
        whens: Vec<WhenClause>,
        else_result: Option<Box<Expr>>,
    },
    Exists(Box<Query>),
    Subquery(Box<Query>),
    /// Explicit parentheses around an expression.
    Nested(Box<Expr>),
    /// `(a, b, ...)`
    Tuple(Vec<Expr>),
    Function(Box<Function>),
}

type ExprPairs<'a> = Vec<(&'a Expr, &'a Expr)>;

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    fn placeholder() -> Self {
        Self::new(ExprKind::Value(Value::Null), Span::default())
    }

    /// Moves every directly owned child expression into `out`, leaving
    /// childless placeholders behind.
    fn take_children(&mut self, out: &mut Vec<Expr>) {
        fn take(slot: &mut Expr) -> Expr {
            mem::replace(slot, Expr::placeholder())
        }

        match &mut self.kind {
            ExprKind::BinaryOp { left, right, .. } => {
                out.push(take(left));
                out.push(take(right));
            }
            ExprKind::UnaryOp { expr, .. }
            | ExprKind::InSubquery { expr, .. }
            | ExprKind::Cast { expr, .. }
            | ExprKind::DoubleColonCast { expr, .. }
            | ExprKind::Nested(expr) => out.push(take(expr)),
            ExprKind::Is { expr, test, .. } => {
                out.push(take(expr));
                if let IsTest::DistinctFrom(other) = test {
                    out.push(take(other));
                }
            }
            ExprKind::Between {
                expr, low, high, ..
            } => {
                out.push(take(expr));
                out.push(take(low));
                out.push(take(high));
            }
            ExprKind::InList { expr, list, .. } => {
                out.push(take(expr));
                out.append(list);
            }
            ExprKind::Like { expr, pattern, .. } => {
                out.push(take(expr));
                out.push(take(pattern));
            }
            ExprKind::Case {
                operand,
                whens,
                else_result,
            } => {
                out.extend(operand.take().map(|operand| *operand));
                for when in whens.drain(..) {
                    out.push(when.condition);
                    out.push(when.result);
                }
                out.extend(else_result.take().map(|result| *result));
            }
            ExprKind::Tuple(list) => out.append(list),
            ExprKind::Identifier(_)
            | ExprKind::CompoundIdentifier(_)
            | ExprKind::QualifiedWildcard(_)
            | ExprKind::Value(_)
            | ExprKind::TypedString { .. }
            | ExprKind::Exists(_)
            | ExprKind::Subquery(_)
            | ExprKind::Function(_) => {}
        }
    }
}

impl Drop for Expr {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.take_children(&mut stack);
        while let Some(mut expr) = stack.pop() {
            expr.take_children(&mut stack);
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl PartialEq for ExprKind {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = Vec::new();
        if !self.shallow_eq(other, &mut pending) {
            return false;
        }
        while let Some((a, b)) = pending.pop() {
            if !a.kind.shallow_eq(&b.kind, &mut pending) {
                return false;
            }
        }
        true
    }
}

impl ExprKind {
    /// Compares everything but child expressions, which are queued as pairs.
    fn shallow_eq<'a>(&'a self, other: &'a Self, pending: &mut ExprPairs<'a>) -> bool {
        match (self, other) {
            (ExprKind::Identifier(a), ExprKind::Identifier(b)) => a == b,
            (ExprKind::CompoundIdentifier(a), ExprKind::CompoundIdentifier(b))
            | (ExprKind::QualifiedWildcard(a), ExprKind::QualifiedWildcard(b)) => a == b,
            (ExprKind::Value(a), ExprKind::Value(b)) => a == b,
            (
                ExprKind::TypedString {
                    data_type: type_a,
                    value: value_a,
                },
                ExprKind::TypedString {
                    data_type: type_b,
                    value: value_b,
                },
            ) => type_a == type_b && value_a == value_b,
            (
                ExprKind::BinaryOp {
                    left: left_a,
                    op: op_a,
                    right: right_a,
                },
                ExprKind::BinaryOp {
                    left: left_b,
                    op: op_b,
                    right: right_b,
                },
            ) => {
                pending.push((&**left_a, &**left_b));
                pending.push((&**right_a, &**right_b));
                op_a == op_b
            }
            (
                ExprKind::UnaryOp {
                    op: op_a,
                    expr: expr_a,
                },
                ExprKind::UnaryOp {
                    op: op_b,
                    expr: expr_b,
                },
            ) => {
                pending.push((&**expr_a, &**expr_b));
                op_a == op_b
            }
            (
                ExprKind::Is {
                    expr: expr_a,
                    negated: negated_a,
                    test: test_a,
                },
                ExprKind::Is {
                    expr: expr_b,
                    negated: negated_b,
                    test: test_b,
                },
            ) => {
                pending.push((&**expr_a, &**expr_b));
                let same_test = match (test_a, test_b) {
                    (IsTest::DistinctFrom(a), IsTest::DistinctFrom(b)) => {
                        pending.push((&**a, &**b));
                        true
                    }
                    (a, b) => a == b,
                };
                negated_a == negated_b && same_test
            }
            (
                ExprKind::Between {
                    expr: expr_a,
                    negated: negated_a,
                    low: low_a,
                    high: high_a,
                },
                ExprKind::Between {
                    expr: expr_b,
                    negated: negated_b,
                    low: low_b,
                    high: high_b,
                },
            ) => {
                pending.push((&**expr_a, &**expr_b));
                pending.push((&**low_a, &**low_b));
                pending.push((&**high_a, &**high_b));
                negated_a == negated_b
            }
            (
                ExprKind::InList {
                    expr: expr_a,
                    negated: negated_a,
                    list: list_a,
                },
                ExprKind::InList {
                    expr: expr_b,
                    negated: negated_b,
                    list: list_b,
                },
            ) => {
                pending.push((&**expr_a, &**expr_b));
                negated_a == negated_b && pair_lists(list_a, list_b, pending)
            }
            (
                ExprKind::InSubquery {
                    expr: expr_a,
                    negated: negated_a,
                    subquery: subquery_a,
                },
                ExprKind::InSubquery {
                    expr: expr_b,
                    negated: negated_b,
                    subquery: subquery_b,
                },
            ) => {
                pending.push((&**expr_a, &**expr_b));
                negated_a == negated_b && subquery_a == subquery_b
            }
            (
                ExprKind::Like {
                    expr: expr_a,
                    negated: negated_a,
                    case_insensitive: ci_a,
                    pattern: pattern_a,
                },
                ExprKind::Like {
                    expr: expr_b,
                    negated: negated_b,
                    case_insensitive: ci_b,
                    pattern: pattern_b,
                },
            ) => {
                pending.push((&**expr_a, &**expr_b));
                pending.push((&**pattern_a, &**pattern_b));
                negated_a == negated_b && ci_a == ci_b
            }
            (
                ExprKind::Cast {
                    expr: expr_a,
                    data_type: type_a,
                },
                ExprKind::Cast {
                    expr: expr_b,
                    data_type: type_b,
                },
            )
            | (
                ExprKind::DoubleColonCast {
                    expr: expr_a,
                    data_type: type_a,
                },
                ExprKind::DoubleColonCast {
                    expr: expr_b,
                    data_type: type_b,
                },
            ) => {
                pending.push((&**expr_a, &**expr_b));
                type_a == type_b
            }
            (
                ExprKind::Case {
                    operand: operand_a,
                    whens: whens_a,
                    else_result: else_a,
                },
                ExprKind::Case {
                    operand: operand_b,
                    whens: whens_b,
                    else_result: else_b,
                },
            ) => {
                if whens_a.len() != whens_b.len() {
                    return false;
                }
                for (a, b) in whens_a.iter().zip(whens_b) {
                    pending.push((&a.condition, &b.condition));
                    pending.push((&a.result, &b.result));
                }
                pair_options(operand_a, operand_b, pending)
                    && pair_options(else_a, else_b, pending)
            }
            (ExprKind::Exists(a), ExprKind::Exists(b))
            | (ExprKind::Subquery(a), ExprKind::Subquery(b)) => a == b,
            (ExprKind::Nested(a), ExprKind::Nested(b)) => {
                pending.push((&**a, &**b));
                true
            }
            (ExprKind::Tuple(a), ExprKind::Tuple(b)) => pair_lists(a, b, pending),
            (ExprKind::Function(a), ExprKind::Function(b)) => a == b,
            _ => false,
        }
    }
}

fn pair_lists<'a>(a: &'a [Expr], b: &'a [Expr], pending: &mut ExprPairs<'a>) -> bool {
    if a.len() != b.len() {
        return false;
    }
    pending.extend(a.iter().zip(b));
    true
}

fn pair_options<'a>(
    a: &'a Option<Box<Expr>>,
    b: &'a Option<Box<Expr>>,
    pending: &mut ExprPairs<'a>,
) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            pending.push((&**a, &**b));
            true
        }
        (None, None) => true,
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Number(CompactString),
    String(CompactString),
    Boolean(bool),
    Null,
    Placeholder(CompactString),
}

#[derive(Debug, Clone, PartialEq)]
pub enum IsTest {
    Null,
    True,
    False,
    Unknown,
    DistinctFrom(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub condition: Expr,
    pub result: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Exponent,
    StringConcat,
    /// Any other symbolic operator (`->>`, `@>`, `**`, ...).
    Custom(CompactString),
}

impl BinaryOperator {
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "=" => Self::Eq,
            "<>" | "!=" => Self::NotEq,
            "<" => Self::Lt,
            "<=" => Self::LtEq,
            ">" => Self::Gt,
            ">=" => Self::GtEq,
            "+" => Self::Plus,
            "-" => Self::Minus,
            "*" => Self::Multiply,
            "/" => Self::Divide,
            "%" => Self::Modulo,
            "^" => Self::Exponent,
            "||" => Self::StringConcat,
            other => Self::Custom(CompactString::from(other)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Or => "OR",
            Self::And => "AND",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Exponent => "^",
            Self::StringConcat => "||",
            Self::Custom(op) => op,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: ObjectName,
    pub args: FunctionArgs,
    pub filter: Option<Box<Expr>>,
    pub over: Option<WindowRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionArgs {
    /// `count(*)`
    Star,
    List {
        distinct: bool,
        args: Vec<Expr>,
        order_by: Vec<OrderByExpr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum WindowRef {
    Named(Ident),
    Spec(WindowSpec),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub frame: Option<WindowFrame>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUnits {
    Rows,
    Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowFrame {
    pub units: FrameUnits,
    pub start: FrameBound,
    /// Present for `BETWEEN start AND end`.
    pub end: Option<FrameBound>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(Box<Expr>),
    CurrentRow,
    Following(Box<Expr>),
    UnboundedFollowing,
}

// ---- DML ----

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: ObjectName,
    pub columns: Vec<Ident>,
    pub source: InsertSource,
    pub returning: Vec<SelectItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    Query(Box<Query>),
    DefaultValues,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: Ident,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: ObjectName,
    pub alias: Option<Ident>,
    pub assignments: Vec<Assignment>,
    pub from: Vec<TableWithJoins>,
    pub selection: Option<Expr>,
    pub returning: Vec<SelectItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: ObjectName,
    pub alias: Option<Ident>,
    pub using: Vec<TableWithJoins>,
    pub selection: Option<Expr>,
    pub returning: Vec<SelectItem>,
}

// ---- DDL ----

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub temporary: bool,
    pub if_not_exists: bool,
    pub name: ObjectName,
    pub elements: Vec<TableElement>,
    pub query: Option<Box<Query>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableElement {
    Column(ColumnDef),
    Constraint(TableConstraint),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: Ident,
    pub data_type: DataType,
    pub options: Vec<ColumnOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnOption {
    Null,
    NotNull,
    Default(Expr),
    PrimaryKey,
    Unique,
    Check(Expr),
    References {
        table: ObjectName,
        columns: Vec<Ident>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableConstraint {
    pub name: Option<Ident>,
    pub kind: ConstraintKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    PrimaryKey(Vec<Ident>),
    Unique(Vec<Ident>),
    ForeignKey {
        columns: Vec<Ident>,
        foreign_table: ObjectName,
        referred_columns: Vec<Ident>,
    },
    Check(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateView {
    pub or_replace: bool,
    pub temporary: bool,
    pub materialized: bool,
    pub if_not_exists: bool,
    pub name: ObjectName,
    pub columns: Vec<Ident>,
    pub query: Box<Query>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    pub unique: bool,
    pub if_not_exists: bool,
    pub name: Option<Ident>,
    pub table: ObjectName,
    pub using: Option<Ident>,
    pub columns: Vec<OrderByExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    pub if_exists: bool,
    pub name: ObjectName,
    pub actions: Vec<AlterTableAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableAction {
    AddColumn(ColumnDef),
    AddConstraint(TableConstraint),
    DropColumn {
        if_exists: bool,
        name: Ident,
        behavior: Option<DropBehavior>,
    },
    RenameColumn {
        old: Ident,
        new: Ident,
    },
    RenameTable(ObjectName),
    AlterColumn {
        name: Ident,
        op: AlterColumnOp,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterColumnOp {
    SetDefault(Expr),
    DropDefault,
    SetNotNull,
    DropNotNull,
    SetDataType(DataType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Table,
    View,
    MaterializedView,
    Index,
    Schema,
}

impl ObjectType {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Table => "TABLE",
            Self::View => "VIEW",
            Self::MaterializedView => "MATERIALIZED VIEW",
            Self::Index => "INDEX",
            Self::Schema => "SCHEMA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropBehavior {
    Cascade,
    Restrict,
}

impl DropBehavior {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::Restrict => "RESTRICT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropObjects {
    pub object_type: ObjectType,
    pub if_exists: bool,
    pub names: Vec<ObjectName>,
    pub behavior: Option<DropBehavior>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_object_name_display() {
        let name = ObjectName(smallvec![Ident::new("public"), Ident::new("\"Users\"")]);
        assert_eq!(name.to_string(), "public.\"Users\"");
    }

    #[test]
    fn test_data_type_display() {
        let ty = DataType {
            name: CompactString::from("numeric"),
            args: vec![CompactString::from("10"), CompactString::from("2")],
        };
        assert_eq!(ty.to_string(), "numeric(10, 2)");
    }

    #[test]
    fn test_binary_operator_normalizes_not_equal() {
        assert_eq!(BinaryOperator::from_symbol("!="), BinaryOperator::NotEq);
        assert_eq!(BinaryOperator::from_symbol("<>").as_str(), "<>");
        assert_eq!(BinaryOperator::from_symbol("->>").as_str(), "->>");
    }

    fn number(n: usize) -> Expr {
        Expr::new(
            ExprKind::Value(Value::Number(CompactString::from(n.to_string()))),
            Span::new(n, n + 1),
        )
    }

    fn left_deep_sum(terms: usize, offset: usize) -> Expr {
        let mut expr = number(offset);
        for i in 1..terms {
            expr = Expr::new(
                ExprKind::BinaryOp {
                    left: Box::new(expr),
                    op: BinaryOperator::Plus,
                    right: Box::new(number(offset + i)),
                },
                Span::new(offset, offset + i),
            );
        }
        expr
    }

    #[test]
    fn test_expr_equality_ignores_spans() {
        let a = left_deep_sum(3, 0);
        let mut b = left_deep_sum(3, 0);
        b.span = Span::new(40, 50);
        assert_eq!(a, b);
        assert_ne!(a, left_deep_sum(4, 0));
    }

    #[test]
    fn test_deep_expression_chain_compares_and_drops() {
        let a = left_deep_sum(200_000, 0);
        let b = left_deep_sum(200_000, 0);
        assert!(a == b);
        let ExprKind::BinaryOp { right, .. } = &b.kind else {
            panic!("expected a binary operator at the root");
        };
        assert_eq!(**right, number(199_999));
        drop(a);
        drop(b);
    }

    #[test]
    fn test_deep_set_operation_chain_compares_and_drops() {
        let select = || {
            SetExpr::Values(Values {
                rows: vec![vec![number(1)]],
            })
        };
        let chain = || {
            let mut set = select();
            for _ in 0..200_000 {
                set = SetExpr::SetOperation {
                    op: SetOperator::Union,
                    quantifier: SetQuantifier::All,
                    left: Box::new(set),
                    right: Box::new(select()),
                };
            }
            set
        };
        let (a, b) = (chain(), chain());
        assert!(a == b);
        drop(a);
        drop(b);
    }
}
