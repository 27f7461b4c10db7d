use smallvec::{smallvec, SmallVec};

use crate::ast::*;
use crate::error::{Result, SqlprettyError};
use crate::lexer::{is_reserved, tokenize};
use crate::operator_precedence::OperatorPrecedence;
use crate::stack::StackProbe;
use crate::token::{Token, TokenKind};

/// Type names that may prefix a string literal (`DATE '2024-01-01'`).
const TYPED_STRING_TYPES: &[&str] = &["date", "time", "timestamp", "timestamptz", "interval"];

/// Words that may continue a multi-word type name (`double precision`).
const TYPE_CONTINUATIONS: &[&str] = &["precision", "varying", "without", "time", "zone"];

/// Parse every statement in `source` on the current stack.
pub fn parse_statements(source: &str) -> Result<Vec<Statement>> {
    parse_statements_with(source, &StackProbe::unlimited())
}

/// Parse every statement in `source`, checking `probe` at each level of
/// recursion.
pub fn parse_statements_with(source: &str, probe: &StackProbe<'_>) -> Result<Vec<Statement>> {
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(tokens, probe);
    let statements = parser.parse_all()?;
    log::debug!("parsed {} statement(s)", statements.len());
    Ok(statements)
}

/// Recursive-descent SQL parser. Comments are dropped on construction.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    probe: &'a StackProbe<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, probe: &'a StackProbe<'a>) -> Self {
        let tokens: Vec<Token> = tokens
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .collect();
        Self {
            tokens,
            pos: 0,
            probe,
        }
    }

    // ---- Token helpers ----

    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn advance(&mut self) {
        if self.peek().kind != TokenKind::Eof {
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> Token {
        let tok = self.peek().clone();
        self.advance();
        tok
    }

    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .map(|i| self.tokens[i].epos)
            .unwrap_or(0)
    }

    fn parse_keyword(&mut self, kw: &str) -> bool {
        if self.peek().is_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the whole keyword sequence or nothing.
    fn parse_keywords(&mut self, kws: &[&str]) -> bool {
        if kws.iter().enumerate().all(|(i, kw)| self.peek_nth(i).is_keyword(kw)) {
            self.pos += kws.len();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<()> {
        if self.parse_keyword(kw) {
            Ok(())
        } else {
            self.expected(kw)
        }
    }

    fn expect_keywords(&mut self, kws: &[&str]) -> Result<()> {
        for kw in kws {
            self.expect_keyword(kw)?;
        }
        Ok(())
    }

    /// Match a word that may be lexed as either a keyword or an identifier.
    fn peek_word(&self, word: &str) -> bool {
        let tok = self.peek();
        matches!(tok.kind, TokenKind::Keyword | TokenKind::Identifier)
            && tok.text.eq_ignore_ascii_case(word)
    }

    fn parse_word(&mut self, word: &str) -> bool {
        if self.peek_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume_punct(&mut self, p: &str) -> bool {
        if self.peek().is_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) -> Result<()> {
        if self.consume_punct(p) {
            Ok(())
        } else {
            self.expected(&format!("'{}'", p))
        }
    }

    fn expected<T>(&self, what: &str) -> Result<T> {
        let tok = self.peek();
        Err(SqlprettyError::parse(tok.spos, what, tok.describe()))
    }

    fn at_query_start(&self) -> bool {
        let tok = self.peek();
        tok.is_keyword("SELECT") || tok.is_keyword("WITH") || tok.is_keyword("VALUES")
    }

    /// Whether the tokens from here, after any run of `(`, start a query.
    fn at_parenthesized_query(&self) -> bool {
        let mut n = 0;
        while self.peek_nth(n).is_punct("(") {
            n += 1;
        }
        let tok = self.peek_nth(n);
        n > 0 && (tok.is_keyword("SELECT") || tok.is_keyword("WITH") || tok.is_keyword("VALUES"))
    }

    fn parse_comma_separated<T>(
        &mut self,
        mut f: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut items = vec![f(self)?];
        while self.consume_punct(",") {
            items.push(f(self)?);
        }
        Ok(items)
    }

    // ---- Identifiers ----

    /// An identifier, quoted identifier, or non-reserved keyword.
    fn parse_identifier(&mut self) -> Result<Ident> {
        let tok = self.peek();
        let ok = match tok.kind {
            TokenKind::Identifier | TokenKind::QuotedIdentifier => true,
            TokenKind::Keyword => !is_reserved(&tok.text),
            _ => false,
        };
        if !ok {
            return self.expected("identifier");
        }
        let ident = Ident::new(&tok.text);
        self.advance();
        Ok(ident)
    }

    /// Any word, reserved keywords included (after `AS` and `.`).
    fn parse_label(&mut self) -> Result<Ident> {
        let tok = self.peek();
        if !matches!(
            tok.kind,
            TokenKind::Identifier | TokenKind::QuotedIdentifier | TokenKind::Keyword
        ) {
            return self.expected("identifier");
        }
        let ident = Ident::new(&tok.text);
        self.advance();
        Ok(ident)
    }

    fn parse_object_name(&mut self) -> Result<ObjectName> {
        let mut parts: SmallVec<[Ident; 2]> = smallvec![self.parse_identifier()?];
        while self.consume_punct(".") {
            parts.push(self.parse_label()?);
        }
        Ok(ObjectName(parts))
    }

    fn parse_parenthesized_idents(&mut self) -> Result<Vec<Ident>> {
        self.expect_punct("(")?;
        let idents = self.parse_comma_separated(Self::parse_identifier)?;
        self.expect_punct(")")?;
        Ok(idents)
    }

    fn parse_optional_alias(&mut self) -> Result<Option<Ident>> {
        if self.parse_keyword("AS") {
            return Ok(Some(self.parse_label()?));
        }
        if self.peek().kind.is_identifier() {
            return Ok(Some(Ident::new(&self.next_token().text)));
        }
        Ok(None)
    }

    fn parse_data_type(&mut self) -> Result<DataType> {
        let first = self.parse_identifier()?;
        let mut name = first.value;
        loop {
            let tok = self.peek();
            let continues = tok.kind == TokenKind::Identifier
                && TYPE_CONTINUATIONS
                    .iter()
                    .any(|w| tok.text.eq_ignore_ascii_case(w));
            let with_time_zone = tok.is_keyword("WITH") && {
                let next = self.peek_nth(1);
                next.kind == TokenKind::Identifier && next.text.eq_ignore_ascii_case("time")
            };
            if !(continues || with_time_zone) {
                break;
            }
            name.push(' ');
            name.push_str(&self.next_token().text);
        }

        let mut args = Vec::new();
        if self.consume_punct("(") {
            args = self.parse_comma_separated(|p| {
                let tok = p.peek();
                if matches!(tok.kind, TokenKind::Number | TokenKind::Identifier) {
                    Ok(p.next_token().text)
                } else {
                    p.expected("type modifier")
                }
            })?;
            self.expect_punct(")")?;
        }
        Ok(DataType { name, args })
    }

    // ---- Statements ----

    fn parse_all(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            while self.consume_punct(";") {}
            if self.peek().kind == TokenKind::Eof {
                break;
            }
            let start = self.peek().spos;
            let body = self.parse_statement()?;
            let mut end = self.prev_end();
            let terminated = if self.peek().is_punct(";") {
                end = self.peek().epos;
                self.advance();
                true
            } else if self.peek().kind == TokenKind::Eof {
                false
            } else {
                return self.expected("';' or end of input");
            };
            statements.push(Statement {
                body,
                span: Span::new(start, end),
                terminated,
            });
        }
        Ok(statements)
    }

    pub fn parse_statement(&mut self) -> Result<StatementBody> {
        let tok = self.peek();
        if self.at_query_start() || tok.is_punct("(") {
            return Ok(StatementBody::Query(Box::new(self.parse_query()?)));
        }
        if tok.is_keyword("INSERT") {
            return self.parse_insert().map(StatementBody::Insert);
        }
        if tok.is_keyword("UPDATE") {
            return self.parse_update().map(StatementBody::Update);
        }
        if tok.is_keyword("DELETE") {
            return self.parse_delete().map(StatementBody::Delete);
        }
        if tok.is_keyword("CREATE") {
            return self.parse_create();
        }
        if tok.is_keyword("ALTER") {
            return self.parse_alter_table().map(StatementBody::AlterTable);
        }
        if tok.is_keyword("DROP") {
            return self.parse_drop().map(StatementBody::Drop);
        }
        self.expected("statement")
    }

    // ---- Queries ----

    pub fn parse_query(&mut self) -> Result<Query> {
        self.probe.check()?;
        let start = self.peek().spos;
        let with = if self.parse_keyword("WITH") {
            Some(self.parse_with()?)
        } else {
            None
        };
        let body = self.parse_set_expr(0)?;
        let order_by = if self.parse_keywords(&["ORDER", "BY"]) {
            self.parse_comma_separated(Self::parse_order_by_expr)?
        } else {
            Vec::new()
        };

        let mut limit = None;
        let mut offset = None;
        loop {
            if limit.is_none() && self.parse_keyword("LIMIT") {
                limit = Some(if self.parse_keyword("ALL") {
                    Limit::All
                } else {
                    Limit::Count(self.parse_expr()?)
                });
                continue;
            }
            if offset.is_none() && self.parse_keyword("OFFSET") {
                let value = self.parse_expr()?;
                let rows = if self.parse_keyword("ROWS") {
                    OffsetRows::Rows
                } else if self.parse_keyword("ROW") {
                    OffsetRows::Row
                } else {
                    OffsetRows::None
                };
                offset = Some(Offset { value, rows });
                continue;
            }
            break;
        }

        Ok(Query {
            with,
            body,
            order_by,
            limit,
            offset,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_with(&mut self) -> Result<With> {
        let recursive = self.parse_keyword("RECURSIVE");
        let ctes = self.parse_comma_separated(|p| {
            let name = p.parse_identifier()?;
            let columns = if p.peek().is_punct("(") {
                p.parse_parenthesized_idents()?
            } else {
                Vec::new()
            };
            p.expect_keyword("AS")?;
            p.expect_punct("(")?;
            let query = p.parse_query()?;
            p.expect_punct(")")?;
            Ok(Cte {
                name,
                columns,
                query,
            })
        })?;
        Ok(With { recursive, ctes })
    }

    /// Set operations by precedence: INTERSECT (2) binds tighter than UNION
    /// and EXCEPT (1). All are left-associative.
    fn parse_set_expr(&mut self, min_prec: u8) -> Result<SetExpr> {
        self.probe.check()?;
        let mut left = self.parse_set_operand()?;
        loop {
            let tok = self.peek();
            let (op, prec) = if tok.is_keyword("UNION") {
                (SetOperator::Union, 1)
            } else if tok.is_keyword("EXCEPT") {
                (SetOperator::Except, 1)
            } else if tok.is_keyword("INTERSECT") {
                (SetOperator::Intersect, 2)
            } else {
                break;
            };
            if prec <= min_prec {
                break;
            }
            self.advance();
            let quantifier = if self.parse_keyword("ALL") {
                SetQuantifier::All
            } else if self.parse_keyword("DISTINCT") {
                SetQuantifier::Distinct
            } else {
                SetQuantifier::None
            };
            let right = self.parse_set_expr(prec)?;
            left = SetExpr::SetOperation {
                op,
                quantifier,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_set_operand(&mut self) -> Result<SetExpr> {
        if self.peek().is_keyword("SELECT") {
            return Ok(SetExpr::Select(Box::new(self.parse_select()?)));
        }
        if self.parse_keyword("VALUES") {
            let rows = self.parse_comma_separated(|p| {
                p.expect_punct("(")?;
                let row = p.parse_comma_separated(Self::parse_expr)?;
                p.expect_punct(")")?;
                Ok(row)
            })?;
            return Ok(SetExpr::Values(Values { rows }));
        }
        if self.consume_punct("(") {
            let query = self.parse_query()?;
            self.expect_punct(")")?;
            return Ok(SetExpr::Query(Box::new(query)));
        }
        self.expected("SELECT, VALUES or '('")
    }

    fn parse_select(&mut self) -> Result<Select> {
        let start = self.peek().spos;
        self.expect_keyword("SELECT")?;
        let distinct = if self.parse_keyword("ALL") {
            Some(Distinct::All)
        } else if self.parse_keyword("DISTINCT") {
            if self.parse_keyword("ON") {
                self.expect_punct("(")?;
                let exprs = self.parse_comma_separated(Self::parse_expr)?;
                self.expect_punct(")")?;
                Some(Distinct::On(exprs))
            } else {
                Some(Distinct::Distinct)
            }
        } else {
            None
        };

        let projection = self.parse_comma_separated(Self::parse_select_item)?;

        let from = if self.parse_keyword("FROM") {
            self.parse_comma_separated(Self::parse_table_with_joins)?
        } else {
            Vec::new()
        };
        let selection = if self.parse_keyword("WHERE") {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let group_by = if self.parse_keywords(&["GROUP", "BY"]) {
            self.parse_comma_separated(Self::parse_expr)?
        } else {
            Vec::new()
        };
        let having = if self.parse_keyword("HAVING") {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(Select {
            distinct,
            projection,
            from,
            selection,
            group_by,
            having,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_select_item(&mut self) -> Result<SelectItem> {
        if self.peek().is_operator("*") {
            self.advance();
            return Ok(SelectItem::Wildcard);
        }
        let expr = self.parse_expr()?;
        let alias = self.parse_optional_alias()?;
        Ok(SelectItem::Expr { expr, alias })
    }

    fn parse_order_by_expr(&mut self) -> Result<OrderByExpr> {
        let expr = self.parse_expr()?;
        let asc = if self.parse_keyword("ASC") {
            Some(true)
        } else if self.parse_keyword("DESC") {
            Some(false)
        } else {
            None
        };
        let nulls_first = if self.parse_keywords(&["NULLS", "FIRST"]) {
            Some(true)
        } else if self.parse_keywords(&["NULLS", "LAST"]) {
            Some(false)
        } else {
            None
        };
        Ok(OrderByExpr {
            expr,
            asc,
            nulls_first,
        })
    }

    fn parse_table_with_joins(&mut self) -> Result<TableWithJoins> {
        let relation = self.parse_table_factor()?;
        let mut joins = Vec::new();
        loop {
            let natural = self.parse_keyword("NATURAL");
            let operator = if self.parse_keywords(&["CROSS", "JOIN"]) {
                JoinOperator::Cross
            } else if self.parse_keywords(&["INNER", "JOIN"]) || self.parse_keyword("JOIN") {
                JoinOperator::Inner
            } else if self.parse_keyword("LEFT") {
                self.parse_keyword("OUTER");
                self.expect_keyword("JOIN")?;
                JoinOperator::Left
            } else if self.parse_keyword("RIGHT") {
                self.parse_keyword("OUTER");
                self.expect_keyword("JOIN")?;
                JoinOperator::Right
            } else if self.parse_keyword("FULL") {
                self.parse_keyword("OUTER");
                self.expect_keyword("JOIN")?;
                JoinOperator::Full
            } else if natural {
                return self.expected("JOIN");
            } else {
                break;
            };

            let relation = self.parse_table_factor()?;
            let constraint = if self.parse_keyword("ON") {
                JoinConstraint::On(self.parse_expr()?)
            } else if self.parse_keyword("USING") {
                JoinConstraint::Using(self.parse_parenthesized_idents()?)
            } else {
                JoinConstraint::None
            };
            joins.push(Join {
                natural,
                operator,
                relation,
                constraint,
            });
        }
        Ok(TableWithJoins { relation, joins })
    }

    fn parse_table_factor(&mut self) -> Result<TableFactor> {
        self.probe.check()?;
        if self.parse_keyword("LATERAL") {
            self.expect_punct("(")?;
            let subquery = self.parse_query()?;
            self.expect_punct(")")?;
            let alias = self.parse_optional_alias()?;
            return Ok(TableFactor::Derived {
                lateral: true,
                subquery: Box::new(subquery),
                alias,
            });
        }

        if self.peek().is_punct("(") {
            if self.at_parenthesized_query() {
                self.advance();
                let subquery = self.parse_query()?;
                self.expect_punct(")")?;
                let alias = self.parse_optional_alias()?;
                return Ok(TableFactor::Derived {
                    lateral: false,
                    subquery: Box::new(subquery),
                    alias,
                });
            }
            self.advance();
            let join = self.parse_table_with_joins()?;
            self.expect_punct(")")?;
            let alias = self.parse_optional_alias()?;
            return Ok(TableFactor::NestedJoin {
                join: Box::new(join),
                alias,
            });
        }

        let name = self.parse_object_name()?;
        if self.peek().is_punct("(") {
            let call = self.parse_function(name)?;
            let alias = self.parse_optional_alias()?;
            return Ok(TableFactor::Function {
                call: Box::new(call),
                alias,
            });
        }
        let alias = self.parse_optional_alias()?;
        Ok(TableFactor::Table { name, alias })
    }

    // ---- Expressions ----

    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_subexpr(OperatorPrecedence::Lowest)
    }

    /// Precedence climbing: keep folding infix operators that bind tighter
    /// than `min`.
    fn parse_subexpr(&mut self, min: OperatorPrecedence) -> Result<Expr> {
        self.probe.check()?;
        let start = self.peek().spos;
        let mut expr = self.parse_prefix()?;
        loop {
            let Some(prec) = OperatorPrecedence::of_infix(self.peek(), self.peek_nth(1)) else {
                break;
            };
            if prec <= min {
                break;
            }
            let kind = self.parse_infix(expr, prec)?;
            expr = self.spanned(start, kind);
        }
        Ok(expr)
    }

    /// Wraps `kind` with the span from `start` to the last consumed token.
    fn spanned(&self, start: usize, kind: ExprKind) -> Expr {
        Expr::new(kind, Span::new(start, self.prev_end()))
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        let start = self.peek().spos;
        let kind = self.parse_prefix_kind()?;
        Ok(self.spanned(start, kind))
    }

    fn parse_prefix_kind(&mut self) -> Result<ExprKind> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Keyword => {
                let kw = tok.text.to_ascii_uppercase();
                match kw.as_str() {
                    "NOT" => {
                        self.advance();
                        let expr = self.parse_subexpr(OperatorPrecedence::Not)?;
                        Ok(ExprKind::UnaryOp {
                            op: UnaryOperator::Not,
                            expr: Box::new(expr),
                        })
                    }
                    "NULL" => {
                        self.advance();
                        Ok(ExprKind::Value(Value::Null))
                    }
                    "TRUE" | "FALSE" => {
                        self.advance();
                        Ok(ExprKind::Value(Value::Boolean(kw == "TRUE")))
                    }
                    "CASE" => self.parse_case(),
                    "CAST" => self.parse_cast(),
                    "EXISTS" => {
                        self.advance();
                        self.expect_punct("(")?;
                        let query = self.parse_query()?;
                        self.expect_punct(")")?;
                        Ok(ExprKind::Exists(Box::new(query)))
                    }
                    _ if self.peek_nth(1).is_punct("(") => {
                        // Keyword used as a function name: LEFT(s, 3), REPLACE(...)
                        self.advance();
                        let name = ObjectName(smallvec![Ident::new(&tok.text)]);
                        Ok(ExprKind::Function(Box::new(self.parse_function(name)?)))
                    }
                    _ if !is_reserved(&tok.text) => self.parse_identifier_expr(),
                    _ => self.expected("expression"),
                }
            }
            TokenKind::Identifier => {
                let next = self.peek_nth(1);
                if next.kind == TokenKind::String
                    && TYPED_STRING_TYPES
                        .iter()
                        .any(|t| tok.text.eq_ignore_ascii_case(t))
                {
                    self.advance();
                    let value = self.next_token().text;
                    return Ok(ExprKind::TypedString {
                        data_type: tok.text,
                        value,
                    });
                }
                self.parse_identifier_expr()
            }
            TokenKind::QuotedIdentifier => self.parse_identifier_expr(),
            TokenKind::Number => {
                self.advance();
                Ok(ExprKind::Value(Value::Number(tok.text)))
            }
            TokenKind::String => {
                self.advance();
                Ok(ExprKind::Value(Value::String(tok.text)))
            }
            TokenKind::Parameter => {
                self.advance();
                Ok(ExprKind::Value(Value::Placeholder(tok.text)))
            }
            TokenKind::Operator if tok.text == "-" || tok.text == "+" => {
                self.advance();
                let expr = self.parse_subexpr(OperatorPrecedence::Unary)?;
                let op = if tok.text == "-" {
                    UnaryOperator::Minus
                } else {
                    UnaryOperator::Plus
                };
                Ok(ExprKind::UnaryOp {
                    op,
                    expr: Box::new(expr),
                })
            }
            TokenKind::Punctuation if tok.text == "(" => self.parse_parenthesized(),
            _ => self.expected("expression"),
        }
    }

    /// Identifier, `a.b.c`, `t.*`, or a function call.
    fn parse_identifier_expr(&mut self) -> Result<ExprKind> {
        let mut parts: SmallVec<[Ident; 2]> = smallvec![Ident::new(&self.next_token().text)];
        while self.consume_punct(".") {
            if self.peek().is_operator("*") {
                self.advance();
                return Ok(ExprKind::QualifiedWildcard(ObjectName(parts)));
            }
            parts.push(self.parse_label()?);
        }
        if self.peek().is_punct("(") {
            let call = self.parse_function(ObjectName(parts))?;
            return Ok(ExprKind::Function(Box::new(call)));
        }
        if parts.len() == 1 {
            let ident = parts.remove(0);
            Ok(ExprKind::Identifier(ident))
        } else {
            Ok(ExprKind::CompoundIdentifier(ObjectName(parts)))
        }
    }

    fn parse_parenthesized(&mut self) -> Result<ExprKind> {
        self.expect_punct("(")?;
        if self.at_query_start() {
            let query = self.parse_query()?;
            self.expect_punct(")")?;
            return Ok(ExprKind::Subquery(Box::new(query)));
        }
        let first = self.parse_expr()?;
        if self.consume_punct(",") {
            let mut items = vec![first];
            items.extend(self.parse_comma_separated(Self::parse_expr)?);
            self.expect_punct(")")?;
            return Ok(ExprKind::Tuple(items));
        }
        self.expect_punct(")")?;
        Ok(ExprKind::Nested(Box::new(first)))
    }

    fn parse_infix(&mut self, left: Expr, prec: OperatorPrecedence) -> Result<ExprKind> {
        let tok = self.next_token();
        let left = Box::new(left);
        if tok.kind == TokenKind::Operator {
            if tok.text == "::" {
                let data_type = self.parse_data_type()?;
                return Ok(ExprKind::DoubleColonCast {
                    expr: left,
                    data_type,
                });
            }
            let right = self.parse_subexpr(prec)?;
            return Ok(ExprKind::BinaryOp {
                left,
                op: BinaryOperator::from_symbol(&tok.text),
                right: Box::new(right),
            });
        }

        let kw = tok.text.to_ascii_uppercase();
        match kw.as_str() {
            "OR" | "AND" => {
                let right = self.parse_subexpr(prec)?;
                let op = if kw == "OR" {
                    BinaryOperator::Or
                } else {
                    BinaryOperator::And
                };
                Ok(ExprKind::BinaryOp {
                    left,
                    op,
                    right: Box::new(right),
                })
            }
            "IS" => {
                let negated = self.parse_keyword("NOT");
                let test = if self.parse_keyword("NULL") {
                    IsTest::Null
                } else if self.parse_keyword("TRUE") {
                    IsTest::True
                } else if self.parse_keyword("FALSE") {
                    IsTest::False
                } else if self.parse_keyword("UNKNOWN") {
                    IsTest::Unknown
                } else if self.parse_keywords(&["DISTINCT", "FROM"]) {
                    IsTest::DistinctFrom(Box::new(self.parse_subexpr(OperatorPrecedence::Is)?))
                } else {
                    return self.expected("NULL, TRUE, FALSE, UNKNOWN or DISTINCT FROM");
                };
                Ok(ExprKind::Is {
                    expr: left,
                    negated,
                    test,
                })
            }
            "NOT" => {
                let kw = self.next_token().text.to_ascii_uppercase();
                self.parse_membership(left, true, &kw)
            }
            _ => self.parse_membership(left, false, &kw),
        }
    }

    /// The tail of `[NOT] BETWEEN`, `[NOT] IN`, `[NOT] LIKE`, `[NOT] ILIKE`.
    fn parse_membership(
        &mut self,
        expr: Box<Expr>,
        negated: bool,
        kw: &str,
    ) -> Result<ExprKind> {
        match kw {
            "BETWEEN" => {
                let low = self.parse_subexpr(OperatorPrecedence::Membership)?;
                self.expect_keyword("AND")?;
                let high = self.parse_subexpr(OperatorPrecedence::Membership)?;
                Ok(ExprKind::Between {
                    expr,
                    negated,
                    low: Box::new(low),
                    high: Box::new(high),
                })
            }
            "IN" => {
                self.expect_punct("(")?;
                if self.at_query_start() {
                    let subquery = self.parse_query()?;
                    self.expect_punct(")")?;
                    return Ok(ExprKind::InSubquery {
                        expr,
                        negated,
                        subquery: Box::new(subquery),
                    });
                }
                let list = self.parse_comma_separated(Self::parse_expr)?;
                self.expect_punct(")")?;
                Ok(ExprKind::InList {
                    expr,
                    negated,
                    list,
                })
            }
            "LIKE" | "ILIKE" => {
                let pattern = self.parse_subexpr(OperatorPrecedence::Membership)?;
                Ok(ExprKind::Like {
                    expr,
                    negated,
                    case_insensitive: kw == "ILIKE",
                    pattern: Box::new(pattern),
                })
            }
            _ => self.expected("BETWEEN, IN, LIKE or ILIKE"),
        }
    }

    fn parse_case(&mut self) -> Result<ExprKind> {
        self.expect_keyword("CASE")?;
        let operand = if self.peek().is_keyword("WHEN") {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let mut whens = Vec::new();
        while self.parse_keyword("WHEN") {
            let condition = self.parse_expr()?;
            self.expect_keyword("THEN")?;
            let result = self.parse_expr()?;
            whens.push(WhenClause { condition, result });
        }
        if whens.is_empty() {
            return self.expected("WHEN");
        }
        let else_result = if self.parse_keyword("ELSE") {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect_keyword("END")?;
        Ok(ExprKind::Case {
            operand,
            whens,
            else_result,
        })
    }

    fn parse_cast(&mut self) -> Result<ExprKind> {
        self.expect_keyword("CAST")?;
        self.expect_punct("(")?;
        let expr = self.parse_expr()?;
        self.expect_keyword("AS")?;
        let data_type = self.parse_data_type()?;
        self.expect_punct(")")?;
        Ok(ExprKind::Cast {
            expr: Box::new(expr),
            data_type,
        })
    }

    fn parse_function(&mut self, name: ObjectName) -> Result<Function> {
        self.expect_punct("(")?;
        let args = if self.peek().is_operator("*") && self.peek_nth(1).is_punct(")") {
            self.advance();
            FunctionArgs::Star
        } else {
            let distinct = self.parse_keyword("DISTINCT");
            let args = if self.peek().is_punct(")") {
                Vec::new()
            } else if self.at_query_start() {
                let start = self.peek().spos;
                let query = self.parse_query()?;
                vec![self.spanned(start, ExprKind::Subquery(Box::new(query)))]
            } else {
                self.parse_comma_separated(Self::parse_expr)?
            };
            let order_by = if self.parse_keywords(&["ORDER", "BY"]) {
                self.parse_comma_separated(Self::parse_order_by_expr)?
            } else {
                Vec::new()
            };
            FunctionArgs::List {
                distinct,
                args,
                order_by,
            }
        };
        self.expect_punct(")")?;

        let filter = if self.peek().is_keyword("FILTER") && self.peek_nth(1).is_punct("(") {
            self.advance();
            self.advance();
            self.expect_keyword("WHERE")?;
            let condition = self.parse_expr()?;
            self.expect_punct(")")?;
            Some(Box::new(condition))
        } else {
            None
        };

        let over = if self.parse_keyword("OVER") {
            if self.peek().is_punct("(") {
                Some(WindowRef::Spec(self.parse_window_spec()?))
            } else {
                Some(WindowRef::Named(self.parse_identifier()?))
            }
        } else {
            None
        };

        Ok(Function {
            name,
            args,
            filter,
            over,
        })
    }

    fn parse_window_spec(&mut self) -> Result<WindowSpec> {
        self.expect_punct("(")?;
        let partition_by = if self.parse_keywords(&["PARTITION", "BY"]) {
            self.parse_comma_separated(Self::parse_expr)?
        } else {
            Vec::new()
        };
        let order_by = if self.parse_keywords(&["ORDER", "BY"]) {
            self.parse_comma_separated(Self::parse_order_by_expr)?
        } else {
            Vec::new()
        };
        let units = if self.parse_keyword("ROWS") {
            Some(FrameUnits::Rows)
        } else if self.parse_keyword("RANGE") {
            Some(FrameUnits::Range)
        } else {
            None
        };
        let frame = match units {
            Some(units) => {
                if self.parse_keyword("BETWEEN") {
                    let start = self.parse_frame_bound()?;
                    self.expect_keyword("AND")?;
                    let end = self.parse_frame_bound()?;
                    Some(WindowFrame {
                        units,
                        start,
                        end: Some(end),
                    })
                } else {
                    let start = self.parse_frame_bound()?;
                    Some(WindowFrame {
                        units,
                        start,
                        end: None,
                    })
                }
            }
            None => None,
        };
        self.expect_punct(")")?;
        Ok(WindowSpec {
            partition_by,
            order_by,
            frame,
        })
    }

    fn parse_frame_bound(&mut self) -> Result<FrameBound> {
        if self.parse_keywords(&["CURRENT", "ROW"]) {
            return Ok(FrameBound::CurrentRow);
        }
        if self.parse_keyword("UNBOUNDED") {
            if self.parse_keyword("PRECEDING") {
                return Ok(FrameBound::UnboundedPreceding);
            }
            self.expect_keyword("FOLLOWING")?;
            return Ok(FrameBound::UnboundedFollowing);
        }
        let offset = Box::new(self.parse_subexpr(OperatorPrecedence::And)?);
        if self.parse_keyword("PRECEDING") {
            return Ok(FrameBound::Preceding(offset));
        }
        self.expect_keyword("FOLLOWING")?;
        Ok(FrameBound::Following(offset))
    }

    // ---- DML ----

    fn parse_returning(&mut self) -> Result<Vec<SelectItem>> {
        if self.parse_keyword("RETURNING") {
            self.parse_comma_separated(Self::parse_select_item)
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_insert(&mut self) -> Result<Insert> {
        self.expect_keywords(&["INSERT", "INTO"])?;
        let table = self.parse_object_name()?;
        let columns = if self.peek().is_punct("(") && !self.at_parenthesized_query() {
            self.parse_parenthesized_idents()?
        } else {
            Vec::new()
        };
        let source = if self.parse_keywords(&["DEFAULT", "VALUES"]) {
            InsertSource::DefaultValues
        } else {
            InsertSource::Query(Box::new(self.parse_query()?))
        };
        let returning = self.parse_returning()?;
        Ok(Insert {
            table,
            columns,
            source,
            returning,
        })
    }

    fn parse_update(&mut self) -> Result<Update> {
        self.expect_keyword("UPDATE")?;
        let table = self.parse_object_name()?;
        let alias = self.parse_optional_alias()?;
        self.expect_keyword("SET")?;
        let assignments = self.parse_comma_separated(|p| {
            let column = p.parse_identifier()?;
            if !p.peek().is_operator("=") {
                return p.expected("'='");
            }
            p.advance();
            let value = p.parse_expr()?;
            Ok(Assignment { column, value })
        })?;
        let from = if self.parse_keyword("FROM") {
            self.parse_comma_separated(Self::parse_table_with_joins)?
        } else {
            Vec::new()
        };
        let selection = if self.parse_keyword("WHERE") {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let returning = self.parse_returning()?;
        Ok(Update {
            table,
            alias,
            assignments,
            from,
            selection,
            returning,
        })
    }

    fn parse_delete(&mut self) -> Result<Delete> {
        self.expect_keywords(&["DELETE", "FROM"])?;
        let table = self.parse_object_name()?;
        let alias = self.parse_optional_alias()?;
        let using = if self.parse_keyword("USING") {
            self.parse_comma_separated(Self::parse_table_with_joins)?
        } else {
            Vec::new()
        };
        let selection = if self.parse_keyword("WHERE") {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let returning = self.parse_returning()?;
        Ok(Delete {
            table,
            alias,
            using,
            selection,
            returning,
        })
    }

    // ---- DDL ----

    fn parse_if_not_exists(&mut self) -> bool {
        self.parse_keywords(&["IF", "NOT", "EXISTS"])
    }

    fn parse_if_exists(&mut self) -> bool {
        self.parse_keywords(&["IF", "EXISTS"])
    }

    fn parse_drop_behavior(&mut self) -> Option<DropBehavior> {
        if self.parse_keyword("CASCADE") {
            Some(DropBehavior::Cascade)
        } else if self.parse_keyword("RESTRICT") {
            Some(DropBehavior::Restrict)
        } else {
            None
        }
    }

    fn parse_create(&mut self) -> Result<StatementBody> {
        self.expect_keyword("CREATE")?;
        let or_replace = self.parse_keywords(&["OR", "REPLACE"]);
        let temporary = self.parse_keyword("TEMPORARY") || self.parse_keyword("TEMP");
        let unique = self.parse_keyword("UNIQUE");
        let materialized = self.parse_keyword("MATERIALIZED");

        if self.peek().is_keyword("VIEW") && !unique {
            self.advance();
            let if_not_exists = self.parse_if_not_exists();
            let name = self.parse_object_name()?;
            let columns = if self.peek().is_punct("(") {
                self.parse_parenthesized_idents()?
            } else {
                Vec::new()
            };
            self.expect_keyword("AS")?;
            let query = self.parse_query()?;
            return Ok(StatementBody::CreateView(CreateView {
                or_replace,
                temporary,
                materialized,
                if_not_exists,
                name,
                columns,
                query: Box::new(query),
            }));
        }
        if materialized {
            return self.expected("VIEW");
        }
        if self.peek().is_keyword("INDEX") && !or_replace && !temporary {
            self.advance();
            return self.parse_create_index(unique).map(StatementBody::CreateIndex);
        }
        if unique {
            return self.expected("INDEX");
        }
        if self.peek().is_keyword("TABLE") && !or_replace {
            self.advance();
            return self
                .parse_create_table(temporary)
                .map(StatementBody::CreateTable);
        }
        self.expected("TABLE, VIEW or INDEX")
    }

    fn parse_create_table(&mut self, temporary: bool) -> Result<CreateTable> {
        let if_not_exists = self.parse_if_not_exists();
        let name = self.parse_object_name()?;
        if self.parse_keyword("AS") {
            let query = self.parse_query()?;
            return Ok(CreateTable {
                temporary,
                if_not_exists,
                name,
                elements: Vec::new(),
                query: Some(Box::new(query)),
            });
        }
        self.expect_punct("(")?;
        let elements = self.parse_comma_separated(|p| {
            if p.at_table_constraint() {
                p.parse_table_constraint().map(TableElement::Constraint)
            } else {
                p.parse_column_def().map(TableElement::Column)
            }
        })?;
        self.expect_punct(")")?;
        Ok(CreateTable {
            temporary,
            if_not_exists,
            name,
            elements,
            query: None,
        })
    }

    fn at_table_constraint(&self) -> bool {
        ["CONSTRAINT", "PRIMARY", "UNIQUE", "FOREIGN", "CHECK"]
            .iter()
            .any(|kw| self.peek().is_keyword(kw))
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.parse_identifier()?;
        let data_type = self.parse_data_type()?;
        let mut options = Vec::new();
        loop {
            let option = if self.parse_keywords(&["NOT", "NULL"]) {
                ColumnOption::NotNull
            } else if self.parse_keyword("NULL") {
                ColumnOption::Null
            } else if self.parse_keyword("DEFAULT") {
                ColumnOption::Default(self.parse_expr()?)
            } else if self.parse_keywords(&["PRIMARY", "KEY"]) {
                ColumnOption::PrimaryKey
            } else if self.parse_keyword("UNIQUE") {
                ColumnOption::Unique
            } else if self.parse_keyword("CHECK") {
                ColumnOption::Check(self.parse_check_body()?)
            } else if self.parse_keyword("REFERENCES") {
                let table = self.parse_object_name()?;
                let columns = if self.peek().is_punct("(") {
                    self.parse_parenthesized_idents()?
                } else {
                    Vec::new()
                };
                ColumnOption::References { table, columns }
            } else {
                break;
            };
            options.push(option);
        }
        Ok(ColumnDef {
            name,
            data_type,
            options,
        })
    }

    fn parse_check_body(&mut self) -> Result<Expr> {
        self.expect_punct("(")?;
        let expr = self.parse_expr()?;
        self.expect_punct(")")?;
        Ok(expr)
    }

    fn parse_table_constraint(&mut self) -> Result<TableConstraint> {
        let name = if self.parse_keyword("CONSTRAINT") {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        let kind = if self.parse_keywords(&["PRIMARY", "KEY"]) {
            ConstraintKind::PrimaryKey(self.parse_parenthesized_idents()?)
        } else if self.parse_keyword("UNIQUE") {
            ConstraintKind::Unique(self.parse_parenthesized_idents()?)
        } else if self.parse_keywords(&["FOREIGN", "KEY"]) {
            let columns = self.parse_parenthesized_idents()?;
            self.expect_keyword("REFERENCES")?;
            let foreign_table = self.parse_object_name()?;
            let referred_columns = if self.peek().is_punct("(") {
                self.parse_parenthesized_idents()?
            } else {
                Vec::new()
            };
            ConstraintKind::ForeignKey {
                columns,
                foreign_table,
                referred_columns,
            }
        } else if self.parse_keyword("CHECK") {
            ConstraintKind::Check(self.parse_check_body()?)
        } else {
            return self.expected("PRIMARY KEY, UNIQUE, FOREIGN KEY or CHECK");
        };
        Ok(TableConstraint { name, kind })
    }

    fn parse_create_index(&mut self, unique: bool) -> Result<CreateIndex> {
        let if_not_exists = self.parse_if_not_exists();
        let name = if self.peek().is_keyword("ON") {
            None
        } else {
            Some(self.parse_identifier()?)
        };
        self.expect_keyword("ON")?;
        let table = self.parse_object_name()?;
        let using = if self.parse_keyword("USING") {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        self.expect_punct("(")?;
        let columns = self.parse_comma_separated(Self::parse_order_by_expr)?;
        self.expect_punct(")")?;
        Ok(CreateIndex {
            unique,
            if_not_exists,
            name,
            table,
            using,
            columns,
        })
    }

    fn parse_alter_table(&mut self) -> Result<AlterTable> {
        self.expect_keywords(&["ALTER", "TABLE"])?;
        let if_exists = self.parse_if_exists();
        let name = self.parse_object_name()?;
        let actions = self.parse_comma_separated(Self::parse_alter_table_action)?;
        Ok(AlterTable {
            if_exists,
            name,
            actions,
        })
    }

    fn parse_alter_table_action(&mut self) -> Result<AlterTableAction> {
        if self.parse_keyword("ADD") {
            if self.at_table_constraint() {
                return self
                    .parse_table_constraint()
                    .map(AlterTableAction::AddConstraint);
            }
            self.parse_keyword("COLUMN");
            return self.parse_column_def().map(AlterTableAction::AddColumn);
        }
        if self.parse_keyword("DROP") {
            self.parse_keyword("COLUMN");
            let if_exists = self.parse_if_exists();
            let name = self.parse_identifier()?;
            let behavior = self.parse_drop_behavior();
            return Ok(AlterTableAction::DropColumn {
                if_exists,
                name,
                behavior,
            });
        }
        if self.parse_keyword("RENAME") {
            if self.parse_keyword("TO") {
                return self.parse_object_name().map(AlterTableAction::RenameTable);
            }
            self.parse_keyword("COLUMN");
            let old = self.parse_identifier()?;
            self.expect_keyword("TO")?;
            let new = self.parse_identifier()?;
            return Ok(AlterTableAction::RenameColumn { old, new });
        }
        if self.parse_keyword("ALTER") {
            self.parse_keyword("COLUMN");
            let name = self.parse_identifier()?;
            let op = if self.parse_keywords(&["SET", "DEFAULT"]) {
                AlterColumnOp::SetDefault(self.parse_expr()?)
            } else if self.parse_keywords(&["DROP", "DEFAULT"]) {
                AlterColumnOp::DropDefault
            } else if self.parse_keywords(&["SET", "NOT", "NULL"]) {
                AlterColumnOp::SetNotNull
            } else if self.parse_keywords(&["DROP", "NOT", "NULL"]) {
                AlterColumnOp::DropNotNull
            } else {
                if self.parse_keyword("SET") && !self.parse_word("DATA") && !self.peek_word("TYPE")
                {
                    return self.expected("DATA TYPE");
                }
                if !self.parse_word("TYPE") {
                    return self.expected("SET, DROP or TYPE");
                }
                AlterColumnOp::SetDataType(self.parse_data_type()?)
            };
            return Ok(AlterTableAction::AlterColumn { name, op });
        }
        self.expected("ADD, DROP, RENAME or ALTER")
    }

    fn parse_drop(&mut self) -> Result<DropObjects> {
        self.expect_keyword("DROP")?;
        let object_type = if self.parse_keyword("TABLE") {
            ObjectType::Table
        } else if self.parse_keyword("VIEW") {
            ObjectType::View
        } else if self.parse_keywords(&["MATERIALIZED", "VIEW"]) {
            ObjectType::MaterializedView
        } else if self.parse_keyword("INDEX") {
            ObjectType::Index
        } else if self.parse_keyword("SCHEMA") {
            ObjectType::Schema
        } else {
            return self.expected("TABLE, VIEW, MATERIALIZED VIEW, INDEX or SCHEMA");
        };
        let if_exists = self.parse_if_exists();
        let names = self.parse_comma_separated(Self::parse_object_name)?;
        let behavior = self.parse_drop_behavior();
        Ok(DropObjects {
            object_type,
            if_exists,
            names,
            behavior,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;
    use pretty_assertions::assert_eq;

    fn parse_one(sql: &str) -> StatementBody {
        let mut stmts = parse_statements(sql).unwrap();
        assert_eq!(stmts.len(), 1, "expected one statement in {sql}");
        stmts.remove(0).body
    }

    fn parse_expr(sql: &str) -> Expr {
        let tokens = tokenize(sql).unwrap();
        let probe = StackProbe::unlimited();
        let mut parser = Parser::new(tokens, &probe);
        parser.parse_expr().unwrap()
    }

    fn expr(kind: ExprKind) -> Expr {
        Expr::new(kind, Span::default())
    }

    fn ident(name: &str) -> Box<Expr> {
        Box::new(expr(ExprKind::Identifier(Ident::new(name))))
    }

    fn number(n: &str) -> Box<Expr> {
        Box::new(expr(ExprKind::Value(Value::Number(CompactString::from(n)))))
    }

    fn select_of(body: StatementBody) -> Select {
        match body {
            StatementBody::Query(query) => match &query.body {
                SetExpr::Select(select) => (**select).clone(),
                other => panic!("expected select, got {other:?}"),
            },
            other => panic!("expected query, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence_multiplication_over_addition() {
        let parsed = parse_expr("a + b * c");
        assert_eq!(
            parsed,
            expr(ExprKind::BinaryOp {
                left: ident("a"),
                op: BinaryOperator::Plus,
                right: Box::new(expr(ExprKind::BinaryOp {
                    left: ident("b"),
                    op: BinaryOperator::Multiply,
                    right: ident("c"),
                })),
            })
        );
    }

    #[test]
    fn test_left_associative_subtraction() {
        let parsed = parse_expr("a - b - c");
        let ExprKind::BinaryOp { left, op, right } = &parsed.kind else {
            panic!("expected binary op");
        };
        assert_eq!(*op, BinaryOperator::Minus);
        assert_eq!(*right, ident("c"));
        assert!(matches!(left.kind, ExprKind::BinaryOp { op: BinaryOperator::Minus, .. }));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let parsed = parse_expr("a OR b AND c");
        let ExprKind::BinaryOp { op, right, .. } = &parsed.kind else {
            panic!("expected binary op");
        };
        assert_eq!(*op, BinaryOperator::Or);
        assert!(matches!(right.kind, ExprKind::BinaryOp { op: BinaryOperator::And, .. }));
    }

    #[test]
    fn test_not_applies_to_comparison() {
        let parsed = parse_expr("NOT a = 1");
        let ExprKind::UnaryOp { op, expr } = &parsed.kind else {
            panic!("expected unary op");
        };
        assert_eq!(*op, UnaryOperator::Not);
        assert!(matches!(expr.kind, ExprKind::BinaryOp { op: BinaryOperator::Eq, .. }));
    }

    #[test]
    fn test_between_stops_at_and() {
        let parsed = parse_expr("x BETWEEN 1 AND 2 AND y");
        let ExprKind::BinaryOp { left, op, .. } = &parsed.kind else {
            panic!("expected binary op");
        };
        assert_eq!(*op, BinaryOperator::And);
        assert_eq!(
            **left,
            expr(ExprKind::Between {
                expr: ident("x"),
                negated: false,
                low: number("1"),
                high: number("2"),
            })
        );
    }

    #[test]
    fn test_expression_spans_cover_their_source() {
        let source = "price * (1 + tax) AS total";
        let parsed = parse_expr(source);
        assert_eq!(&source[parsed.span.start..parsed.span.end], "price * (1 + tax)");
        let ExprKind::BinaryOp { left, right, .. } = &parsed.kind else {
            panic!("expected binary op");
        };
        assert_eq!(left.span, Span::new(0, 5));
        assert_eq!(&source[right.span.start..right.span.end], "(1 + tax)");
        let ExprKind::Nested(inner) = &right.kind else {
            panic!("expected parentheses");
        };
        assert_eq!(&source[inner.span.start..inner.span.end], "1 + tax");
    }

    #[test]
    fn test_query_and_select_spans() {
        let source = "select a from t where b = 1 union select 2 order by 1";
        let StatementBody::Query(query) = parse_one(source) else {
            panic!("expected query");
        };
        assert_eq!(query.span, Span::new(0, source.len()));
        let SetExpr::SetOperation { left, .. } = &query.body else {
            panic!("expected set operation");
        };
        let SetExpr::Select(select) = &**left else {
            panic!("expected select");
        };
        assert_eq!(
            &source[select.span.start..select.span.end],
            "select a from t where b = 1"
        );
    }

    #[test]
    fn test_not_in_and_is_not_null() {
        assert!(matches!(
            parse_expr("a NOT IN (1, 2)").kind,
            ExprKind::InList { negated: true, ref list, .. } if list.len() == 2
        ));
        assert!(matches!(
            parse_expr("a IS NOT NULL").kind,
            ExprKind::Is { negated: true, test: IsTest::Null, .. }
        ));
        assert!(matches!(
            parse_expr("a NOT ILIKE 'x%'").kind,
            ExprKind::Like { negated: true, case_insensitive: true, .. }
        ));
    }

    #[test]
    fn test_cast_forms() {
        assert!(matches!(
            parse_expr("CAST(a AS numeric(10, 2))").kind,
            ExprKind::Cast { ref data_type, .. } if data_type.to_string() == "numeric(10, 2)"
        ));
        assert!(matches!(
            parse_expr("a::double precision").kind,
            ExprKind::DoubleColonCast { ref data_type, .. } if data_type.name == "double precision"
        ));
        assert!(matches!(
            parse_expr("ts::timestamp with time zone").kind,
            ExprKind::DoubleColonCast { ref data_type, .. }
                if data_type.name == "timestamp with time zone"
        ));
    }

    #[test]
    fn test_nested_parentheses_are_kept() {
        let parsed = parse_expr("((1))");
        assert_eq!(
            parsed,
            expr(ExprKind::Nested(Box::new(expr(ExprKind::Nested(number("1"))))))
        );
    }

    #[test]
    fn test_function_forms() {
        assert!(matches!(
            parse_expr("count(*)").kind,
            ExprKind::Function(ref f) if f.args == FunctionArgs::Star
        ));
        let parsed = parse_expr(
            "sum(DISTINCT x) FILTER (WHERE y > 0) OVER (PARTITION BY z ORDER BY w ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW)",
        );
        let ExprKind::Function(f) = &parsed.kind else {
            panic!("expected function");
        };
        assert!(matches!(f.args, FunctionArgs::List { distinct: true, .. }));
        assert!(f.filter.is_some());
        let Some(WindowRef::Spec(spec)) = &f.over else {
            panic!("expected window spec");
        };
        assert_eq!(spec.partition_by.len(), 1);
        assert_eq!(spec.order_by.len(), 1);
        assert_eq!(
            spec.frame,
            Some(WindowFrame {
                units: FrameUnits::Rows,
                start: FrameBound::UnboundedPreceding,
                end: Some(FrameBound::CurrentRow),
            })
        );
    }

    #[test]
    fn test_keyword_function_names() {
        assert!(matches!(
            parse_expr("left(name, 3)").kind,
            ExprKind::Function(ref f) if f.name.to_string() == "left"
        ));
    }

    #[test]
    fn test_case_expression() {
        let parsed = parse_expr("CASE WHEN a THEN 1 WHEN b THEN 2 ELSE 3 END");
        let ExprKind::Case {
            operand,
            whens,
            else_result,
        } = &parsed.kind
        else {
            panic!("expected case");
        };
        assert!(operand.is_none());
        assert_eq!(whens.len(), 2);
        assert!(else_result.is_some());
    }

    #[test]
    fn test_typed_strings_and_literals() {
        assert_eq!(
            parse_expr("DATE '2024-01-01'"),
            expr(ExprKind::TypedString {
                data_type: CompactString::from("DATE"),
                value: CompactString::from("'2024-01-01'"),
            })
        );
        assert_eq!(parse_expr("NULL"), expr(ExprKind::Value(Value::Null)));
        assert_eq!(
            parse_expr("$1"),
            expr(ExprKind::Value(Value::Placeholder("$1".into())))
        );
    }

    #[test]
    fn test_simple_select() {
        let select = select_of(parse_one("select a, b as c, t.* from t where x = 1"));
        assert_eq!(select.projection.len(), 3);
        assert_eq!(
            select.projection[1],
            SelectItem::Expr {
                expr: *ident("b"),
                alias: Some(Ident::new("c")),
            }
        );
        assert!(matches!(
            &select.projection[2],
            SelectItem::Expr { expr, .. } if matches!(expr.kind, ExprKind::QualifiedWildcard(_))
        ));
        assert_eq!(select.from.len(), 1);
        assert!(select.selection.is_some());
    }

    #[test]
    fn test_implicit_alias_matches_explicit() {
        assert_eq!(
            parse_one("select a x from t y"),
            parse_one("SELECT a AS x FROM t AS y")
        );
    }

    #[test]
    fn test_join_chain() {
        let select = select_of(parse_one(
            "select * from a join b on a.id = b.id left outer join c using (id) cross join d natural join e",
        ));
        let joins = &select.from[0].joins;
        assert_eq!(joins.len(), 4);
        assert_eq!(joins[0].operator, JoinOperator::Inner);
        assert_eq!(joins[1].operator, JoinOperator::Left);
        assert!(matches!(joins[1].constraint, JoinConstraint::Using(_)));
        assert_eq!(joins[2].operator, JoinOperator::Cross);
        assert!(joins[3].natural);
    }

    #[test]
    fn test_derived_and_nested_join_factors() {
        let select = select_of(parse_one(
            "select * from (select 1) s, ((a join b on true)) j, lateral (select 2) l, generate_series(1, 3) g",
        ));
        assert!(matches!(select.from[0].relation, TableFactor::Derived { lateral: false, .. }));
        assert!(matches!(select.from[1].relation, TableFactor::NestedJoin { .. }));
        assert!(matches!(select.from[2].relation, TableFactor::Derived { lateral: true, .. }));
        assert!(matches!(select.from[3].relation, TableFactor::Function { .. }));
    }

    #[test]
    fn test_set_operation_precedence() {
        let StatementBody::Query(query) =
            parse_one("select 1 union all select 2 intersect select 3 order by 1 limit 5 offset 2")
        else {
            panic!("expected query");
        };
        let SetExpr::SetOperation {
            op,
            quantifier,
            right,
            ..
        } = &query.body
        else {
            panic!("expected set operation");
        };
        assert_eq!(*op, SetOperator::Union);
        assert_eq!(*quantifier, SetQuantifier::All);
        assert!(matches!(
            **right,
            SetExpr::SetOperation { op: SetOperator::Intersect, .. }
        ));
        assert_eq!(query.order_by.len(), 1);
        assert!(matches!(query.limit, Some(Limit::Count(_))));
        assert!(query.offset.is_some());
    }

    #[test]
    fn test_with_clause() {
        let StatementBody::Query(query) =
            parse_one("with recursive r (n) as (select 1 union all select n + 1 from r) select * from r")
        else {
            panic!("expected query");
        };
        let with = query.with.unwrap();
        assert!(with.recursive);
        assert_eq!(with.ctes[0].columns, vec![Ident::new("n")]);
    }

    #[test]
    fn test_multiple_statements_spans() {
        let source = "select 1;\n\nselect 2";
        let stmts = parse_statements(source).unwrap();
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].terminated);
        assert_eq!(stmts[0].span, Span::new(0, 9));
        assert!(!stmts[1].terminated);
        assert_eq!(&source[stmts[1].span.start..stmts[1].span.end], "select 2");
    }

    #[test]
    fn test_empty_statements_are_skipped() {
        assert_eq!(parse_statements(";; select 1;;").unwrap().len(), 1);
        assert!(parse_statements("  -- only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn test_comments_are_ignored() {
        assert_eq!(
            parse_one("select /* x */ a -- trailing\nfrom t"),
            parse_one("select a from t")
        );
    }

    #[test]
    fn test_insert_update_delete() {
        let StatementBody::Insert(insert) =
            parse_one("insert into t (a, b) values (1, 2), (3, 4) returning a")
        else {
            panic!("expected insert");
        };
        assert_eq!(insert.columns.len(), 2);
        assert_eq!(insert.returning.len(), 1);

        let StatementBody::Update(update) =
            parse_one("update t x set a = 1, b = b + 1 from u where x.id = u.id")
        else {
            panic!("expected update");
        };
        assert_eq!(update.alias, Some(Ident::new("x")));
        assert_eq!(update.assignments.len(), 2);
        assert_eq!(update.from.len(), 1);

        let StatementBody::Delete(delete) = parse_one("delete from t using u where t.id = u.id")
        else {
            panic!("expected delete");
        };
        assert_eq!(delete.using.len(), 1);
        assert!(delete.selection.is_some());
    }

    #[test]
    fn test_create_table() {
        let StatementBody::CreateTable(create) = parse_one(
            "create table if not exists s.t (id int primary key, name varchar(20) not null default 'x', \
             constraint fk foreign key (id) references u (id), check (id > 0))",
        ) else {
            panic!("expected create table");
        };
        assert!(create.if_not_exists);
        assert_eq!(create.elements.len(), 4);
        let TableElement::Column(name) = &create.elements[1] else {
            panic!("expected column");
        };
        assert_eq!(name.data_type.to_string(), "varchar(20)");
        assert_eq!(name.options.len(), 2);
        assert!(matches!(
            &create.elements[2],
            TableElement::Constraint(TableConstraint { name: Some(_), kind: ConstraintKind::ForeignKey { .. } })
        ));
    }

    #[test]
    fn test_create_view_index_alter_drop() {
        assert!(matches!(
            parse_one("create or replace materialized view v (a) as select 1"),
            StatementBody::CreateView(CreateView { or_replace: true, materialized: true, .. })
        ));
        assert!(matches!(
            parse_one("create unique index idx on t using btree (a desc, b)"),
            StatementBody::CreateIndex(CreateIndex { unique: true, ref columns, .. }) if columns.len() == 2
        ));
        let StatementBody::AlterTable(alter) = parse_one(
            "alter table t add column c int, drop column if exists d cascade, rename column e to f, \
             alter column g set data type text, alter h drop not null, rename to t2",
        ) else {
            panic!("expected alter table");
        };
        assert_eq!(alter.actions.len(), 6);
        assert!(matches!(
            parse_one("drop materialized view if exists a, b restrict"),
            StatementBody::Drop(DropObjects {
                object_type: ObjectType::MaterializedView,
                if_exists: true,
                behavior: Some(DropBehavior::Restrict),
                ..
            })
        ));
    }

    #[test]
    fn test_non_reserved_keywords_as_identifiers() {
        let select = select_of(parse_one("select key, first from index"));
        assert_eq!(select.projection.len(), 2);
    }

    #[test]
    fn test_parse_error_reports_position_and_found() {
        let err = parse_statements("select a from where").unwrap_err();
        match err {
            SqlprettyError::Parse {
                position,
                expected,
                found,
            } => {
                assert_eq!(position, 14);
                assert_eq!(expected, "identifier");
                assert_eq!(found, "keyword WHERE");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_separator_is_an_error() {
        let err = parse_statements("select 1 select 2").unwrap_err();
        assert!(matches!(err, SqlprettyError::Parse { position: 9, .. }));
    }

    #[test]
    fn test_unsupported_statement() {
        let err = parse_statements("grant all on t to bob").unwrap_err();
        assert!(matches!(err, SqlprettyError::Parse { position: 0, .. }));
    }
}
