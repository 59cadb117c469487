//! Recursive-descent parser over the token stream.

use crate::ast::*;
use crate::error::{Position, SqlSyntaxError};
use crate::lexer::tokenize;
use crate::token::{Token, TokenKind};
use crate::value::Value;

/// Parser state: a token stream plus a cursor.
pub struct Parser {
    tokens: Vec<Token>,
    i: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, i: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.i).unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn consume(&mut self) -> Token {
        let t = self.peek().clone();
        if self.i < self.tokens.len() {
            self.i += 1;
        }
        t
    }

    fn expect(&mut self, kind: TokenKind, msg: &str) -> Result<Token, SqlSyntaxError> {
        if self.peek().kind != kind {
            return Err(SqlSyntaxError::new(msg.to_string(), self.peek().pos));
        }
        Ok(self.consume())
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.consume();
            true
        } else {
            false
        }
    }

    /// Parses zero or more statements separated by semicolons. Empty `;;`
    /// runs are skipped; a trailing semicolon is optional.
    pub fn parse_script(&mut self) -> Result<Vec<Statement>, SqlSyntaxError> {
        let mut stmts = Vec::new();
        while !self.at(TokenKind::Eof) {
            if self.match_kind(TokenKind::Semi) {
                continue;
            }
            stmts.push(self.parse_statement()?);
            self.match_kind(TokenKind::Semi);
        }
        Ok(stmts)
    }

    /// Parses exactly one statement; rejects anything beyond it.
    pub fn parse_one(&mut self) -> Result<Statement, SqlSyntaxError> {
        let stmts = self.parse_script()?;
        if stmts.is_empty() {
            return Err(SqlSyntaxError::new("empty input", Position::new(1, 1)));
        }
        if stmts.len() > 1 {
            return Err(SqlSyntaxError::new("expected a single statement", self.peek().pos));
        }
        Ok(stmts.into_iter().next().unwrap())
    }

    fn parse_statement(&mut self) -> Result<Statement, SqlSyntaxError> {
        match self.peek().kind {
            TokenKind::Create => self.parse_create(),
            TokenKind::Insert => self.parse_insert().map(Statement::Insert),
            TokenKind::Select => self.parse_select().map(Statement::Select),
            TokenKind::Update => self.parse_update().map(Statement::Update),
            TokenKind::Delete => self.parse_delete().map(Statement::Delete),
            _ => Err(SqlSyntaxError::new(
                format!("unexpected token: {:?}", self.peek().lexeme),
                self.peek().pos,
            )),
        }
    }

    // ---------------- CREATE ----------------

    fn parse_create(&mut self) -> Result<Statement, SqlSyntaxError> {
        self.expect(TokenKind::Create, "expected CREATE")?;

        if self.match_kind(TokenKind::Table) {
            return self.parse_create_table_after_keyword().map(Statement::CreateTable);
        }
        if self.match_kind(TokenKind::Index) {
            return self.parse_create_index_after_keyword().map(Statement::CreateIndex);
        }
        Err(SqlSyntaxError::new("expected TABLE or INDEX after CREATE", self.peek().pos))
    }

    fn parse_create_table_after_keyword(&mut self) -> Result<CreateTable, SqlSyntaxError> {
        let table_name = self.expect_ident("expected table name")?;
        self.expect(TokenKind::LParen, "expected '(' after table name")?;

        let mut columns = vec![self.parse_column_def()?];
        while self.match_kind(TokenKind::Comma) {
            columns.push(self.parse_column_def()?);
        }
        self.expect(TokenKind::RParen, "expected ')' after column definitions")?;

        Ok(CreateTable { table_name, columns })
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef, SqlSyntaxError> {
        let name = self.expect_ident("expected column name")?;
        let typ = self.parse_type_spec()?;

        let mut not_null = false;
        let mut unique = false;
        let mut primary_key = false;

        loop {
            if self.match_kind(TokenKind::Not) {
                self.expect(TokenKind::Null, "expected NULL after NOT")?;
                not_null = true;
                continue;
            }
            if self.match_kind(TokenKind::Unique) {
                unique = true;
                continue;
            }
            if self.match_kind(TokenKind::Primary) {
                self.expect(TokenKind::Key, "expected KEY after PRIMARY")?;
                primary_key = true;
                continue;
            }
            break;
        }

        Ok(ColumnDef {
            name,
            typ,
            not_null,
            unique,
            primary_key,
        })
    }

    /// `type_spec := IDENT [ '(' INT (',' INT)* ')' ]`
    fn parse_type_spec(&mut self) -> Result<TypeSpec, SqlSyntaxError> {
        let name = self.expect_ident("expected type name")?.to_ascii_uppercase();
        let mut params = Vec::new();
        if self.match_kind(TokenKind::LParen) {
            params.push(self.expect_int("expected integer type parameter")?);
            while self.match_kind(TokenKind::Comma) {
                params.push(self.expect_int("expected integer type parameter")?);
            }
            self.expect(TokenKind::RParen, "expected ')' after type parameters")?;
        }
        Ok(TypeSpec { name, params })
    }

    fn parse_create_index_after_keyword(&mut self) -> Result<CreateIndex, SqlSyntaxError> {
        let index_name = self.expect_ident("expected index name")?;
        self.expect(TokenKind::On, "expected ON after index name")?;
        let table_name = self.expect_ident("expected table name")?;

        self.expect(TokenKind::LParen, "expected '(' after table name")?;
        let column_name = self.expect_ident("expected column name")?;
        self.expect(TokenKind::RParen, "expected ')' after column name")?;

        Ok(CreateIndex {
            index_name,
            table_name,
            column_name,
        })
    }

    // ---------------- INSERT ----------------

    fn parse_insert(&mut self) -> Result<Insert, SqlSyntaxError> {
        self.expect(TokenKind::Insert, "expected INSERT")?;
        self.expect(TokenKind::Into, "expected INTO after INSERT")?;
        let table_name = self.expect_ident("expected table name")?;

        self.expect(TokenKind::LParen, "expected '(' before column list")?;
        let mut columns = vec![self.expect_ident("expected column name")?];
        while self.match_kind(TokenKind::Comma) {
            columns.push(self.expect_ident("expected column name")?);
        }
        self.expect(TokenKind::RParen, "expected ')' after column list")?;

        self.expect(TokenKind::Values, "expected VALUES")?;
        self.expect(TokenKind::LParen, "expected '(' before values")?;
        let mut values = vec![self.parse_literal()?];
        while self.match_kind(TokenKind::Comma) {
            values.push(self.parse_literal()?);
        }
        let rparen = self.expect(TokenKind::RParen, "expected ')' after values")?;

        if columns.len() != values.len() {
            return Err(SqlSyntaxError::new(
                "number of columns does not match number of values",
                rparen.pos,
            ));
        }

        Ok(Insert {
            table_name,
            columns,
            values,
        })
    }

    // ---------------- SELECT ----------------

    fn parse_select(&mut self) -> Result<Select, SqlSyntaxError> {
        self.expect(TokenKind::Select, "expected SELECT")?;

        let columns = self.parse_select_list()?;
        self.expect(TokenKind::From, "expected FROM")?;
        let from_table = self.expect_ident("expected table name")?;

        let mut joins = Vec::new();
        while self.match_kind(TokenKind::Join) {
            joins.push(self.parse_join_clause()?);
        }

        let where_clause = if self.match_kind(TokenKind::Where) {
            Some(self.parse_where_clause_after_where()?)
        } else {
            None
        };

        Ok(Select {
            columns,
            from_table,
            joins,
            where_clause,
        })
    }

    fn parse_select_list(&mut self) -> Result<Option<Vec<ColumnRef>>, SqlSyntaxError> {
        if self.match_kind(TokenKind::Star) {
            return Ok(None);
        }
        let mut cols = vec![self.parse_column_ref()?];
        while self.match_kind(TokenKind::Comma) {
            cols.push(self.parse_column_ref()?);
        }
        Ok(Some(cols))
    }

    fn parse_join_clause(&mut self) -> Result<JoinClause, SqlSyntaxError> {
        let table_name = self.expect_ident("expected table name after JOIN")?;
        self.expect(TokenKind::On, "expected ON in JOIN clause")?;
        let left = self.parse_column_ref()?;
        self.expect(TokenKind::Eq, "expected '=' in JOIN condition")?;
        let right = self.parse_column_ref()?;
        Ok(JoinClause { table_name, left, right })
    }

    // ---------------- UPDATE ----------------

    fn parse_update(&mut self) -> Result<Update, SqlSyntaxError> {
        self.expect(TokenKind::Update, "expected UPDATE")?;
        let table_name = self.expect_ident("expected table name")?;
        self.expect(TokenKind::Set, "expected SET")?;

        let mut assignments = vec![self.parse_assignment()?];
        while self.match_kind(TokenKind::Comma) {
            assignments.push(self.parse_assignment()?);
        }

        let where_clause = if self.match_kind(TokenKind::Where) {
            Some(self.parse_where_clause_after_where()?)
        } else {
            None
        };

        Ok(Update {
            table_name,
            assignments,
            where_clause,
        })
    }

    fn parse_assignment(&mut self) -> Result<Assignment, SqlSyntaxError> {
        let column = self.expect_ident("expected column name")?;
        self.expect(TokenKind::Eq, "expected '=' in assignment")?;
        let value = self.parse_literal()?;
        Ok(Assignment { column, value })
    }

    // ---------------- DELETE ----------------

    fn parse_delete(&mut self) -> Result<Delete, SqlSyntaxError> {
        self.expect(TokenKind::Delete, "expected DELETE")?;
        self.expect(TokenKind::From, "expected FROM after DELETE")?;
        let table_name = self.expect_ident("expected table name")?;

        let where_clause = if self.match_kind(TokenKind::Where) {
            Some(self.parse_where_clause_after_where()?)
        } else {
            None
        };

        Ok(Delete { table_name, where_clause })
    }

    // ---------------- WHERE helpers ----------------

    fn parse_where_clause_after_where(&mut self) -> Result<WhereClause, SqlSyntaxError> {
        let mut conditions = vec![self.parse_condition()?];
        while self.match_kind(TokenKind::And) {
            conditions.push(self.parse_condition()?);
        }
        Ok(WhereClause { conditions })
    }

    fn parse_condition(&mut self) -> Result<Condition, SqlSyntaxError> {
        let left = self.parse_column_ref()?;
        self.expect(TokenKind::Eq, "expected '=' in WHERE condition")?;
        let right = self.parse_literal()?;
        Ok(Condition { left, right })
    }

    // ---------------- atoms ----------------

    /// `column_ref := IDENT [ '.' IDENT ]`
    fn parse_column_ref(&mut self) -> Result<ColumnRef, SqlSyntaxError> {
        let first = self.expect_ident("expected identifier")?;
        if self.match_kind(TokenKind::Dot) {
            let second = self.expect_ident("expected identifier after '.'")?;
            return Ok(ColumnRef {
                table: Some(first),
                column: second,
            });
        }
        Ok(ColumnRef { table: None, column: first })
    }

    fn parse_literal(&mut self) -> Result<Value, SqlSyntaxError> {
        let t = self.peek().clone();
        match t.kind {
            TokenKind::Int | TokenKind::String | TokenKind::Bool => {
                self.consume();
                Ok(t.value.expect("literal token always carries a value"))
            }
            _ => Err(SqlSyntaxError::new("expected a literal (INT, STRING, BOOL)", t.pos)),
        }
    }

    fn expect_ident(&mut self, msg: &str) -> Result<String, SqlSyntaxError> {
        let t = self.expect(TokenKind::Ident, msg)?;
        Ok(t.lexeme)
    }

    fn expect_int(&mut self, msg: &str) -> Result<i64, SqlSyntaxError> {
        let t = self.expect(TokenKind::Int, msg)?;
        Ok(t.value.and_then(|v| v.as_integer()).expect("INT token always carries an integer"))
    }
}

/// Parses exactly one statement from a SQL string.
pub fn parse_one(sql: &str) -> Result<Statement, SqlSyntaxError> {
    let tokens = tokenize(sql)?;
    Parser::new(tokens).parse_one()
}

/// Parses a semicolon-separated script into zero or more statements.
pub fn parse_script(sql: &str) -> Result<Vec<Statement>, SqlSyntaxError> {
    let tokens = tokenize(sql)?;
    Parser::new(tokens).parse_script()
}
