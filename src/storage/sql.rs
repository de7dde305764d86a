//! # SQL Rendering
//!
//! Renders a [`FilterProgram`] to SQLite SQL over a `jsonb TEXT` column,
//! with the same semantics as [`crate::query::eval`].
//!
//! Field paths are embedded as literals (the compiler restricts them to
//! identifier characters); search terms are always bound parameters.

use rusqlite::types::Value as SqlValue;

use crate::query::{
    Comparison, FieldPath, FilterProgram, Predicate, Relation, SortDirection, StorageFilter,
};

/// Rendered predicate and ordering
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFilter {
    pub where_clause: String,
    pub order_terms: Vec<String>,
    pub params: Vec<SqlValue>,
}

/// Render a filter program
pub fn render(program: &FilterProgram) -> SqlFilter {
    let mut params = Vec::new();
    let where_clause = render_predicate(&program.predicate, &mut params);
    let order_terms = program
        .sort
        .iter()
        .map(|key| {
            let direction = match key.direction {
                SortDirection::Ascending => "ASC",
                SortDirection::Descending => "DESC",
            };
            format!("json_extract(jsonb, {}) {}", path_literal(&key.field), direction)
        })
        .collect();

    SqlFilter {
        where_clause,
        order_terms,
        params,
    }
}

/// Quote an identifier for SQLite
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Single statement returning the total match count on every row plus the
/// requested page. When the page is empty one row with a NULL document is
/// returned so the count is still delivered.
///
/// Parameters: the filter's params, then `LIMIT`, then `OFFSET`.
pub fn select_page_statement(table_ident: &str, filter: &SqlFilter) -> String {
    let mut order = filter.order_terms.clone();
    order.push("seq".to_string());
    let order = order.join(", ");

    format!(
        "WITH matched AS (SELECT rowid AS seq, jsonb FROM {table} WHERE {predicate}), \
         page AS (SELECT jsonb, ROW_NUMBER() OVER (ORDER BY {order}) AS ord \
         FROM matched ORDER BY {order} LIMIT ? OFFSET ?) \
         SELECT (SELECT COUNT(*) FROM matched) AS total, page.jsonb \
         FROM (SELECT 1) LEFT JOIN page ON 1 = 1 ORDER BY page.ord",
        table = table_ident,
        predicate = filter.where_clause,
        order = order,
    )
}

/// Human-readable SQL for a storage filter, with parameters listed
pub fn explain(table_ident: &str, filter: &StorageFilter) -> String {
    let sql = render(&filter.program);
    let mut out = select_page_statement(table_ident, &sql);
    let mut params: Vec<String> = sql.params.iter().map(describe_param).collect();
    params.push(filter.limit.to_string());
    params.push(filter.offset.to_string());
    out.push_str("\n-- params: [");
    out.push_str(&params.join(", "));
    out.push(']');
    out
}

fn describe_param(value: &SqlValue) -> String {
    match value {
        SqlValue::Text(text) => format!("'{}'", text),
        SqlValue::Real(n) => n.to_string(),
        SqlValue::Integer(n) => n.to_string(),
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Blob(_) => "<blob>".to_string(),
    }
}

fn path_literal(field: &FieldPath) -> String {
    format!("'{}'", field.json_path())
}

/// Text form of a field: strings as-is, numbers cast, booleans spelled out,
/// NULL for anything else.
fn text_expr(field: &FieldPath) -> String {
    let p = path_literal(field);
    format!(
        "(CASE json_type(jsonb, {p}) \
         WHEN 'text' THEN json_extract(jsonb, {p}) \
         WHEN 'integer' THEN CAST(json_extract(jsonb, {p}) AS TEXT) \
         WHEN 'real' THEN CAST(json_extract(jsonb, {p}) AS TEXT) \
         WHEN 'true' THEN 'true' \
         WHEN 'false' THEN 'false' END)",
        p = p
    )
}

fn render_predicate(predicate: &Predicate, params: &mut Vec<SqlValue>) -> String {
    match predicate {
        Predicate::All => "1".to_string(),
        Predicate::Compare(cmp) => format!("COALESCE({}, 0)", render_comparison(cmp, params)),
        Predicate::And(left, right) => format!(
            "({} AND {})",
            render_predicate(left, params),
            render_predicate(right, params)
        ),
        Predicate::Or(left, right) => format!(
            "({} OR {})",
            render_predicate(left, params),
            render_predicate(right, params)
        ),
        Predicate::AndNot(left, right) => format!(
            "({} AND NOT {})",
            render_predicate(left, params),
            render_predicate(right, params)
        ),
    }
}

fn render_comparison(cmp: &Comparison, params: &mut Vec<SqlValue>) -> String {
    let text = text_expr(&cmp.field);

    match cmp.relation {
        Relation::Contains => {
            let terms: Vec<String> = cmp
                .value
                .split(' ')
                .filter(|term| !term.is_empty())
                .map(|term| {
                    params.push(SqlValue::Text(format!("% {} %", like_pattern(term))));
                    format!("(' ' || {} || ' ') LIKE ? ESCAPE '\\'", text)
                })
                .collect();
            if terms.is_empty() {
                format!("({} IS NOT NULL)", text)
            } else {
                format!("({})", terms.join(" AND "))
            }
        }
        Relation::Exact if cmp.value.contains('*') => {
            params.push(SqlValue::Text(glob_pattern(&cmp.value)));
            format!("({} GLOB ?)", text)
        }
        Relation::Exact => {
            params.push(SqlValue::Text(cmp.value.clone()));
            format!("({} = ?)", text)
        }
        Relation::NotEqual => {
            params.push(SqlValue::Text(cmp.value.clone()));
            format!("({} <> ?)", text)
        }
        relation => {
            let op = relation.as_str();
            let p = path_literal(&cmp.field);
            match cmp.numeric_value() {
                Some(n) => {
                    params.push(SqlValue::Real(n));
                    format!(
                        "(json_type(jsonb, {p}) IN ('integer', 'real') AND json_extract(jsonb, {p}) {op} ?)",
                        p = p,
                        op = op
                    )
                }
                None => {
                    params.push(SqlValue::Text(cmp.value.clone()));
                    format!(
                        "(json_type(jsonb, {p}) = 'text' AND json_extract(jsonb, {p}) {op} ?)",
                        p = p,
                        op = op
                    )
                }
            }
        }
    }
}

/// LIKE pattern for one search term: `*` becomes `%`, LIKE metacharacters
/// are escaped with `\`.
fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        match c {
            '*' => out.push('%'),
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// GLOB pattern keeping `*` as wildcard and neutralising `?` and `[`
fn glob_pattern(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '?' => out.push_str("[?]"),
            '[' => out.push_str("[[]"),
            c => out.push(c),
        }
    }
    out
}
