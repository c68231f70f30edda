//! Column names produced by a SQL `SELECT` statement.

use crate::text::{Span, find_matching_close, split_unescaped};
use std::collections::BTreeSet;

/// Column names of the first top-level `SELECT` list in `sql`.
///
/// Aliases win over source column names, table qualifiers are dropped and
/// a `*` anywhere in the list yields an empty set since the real columns
/// are unknown.
pub fn select_column_names(sql: &str) -> BTreeSet<String> {
    let mut columns = BTreeSet::new();
    let Some(list) = select_list(sql) else {
        return columns;
    };

    for part in split_unescaped(sql, list.start, list.end, ',') {
        let expression = part.slice(sql).trim();
        if expression.is_empty() {
            continue;
        }
        if expression == "*" || expression.ends_with(".*") {
            return BTreeSet::new();
        }
        if let Some(name) = column_name(expression) {
            columns.insert(name);
        }
    }

    columns
}

/// Span between `SELECT [DISTINCT|ALL|TOP n]` and the matching top-level `FROM`
fn select_list(sql: &str) -> Option<Span> {
    let bytes = sql.as_bytes();
    let select = find_keyword(sql, 0, "select")?;
    let mut start = select + "select".len();

    loop {
        let next = skip_space(bytes, start);
        if let Some(after) = keyword_at(sql, next, "distinct").or_else(|| keyword_at(sql, next, "all")) {
            start = after;
        } else if let Some(after) = keyword_at(sql, next, "top") {
            let mut idx = skip_space(bytes, after);
            if bytes.get(idx) == Some(&b'(') {
                idx = find_matching_close(sql, idx, '(', ')').map_or(idx, |close| close + 1);
            }
            while idx < bytes.len() && bytes[idx].is_ascii_digit() {
                idx += 1;
            }
            start = idx;
        } else {
            break;
        }
    }

    let end = find_keyword(sql, start, "from").unwrap_or(sql.len());
    Some(Span::new(start, end))
}

/// Output name of one select-list expression
fn column_name(expression: &str) -> Option<String> {
    let words: Vec<&str> = expression.split_whitespace().collect();
    let candidate = match words.as_slice() {
        [] => return None,
        [.., as_keyword, alias] if as_keyword.eq_ignore_ascii_case("as") => *alias,
        [.., previous, alias] if is_plain_identifier(alias) && !previous.ends_with(|c: char| "+-*/|(,".contains(c)) => {
            *alias
        }
        [single] => single.rsplit('.').next().unwrap_or(*single),
        _ => return None,
    };
    let name = candidate.trim_matches(|c| matches!(c, '[' | ']' | '"' | '\'' | '`'));
    is_plain_identifier(name).then(|| name.to_string())
}

fn is_plain_identifier(value: &str) -> bool {
    let value = value.trim_matches(|c| matches!(c, '[' | ']' | '"' | '\'' | '`'));
    let mut chars = value.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn skip_space(bytes: &[u8], idx: usize) -> usize {
    let mut idx = idx;
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx += 1;
    }
    idx
}

/// End offset of `keyword` when it starts exactly at `idx` as a whole word
fn keyword_at(sql: &str, idx: usize, keyword: &str) -> Option<usize> {
    let end = idx + keyword.len();
    let candidate = sql.get(idx..end)?;
    let bounded = sql
        .as_bytes()
        .get(end)
        .is_none_or(|byte| !byte.is_ascii_alphanumeric() && *byte != b'_');
    (candidate.eq_ignore_ascii_case(keyword) && bounded).then_some(end)
}

/// First whole-word `keyword` at parenthesis depth zero, outside strings
fn find_keyword(sql: &str, start: usize, keyword: &str) -> Option<usize> {
    let bytes = sql.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut idx = start;

    while idx < bytes.len() {
        let byte = bytes[idx];
        if let Some(open) = quote {
            if byte == open {
                quote = None;
            }
            idx += 1;
            continue;
        }
        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => {
                let word_start = idx == 0 || !(bytes[idx - 1].is_ascii_alphanumeric() || bytes[idx - 1] == b'_');
                if word_start && keyword_at(sql, idx, keyword).is_some() {
                    return Some(idx);
                }
            }
            _ => {}
        }
        idx += 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(sql: &str) -> Vec<String> {
        select_column_names(sql).into_iter().collect()
    }

    #[test]
    fn test_aliases_win() {
        assert_eq!(columns("SELECT a, b AS c, t.d, COUNT(*) total FROM t"), vec!["a", "c", "d", "total"]);
    }

    #[test]
    fn test_star_yields_empty() {
        assert!(columns("select * from users").is_empty());
        assert!(columns("select u.*, o.id from users u join orders o on 1=1").is_empty());
    }

    #[test]
    fn test_modifiers_and_subqueries() {
        assert_eq!(
            columns("SELECT DISTINCT TOP 10 id, (SELECT max(x) FROM y) AS latest\nFROM t WHERE a = 'from'"),
            vec!["id", "latest"]
        );
    }

    #[test]
    fn test_no_select() {
        assert!(columns("UPDATE t SET a = 1").is_empty());
    }

    #[test]
    fn test_bracketed_names() {
        assert_eq!(columns("SELECT [First Name] AS [firstName], `last` FROM people"), vec!["firstName", "last"]);
    }
}
