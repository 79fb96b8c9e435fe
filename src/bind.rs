// Placeholder scanning and rewriting.
//
// Queries use `${name}` markers for named parameters. `bind_params` rewrites
// them into the dialect's positional placeholders and returns the parameter
// names in placeholder order, duplicates included. The scanner is a single
// left-to-right pass with backslash escaping and single/double quote
// recognition; markers inside quoted literals are never rewritten.

use std::borrow::Cow;

use crate::error::Error;

/// The positional-placeholder convention of the target backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// No known convention; rewriting a parameterized query fails.
    Unspecified,
    /// Numbered placeholders: `$1`, `$2`, ...
    Postgres,
    /// Fixed `?` placeholders.
    MySql,
    /// Fixed `?` placeholders.
    Sqlite,
}

impl Dialect {
    // Placeholder token for the occurrence with the given 0-based ordinal.
    fn placeholder(self, ordinal: usize) -> Result<String, Error> {
        match self {
            Dialect::Postgres => Ok(format!("${}", ordinal + 1)),
            Dialect::MySql | Dialect::Sqlite => Ok("?".to_string()),
            Dialect::Unspecified => Err(Error::UnsupportedDialect),
        }
    }
}

// One `${name}` occurrence. `begin` is the byte index of `$`, `end` the byte
// index of the closing `}`.
#[derive(Debug, PartialEq, Eq)]
struct Param {
    name: String,
    begin: usize,
    end: usize,
}

#[derive(Debug)]
enum State {
    Text,
    // Saw `$`, waiting for `{`.
    Dollar(usize),
    // Inside `${...}`, accumulating the name.
    Name { begin: usize, buf: String },
}

fn scan_params(query: &str) -> Vec<Param> {
    let mut found = Vec::new();
    let mut escape = false;
    let mut quote: Option<char> = None;
    let mut state = State::Text;

    for (idx, ch) in query.char_indices() {
        if escape {
            escape = false;
            // escaped characters cannot open or close anything, but inside a
            // marker they still belong to the name
            if let State::Name { buf, .. } = &mut state {
                buf.push(ch);
            }
            continue;
        }
        if ch == '\\' {
            escape = true;
            continue;
        }
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            continue;
        }

        match &mut state {
            State::Text => {
                if ch == '"' || ch == '\'' {
                    quote = Some(ch);
                } else if ch == '$' {
                    state = State::Dollar(idx);
                }
            }
            State::Dollar(begin) => {
                if ch == '{' {
                    state = State::Name {
                        begin: *begin,
                        buf: String::new(),
                    };
                } else if ch == '"' || ch == '\'' {
                    quote = Some(ch);
                    state = State::Text;
                } else {
                    // `$` not followed by `{` is ordinary text
                    state = State::Text;
                }
            }
            State::Name { begin, buf } => {
                if ch == '}' {
                    found.push(Param {
                        name: std::mem::take(buf),
                        begin: *begin,
                        end: idx,
                    });
                    state = State::Text;
                } else {
                    buf.push(ch);
                }
            }
        }
    }

    // an unterminated marker at end of input is not an occurrence; the raw
    // text is copied through by the rewriter
    found
}

/// Rewrite `${name}` markers into `dialect` placeholders.
///
/// Returns the rewritten query and the parameter names in placeholder order.
/// A name used twice yields two entries. Queries without markers are returned
/// borrowed and unchanged with an empty key list.
pub fn bind_params(dialect: Dialect, query: &str) -> Result<(Cow<'_, str>, Vec<String>), Error> {
    if !query.contains("${") {
        return Ok((Cow::Borrowed(query), Vec::new()));
    }

    let params = scan_params(query);
    if params.is_empty() {
        return Ok((Cow::Borrowed(query), Vec::new()));
    }

    let mut out = String::with_capacity(query.len());
    let mut keys = Vec::with_capacity(params.len());
    let mut cur = 0;
    for (ordinal, param) in params.iter().enumerate() {
        out.push_str(&query[cur..param.begin]);
        out.push_str(&dialect.placeholder(ordinal)?);
        keys.push(param.name.clone());
        cur = param.end + 1;
    }
    out.push_str(&query[cur..]);

    Ok((Cow::Owned(out), keys))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(dialect: Dialect, query: &str) -> (String, Vec<String>) {
        let (text, keys) = bind_params(dialect, query).unwrap();
        (text.into_owned(), keys)
    }

    #[test]
    fn no_markers_returns_input_borrowed() {
        let query = "select * from users where id = 1";
        let (text, keys) = bind_params(Dialect::Postgres, query).unwrap();
        assert!(matches!(text, Cow::Borrowed(_)));
        assert_eq!(text, query);
        assert!(keys.is_empty());
    }

    #[test]
    fn numbered_placeholders_and_keys_in_order() {
        let (text, keys) = rewrite(
            Dialect::Postgres,
            "select ${a}::int+${b}::int as c",
        );
        assert_eq!(text, "select $1::int+$2::int as c");
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn fixed_placeholders() {
        let (text, keys) = rewrite(Dialect::MySql, "update t set x=${x} where id=${id}");
        assert_eq!(text, "update t set x=? where id=?");
        assert_eq!(keys, vec!["x", "id"]);
    }

    #[test]
    fn duplicate_names_keep_both_entries() {
        let (text, keys) = rewrite(Dialect::Postgres, "select ${a}, ${b}, ${a}");
        assert_eq!(text, "select $1, $2, $3");
        assert_eq!(keys, vec!["a", "b", "a"]);
    }

    #[test]
    fn marker_inside_single_quotes_is_literal() {
        let (text, keys) = rewrite(Dialect::Postgres, "select '${x}'");
        assert_eq!(text, "select '${x}'");
        assert!(keys.is_empty());
    }

    #[test]
    fn marker_inside_double_quotes_is_literal() {
        let (text, keys) = rewrite(Dialect::Postgres, r#"select "${x}" from t"#);
        assert_eq!(text, r#"select "${x}" from t"#);
        assert!(keys.is_empty());
    }

    #[test]
    fn marker_after_closed_quote_is_recognized() {
        let (text, keys) = rewrite(Dialect::Postgres, "select 'lit' || ${x}");
        assert_eq!(text, "select 'lit' || $1");
        assert_eq!(keys, vec!["x"]);
    }

    #[test]
    fn escaped_dollar_is_not_a_marker() {
        let (text, keys) = rewrite(Dialect::Postgres, r"select \${x}");
        assert_eq!(text, r"select \${x}");
        assert!(keys.is_empty());
    }

    #[test]
    fn escaped_quote_does_not_open_a_literal() {
        let (text, keys) = rewrite(Dialect::Postgres, r"select \' ${x}");
        assert_eq!(text, r"select \' $1");
        assert_eq!(keys, vec!["x"]);
    }

    #[test]
    fn dollar_without_brace_is_plain_text() {
        let (text, keys) = rewrite(Dialect::Postgres, "select $1 from t");
        assert_eq!(text, "select $1 from t");
        assert!(keys.is_empty());
    }

    #[test]
    fn empty_name_is_a_valid_key() {
        let (text, keys) = rewrite(Dialect::Postgres, "select ${}");
        assert_eq!(text, "select $1");
        assert_eq!(keys, vec![""]);
    }

    #[test]
    fn unterminated_marker_is_ignored_and_text_preserved() {
        let (text, keys) = rewrite(Dialect::Postgres, "select ${a");
        assert_eq!(text, "select ${a");
        assert!(keys.is_empty());
    }

    #[test]
    fn unterminated_marker_after_a_complete_one() {
        let (text, keys) = rewrite(Dialect::Postgres, "select ${a}, ${b");
        assert_eq!(text, "select $1, ${b");
        assert_eq!(keys, vec!["a"]);
    }

    #[test]
    fn unsupported_dialect_fails_at_rewrite_time() {
        let err = bind_params(Dialect::Unspecified, "select ${a}").unwrap_err();
        assert!(matches!(err, Error::UnsupportedDialect));
    }

    #[test]
    fn unsupported_dialect_passes_marker_free_queries() {
        let (text, keys) = rewrite(Dialect::Unspecified, "select 1");
        assert_eq!(text, "select 1");
        assert!(keys.is_empty());
    }

    #[test]
    fn escaped_character_inside_name_is_kept() {
        let (text, keys) = rewrite(Dialect::Postgres, r"select ${a\}b}");
        assert_eq!(text, "select $1");
        assert_eq!(keys, vec!["a}b"]);
    }
}
