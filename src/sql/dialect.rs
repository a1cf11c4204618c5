//! Identifier quoting per SQL dialect

use std::fmt;

use serde::{Deserialize, Serialize};

/// Target SQL dialect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Backtick-quoted identifiers
    #[default]
    Mysql,
    /// Double-quoted identifiers
    Ansi,
}

impl Dialect {
    pub fn quote_char(&self) -> char {
        match self {
            Dialect::Mysql => '`',
            Dialect::Ansi => '"',
        }
    }

    /// Quotes an identifier, doubling any embedded quote character
    pub fn quote_ident(&self, name: &str) -> String {
        let quote = self.quote_char();
        let mut out = String::with_capacity(name.len() + 2);
        out.push(quote);
        for ch in name.chars() {
            if ch == quote {
                out.push(quote);
            }
            out.push(ch);
        }
        out.push(quote);
        out
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Ansi => "ansi",
        }
    }

    /// Parses a dialect name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mysql" => Some(Dialect::Mysql),
            "ansi" => Some(Dialect::Ansi),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(Dialect::Mysql.quote_ident("age"), "`age`");
        assert_eq!(Dialect::Ansi.quote_ident("age"), "\"age\"");
    }

    #[test]
    fn test_embedded_quote_is_doubled() {
        assert_eq!(Dialect::Mysql.quote_ident("a`b"), "`a``b`");
        assert_eq!(Dialect::Ansi.quote_ident("a\"b"), "\"a\"\"b\"");
        assert_eq!(Dialect::Ansi.quote_ident("a`b"), "\"a`b\"");
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Dialect::from_name("MySQL"), Some(Dialect::Mysql));
        assert_eq!(Dialect::from_name("ansi"), Some(Dialect::Ansi));
        assert_eq!(Dialect::from_name("postgres"), None);
        assert_eq!(Dialect::default(), Dialect::Mysql);
    }
}
