pub mod document;
pub mod stats;
pub mod user;

pub use document::*;
pub use stats::*;
pub use user::*;

/// Whitelisted ordering columns for list/search queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    CreatedAt,
    Filename,
    SizeBytes,
}

impl OrderField {
    fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Filename => "filename",
            Self::SizeBytes => "size_bytes",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "created_at" => Some(Self::CreatedAt),
            "filename" => Some(Self::Filename),
            "size_bytes" => Some(Self::SizeBytes),
            _ => None,
        }
    }
}

/// Ordering for list/search queries. Defaults to newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: OrderField,
    pub descending: bool,
}

impl Default for OrderBy {
    fn default() -> Self {
        Self {
            field: OrderField::CreatedAt,
            descending: true,
        }
    }
}

impl OrderBy {
    /// Parse a client-supplied ordering like `"filename"` or `"-size_bytes"`.
    ///
    /// Only fields in `allowed` are accepted; anything else falls back to the
    /// default ordering so arbitrary strings never reach the SQL layer.
    pub fn parse(raw: Option<&str>, allowed: &[OrderField]) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        match OrderField::from_name(name) {
            Some(field) if allowed.contains(&field) => Self { field, descending },
            _ => Self::default(),
        }
    }

    /// Render as a SQL fragment, optionally qualified with a table alias.
    fn sql(&self, table_alias: &str) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        if table_alias.is_empty() {
            format!("{} {}", self.field.column(), direction)
        } else {
            format!("{}.{} {}", table_alias, self.field.column(), direction)
        }
    }
}

/// Escape `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'`
/// pattern, so user input is matched literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[OrderField] = &[OrderField::CreatedAt, OrderField::Filename, OrderField::SizeBytes];

    #[test]
    fn default_ordering_is_newest_first() {
        let order = OrderBy::parse(None, ALL);
        assert_eq!(order.field, OrderField::CreatedAt);
        assert!(order.descending);
    }

    #[test]
    fn minus_prefix_flips_direction() {
        let order = OrderBy::parse(Some("-filename"), ALL);
        assert_eq!(order.field, OrderField::Filename);
        assert!(order.descending);

        let order = OrderBy::parse(Some("filename"), ALL);
        assert!(!order.descending);
    }

    #[test]
    fn unknown_or_disallowed_fields_fall_back_to_default() {
        assert_eq!(OrderBy::parse(Some("extracted_text"), ALL), OrderBy::default());
        assert_eq!(
            OrderBy::parse(Some("size_bytes"), &[OrderField::CreatedAt]),
            OrderBy::default()
        );
        assert_eq!(
            OrderBy::parse(Some("; DROP TABLE documents"), ALL),
            OrderBy::default()
        );
    }

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
    }
}
