use super::types::{ListingQuery, OwnerFilter, SqlParam};

/// Accumulates AND-joined predicates with `$n` placeholders. Placeholder
/// numbering can start above 1 so a WHERE clause can follow a dynamically
/// built SET clause in the same statement.
#[derive(Debug, Default)]
pub struct WhereBuilder {
    clauses: Vec<String>,
    params: Vec<SqlParam>,
    offset: usize,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start placeholder numbering at `$offset + 1`.
    pub fn with_offset(offset: usize) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    fn placeholder(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.offset + self.params.len())
    }

    pub fn eq(&mut self, column: &str, param: SqlParam) -> &mut Self {
        let ph = self.placeholder(param);
        self.clauses.push(format!("{} = {}", column, ph));
        self
    }

    /// Case-insensitive substring match across name, description and tags.
    /// One parameter, referenced three times.
    pub fn search(&mut self, term: &str) -> &mut Self {
        let pattern = format!("%{}%", escape_like(term));
        let ph = self.placeholder(SqlParam::Text(pattern));
        self.clauses.push(format!(
            "(name ILIKE {ph} OR description ILIKE {ph} \
             OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE {ph}))"
        ));
        self
    }

    pub fn owner(&mut self, filter: &OwnerFilter) -> &mut Self {
        self.eq("owner_type", SqlParam::Text(filter.owner_type.as_str().to_string()));
        self.eq(filter.owner_type.owner_column(), SqlParam::Uuid(filter.profile_id));
        self
    }

    /// Exact-match predicates for each present query parameter, plus the
    /// search clause. Blank values are treated as absent.
    pub fn listing(&mut self, query: &ListingQuery) -> &mut Self {
        if let Some(category) = present(&query.category) {
            self.eq("category", SqlParam::Text(category));
        }
        if let Some(item_type) = present(&query.item_type) {
            self.eq("item_type", SqlParam::Text(item_type));
        }
        if let Some(owner_type) = present(&query.owner_type) {
            self.eq("owner_type", SqlParam::Text(owner_type));
        }
        if let Some(term) = present(&query.search) {
            self.search(&term);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// ` WHERE a AND b` (leading space) or the empty string.
    pub fn sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn into_params(self) -> Vec<SqlParam> {
        self.params
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Escape LIKE metacharacters so a search term always means a literal
/// substring.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::OwnerType;
    use uuid::Uuid;

    #[test]
    fn empty_builder_produces_no_where() {
        let builder = WhereBuilder::new();
        assert!(builder.is_empty());
        assert_eq!(builder.sql(), "");
    }

    #[test]
    fn numbers_placeholders_sequentially() {
        let mut builder = WhereBuilder::new();
        builder
            .eq("category", SqlParam::Text("design".into()))
            .eq("item_type", SqlParam::Text("service".into()));
        assert_eq!(builder.sql(), " WHERE category = $1 AND item_type = $2");
        assert_eq!(builder.into_params().len(), 2);
    }

    #[test]
    fn offset_shifts_numbering() {
        let mut builder = WhereBuilder::with_offset(3);
        builder.eq("id", SqlParam::Uuid(Uuid::new_v4()));
        assert_eq!(builder.sql(), " WHERE id = $4");
    }

    #[test]
    fn search_binds_one_param_used_three_times() {
        let mut builder = WhereBuilder::new();
        builder.search("logo");
        let sql = builder.sql();
        assert_eq!(sql.matches("$1").count(), 3);
        assert!(sql.contains("ILIKE"));
        assert!(sql.contains("unnest(tags)"));
        match &builder.into_params()[..] {
            [SqlParam::Text(p)] => assert_eq!(p, "%logo%"),
            other => panic!("unexpected params: {other:?}"),
        }
    }

    #[test]
    fn search_escapes_like_metacharacters() {
        let mut builder = WhereBuilder::new();
        builder.search("100%_done");
        match &builder.into_params()[..] {
            [SqlParam::Text(p)] => assert_eq!(p, "%100\\%\\_done%"),
            other => panic!("unexpected params: {other:?}"),
        }
    }

    #[test]
    fn owner_filter_picks_column_by_type() {
        let profile_id = Uuid::new_v4();
        let mut builder = WhereBuilder::new();
        builder.owner(&OwnerFilter {
            owner_type: OwnerType::ServiceProvider,
            profile_id,
        });
        assert_eq!(builder.sql(), " WHERE owner_type = $1 AND owner_provider = $2");
    }

    #[test]
    fn listing_query_skips_absent_and_blank_fields() {
        let mut builder = WhereBuilder::new();
        builder.listing(&ListingQuery {
            category: Some("design".into()),
            item_type: None,
            owner_type: Some("  ".into()),
            search: None,
        });
        assert_eq!(builder.sql(), " WHERE category = $1");
    }

    #[test]
    fn full_listing_query_composes_all_predicates() {
        let mut builder = WhereBuilder::new();
        builder.listing(&ListingQuery {
            category: Some("design".into()),
            item_type: Some("service".into()),
            owner_type: Some("freelancer".into()),
            search: Some("logo".into()),
        });
        let sql = builder.sql();
        assert!(sql.contains("category = $1"));
        assert!(sql.contains("item_type = $2"));
        assert!(sql.contains("owner_type = $3"));
        assert!(sql.contains("name ILIKE $4"));
    }

    #[test]
    fn owner_type_role_mapping() {
        assert_eq!(OwnerType::from_role("freelancer"), Some(OwnerType::Freelancer));
        assert_eq!(
            OwnerType::from_role("service_provider"),
            Some(OwnerType::ServiceProvider)
        );
        assert_eq!(OwnerType::from_role("client"), None);
        assert_eq!(OwnerType::from_role(""), None);
    }
}
