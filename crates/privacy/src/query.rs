//! Store query for records that might mention an email address.

use crate::catalog::FieldCatalog;
use crate::error::{ErrorKind, Result};
use crate::settings::Settings;
use exn::ResultExt;
use tracing::instrument;
use wcpt_store::RecordStore;
use wcpt_store::query::{MetaClause, MetaQuery, Order, Permission, QueryPage, QuerySpec, Relation, StatusFilter};

/// Records per page, for both export and erase.
pub const PER_PAGE: u32 = 20;

/// Build the query for one page of candidate records.
///
/// The filter is deliberately coarser than the exact-match validation the
/// exporter applies afterwards: alongside an exact clause per catalog key it
/// matches the address anywhere inside the serialized catch-all field, so
/// some candidates yield no exported fields at all.
pub fn records_query(catalog: &FieldCatalog, settings: &Settings, email_address: &str, page: u32) -> QuerySpec {
    let meta = catalog.primary_keys().fold(
        MetaQuery::new(Relation::Or).with_clause(MetaClause::like(&settings.catch_all_key, email_address)),
        |meta, key| meta.with_clause(MetaClause::equals(key, email_address)),
    );
    QuerySpec::new(&settings.post_type)
        .with_status(StatusFilter::Any)
        .with_permission(Permission::Readable)
        .with_per_page(PER_PAGE)
        .with_page(page)
        .with_order(Order::Descending)
        .with_meta_query(meta)
}

/// Fetch one page of candidate records.
#[instrument(skip(store, catalog, settings, email_address), fields(store = store.name()))]
pub(crate) async fn fetch_records(
    store: &dyn RecordStore,
    catalog: &FieldCatalog,
    settings: &Settings,
    email_address: &str,
    page: u32,
) -> Result<QueryPage> {
    let spec = records_query(catalog, settings, email_address, page);
    let result = store.query(&spec).await.or_raise(|| ErrorKind::Store)?;
    tracing::debug!(
        candidates = result.records.len(),
        found = result.found,
        max_num_pages = result.max_num_pages,
        "Fetched candidate records"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EMAIL_FIELDS;
    use wcpt_store::query::Compare;

    #[test]
    fn test_query_shape() {
        let spec = records_query(&EMAIL_FIELDS, &Settings::default(), "a@x.com", 3);
        assert_eq!(spec.post_type, "wordcamp");
        assert_eq!(spec.status, StatusFilter::Any);
        assert_eq!(spec.permission, Permission::Readable);
        assert_eq!(spec.per_page, 20);
        assert_eq!(spec.page, 3);
        assert_eq!(spec.meta.relation, Relation::Or);
        assert_eq!(spec.meta.clauses.len(), EMAIL_FIELDS.len() + 1);
    }

    #[test]
    fn test_catch_all_clause_is_substring() {
        let spec = records_query(&EMAIL_FIELDS, &Settings::default(), "a@x.com", 1);
        let first = &spec.meta.clauses[0];
        assert_eq!(first.key, "_application_data");
        assert_eq!(first.compare, Compare::Like);
        assert_eq!(first.value, "a@x.com");
    }

    #[test]
    fn test_catalog_clauses_are_exact_and_ordered() {
        let spec = records_query(&EMAIL_FIELDS, &Settings::default(), "a@x.com", 1);
        let keys: Vec<_> = spec.meta.clauses[1..].iter().map(|clause| clause.key.as_str()).collect();
        assert_eq!(keys, EMAIL_FIELDS.primary_keys().collect::<Vec<_>>());
        assert!(spec.meta.clauses[1..].iter().all(|clause| clause.compare == Compare::Equals));
        assert!(spec.meta.clauses.iter().all(|clause| clause.value == "a@x.com"));
    }

    #[test]
    fn test_custom_settings() {
        let settings = Settings {
            post_type: "wp_meetup".to_string(),
            catch_all_key: "_meetup_data".to_string(),
        };
        let spec = records_query(&EMAIL_FIELDS, &settings, "a@x.com", 1);
        assert_eq!(spec.post_type, "wp_meetup");
        assert_eq!(spec.meta.clauses[0].key, "_meetup_data");
    }
}
