/// Name of the unique constraint guarding `short_links.slug`.
pub const SLUG_UNIQUE_CONSTRAINT: &str = "short_links_slug_key";

/// Returns true if `e` is a unique violation on the slug column.
///
/// Relies on the driver's structured error code and constraint name, never on
/// the error message text.
pub fn is_unique_violation_on_slug(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some(SLUG_UNIQUE_CONSTRAINT))
}
