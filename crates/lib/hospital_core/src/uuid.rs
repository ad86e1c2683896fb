// Record identifiers are UUIDv7 generated app-side so the in-memory and
// PostgreSQL stores hand out ids of the same shape, ordered by creation time.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}

/// Generate a new UUIDv7 in its hyphenated string form.
pub fn new_id() -> String {
    uuidv7().to_string()
}

/// Parse a record id, returning `None` for anything that is not a UUID.
pub fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}
