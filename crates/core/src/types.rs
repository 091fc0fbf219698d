/// Identifiers assigned by the remote store (businesses and their images).
pub type DbId = i64;
