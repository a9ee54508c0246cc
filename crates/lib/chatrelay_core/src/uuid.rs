// Helper for generating UUIDv7 (timestamp-sortable UUIDs).
//
// Conversation ids and server-generated chat ids are UUIDv7 so they sort by
// creation time. Users keep PG's gen_random_uuid() (v4).

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}
