use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Create body: either an explicit list of days, or an inclusive range
/// the server expands.
#[derive(Debug, Deserialize)]
pub struct CreateReservationsRequest {
    #[serde(default)]
    pub dates: Vec<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedReservations {
    pub created: u64,
}

/// One booked day in the availability map, annotated for the caller.
#[derive(Debug, Serialize)]
pub struct DayEntry {
    pub owner_name: String,
    pub owner_id: Uuid,
    pub is_owner: bool,
}
