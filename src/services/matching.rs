use rusqlite::Connection;

use crate::db::queries;
use crate::models::Technician;

/// Picks the technician to assign to a booking in `category_id` at the given
/// locality. `Ok(None)` means nobody matched; the booking goes ahead unassigned.
/// A blank `area` or `pincode` never matches on that field.
pub fn find_available_technician(
    conn: &Connection,
    area: &str,
    pincode: &str,
    category_id: &str,
) -> anyhow::Result<Option<Technician>> {
    let technician = queries::find_matching_technician(conn, area.trim(), pincode.trim(), category_id)?;

    match &technician {
        Some(t) => tracing::debug!(technician_id = %t.id, category_id, "matched technician"),
        None => tracing::info!(area, pincode, category_id, "no technician available"),
    }

    Ok(technician)
}
