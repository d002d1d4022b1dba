//! Shipment origin address resolution.
//!
//! Inbound shipments carry a free-form ship-from address instead of a
//! location id. Operators map each distinct address to a stock location
//! once; the resolver looks addresses up by their full seven-field tuple
//! and registers unseen ones so they show up for mapping.
//!
//! Resolution outcomes:
//! - Mapped: the tuple exists and has a location -> `Some(location_id)`
//! - Unmapped: the tuple exists without a location -> `None`
//! - Unseen: the tuple is registered unmapped -> `None`

use diesel::prelude::*;
use diesel::{SqliteConnection, insert_into};
use tracing::info;

use crate::models::NewAddressMapping;
use crate::schema::address_mappings;

/// The seven fields that identify a shipment origin.
///
/// Absent wire fields are stored as empty strings so the tuple stays
/// comparable under the table's UNIQUE constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressTuple {
    /// Contact or facility name.
    pub name: String,
    /// First address line.
    pub address_line1: String,
    /// Second address line.
    pub address_line2: String,
    /// City.
    pub city: String,
    /// State or region code.
    pub state_or_region: String,
    /// Postal code.
    pub postal_code: String,
    /// Two-letter country code.
    pub country_code: String,
}

impl AddressTuple {
    /// Builds a tuple from optional wire fields, trimming whitespace and
    /// mapping absent fields to empty strings.
    pub fn from_parts(
        name: Option<&str>,
        address_line1: Option<&str>,
        address_line2: Option<&str>,
        city: Option<&str>,
        state_or_region: Option<&str>,
        postal_code: Option<&str>,
        country_code: Option<&str>,
    ) -> AddressTuple {
        let clean = |v: Option<&str>| v.unwrap_or_default().trim().to_string();
        AddressTuple {
            name: clean(name),
            address_line1: clean(address_line1),
            address_line2: clean(address_line2),
            city: clean(city),
            state_or_region: clean(state_or_region),
            postal_code: clean(postal_code),
            country_code: clean(country_code),
        }
    }

    /// One-line rendering for log messages.
    pub fn summary(&self) -> String {
        [
            self.name.as_str(),
            self.address_line1.as_str(),
            self.city.as_str(),
            self.state_or_region.as_str(),
            self.postal_code.as_str(),
            self.country_code.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Looks up an address tuple, registering it unmapped when unseen.
///
/// Returns the mapped location id, or `None` when the address still needs
/// operator attention.
pub fn resolve_or_register(
    conn: &mut SqliteConnection,
    tuple: &AddressTuple,
) -> anyhow::Result<Option<i32>> {
    let existing = address_mappings::table
        .filter(address_mappings::name.eq(&tuple.name))
        .filter(address_mappings::address_line1.eq(&tuple.address_line1))
        .filter(address_mappings::address_line2.eq(&tuple.address_line2))
        .filter(address_mappings::city.eq(&tuple.city))
        .filter(address_mappings::state_or_region.eq(&tuple.state_or_region))
        .filter(address_mappings::postal_code.eq(&tuple.postal_code))
        .filter(address_mappings::country_code.eq(&tuple.country_code))
        .select((address_mappings::id, address_mappings::location_id))
        .first::<(i32, Option<i32>)>(conn)
        .optional()?;

    if let Some((_, location_id)) = existing {
        return Ok(location_id);
    }

    let row = NewAddressMapping {
        name: &tuple.name,
        address_line1: &tuple.address_line1,
        address_line2: &tuple.address_line2,
        city: &tuple.city,
        state_or_region: &tuple.state_or_region,
        postal_code: &tuple.postal_code,
        country_code: &tuple.country_code,
    };
    insert_into(address_mappings::table)
        .values(&row)
        .execute(conn)?;
    info!(
        address = %tuple.summary(),
        "registered new shipment origin; map it to a location to import its shipments"
    );
    Ok(None)
}

/// Number of registered addresses still waiting for a location.
pub fn unmapped_count(conn: &mut SqliteConnection) -> anyhow::Result<i64> {
    let n = address_mappings::table
        .filter(address_mappings::location_id.is_null())
        .count()
        .get_result::<i64>(conn)?;
    Ok(n)
}

/// Total number of registered addresses.
pub fn total_count(conn: &mut SqliteConnection) -> anyhow::Result<i64> {
    let n = address_mappings::table.count().get_result::<i64>(conn)?;
    Ok(n)
}
