// src/schema/alias.rs

use super::canonical::{
    DO_LOCATION_ID, DROPOFF_DATETIME, FARE_AMOUNT, PASSENGER_COUNT, PAYMENT_TYPE,
    PICKUP_DATETIME, PU_LOCATION_ID, TRIP_DISTANCE, VENDOR_ID,
};

/// Known source spellings → canonical column name.
///
/// Lookup is order-sensitive: when a file carries more than one spelling of
/// the same column, the entry listed first here wins. An exact canonical
/// name always beats any alias. Add new spellings by appending rows.
pub static COLUMN_ALIASES: &[(&str, &str)] = &[
    // yellow 2011+, green, fhvhv
    ("VendorID", VENDOR_ID),
    ("vendorid", VENDOR_ID),
    ("tpep_pickup_datetime", PICKUP_DATETIME),
    ("tpep_dropoff_datetime", DROPOFF_DATETIME),
    ("passenger_count", PASSENGER_COUNT),
    ("trip_distance", TRIP_DISTANCE),
    ("PULocationID", PU_LOCATION_ID),
    ("DOLocationID", DO_LOCATION_ID),
    ("payment_type", PAYMENT_TYPE),
    ("Payment_Type", PAYMENT_TYPE),
    ("fare_amount", FARE_AMOUNT),
    // fhv / generic
    ("pickup_datetime", PICKUP_DATETIME),
    ("dropoff_datetime", DROPOFF_DATETIME),
    ("dropOff_datetime", DROPOFF_DATETIME),
    ("passengers", PASSENGER_COUNT),
    ("PUlocationID", PU_LOCATION_ID),
    ("DOlocationID", DO_LOCATION_ID),
    // green
    ("lpep_pickup_datetime", PICKUP_DATETIME),
    ("lpep_dropoff_datetime", DROPOFF_DATETIME),
    // yellow 2009-2010
    ("vendor_name", VENDOR_ID),
    ("Trip_Pickup_DateTime", PICKUP_DATETIME),
    ("Trip_Dropoff_DateTime", DROPOFF_DATETIME),
    ("Passenger_Count", PASSENGER_COUNT),
    ("Trip_Distance", TRIP_DISTANCE),
    ("Fare_Amt", FARE_AMOUNT),
];

/// Spellings that resolve to `canonical`, in lookup priority order. The
/// canonical name itself comes first.
pub fn spellings_for(canonical: &'static str) -> impl Iterator<Item = &'static str> {
    std::iter::once(canonical).chain(
        COLUMN_ALIASES
            .iter()
            .filter(move |(alias, target)| *target == canonical && *alias != canonical)
            .map(|(alias, _)| *alias),
    )
}

/// Pick the source column for `canonical` among `available` names.
pub fn resolve<'a>(canonical: &'static str, available: &[&'a str]) -> Option<&'a str> {
    spellings_for(canonical).find_map(|spelling| {
        available.iter().copied().find(|name| *name == spelling)
    })
}
