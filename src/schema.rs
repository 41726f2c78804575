//! Table and column names of the flight dataset.
//!
//! Every query in the crate is assembled from these constants so that a
//! renamed column only needs to change here.
//!
//! ```text
//! flights.aircraft_reg ──▶ aircraft.aircraft_reg   (soft, may not resolve)
//! flights.origin_icao  ──▶ airports.icao_code      (soft, may not resolve)
//! flights.dest_icao    ──▶ airports.icao_code      (soft, may not resolve)
//! ```

/// The `flights` relation.
pub mod flights {
    pub const TABLE: &str = "flights";

    pub const FLIGHT_ID: &str = "flight_id";
    pub const FLIGHT_NUMBER: &str = "flight_number";
    pub const AIRLINE_NAME: &str = "airline_name";
    pub const AIRCRAFT_REG: &str = "aircraft_reg";
    pub const ORIGIN_ICAO: &str = "origin_icao";
    pub const ORIGIN_IATA: &str = "origin_iata";
    pub const ORIGIN_CITY: &str = "origin_city";
    pub const DEST_ICAO: &str = "dest_icao";
    pub const DEST_IATA: &str = "dest_iata";
    pub const DEST_CITY: &str = "dest_city";
    pub const SCHEDULED_DEP: &str = "scheduled_dep";
    pub const ACTUAL_DEP: &str = "actual_dep";
    pub const SCHEDULED_ARR: &str = "scheduled_arr";
    pub const ACTUAL_ARR: &str = "actual_arr";
    pub const STATUS: &str = "status";
}

/// The `aircraft` relation.
pub mod aircraft {
    pub const TABLE: &str = "aircraft";

    pub const AIRCRAFT_REG: &str = "aircraft_reg";
    pub const AIRCRAFT_MODEL: &str = "aircraft_model";
    pub const MANUFACTURER: &str = "manufacturer";
}

/// The `airports` relation.
pub mod airports {
    pub const TABLE: &str = "airports";

    pub const ICAO_CODE: &str = "icao_code";
    pub const IATA_CODE: &str = "iata_code";
    pub const NAME: &str = "name";
    pub const CITY: &str = "city";
    pub const COUNTRY: &str = "country";
}

/// Flight status values the reports know by name.
///
/// The column itself is an open string domain; anything not listed here is
/// still a valid status and is tallied separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightStatus {
    Arrived,
    Departed,
    Unknown,
    Expected,
    Approaching,
    Canceled,
    Delayed,
}

impl FlightStatus {
    /// All known statuses, in report column order.
    pub const KNOWN: [FlightStatus; 7] = [
        FlightStatus::Arrived,
        FlightStatus::Departed,
        FlightStatus::Unknown,
        FlightStatus::Expected,
        FlightStatus::Approaching,
        FlightStatus::Canceled,
        FlightStatus::Delayed,
    ];

    /// The value as stored in `flights.status`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Arrived => "Arrived",
            FlightStatus::Departed => "Departed",
            FlightStatus::Unknown => "Unknown",
            FlightStatus::Expected => "Expected",
            FlightStatus::Approaching => "Approaching",
            FlightStatus::Canceled => "Canceled",
            FlightStatus::Delayed => "Delayed",
        }
    }

    /// Report column name for this status bucket.
    pub fn column_name(&self) -> &'static str {
        match self {
            FlightStatus::Arrived => "arrived",
            FlightStatus::Departed => "departed",
            FlightStatus::Unknown => "unknown",
            FlightStatus::Expected => "expected",
            FlightStatus::Approaching => "approaching",
            FlightStatus::Canceled => "canceled",
            FlightStatus::Delayed => "delayed",
        }
    }
}
