use chrono::NaiveDateTime;

type KWh = f64;
type Watt = f64;

/// Aggregation granularity of an energy query, as the vendor `type` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timespan {
    Day = 1,
    Month = 2,
    Year = 3,
    Total = 4,
}

/// Session state learned at login.
///
/// `session_id` and `server_id` are the `JSESSIONID` and `SERVERID` cookies; they are always
/// assigned together from the same login response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub session_id: String,
    pub server_id: String,
    pub user_id: i64,
    pub user_level: i64,
}

impl Session {
    pub fn is_active(&self) -> bool {
        !self.session_id.is_empty() && !self.server_id.is_empty()
    }
}

/// Growatt API client state.
///
/// Not meant to be shared between tasks without external locking: every operation takes
/// `&mut Api` because the session is refreshed in place.
#[derive(Debug)]
pub struct Api {
    pub(crate) api_url: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) session: Session,
    pub(crate) client: reqwest::Client,
}

impl Api {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_active()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plant {
    pub id: i64,
    pub name: String,
    /// Vendor formatted earnings, e.g. `"12.3 EUR"`
    pub earned: String,
    pub has_storage: bool,
    pub energy_today: KWh,
    pub energy_total: KWh,
    pub current_power: Watt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inverter {
    pub serial: String,
    pub datalog_serial: String,
    pub alias: String,
    pub location: String,
    pub inverter_type: String,
    pub device_type: String,
    pub is_lost: bool,
    pub status: i64,
    pub energy_today: KWh,
    pub energy_total: KWh,
    pub current_power: Watt,
}

/// Power generated at a certain time (in W)
#[derive(Debug, Clone, PartialEq)]
pub struct TimeEnergy {
    pub timestamp: NaiveDateTime,
    pub power: Watt,
}
