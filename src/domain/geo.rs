//! Distance, ETA and opening-hours helpers
//!
//! Pure functions used by the reservation workflow and nearest-station
//! ranking. No I/O.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};

use super::error::{DomainError, DomainResult};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two (lat, lon) points.
pub fn calc_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Pickup estimate handed back to the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelEstimate {
    pub distance_km: f64,
    pub travel_minutes: i64,
    pub expected_pickup_time: DateTime<Utc>,
}

/// Average travel speed plus a fixed buffer for parking and queueing.
#[derive(Debug, Clone, Copy)]
pub struct TravelPolicy {
    pub speed_kmh: f64,
    pub buffer_minutes: i64,
}

impl Default for TravelPolicy {
    fn default() -> Self {
        Self {
            speed_kmh: 40.0,
            buffer_minutes: 20,
        }
    }
}

impl TravelPolicy {
    /// `ceil(distance / speed * 60) + buffer`
    pub fn travel_minutes(&self, distance_km: f64) -> i64 {
        (distance_km / self.speed_kmh * 60.0).ceil() as i64 + self.buffer_minutes
    }

    pub fn estimate(&self, distance_km: f64, now: DateTime<Utc>) -> TravelEstimate {
        let travel_minutes = self.travel_minutes(distance_km);
        TravelEstimate {
            distance_km,
            travel_minutes,
            expected_pickup_time: now + Duration::minutes(travel_minutes),
        }
    }
}

/// Station opening hours, compared against the time of day only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl OpeningHours {
    /// Parse `HH:MM:SS` strings.
    pub fn parse(open: &str, close: &str) -> DomainResult<Self> {
        let parse = |s: &str| {
            NaiveTime::parse_from_str(s, "%H:%M:%S")
                .map_err(|_| {
                    DomainError::bad_request(format!("Invalid time '{}', expected HH:MM:SS", s))
                })
        };
        Ok(Self {
            open: parse(open)?,
            close: parse(close)?,
        })
    }

    /// Whether `at`, seen in the station's local offset, falls between open
    /// and close of the same calendar day. Windows that wrap past midnight
    /// never match.
    pub fn contains(&self, at: DateTime<Utc>, offset: FixedOffset) -> bool {
        let local = at.with_timezone(&offset).time();
        self.open <= local && local <= self.close
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const HCMC: (f64, f64) = (10.7769, 106.7009);
    const HANOI: (f64, f64) = (21.0285, 105.8542);

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(calc_distance(HCMC.0, HCMC.1, HCMC.0, HCMC.1), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = calc_distance(HCMC.0, HCMC.1, HANOI.0, HANOI.1);
        let ba = calc_distance(HANOI.0, HANOI.1, HCMC.0, HCMC.1);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn distance_matches_known_city_pair() {
        // Ho Chi Minh City to Hanoi is roughly 1,140 km as the crow flies.
        let d = calc_distance(HCMC.0, HCMC.1, HANOI.0, HANOI.1);
        assert!((1100.0..1180.0).contains(&d), "got {}", d);
    }

    #[test]
    fn travel_minutes_round_up_and_add_buffer() {
        let policy = TravelPolicy::default();
        assert_eq!(policy.travel_minutes(0.0), 20);
        // 10 km at 40 km/h = 15 min
        assert_eq!(policy.travel_minutes(10.0), 35);
        // 10.1 km = 15.15 min, rounded up
        assert_eq!(policy.travel_minutes(10.1), 36);
    }

    #[test]
    fn estimate_offsets_pickup_from_now() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let est = TravelPolicy::default().estimate(20.0, now);
        assert_eq!(est.travel_minutes, 50);
        assert_eq!(est.expected_pickup_time, now + Duration::minutes(50));
    }

    #[test]
    fn opening_hours_compare_local_time_of_day() {
        let hours = OpeningHours::parse("06:00:00", "22:00:00").unwrap();
        let vn = FixedOffset::east_opt(7 * 3600).unwrap();

        // 00:30 UTC is 07:30 in Vietnam
        let morning = Utc.with_ymd_and_hms(2025, 3, 1, 0, 30, 0).unwrap();
        assert!(hours.contains(morning, vn));

        // 16:00 UTC is 23:00 in Vietnam
        let late = Utc.with_ymd_and_hms(2025, 3, 1, 16, 0, 0).unwrap();
        assert!(!hours.contains(late, vn));
    }

    #[test]
    fn overnight_window_never_matches() {
        let hours = OpeningHours::parse("22:00:00", "06:00:00").unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 23, 0, 0).unwrap();
        assert!(!hours.contains(at, utc));
    }

    #[test]
    fn malformed_hours_are_rejected() {
        assert!(OpeningHours::parse("6am", "22:00:00").is_err());
    }
}
