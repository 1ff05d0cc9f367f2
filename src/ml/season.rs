use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Summer,
    Monsoon,
    Autumn,
    Winter,
}

/// Calendar months (1 = January) covered by each season.
const SEASON_MONTHS: [(Season, &[u32]); 4] = [
    (Season::Summer, &[3, 4, 5]),
    (Season::Monsoon, &[6, 7, 8]),
    (Season::Autumn, &[9, 10]),
    (Season::Winter, &[11, 12, 1, 2]),
];

impl Season {
    pub const ALL: [Season; 4] = [
        Season::Summer,
        Season::Monsoon,
        Season::Autumn,
        Season::Winter,
    ];

    /// Season for a calendar month, 1-based.
    pub fn from_month(month: u32) -> Self {
        SEASON_MONTHS
            .iter()
            .find(|(_, months)| months.contains(&month))
            .map(|(season, _)| *season)
            .unwrap_or(Season::Winter)
    }

    pub fn from_date(date: &DateTime<Utc>) -> Self {
        Self::from_month(date.month())
    }

    pub fn current() -> Self {
        Self::from_date(&Utc::now())
    }

    /// Travel comfort (0-100) used by the budget estimator.
    pub fn comfort_score(&self) -> f64 {
        match self {
            Season::Summer => 40.0,
            Season::Monsoon => 60.0,
            Season::Autumn => 85.0,
            Season::Winter => 95.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Summer => "summer",
            Season::Monsoon => "monsoon",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "summer" => Ok(Season::Summer),
            "monsoon" => Ok(Season::Monsoon),
            "autumn" => Ok(Season::Autumn),
            "winter" => Ok(Season::Winter),
            other => Err(format!("unknown season '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_month_table_is_total() {
        for month in 1..=12 {
            let season = Season::from_month(month);
            let owners = SEASON_MONTHS
                .iter()
                .filter(|(_, months)| months.contains(&month))
                .count();
            assert_eq!(owners, 1, "month {} owned by {} seasons", month, owners);
            assert!(Season::ALL.contains(&season));
        }
    }

    #[test]
    fn test_january_is_winter_and_july_is_monsoon() {
        let january = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let july = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();

        assert_eq!(Season::from_date(&january), Season::Winter);
        assert_eq!(Season::from_date(&july), Season::Monsoon);
    }

    #[test]
    fn test_season_boundaries() {
        assert_eq!(Season::from_month(2), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Summer);
        assert_eq!(Season::from_month(5), Season::Summer);
        assert_eq!(Season::from_month(6), Season::Monsoon);
        assert_eq!(Season::from_month(9), Season::Autumn);
        assert_eq!(Season::from_month(10), Season::Autumn);
        assert_eq!(Season::from_month(11), Season::Winter);
    }

    #[test]
    fn test_out_of_range_month_falls_back_to_winter() {
        assert_eq!(Season::from_month(0), Season::Winter);
        assert_eq!(Season::from_month(13), Season::Winter);
    }

    #[test]
    fn test_parse_and_serialize() {
        assert_eq!("Autumn".parse::<Season>().unwrap(), Season::Autumn);
        assert!("spring".parse::<Season>().is_err());
        assert_eq!(
            serde_json::to_string(&Season::Monsoon).unwrap(),
            "\"monsoon\""
        );
    }
}
