use serde::{Deserialize, Serialize};

use crate::ml::season::Season;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelType {
    Solo,
    Couple,
    Family,
    Group,
}

impl TravelType {
    /// Numeric code used by the budget formula.
    pub fn code(&self) -> u8 {
        match self {
            TravelType::Solo => 0,
            TravelType::Couple => 1,
            TravelType::Family => 2,
            TravelType::Group => 3,
        }
    }

    /// Unknown or missing travel types are budgeted as couples.
    pub fn code_or_default(travel_type: Option<TravelType>) -> u8 {
        travel_type.map_or(TravelType::Couple.code(), |t| t.code())
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "solo" => Some(TravelType::Solo),
            "couple" => Some(TravelType::Couple),
            "family" => Some(TravelType::Family),
            "group" => Some(TravelType::Group),
            _ => None,
        }
    }
}

/// Recommendation search request. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub days: Option<u32>,
    pub budget: Option<f64>,
    /// Free text; unrecognised values fall back to the couple budget code
    pub travel_type: Option<String>,
    pub season: Option<Season>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl SearchParams {
    pub fn travel_type(&self) -> Option<TravelType> {
        self.travel_type.as_deref().and_then(TravelType::parse)
    }

    /// Reject values the scoring core cannot make sense of.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(days) = self.days {
            if days == 0 || days > 365 {
                return Err("days must be between 1 and 365".to_string());
            }
        }
        if let Some(budget) = self.budget {
            if !budget.is_finite() || budget <= 0.0 {
                return Err("budget must be a positive number".to_string());
            }
        }
        Ok(())
    }
}

/// Query string form of [`SearchParams`]; interests arrive comma separated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub days: Option<u32>,
    pub budget: Option<f64>,
    pub travel_type: Option<String>,
    pub season: Option<Season>,
    pub interests: Option<String>,
}

impl From<SearchQuery> for SearchParams {
    fn from(query: SearchQuery) -> Self {
        let interests = query
            .interests
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|interest| !interest.is_empty())
            .map(str::to_string)
            .collect();

        SearchParams {
            days: query.days,
            budget: query.budget,
            travel_type: query.travel_type,
            season: query.season,
            interests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_type_codes() {
        assert_eq!(TravelType::parse("Family").map(|t| t.code()), Some(2));
        assert_eq!(TravelType::code_or_default(TravelType::parse("backpacker")), 1);
        assert_eq!(TravelType::code_or_default(Some(TravelType::Group)), 3);
    }

    #[test]
    fn test_search_params_from_json() {
        let params: SearchParams = serde_json::from_str(
            r#"{"days": 4, "budget": 20000, "travelType": "solo", "season": "winter"}"#,
        )
        .unwrap();

        assert_eq!(params.days, Some(4));
        assert_eq!(params.travel_type(), Some(TravelType::Solo));
        assert_eq!(params.season, Some(Season::Winter));
        assert!(params.interests.is_empty());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_query_interests_split_on_commas() {
        let query = SearchQuery {
            interests: Some("beach, heritage,,".to_string()),
            ..Default::default()
        };
        let params = SearchParams::from(query);
        assert_eq!(params.interests, vec!["beach", "heritage"]);

        let params = SearchParams::from(SearchQuery::default());
        assert!(params.interests.is_empty());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let params = SearchParams {
            days: Some(0),
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = SearchParams {
            budget: Some(-10.0),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
