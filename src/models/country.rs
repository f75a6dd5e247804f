use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountryRequest {
    #[schema(example = "India")]
    pub name: Option<String>,
    #[schema(example = "IN")]
    pub code: Option<String>,
    #[schema(example = "IND")]
    pub iso_code: Option<String>,
    #[schema(example = "+91")]
    pub dial_code: Option<String>,
    #[schema(example = "INR")]
    pub currency: Option<String>,
    pub is_domestic: Option<bool>,
    pub is_default: Option<bool>,
}

/// India is always the domestic default, whatever the caller sends.
pub fn is_home_country(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case("india")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_country_match() {
        assert!(is_home_country("India"));
        assert!(is_home_country(" INDIA "));
        assert!(!is_home_country("Indiana"));
    }
}
