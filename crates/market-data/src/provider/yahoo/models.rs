//! Yahoo Finance API response models.
//!
//! These models parse the quoteSummary API responses, which carry the
//! previous-close and 52-week fields the chart endpoints do not.

use serde::Deserialize;

/// Main response wrapper for quoteSummary API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteSummaryResponse {
    pub quote_summary: YahooQuoteSummary,
}

/// Quote summary container
#[derive(Debug, Deserialize)]
pub struct YahooQuoteSummary {
    #[serde(default)]
    pub result: Vec<YahooQuoteSummaryResult>,
    // Note: error field exists in API but we handle errors via HTTP status/empty results
}

/// Individual result from quoteSummary API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteSummaryResult {
    pub price: Option<YahooPriceData>,
    pub summary_detail: Option<YahooSummaryDetail>,
}

/// Price data from quoteSummary API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooPriceData {
    pub regular_market_price: Option<YahooPriceDetail>,
    pub regular_market_previous_close: Option<YahooPriceDetail>,
}

/// Price detail with raw and formatted values
#[derive(Debug, Deserialize, Clone)]
pub struct YahooPriceDetail {
    pub raw: Option<f64>,
    // Note: fmt field exists but we only use raw values
}

/// Summary detail data (financial metrics)
/// Yahoo returns these as nested objects like {"raw": 123.45, "fmt": "123.45"}
/// or empty objects {} when no data is available.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooSummaryDetail {
    pub fifty_two_week_high: Option<YahooPriceDetail>,
    pub fifty_two_week_low: Option<YahooPriceDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_price_detail() {
        let json = r#"{"raw": 150.25, "fmt": "150.25"}"#;
        let detail: YahooPriceDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.raw, Some(150.25));
    }

    #[test]
    fn test_deserialize_price_detail_null() {
        let json = r#"{"raw": null, "fmt": null}"#;
        let detail: YahooPriceDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.raw, None);
    }

    #[test]
    fn test_deserialize_empty_summary_detail() {
        // Empty objects stand in for missing metrics
        let json = r#"{"fiftyTwoWeekHigh": {}, "fiftyTwoWeekLow": {}}"#;
        let detail: YahooSummaryDetail = serde_json::from_str(json).unwrap();
        assert!(detail.fifty_two_week_high.unwrap().raw.is_none());
        assert!(detail.fifty_two_week_low.unwrap().raw.is_none());
    }

    #[test]
    fn test_deserialize_quote_summary_response() {
        let json = r#"{
            "quoteSummary": {
                "result": [{
                    "price": {
                        "regularMarketPrice": {"raw": 11.6, "fmt": "11.60"},
                        "regularMarketPreviousClose": {"raw": 11.2, "fmt": "11.20"}
                    },
                    "summaryDetail": {
                        "fiftyTwoWeekHigh": {"raw": 14.0, "fmt": "14.00"},
                        "fiftyTwoWeekLow": {"raw": 9.1, "fmt": "9.10"}
                    }
                }]
            }
        }"#;
        let response: YahooQuoteSummaryResponse = serde_json::from_str(json).unwrap();
        let result = &response.quote_summary.result[0];
        let price = result.price.as_ref().unwrap();
        assert_eq!(
            price.regular_market_price.as_ref().unwrap().raw,
            Some(11.6)
        );
        assert_eq!(
            price.regular_market_previous_close.as_ref().unwrap().raw,
            Some(11.2)
        );
    }
}
