use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 預設每位付費客戶的月費 (產品訂閱價格，可由配置覆蓋)
pub const DEFAULT_UNIT_PRICE: f64 = 99.0;

/// 預測月數上限，限制單次計算的工作量
pub const MAX_FORECAST_MONTHS: u32 = 120;

/// Acquisition channel catalog. Labels outside the catalog fall back to `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Channel {
    TargetingBlogs,
    Publicity,
    UnconventionalPr,
    SearchEngineMarketing,
    SocialAndDisplayAds,
    OfflineAds,
    SearchEngineOptimization,
    ContentMarketing,
    EmailMarketing,
    ViralMarketing,
    EngineeringAsMarketing,
    BusinessDevelopment,
    Sales,
    AffiliatePrograms,
    ExistingPlatforms,
    TradeShows,
    OfflineEvents,
    SpeakingEngagements,
    CommunityBuilding,
    Custom(String),
}

impl Channel {
    pub const CATALOG: [&'static str; 19] = [
        "Targeting Blogs",
        "Publicity",
        "Unconventional PR",
        "Search Engine Marketing",
        "Social & Display Ads",
        "Offline Ads",
        "Search Engine Optimization",
        "Content Marketing",
        "Email Marketing",
        "Viral Marketing",
        "Engineering as Marketing",
        "Business Development",
        "Sales",
        "Affiliate Programs",
        "Existing Platforms",
        "Trade Shows",
        "Offline Events",
        "Speaking Engagements",
        "Community Building",
    ];

    pub fn label(&self) -> &str {
        match self {
            Channel::TargetingBlogs => "Targeting Blogs",
            Channel::Publicity => "Publicity",
            Channel::UnconventionalPr => "Unconventional PR",
            Channel::SearchEngineMarketing => "Search Engine Marketing",
            Channel::SocialAndDisplayAds => "Social & Display Ads",
            Channel::OfflineAds => "Offline Ads",
            Channel::SearchEngineOptimization => "Search Engine Optimization",
            Channel::ContentMarketing => "Content Marketing",
            Channel::EmailMarketing => "Email Marketing",
            Channel::ViralMarketing => "Viral Marketing",
            Channel::EngineeringAsMarketing => "Engineering as Marketing",
            Channel::BusinessDevelopment => "Business Development",
            Channel::Sales => "Sales",
            Channel::AffiliatePrograms => "Affiliate Programs",
            Channel::ExistingPlatforms => "Existing Platforms",
            Channel::TradeShows => "Trade Shows",
            Channel::OfflineEvents => "Offline Events",
            Channel::SpeakingEngagements => "Speaking Engagements",
            Channel::CommunityBuilding => "Community Building",
            Channel::Custom(label) => label.as_str(),
        }
    }
}

impl From<String> for Channel {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Targeting Blogs" => Channel::TargetingBlogs,
            "Publicity" => Channel::Publicity,
            "Unconventional PR" => Channel::UnconventionalPr,
            "Search Engine Marketing" => Channel::SearchEngineMarketing,
            "Social & Display Ads" => Channel::SocialAndDisplayAds,
            "Offline Ads" => Channel::OfflineAds,
            "Search Engine Optimization" => Channel::SearchEngineOptimization,
            "Content Marketing" => Channel::ContentMarketing,
            "Email Marketing" => Channel::EmailMarketing,
            "Viral Marketing" => Channel::ViralMarketing,
            "Engineering as Marketing" => Channel::EngineeringAsMarketing,
            "Business Development" => Channel::BusinessDevelopment,
            "Sales" => Channel::Sales,
            "Affiliate Programs" => Channel::AffiliatePrograms,
            "Existing Platforms" => Channel::ExistingPlatforms,
            "Trade Shows" => Channel::TradeShows,
            "Offline Events" => Channel::OfflineEvents,
            "Speaking Engagements" => Channel::SpeakingEngagements,
            "Community Building" => Channel::CommunityBuilding,
            _ => Channel::Custom(label),
        }
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.label().to_string()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One channel/medium pairing with its assumed funnel performance.
/// Percentage fields are 0-100, not fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub channel: Channel,
    pub medium: String,
    pub site_visitors: f64,
    pub conversion_to_trial: f64,
    pub conversion_to_paid: f64,
    pub churn_rate: f64,
    pub cost: f64,
}

/// 兩種預測模型：逐通道訪客成長 (含流失) 與 MRR 目標份額分攤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ForecastMode {
    #[default]
    ChurnAware,
    ShareApportioned,
}

impl ForecastMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMode::ChurnAware => "churn-aware",
            ForecastMode::ShareApportioned => "share-apportioned",
        }
    }
}

impl fmt::Display for ForecastMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForecastMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "churn-aware" => Ok(ForecastMode::ChurnAware),
            "share-apportioned" => Ok(ForecastMode::ShareApportioned),
            other => Err(format!(
                "unknown forecast mode '{}', expected 'churn-aware' or 'share-apportioned'",
                other
            )),
        }
    }
}

/// Scalar inputs shared by every entry in one forecast run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastParams {
    pub months: u32,
    pub growth_rate: f64,
    pub unit_price: f64,
    pub mode: ForecastMode,
}

impl ForecastParams {
    pub fn new(months: u32, growth_rate: f64) -> Self {
        Self {
            months,
            growth_rate,
            unit_price: DEFAULT_UNIT_PRICE,
            mode: ForecastMode::default(),
        }
    }

    pub fn with_unit_price(mut self, unit_price: f64) -> Self {
        self.unit_price = unit_price;
        self
    }

    pub fn with_mode(mut self, mode: ForecastMode) -> Self {
        self.mode = mode;
        self
    }
}

/// One (month, channel) projection. Field renames match the report column headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Channel")]
    pub channel: Channel,
    #[serde(rename = "Medium")]
    pub medium: String,
    #[serde(rename = "Site Visitors")]
    pub site_visitors: f64,
    #[serde(rename = "Trials")]
    pub trials: f64,
    #[serde(rename = "Paid Customers")]
    pub paid_customers: f64,
    #[serde(rename = "MRR")]
    pub mrr: f64,
    #[serde(rename = "Cost")]
    pub cost: f64,
    #[serde(rename = "CAC")]
    pub cac: f64,
    #[serde(rename = "LTV")]
    pub ltv: f64,
    #[serde(rename = "ROI")]
    pub roi: f64,
}

/// Totals summed across every row of the horizon. Cumulative figures,
/// not a final-month snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub total_cost: f64,
    pub total_mrr: f64,
    pub total_customers: f64,
}

impl ForecastSummary {
    pub fn total_arr(&self) -> f64 {
        round2(self.total_mrr * 12.0)
    }

    pub fn blended_cac(&self) -> f64 {
        if self.total_customers > 0.0 {
            round2(self.total_cost / self.total_customers)
        } else {
            0.0
        }
    }
}

/// Engine return value: projection table plus aggregate totals.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub rows: Vec<ForecastRow>,
    pub summary: ForecastSummary,
}

/// Transform stage output handed to the load stage.
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    pub rows: Vec<ForecastRow>,
    pub summary: ForecastSummary,
    pub csv_output: String,
    pub tsv_output: String,
}

/// Round to 2 decimal places for display fields.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parses_catalog_labels() {
        for label in Channel::CATALOG {
            let channel = Channel::from(label.to_string());
            assert!(
                !matches!(channel, Channel::Custom(_)),
                "{} fell through to Custom",
                label
            );
            assert_eq!(channel.label(), label);
        }
    }

    #[test]
    fn test_channel_free_text_roundtrip() {
        let channel = Channel::from("Podcast Sponsorship".to_string());
        assert_eq!(channel, Channel::Custom("Podcast Sponsorship".to_string()));
        assert_eq!(String::from(channel), "Podcast Sponsorship");
    }

    #[test]
    fn test_forecast_mode_from_str() {
        assert_eq!(
            "churn-aware".parse::<ForecastMode>().unwrap(),
            ForecastMode::ChurnAware
        );
        assert_eq!(
            "share-apportioned".parse::<ForecastMode>().unwrap(),
            ForecastMode::ShareApportioned
        );
        assert!("mrr-target".parse::<ForecastMode>().is_err());
    }

    #[test]
    fn test_summary_derived_figures() {
        let summary = ForecastSummary {
            total_cost: 1000.0,
            total_mrr: 388.08,
            total_customers: 3.92,
        };

        assert_eq!(summary.total_arr(), 4656.96);
        assert_eq!(summary.blended_cac(), 255.1);
    }

    #[test]
    fn test_summary_blended_cac_without_customers() {
        let summary = ForecastSummary::default();
        assert_eq!(summary.blended_cac(), 0.0);
    }

    #[test]
    fn test_params_builder_defaults() {
        let params = ForecastParams::new(12, 10.0);
        assert_eq!(params.unit_price, DEFAULT_UNIT_PRICE);
        assert_eq!(params.mode, ForecastMode::ChurnAware);

        let params = params
            .with_unit_price(49.0)
            .with_mode(ForecastMode::ShareApportioned);
        assert_eq!(params.unit_price, 49.0);
        assert_eq!(params.mode, ForecastMode::ShareApportioned);
    }
}
