use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::NaverConfig;
use crate::external::price_provider::{HistoryProvider, PriceProviderError};
use crate::models::{PricePoint, PriceSeries};

const USER_AGENT: &str = "Mozilla/5.0";

/// Extracts price bars and company names from Naver Finance responses.
pub struct NaverParser {
    item_re: Regex,
    company_re: Regex,
    link_re: Regex,
    tag_re: Regex,
}

impl NaverParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            // <item data="20240102|78200|79800|78200|79600|17142847" />
            item_re: Regex::new(r#"item data="([^"]*)""#)?,
            company_re: Regex::new(
                r#"(?s)<div[^>]*class="[^"]*\bwrap_company\b[^"]*"[^>]*>.*?<h2[^>]*>(.*?)</h2>"#,
            )?,
            link_re: Regex::new(r"(?s)<a[^>]*>(.*?)</a>")?,
            tag_re: Regex::new(r"<[^>]+>")?,
        })
    }

    /// Parse every well-formed `item data="..."` entry of a chart response.
    ///
    /// Entries with fewer than 6 fields, an unparseable date or number, or a
    /// negative value are skipped. The result is sorted by date and a repeated
    /// date keeps its last entry.
    pub fn parse_history(&self, body: &str) -> Vec<PricePoint> {
        let mut points: Vec<PricePoint> = self
            .item_re
            .captures_iter(body)
            .filter_map(|cap| {
                let raw = cap.get(1)?.as_str();
                let point = parse_item(raw);
                if point.is_none() {
                    debug!("Skipping malformed chart item: {}", raw);
                }
                point
            })
            .collect();

        points.sort_by_key(|p| p.date);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }
        deduped
    }

    /// Text of the company heading link, or an empty string when absent.
    pub fn parse_company_name(&self, html: &str) -> String {
        self.company_re
            .captures(html)
            .and_then(|cap| cap.get(1))
            .and_then(|heading| self.link_re.captures(heading.as_str()))
            .and_then(|cap| cap.get(1))
            .map(|m| decode_entities(self.tag_re.replace_all(m.as_str(), "").trim()))
            .unwrap_or_default()
    }
}

fn parse_item(raw: &str) -> Option<PricePoint> {
    let fields: Vec<&str> = raw.split('|').collect();
    if fields.len() < 6 {
        return None;
    }

    let date = NaiveDate::parse_from_str(fields[0].trim(), "%Y%m%d").ok()?;
    let mut numbers = [0.0_f64; 5];
    for (slot, field) in numbers.iter_mut().zip(&fields[1..6]) {
        let value: f64 = field.trim().parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        *slot = value;
    }

    let [open, high, low, close, volume] = numbers;
    Some(PricePoint::new(date, open, high, low, close, volume))
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Naver Finance history source (KRX tickers such as `005930`).
pub struct NaverProvider {
    client: reqwest::Client,
    parser: NaverParser,
    chart_url: String,
    item_url: String,
}

impl NaverProvider {
    pub fn new(config: &NaverConfig) -> Result<Self, PriceProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| PriceProviderError::Network(format!("failed to build HTTP client: {}", e)))?;

        let parser = NaverParser::new()
            .map_err(|e| PriceProviderError::Parse(format!("invalid pattern: {}", e)))?;

        Ok(Self {
            client,
            parser,
            chart_url: config.chart_url.clone(),
            item_url: config.item_url.clone(),
        })
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<reqwest::Response, PriceProviderError> {
        let resp = self.client.get(url).query(query).send().await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(PriceProviderError::BadResponse(format!("HTTP {}", resp.status())));
        }

        Ok(resp)
    }
}

#[async_trait]
impl HistoryProvider for NaverProvider {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
        bars: u32,
    ) -> Result<PriceSeries, PriceProviderError> {
        let query = [
            ("symbol", ticker.to_string()),
            ("timeframe", "day".to_string()),
            ("count", bars.to_string()),
            ("requestType", "0".to_string()),
        ];
        let body = self.get(&self.chart_url, &query).await?.text().await?;

        if !body.contains("item data=") {
            warn!("No chart items in Naver response for {}", ticker);
            return Ok(PriceSeries::empty());
        }

        let points = self.parser.parse_history(&body);
        debug!("Parsed {} daily bars for {}", points.len(), ticker);

        PriceSeries::new(points).map_err(|e| PriceProviderError::Parse(e.to_string()))
    }

    async fn fetch_company_name(&self, ticker: &str) -> Result<String, PriceProviderError> {
        let html = self
            .get(&self.item_url, &[("code", ticker.to_string())])
            .await?
            .text_with_charset("euc-kr")
            .await?;

        Ok(self.parser.parse_company_name(&html))
    }
}
