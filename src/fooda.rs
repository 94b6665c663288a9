//! Fooda restaurant-banner scraping.
//!
//! The banner page is third-party markup with no schema. Each field is looked up
//! by CSS class, first match wins, and a missing field fails the whole fetch.

use log::debug;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Value, json};
use strum::{Display, EnumString};

use crate::error::{BotError, Result};

/// Root of the public menu pages.
const FOODA_BASE_URL: &str = "http://fooda.com";

/// Prefix for the scraped, site-relative order link.
const FOODA_APP_URL: &str = "https://app.fooda.com";

const NAME_SELECTOR: &str = "div.restaurant-banner__name";
const LOCATION_SELECTOR: &str = "div.restaurant-banner__location";
const CUSTOMER_SELECTOR: &str = "div.restaurant-banner__customer";
const TIME_SELECTOR: &str = "div.restaurant-banner__time";
const DESCRIPTION_SELECTOR: &str = "div.restaurant-banner__description";
const LOGO_SELECTOR: &str = "img.restaurant-banner__logo";
const LINK_SELECTOR: &str = "a.secondary-bar__tab.myfooda-link";

/// A site with a Fooda menu page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Location {
    Broad,
    Simches,
}

impl Location {
    /// Path of this location's page under the Fooda root.
    pub fn page_path(self) -> &'static str {
        match self {
            Location::Broad => "/broadinstitute",
            Location::Simches => "/simches",
        }
    }
}

/// Raw result of scraping a banner page: one entry per field, `None` when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannerScrape {
    pub restaurant: Option<String>,
    pub location: Option<String>,
    pub location_rough: Option<String>,
    pub time: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link_href: Option<String>,
}

impl BannerScrape {
    /// Scrapes every known field from `html`.
    pub fn from_html(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);

        Ok(Self {
            restaurant: first_text(&document, NAME_SELECTOR)?,
            location: first_text(&document, LOCATION_SELECTOR)?,
            location_rough: first_text(&document, CUSTOMER_SELECTOR)?,
            time: first_text(&document, TIME_SELECTOR)?,
            description: first_text(&document, DESCRIPTION_SELECTOR)?,
            image_url: first_attr(&document, LOGO_SELECTOR, "src")?,
            link_href: first_attr(&document, LINK_SELECTOR, "href")?,
        })
    }

    /// Names of the fields that were not found.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("restaurant", self.restaurant.is_none()),
            ("location", self.location.is_none()),
            ("location_rough", self.location_rough.is_none()),
            ("time", self.time.is_none()),
            ("description", self.description.is_none()),
            ("image_url", self.image_url.is_none()),
            ("link", self.link_href.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| BotError::Selector(format!("{css}: {e}")))
}

fn first_match<'a>(document: &'a Html, css: &str) -> Result<Option<ElementRef<'a>>> {
    Ok(document.select(&selector(css)?).next())
}

fn first_text(document: &Html, css: &str) -> Result<Option<String>> {
    Ok(first_match(document, css)?.and_then(|element| {
        element
            .text()
            .map(str::trim)
            .find(|text| !text.is_empty())
            .map(str::to_string)
    }))
}

fn first_attr(document: &Html, css: &str, attr: &str) -> Result<Option<String>> {
    Ok(first_match(document, css)?
        .and_then(|element| element.value().attr(attr))
        .map(str::to_string))
}

/// Today's restaurant at a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub restaurant: String,
    pub location: String,
    pub location_rough: String,
    pub time: String,
    pub description: String,
    pub image_url: String,
    pub link_url: String,
}

impl TryFrom<BannerScrape> for MenuEntry {
    type Error = BotError;

    fn try_from(scrape: BannerScrape) -> Result<Self> {
        let BannerScrape {
            restaurant,
            location,
            location_rough,
            time,
            description,
            image_url,
            link_href,
        } = scrape;

        Ok(Self {
            restaurant: restaurant.ok_or(BotError::MissingMenuField("restaurant"))?,
            location: location.ok_or(BotError::MissingMenuField("location"))?,
            location_rough: location_rough.ok_or(BotError::MissingMenuField("location_rough"))?,
            time: time.ok_or(BotError::MissingMenuField("time"))?,
            description: description.ok_or(BotError::MissingMenuField("description"))?,
            image_url: image_url.ok_or(BotError::MissingMenuField("image_url"))?,
            link_url: link_href
                .map(|href| format!("{FOODA_APP_URL}{href}"))
                .ok_or(BotError::MissingMenuField("link"))?,
        })
    }
}

impl MenuEntry {
    /// Slack mrkdwn summary: linked name, place, time, description.
    pub fn summary(&self) -> String {
        format!(
            "*<{}|{}>*\n{} - {}\n{}\n{}",
            self.link_url,
            self.restaurant,
            self.location,
            self.location_rough,
            self.time,
            self.description
        )
    }

    /// Block Kit payload: the logo, then the summary.
    pub fn to_blocks(&self) -> Vec<Value> {
        vec![
            json!({
                "type": "image",
                "image_url": self.image_url,
                "alt_text": format!("{} logo", self.restaurant),
            }),
            json!({
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": self.summary(),
                },
            }),
        ]
    }
}

/// Parses a banner page into a complete [`MenuEntry`].
pub fn parse_menu(html: &str) -> Result<MenuEntry> {
    let scrape = BannerScrape::from_html(html)?;
    let missing = scrape.missing_fields();
    if !missing.is_empty() {
        debug!("Banner page is missing fields: {:?}", missing);
    }
    MenuEntry::try_from(scrape)
}

#[derive(Debug, Clone)]
pub struct FoodaClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for FoodaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FoodaClient {
    pub fn new() -> Self {
        Self::with_base_url(FOODA_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn page_url(&self, location: Location) -> String {
        format!("{}{}", self.base_url, location.page_path())
    }

    /// Downloads and parses today's banner for `location`.
    pub async fn fetch_menu(&self, location: Location) -> Result<MenuEntry> {
        let url = self.page_url(location);
        debug!("Fetching Fooda menu for {} from {}", location, url);

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(BotError::HttpStatus {
                url,
                status: response.status(),
            });
        }

        let html = response.text().await?;
        debug!("Fetched {} bytes of menu HTML", html.len());
        parse_menu(&html)
    }
}
