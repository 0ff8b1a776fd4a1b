use chrono::{Local, NaiveDate, NaiveDateTime};
use reqwest::Url;

use crate::dates::{ActivePolicy, parse_date_range};
use crate::error::{FetchError, ShopError};
use crate::fetcher::Fetcher;
use crate::models::{Leaflet, ShopLink, TentativeLeaflet};
use crate::parser;

/// A shop whose page could not be fetched or parsed.
#[derive(Debug)]
pub struct ShopFailure {
    pub shop: ShopLink,
    pub error: ShopError,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub leaflets: Vec<Leaflet>,
    pub shops_visited: usize,
    pub failures: Vec<ShopFailure>,
}

pub struct Scraper {
    fetcher: Fetcher,
    base_url: Url,
    category_path: String,
    policy: ActivePolicy,
    fail_fast: bool,
}

impl Scraper {
    pub fn new(fetcher: Fetcher, base_url: Url, category_path: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url,
            category_path: category_path.into(),
            policy: ActivePolicy::default(),
            fail_fast: false,
        }
    }

    pub fn with_policy(mut self, policy: ActivePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Abort on the first shop failure instead of recording it and moving on.
    pub fn fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    pub fn shop_links(&self) -> Result<Vec<ShopLink>, FetchError> {
        let listing_url = self.listing_url();
        let html = self.fetcher.fetch_html(&listing_url)?;
        let links = parser::parse_shop_links(&html, &self.base_url);
        tracing::info!(url = %listing_url, shops = links.len(), "parsed shop listing");
        Ok(links)
    }

    /// Active leaflets of a single shop, stamped with the current local time.
    pub fn collect_shop(&self, shop: &ShopLink) -> Result<Vec<Leaflet>, ShopError> {
        let html = self.fetcher.fetch_html(&shop.url)?;
        let tentative = parser::parse_leaflets(&html, &shop.name)?;
        let found = tentative.len();

        let now = Local::now().naive_local();
        let active = select_active(tentative, now.date(), now, self.policy);
        tracing::info!(shop = %shop.name, found, active = active.len(), "processed shop");
        Ok(active)
    }

    /// Visit every shop on the listing page. Only a failure to load the
    /// listing itself is fatal, unless fail-fast is enabled.
    pub fn run(&self) -> anyhow::Result<RunReport> {
        let shops = self.shop_links()?;
        let mut report = RunReport::default();

        for shop in shops {
            report.shops_visited += 1;
            match self.collect_shop(&shop) {
                Ok(leaflets) => report.leaflets.extend(leaflets),
                Err(error) if self.fail_fast => {
                    return Err(anyhow::Error::new(error)
                        .context(format!("failed to process shop {} ({})", shop.name, shop.url)));
                }
                Err(error) => {
                    tracing::warn!(shop = %shop.name, url = %shop.url, error = %error, "skipping shop");
                    report.failures.push(ShopFailure { shop, error });
                }
            }
        }

        Ok(report)
    }

    fn listing_url(&self) -> String {
        match self.base_url.join(&self.category_path) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.base_url.as_str().trim_end_matches('/'), self.category_path),
        }
    }
}

/// Keep the leaflets that are active on `today` under `policy`.
pub fn select_active(
    tentative: Vec<TentativeLeaflet>,
    today: NaiveDate,
    parsed_time: NaiveDateTime,
    policy: ActivePolicy,
) -> Vec<Leaflet> {
    tentative
        .into_iter()
        .filter_map(|t| {
            let range = parse_date_range(&t.date_text);
            let Some((valid_from, valid_to)) = policy.admit(range, today) else {
                tracing::debug!(title = %t.title, dates = %t.date_text, ?range, "leaflet not active");
                return None;
            };
            Some(Leaflet {
                title: t.title,
                thumbnail: t.thumbnail,
                shop_name: t.shop_name,
                valid_from,
                valid_to,
                parsed_time,
            })
        })
        .collect()
}
