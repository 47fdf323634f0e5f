//! Etsy product listings
//!
//! Matches when the canonical host is `www.etsy.com` and the page carries
//! Etsy's marketplace price and currency meta tags. No API call is needed.

use crate::dispatcher::{Handler, HandlerResult, Page};
use crate::error::HandlerError;
use crate::handlers::generic::baseline;
use crate::metadata::Kind;

const ETSY_HOST: &str = "www.etsy.com";
const PRICE_SELECTOR: &str = "meta[property='etsymarketplace:price_value']";
const CURRENCY_SELECTOR: &str = "meta[property='etsymarketplace:currency_code']";

#[derive(Debug, Clone, Copy, Default)]
pub struct EtsyProductHandler;

impl Handler for EtsyProductHandler {
    fn name(&self) -> &str {
        "etsy-product"
    }

    fn try_match(&self, page: &Page) -> HandlerResult {
        let Some(canonical) = page.canonical_url() else {
            return Ok(None);
        };
        if canonical.host_str() != Some(ETSY_HOST) {
            return Ok(None);
        }

        let price = page.document.meta_content(PRICE_SELECTOR);
        let currency = page.document.meta_content(CURRENCY_SELECTOR);
        let (Some(price), Some(currency)) = (price, currency) else {
            return Ok(None);
        };

        let currency = currency.trim();
        if currency.is_empty() {
            return Ok(None);
        }

        let malformed = || HandlerError::Malformed(format!("Etsy price '{}'", price));
        let price: f64 = price.trim().parse().map_err(|_| malformed())?;
        if !price.is_finite() || price < 0.0 {
            return Err(malformed());
        }

        let mut meta = baseline(page);
        meta.set_kind(Kind::Product);
        meta.set_provider("Etsy");
        meta.set_attr("price", price);
        meta.set_attr("currency", currency.to_ascii_uppercase());

        Ok(Some(meta))
    }
}
