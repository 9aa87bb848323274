use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use super::links::product_handle;

const PRODUCT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Live product data for a card, fetched from the storefront's public
/// `/products/<handle>.js` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub title: String,
    pub image: Option<String>,
    pub url: String,
}

#[derive(Clone)]
pub struct Storefront {
    client: Client,
    base_url: String,
}

impl Storefront {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches live product data for a product-page URL. Best-effort: any
    /// failure (bad handle, network error, non-2xx, bad JSON, timeout)
    /// yields `None` and the caller falls back to the link's own data.
    pub async fn fetch_product(&self, product_url: &str) -> Option<ProductCard> {
        let handle = product_handle(product_url)?;
        let js_url = format!("{}/products/{}.js", self.base_url, handle);

        let res = self
            .client
            .get(&js_url)
            .timeout(PRODUCT_FETCH_TIMEOUT)
            .send()
            .await
            .ok()?;
        if !res.status().is_success() {
            return None;
        }
        let data: Value = res.json().await.ok()?;

        let title = data
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or(&handle)
            .to_string();
        let image = data
            .get("featured_image")
            .and_then(|v| v.as_str())
            .or_else(|| {
                data.get("images")
                    .and_then(|v| v.as_array())
                    .and_then(|imgs| imgs.first())
                    .and_then(|v| v.as_str())
            })
            .map(normalize_image_url);
        let path = data
            .get("url")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("/products/{}", handle));

        Some(ProductCard {
            title,
            image,
            url: format!("{}{}", self.base_url, path),
        })
    }
}

/// Protocol-relative image URLs become https.
pub fn normalize_image_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_relative_image_urls_get_https() {
        assert_eq!(
            normalize_image_url("//cdn.example.com/belt.jpg"),
            "https://cdn.example.com/belt.jpg"
        );
        assert_eq!(
            normalize_image_url("https://cdn.example.com/belt.jpg"),
            "https://cdn.example.com/belt.jpg"
        );
    }

    #[tokio::test]
    async fn non_product_url_fetch_is_none_without_network() {
        let storefront = Storefront::new("https://shop.example.com");
        assert!(storefront.fetch_product("https://shop.example.com/pages/faq").await.is_none());
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_product_fetch() {
        let base = crate::config::AppConfig::from_env().storefront_base_url;
        let handle = std::env::var("STOREFRONT_TEST_HANDLE").expect("handle must be set");
        let storefront = Storefront::new(base.clone());
        let card = storefront
            .fetch_product(&format!("{}/products/{}", base, handle))
            .await
            .expect("product should resolve");
        println!("Card: {:?}", card);
        assert!(!card.title.is_empty());
    }
}
