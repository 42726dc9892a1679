//! Strapi CMS client for the product catalog and order creation.
//!
//! All requests carry a bearer token and a 10 second timeout. The bot only
//! reads product data per request and never caches it authoritatively.

use std::time::Duration;

use anyhow::Result;
use log::info;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cart::Cart;
use crate::cms_errors::CmsError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A catalog product as served by the CMS
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub document_id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub picture_url: Option<String>,
}

/// One line of an order sent to the CMS on checkout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub product: String,
    pub quantity: u32,
}

/// Order payload created from the cart at checkout
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub telegram_id: i64,
    pub telegram_username: Option<String>,
    pub email: String,
    pub items: Vec<OrderLine>,
}

impl Order {
    /// Build an order from the cart contents and the customer contact
    pub fn from_cart(
        telegram_id: i64,
        telegram_username: Option<String>,
        email: String,
        cart: &Cart,
    ) -> Self {
        let items = cart
            .iter()
            .map(|(product, quantity)| OrderLine {
                product: product.to_string(),
                quantity,
            })
            .collect();
        Self {
            telegram_id,
            telegram_username,
            email,
            items,
        }
    }
}

// Strapi wraps resources in a {"data": ...} envelope.

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    data: Vec<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct ItemEnvelope {
    data: Option<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    id: i64,
    #[serde(rename = "documentId")]
    document_id: String,
    title: String,
    description: String,
    price: f64,
    #[serde(default)]
    picture: Option<Vec<RawPicture>>,
}

#[derive(Debug, Deserialize)]
struct RawPicture {
    url: String,
}

#[derive(Serialize)]
struct OrderEnvelope<'a> {
    data: &'a Order,
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        let picture_url = raw
            .picture
            .and_then(|pictures| pictures.into_iter().next())
            .map(|picture| picture.url);
        Self {
            id: raw.id,
            document_id: raw.document_id,
            title: raw.title,
            description: raw.description,
            price: raw.price,
            picture_url,
        }
    }
}

/// Parse the product list envelope returned by `GET /api/products`
pub fn parse_product_list(body: &str) -> Result<Vec<Product>, CmsError> {
    let envelope: ListEnvelope =
        serde_json::from_str(body).map_err(|err| CmsError::Malformed(err.to_string()))?;
    Ok(envelope.data.into_iter().map(Product::from).collect())
}

/// Parse a single-product envelope; `None` when the CMS reports no data
pub fn parse_product(body: &str) -> Result<Option<Product>, CmsError> {
    let envelope: ItemEnvelope =
        serde_json::from_str(body).map_err(|err| CmsError::Malformed(err.to_string()))?;
    Ok(envelope.data.map(Product::from))
}

/// HTTP client for the Strapi instance
pub struct CmsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CmsClient {
    /// Create a client with the bearer token installed as a default header
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base_url = Url::parse(base_url)?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CmsError> {
        self.base_url
            .join(path)
            .map_err(|err| CmsError::Malformed(err.to_string()))
    }

    async fn get_body(&self, url: Url) -> Result<String, CmsError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Fetch the full product list
    pub async fn list_products(&self) -> Result<Vec<Product>, CmsError> {
        let body = self.get_body(self.endpoint("/api/products")?).await?;
        parse_product_list(&body)
    }

    /// Fetch one product with its picture URL populated
    pub async fn get_product(&self, document_id: &str) -> Result<Product, CmsError> {
        let mut url = self.endpoint(&format!("/api/products/{document_id}"))?;
        url.set_query(Some("populate[picture][fields][0]=url"));

        let body = match self.get_body(url).await {
            Ok(body) => body,
            Err(CmsError::Status(404)) => {
                return Err(CmsError::NotFound(document_id.to_string()));
            }
            Err(err) => return Err(err),
        };

        parse_product(&body)?.ok_or_else(|| CmsError::NotFound(document_id.to_string()))
    }

    /// Download a product picture; relative upload paths resolve against the base URL
    pub async fn download_image(&self, picture_url: &str) -> Result<Vec<u8>, CmsError> {
        let url = self.endpoint(picture_url)?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Submit an order built from the cart contents
    pub async fn create_order(&self, order: &Order) -> Result<(), CmsError> {
        let url = self.endpoint("/api/orders")?;
        let response = self
            .http
            .post(url)
            .json(&OrderEnvelope { data: order })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status(status.as_u16()));
        }
        info!(
            "Created order for telegram_id={} with {} line(s)",
            order.telegram_id,
            order.items.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_list() {
        let body = r#"{
            "data": [
                {"id": 1, "documentId": "abc", "title": "Salmon", "description": "Fresh", "price": 10.5},
                {"id": 2, "documentId": "def", "title": "Trout", "description": "Local", "price": 8.0}
            ]
        }"#;

        let products = parse_product_list(body).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].document_id, "abc");
        assert_eq!(products[0].title, "Salmon");
        assert_eq!(products[1].price, 8.0);
        assert!(products[0].picture_url.is_none());
    }

    #[test]
    fn test_parse_product_with_picture() {
        let body = r#"{
            "data": {
                "id": 1,
                "documentId": "abc",
                "title": "Salmon",
                "description": "Fresh",
                "price": 10.5,
                "picture": [{"url": "/uploads/salmon.jpg"}]
            }
        }"#;

        let product = parse_product(body).unwrap().unwrap();
        assert_eq!(product.picture_url.as_deref(), Some("/uploads/salmon.jpg"));
    }

    #[test]
    fn test_parse_product_missing_data_is_none() {
        let product = parse_product(r#"{"data": null}"#).unwrap();
        assert!(product.is_none());
    }

    #[test]
    fn test_parse_malformed_payload_is_error() {
        let result = parse_product_list(r#"{"data": "not a list"}"#);
        assert!(matches!(result, Err(CmsError::Malformed(_))));

        let result = parse_product_list("not even json");
        assert!(matches!(result, Err(CmsError::Malformed(_))));
    }

    #[test]
    fn test_order_from_cart_carries_all_lines() {
        let mut cart = Cart::default();
        cart.add("salmon", 2);
        cart.add("trout", 1);

        let order = Order::from_cart(42, Some("angler".to_string()), "a@b.com".to_string(), &cart);

        assert_eq!(order.telegram_id, 42);
        assert_eq!(order.items.len(), 2);
        assert!(order
            .items
            .contains(&OrderLine { product: "salmon".to_string(), quantity: 2 }));
        assert!(order
            .items
            .contains(&OrderLine { product: "trout".to_string(), quantity: 1 }));
    }
}
