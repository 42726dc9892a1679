use anyhow::Result;

use fishshop_bot::cart::Cart;
use fishshop_bot::cms::{parse_product, parse_product_list, Order};
use fishshop_bot::cms_errors::CmsError;

/// The Strapi list envelope unpacks into catalog products
#[tokio::test]
async fn test_list_envelope_parsing() -> Result<()> {
    let body = r#"{
        "data": [
            {"id": 7, "documentId": "salmon-1", "title": "Salmon", "description": "Fresh", "price": 10.5}
        ],
        "meta": {"pagination": {"total": 1}}
    }"#;

    let products = parse_product_list(body).map_err(anyhow::Error::from)?;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, 7);
    assert_eq!(products[0].document_id, "salmon-1");
    assert_eq!(products[0].price, 10.5);

    Ok(())
}

/// A missing data field parses as an empty catalog rather than an error
#[tokio::test]
async fn test_list_envelope_without_data() -> Result<()> {
    let products = parse_product_list(r#"{"meta": {}}"#).map_err(anyhow::Error::from)?;
    assert!(products.is_empty());

    Ok(())
}

/// The detail envelope carries the first populated picture URL
#[tokio::test]
async fn test_detail_envelope_picture() -> Result<()> {
    let body = r#"{
        "data": {
            "id": 7,
            "documentId": "salmon-1",
            "title": "Salmon",
            "description": "Fresh",
            "price": 10.5,
            "picture": [
                {"url": "/uploads/salmon.jpg"},
                {"url": "/uploads/salmon-2.jpg"}
            ]
        }
    }"#;

    let product = parse_product(body).map_err(anyhow::Error::from)?.unwrap();
    assert_eq!(product.picture_url.as_deref(), Some("/uploads/salmon.jpg"));

    Ok(())
}

/// Envelopes without a picture array still parse
#[tokio::test]
async fn test_detail_envelope_without_picture() -> Result<()> {
    let body = r#"{
        "data": {"id": 7, "documentId": "salmon-1", "title": "Salmon", "description": "Fresh", "price": 10.5}
    }"#;

    let product = parse_product(body).map_err(anyhow::Error::from)?.unwrap();
    assert!(product.picture_url.is_none());

    Ok(())
}

/// Malformed payloads surface as CmsError::Malformed, never a panic
#[tokio::test]
async fn test_malformed_payloads() -> Result<()> {
    assert!(matches!(
        parse_product_list("<html>gateway error</html>"),
        Err(CmsError::Malformed(_))
    ));
    assert!(matches!(
        parse_product(r#"{"data": {"id": "not a number"}}"#),
        Err(CmsError::Malformed(_))
    ));

    Ok(())
}

/// The order created at checkout carries the full cart contents
#[tokio::test]
async fn test_order_payload_contains_cart_lines() -> Result<()> {
    let mut cart = Cart::default();
    cart.add("salmon-1", 2);
    cart.add("trout-1", 1);

    let order = Order::from_cart(
        1234,
        Some("angler".to_string()),
        "fish@example.com".to_string(),
        &cart,
    );

    let json = serde_json::to_value(&order)?;
    assert_eq!(json["telegram_id"], 1234);
    assert_eq!(json["telegram_username"], "angler");
    assert_eq!(json["email"], "fish@example.com");

    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.contains(&serde_json::json!({"product": "salmon-1", "quantity": 2})));
    assert!(items.contains(&serde_json::json!({"product": "trout-1", "quantity": 1})));

    Ok(())
}

/// Error display strings name the failing boundary
#[tokio::test]
async fn test_error_display() -> Result<()> {
    assert_eq!(
        CmsError::Status(502).to_string(),
        "CMS returned status 502"
    );
    assert_eq!(
        CmsError::NotFound("salmon-1".to_string()).to_string(),
        "Product salmon-1 not found"
    );
    assert!(CmsError::Unreachable("timeout".to_string())
        .to_string()
        .contains("unreachable"));

    Ok(())
}
