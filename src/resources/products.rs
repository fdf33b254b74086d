//! Store products: physical goods, digital downloads, tokens and NFTs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{
    require_http_url, require_non_empty, require_non_negative, require_slug, Resource, Validate,
};
use crate::error::{LaunchpadError, Result};
use crate::storage::traits::{to_document, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Physical,
    Digital,
    Token,
    Nft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Draft,
    Published,
    Archived,
}

impl Default for ProductStatus {
    fn default() -> Self {
        ProductStatus::Draft
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    pub alt: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductInventory {
    pub track_inventory: bool,
    pub stock_quantity: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub allow_backorder: bool,
    pub stock_status: String,
}

impl Default for ProductInventory {
    fn default() -> Self {
        Self {
            track_inventory: true,
            stock_quantity: None,
            low_stock_threshold: Some(10),
            allow_backorder: false,
            stock_status: "in_stock".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDimensions {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalAttributes {
    pub weight: Option<f64>,
    pub dimensions: Option<ProductDimensions>,
    #[serde(default)]
    pub requires_shipping: bool,
    pub shipping_class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalAttributes {
    pub file_url: String,
    pub file_type: String,
    pub file_size: u64,
    #[serde(default = "default_download_limit")]
    pub download_limit: u32,
    #[serde(default = "default_download_expiry_days")]
    pub download_expiry_days: u32,
}

fn default_download_limit() -> u32 {
    5
}

fn default_download_expiry_days() -> u32 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAttributes {
    pub token_symbol: String,
    pub token_address_sui: Option<String>,
    pub blockchain: String,
    pub contract_address: String,
    pub min_purchase: Option<u64>,
    pub max_purchase: Option<u64>,
}

impl Validate for TokenAttributes {
    fn validate(&self) -> Result<()> {
        require_non_empty("token_symbol", &self.token_symbol)?;
        require_non_empty("contract_address", &self.contract_address)?;
        if let (Some(min), Some(max)) = (self.min_purchase, self.max_purchase) {
            if min > max {
                return Err(LaunchpadError::ValidationError(
                    "min_purchase must not exceed max_purchase".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: String,
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    pub price: f64,
    pub stock_quantity: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSeo {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn validate_images(images: &[ProductImage]) -> Result<()> {
    images
        .iter()
        .try_for_each(|image| require_http_url("images.url", &image.url))
}

fn validate_crypto_price(prices: &Option<HashMap<String, f64>>) -> Result<()> {
    prices
        .iter()
        .flatten()
        .try_for_each(|(_, price)| require_non_negative("crypto_price", *price))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub sku: String,
    pub name: String,
    pub slug: String,
    pub product_type: ProductType,
    pub description: String,
    pub short_description: Option<String>,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub crypto_price: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub inventory: ProductInventory,
    pub physical_attributes: Option<PhysicalAttributes>,
    pub digital_attributes: Option<DigitalAttributes>,
    pub token_attributes: Option<TokenAttributes>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    pub related_project_id: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub status: ProductStatus,
    pub seo: Option<ProductSeo>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Validate for ProductCreate {
    fn validate(&self) -> Result<()> {
        require_non_empty("sku", &self.sku)?;
        require_non_empty("name", &self.name)?;
        require_slug("slug", &self.slug)?;
        require_non_negative("price", self.price)?;
        validate_crypto_price(&self.crypto_price)?;
        validate_images(&self.images)?;
        self.variants
            .iter()
            .try_for_each(|variant| require_non_negative("variants.price", variant.price))?;

        match self.product_type {
            ProductType::Token => self
                .token_attributes
                .as_ref()
                .ok_or_else(|| {
                    LaunchpadError::ValidationError(
                        "token products require token_attributes".to_string(),
                    )
                })?
                .validate(),
            ProductType::Digital => {
                let digital = self.digital_attributes.as_ref().ok_or_else(|| {
                    LaunchpadError::ValidationError(
                        "digital products require digital_attributes".to_string(),
                    )
                })?;
                require_http_url("digital_attributes.file_url", &digital.file_url)
            }
            ProductType::Physical | ProductType::Nft => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub crypto_price: Option<HashMap<String, f64>>,
    pub images: Option<Vec<ProductImage>>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub inventory: Option<ProductInventory>,
    pub featured: Option<bool>,
    pub status: Option<ProductStatus>,
}

impl Validate for ProductUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(price) = self.price {
            require_non_negative("price", price)?;
        }
        if let Some(images) = &self.images {
            validate_images(images)?;
        }
        validate_crypto_price(&self.crypto_price)
    }
}

/// Stored product record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub slug: String,
    pub product_type: ProductType,
    pub description: String,
    pub short_description: Option<String>,
    pub price: f64,
    pub currency: String,
    pub crypto_price: Option<HashMap<String, f64>>,
    pub images: Vec<ProductImage>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub inventory: ProductInventory,
    pub physical_attributes: Option<PhysicalAttributes>,
    pub digital_attributes: Option<DigitalAttributes>,
    pub token_attributes: Option<TokenAttributes>,
    pub variants: Vec<ProductVariant>,
    pub related_project_id: Option<String>,
    pub featured: bool,
    pub status: ProductStatus,
    pub seo: Option<ProductSeo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct Products;

impl Resource for Products {
    const NAME: &'static str = "Product";
    const PATH: &'static str = "products";
    const COLLECTION: &'static str = "products";
    const FILTER_FIELDS: &'static [&'static str] = &["status", "product_type", "featured"];

    type Create = ProductCreate;
    type Update = ProductUpdate;

    fn create_document(payload: ProductCreate, id: String, now: DateTime<Utc>) -> Result<Document> {
        to_document(&Product {
            id,
            sku: payload.sku,
            name: payload.name,
            slug: payload.slug,
            product_type: payload.product_type,
            description: payload.description,
            short_description: payload.short_description,
            price: payload.price,
            currency: payload.currency,
            crypto_price: payload.crypto_price,
            images: payload.images,
            categories: payload.categories,
            tags: payload.tags,
            inventory: payload.inventory,
            physical_attributes: payload.physical_attributes,
            digital_attributes: payload.digital_attributes,
            token_attributes: payload.token_attributes,
            variants: payload.variants,
            related_project_id: payload.related_project_id,
            featured: payload.featured,
            status: payload.status,
            seo: payload.seo,
            created_at: now,
            updated_at: now,
        })
    }
}
