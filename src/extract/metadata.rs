//! Embedded structured product metadata (JSON-LD)
//!
//! Blocks are decoded into typed records. A block that is not valid JSON or
//! does not describe a `Product` is ignored and the cascade moves on. Within
//! a product record every field is decoded on its own: a field with an
//! unexpected shape reads as absent and leaves the others intact.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Decodes a field as `T`, treating any other shape as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// String or number, as metadata publishers use both for prices and ids
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    /// Text form, trimmed
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Number(number) => number.to_string(),
        }
    }

    /// Numeric value, if the scalar holds or spells a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Text(text) => text.trim().parse().ok(),
            Self::Number(number) => number.as_f64(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::One(item) => std::slice::from_ref(item).iter(),
            Self::Many(items) => items.iter(),
        }
    }
}

/// A brand given by name or as a `Brand`/`Organization` object
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BrandField {
    Name(String),
    Object {
        #[serde(default, deserialize_with = "lenient")]
        name: Option<String>,
    },
}

impl BrandField {
    fn name(&self) -> Option<String> {
        match self {
            Self::Name(name) => non_empty(Some(name)),
            Self::Object { name } => non_empty(name.as_deref()),
        }
    }
}

/// An image given by URL or as an `ImageObject`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImageField {
    Url(String),
    #[serde(rename_all = "camelCase")]
    Object {
        #[serde(default, deserialize_with = "lenient")]
        url: Option<String>,
        #[serde(default, deserialize_with = "lenient")]
        content_url: Option<String>,
    },
}

impl ImageField {
    fn url(&self) -> Option<String> {
        match self {
            Self::Url(url) => non_empty(Some(url)),
            Self::Object { url, content_url } => {
                non_empty(url.as_deref()).or_else(|| non_empty(content_url.as_deref()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Offer {
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<Scalar>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertyValue {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<Scalar>,
}

/// One decoded JSON-LD record
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMetadata {
    #[serde(rename = "@type", default, deserialize_with = "lenient")]
    pub kind: Option<OneOrMany<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sku: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub mpn: Option<Scalar>,
    #[serde(rename = "productID", default, deserialize_with = "lenient")]
    pub product_id: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub brand: Option<OneOrMany<BrandField>>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub offers: Option<OneOrMany<Offer>>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<OneOrMany<ImageField>>,
    #[serde(default, deserialize_with = "lenient")]
    pub additional_property: Option<OneOrMany<PropertyValue>>,
}

impl ProductMetadata {
    /// Returns true if the record's `@type` names `Product`
    pub fn is_product(&self) -> bool {
        self.kind
            .as_ref()
            .is_some_and(|kind| kind.iter().any(|k| k == "Product"))
    }

    pub fn name(&self) -> Option<String> {
        non_empty(self.name.as_deref())
    }

    /// `sku`, else `mpn`, else `productID`
    pub fn identifier(&self) -> Option<String> {
        [&self.sku, &self.mpn, &self.product_id]
            .into_iter()
            .flatten()
            .map(Scalar::as_text)
            .find(|id| !id.is_empty())
    }

    pub fn sku(&self) -> Option<String> {
        self.sku
            .as_ref()
            .map(Scalar::as_text)
            .filter(|sku| !sku.is_empty())
    }

    /// Brand name, unwrapping nested brand objects and lists
    pub fn brand(&self) -> Option<String> {
        self.brand.as_ref()?.iter().find_map(BrandField::name)
    }

    pub fn description(&self) -> Option<String> {
        non_empty(self.description.as_deref())
    }

    /// First offer price that reads as a number
    pub fn offer_price(&self) -> Option<f64> {
        self.offers
            .as_ref()?
            .iter()
            .find_map(|offer| offer.price.as_ref().and_then(Scalar::as_f64))
    }

    /// First usable image URL, unwrapping `ImageObject`s and lists
    pub fn image(&self) -> Option<String> {
        self.image.as_ref()?.iter().find_map(ImageField::url)
    }

    /// `additionalProperty` entries as `name: value` lines
    pub fn property_lines(&self) -> Vec<String> {
        let Some(properties) = &self.additional_property else {
            return Vec::new();
        };

        properties
            .iter()
            .filter_map(|property| {
                let name = non_empty(property.name.as_deref())?;
                let value = property.value.as_ref().map(Scalar::as_text)?;
                if value.is_empty() {
                    return None;
                }
                Some(format!("{}: {}", name, value))
            })
            .collect()
    }
}

/// Decodes every `Product` record found in the given JSON-LD blocks
///
/// Top-level arrays and `@graph` containers are unpacked. Malformed blocks
/// and records of other types are skipped.
pub fn decode_products(blocks: &[String]) -> Vec<ProductMetadata> {
    let mut products = Vec::new();

    for block in blocks {
        let value: Value = match serde_json::from_str(block) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Ignoring malformed JSON-LD block: {}", e);
                continue;
            }
        };

        for candidate in candidates(value) {
            match serde_json::from_value::<ProductMetadata>(candidate) {
                Ok(record) if record.is_product() => products.push(record),
                Ok(_) => {}
                Err(e) => tracing::debug!("Ignoring JSON-LD record: {}", e),
            }
        }
    }

    products
}

fn candidates(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("@graph") {
            Some(Value::Array(items)) => items,
            _ => vec![Value::Object(map)],
        },
        _ => Vec::new(),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
