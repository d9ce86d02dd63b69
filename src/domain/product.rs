use serde::{Deserialize, Serialize};

/// A product as exchanged with the remote service and the persisted snapshot.
///
/// Field names on the wire follow the service contract (`nombre`, `precio`,
/// `codigo`, `descuento`). Identity is the `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "precio")]
    pub price: f64,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "descuento", default)]
    pub discount: bool,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f64, code: impl Into<String>, discount: bool) -> Self {
        Self {
            name: name.into(),
            price,
            code: code.into(),
            discount,
        }
    }

    /// Two products are the same entity when their codes match.
    pub fn same_entity(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

/// Candidate product as typed by a user, before the price is parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub code: String,
    pub discount: bool,
}

impl ProductForm {
    pub fn new(
        name: impl Into<String>,
        price: impl Into<String>,
        code: impl Into<String>,
        discount: bool,
    ) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            code: code.into(),
            discount,
        }
    }

    /// Parse the price field. Surrounding whitespace is ignored.
    ///
    /// Only finite values are accepted: NaN and infinities have no JSON
    /// representation and would be written as `null`.
    pub fn parse_price(&self) -> Option<f64> {
        self.price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite())
    }

    /// Build the product to submit, or `None` when the price does not parse.
    pub fn to_product(&self) -> Option<Product> {
        let price = self.parse_price()?;
        Some(Product {
            name: self.name.clone(),
            price,
            code: self.code.clone(),
            discount: self.discount,
        })
    }

    /// Reset every field to its empty/default value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
