use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const MAX_PRODUCT_NAME_LEN: usize = 100;

/// Product categories offered by the catalog. Wire names follow the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Instrumentos de cuerda", alias = "STRING_INSTRUMENTS")]
    StringInstruments,
    #[serde(rename = "Instrumentos de viento", alias = "WIND_INSTRUMENTS")]
    WindInstruments,
    #[serde(rename = "Instrumentos de percusión", alias = "PERCUSSION")]
    Percussion,
    #[serde(rename = "Instrumentos electrónicos", alias = "ELECTRONIC")]
    Electronic,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::StringInstruments,
        Category::WindInstruments,
        Category::Percussion,
        Category::Electronic,
    ];

    /// Parse a category name, accepting the backend's names and the
    /// English identifiers. Case and surrounding whitespace are ignored.
    pub fn from_wire_name(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Category::ALL.into_iter().find(|category| {
            category.wire_name().eq_ignore_ascii_case(raw)
                || category.identifier().eq_ignore_ascii_case(raw)
        })
    }

    fn identifier(&self) -> &'static str {
        match self {
            Category::StringInstruments => "STRING_INSTRUMENTS",
            Category::WindInstruments => "WIND_INSTRUMENTS",
            Category::Percussion => "PERCUSSION",
            Category::Electronic => "ELECTRONIC",
        }
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            Category::StringInstruments => "Instrumentos de cuerda",
            Category::WindInstruments => "Instrumentos de viento",
            Category::Percussion => "Instrumentos de percusión",
            Category::Electronic => "Instrumentos electrónicos",
        }
    }
}

/// A product as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i64,
    pub category: Option<Category>,
    pub created_at: Option<String>,
}

/// Field-keyed validation failures, rendered inline by forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields = self.fields().collect::<Vec<_>>().join(", ");
        write!(f, "Invalid fields: {fields}")
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

/// Product form contents before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i64,
    /// Unset until chosen. An unknown backend category stays unset.
    pub category: Option<Category>,
}

/// A draft that passed client-side checks and may be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidProduct {
    name: String,
    description: Option<String>,
    price: f64,
    quantity: i64,
    category: Category,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<ValidProduct, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        } else if name.chars().count() > MAX_PRODUCT_NAME_LEN {
            errors.add(
                "name",
                format!("Name must be at most {MAX_PRODUCT_NAME_LEN} characters"),
            );
        }
        if !(self.price.is_finite() && self.price > 0.0) {
            errors.add("price", "Price must be greater than zero");
        }
        if self.quantity < 0 {
            errors.add("quantity", "Quantity cannot be negative");
        }
        if self.category.is_none() {
            errors.add("category", "Category is required");
        }

        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        match self.category {
            Some(category) if errors.is_empty() => Ok(ValidProduct {
                name: name.to_string(),
                description,
                price: self.price,
                quantity: self.quantity,
                category,
            }),
            _ => Err(errors),
        }
    }
}

impl ValidProduct {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            quantity: product.quantity,
            category: product.category,
        }
    }
}

/// Update addressed by the product's current name.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub original_name: String,
    pub draft: ProductDraft,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub search: Option<String>,
    /// Zero-based page index.
    pub page: u32,
    pub page_size: u32,
}

impl ProductQuery {
    pub fn new(search: Option<String>, page: u32, page_size: u32) -> Self {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            search,
            page,
            page_size: page_size.max(1),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_pages: u32,
    pub total_items: u64,
}
