use serde::Serialize;

use crate::state::{Product, ProductId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" | "table" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct OutputRecord {
    pub product_id: ProductId,
    pub name: String,
    pub price: String,
}

pub fn build_records(products: &[Product]) -> Vec<OutputRecord> {
    products
        .iter()
        .map(|p| OutputRecord {
            product_id: p.product_id.clone(),
            name: p.field_text("name").unwrap_or_default(),
            price: p
                .field_text("base_price")
                .or_else(|| p.field_text("price"))
                .unwrap_or_default(),
        })
        .collect()
}

pub fn render_text(products: &[Product]) -> String {
    let records = build_records(products);
    let name_width = records
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut out = String::new();
    out.push_str(&format!(
        "{:>8}  {:<name_width$}  {:>10}\n",
        "ID", "Name", "Price"
    ));
    for r in &records {
        out.push_str(&format!(
            "{:>8}  {:<name_width$}  {:>10}\n",
            r.product_id, r.name, r.price
        ));
    }
    out
}

/// Full product objects, every field included.
pub fn render_json(products: &[Product]) -> String {
    serde_json::to_string_pretty(products).unwrap_or_else(|_| "[]".to_string())
}

pub fn render(products: &[Product], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_text(products),
        OutputFormat::Json => render_json(products),
    }
}
