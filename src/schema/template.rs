//! Receipt rendering for accepted applications

use rust_embed::Embed;
use tera::Tera;
use thiserror::Error;

use crate::schema::record::ValidatedRecord;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const RECEIPT: &str = "receipt.txt.tera";

/// Values shown on the receipt
#[derive(Debug, Clone)]
pub struct ReceiptContext {
    pub reference: String,
    pub visitor: String,
    pub departure_hub: String,
    pub departure_date: String,
    pub return_date: String,
    pub stay_days: i64,
    pub martian_lodgings: String,
}

impl ReceiptContext {
    pub fn new(reference: impl Into<String>, record: &ValidatedRecord) -> Self {
        Self {
            reference: reference.into(),
            visitor: record.full_name(),
            departure_hub: record.departure_hub.clone(),
            departure_date: record.departure_date.format("%Y-%m-%d").to_string(),
            return_date: record.return_date.format("%Y-%m-%d").to_string(),
            stay_days: record.stay_days(),
            martian_lodgings: record.martian_lodgings.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    RenderError(String),
}

/// Renders receipts from the embedded Tera templates
pub struct ReceiptRenderer {
    tera: Tera,
}

impl ReceiptRenderer {
    /// Create a renderer with the embedded templates loaded
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| TemplateError::RenderError(e.to_string()))?;
                }
            }
        }

        Ok(Self { tera })
    }

    pub fn render(&self, ctx: &ReceiptContext) -> Result<String, TemplateError> {
        if !self.tera.get_template_names().any(|n| n == RECEIPT) {
            return Err(TemplateError::NotFound(RECEIPT.to_string()));
        }

        let mut context = tera::Context::new();
        context.insert("reference", &ctx.reference);
        context.insert("visitor", &ctx.visitor);
        context.insert("departure_hub", &ctx.departure_hub);
        context.insert("departure_date", &ctx.departure_date);
        context.insert("return_date", &ctx.return_date);
        context.insert("stay_days", &ctx.stay_days);
        context.insert("martian_lodgings", &ctx.martian_lodgings);

        self.tera
            .render(RECEIPT, &context)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }
}
