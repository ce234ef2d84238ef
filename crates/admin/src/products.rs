//! Product administration: CRUD and bulk CSV import/export.

use nursery_core::product_csv::{
    CsvFlavor, CsvImport, ProductRecord, export_products, parse_products, write_basic,
};
use nursery_core::{Product, ProductId, ProductInput, ProductPage};
use nursery_storefront::ApiClient;
use nursery_storefront::api::ProductQuery;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::AdminError;

/// Page size used when walking the whole catalog.
const EXPORT_PAGE_SIZE: u32 = 100;

/// Outcome of a bulk import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub flavor: CsvFlavor,
    pub created: u32,
    pub failed: u32,
    /// One message per rejected row.
    pub errors: Vec<String>,
}

impl ImportReport {
    /// A report holding only the rows rejected while parsing.
    fn malformed(parsed: &CsvImport) -> Self {
        Self {
            flavor: parsed.flavor,
            created: 0,
            failed: u32::try_from(parsed.malformed.len()).unwrap_or(u32::MAX),
            errors: parsed
                .malformed
                .iter()
                .map(|row| format!("Row {}: {}", row.line, row.reason))
                .collect(),
        }
    }
}

/// Product back-office operations.
#[derive(Clone)]
pub struct ProductAdmin {
    api: ApiClient,
}

impl ProductAdmin {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the listing fails.
    pub async fn list(&self, query: &ProductQuery) -> Result<ProductPage, AdminError> {
        Ok(self.api.list_products(query).await?)
    }

    /// # Errors
    ///
    /// Returns [`AdminError::BadRequest`] for invalid input or
    /// [`AdminError::Api`] if the backend rejects it.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(&self, input: &ProductInput) -> Result<Product, AdminError> {
        validate(input)?;
        let product = self.api.create_product(input).await?;
        info!(id = %product.id, "Product created");
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns [`AdminError::BadRequest`] for invalid input or
    /// [`AdminError::Api`] if the backend rejects it.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: ProductId, input: &ProductInput) -> Result<Product, AdminError> {
        validate(input)?;
        Ok(self.api.update_product(id, input).await?)
    }

    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the backend rejects the delete.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), AdminError> {
        self.api.delete_product(id).await?;
        info!(%id, "Product deleted");
        Ok(())
    }

    /// Import a product file.
    ///
    /// The file is parsed locally first; an unrecognized header stops the
    /// import and malformed rows are counted as failures without reaching
    /// the server. The valid rows of a basic (`name,slug,price`) file are
    /// re-written and uploaded to the bulk endpoint in one request; an
    /// enhanced file is imported row by row.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Csv`] for an unreadable file or unknown header,
    /// or [`AdminError::Api`] if the bulk upload fails outright.
    #[instrument(skip(self, contents), fields(bytes = contents.len()))]
    pub async fn import_csv(&self, file_name: &str, contents: &str) -> Result<ImportReport, AdminError> {
        let parsed = parse_products(contents)?;
        for row in &parsed.malformed {
            warn!(line = row.line, reason = %row.reason, "Malformed CSV row");
        }

        let mut report = ImportReport::malformed(&parsed);
        match parsed.flavor {
            CsvFlavor::Basic => {
                if !parsed.records.is_empty() {
                    let body = write_basic(&parsed.records)?;
                    let result = self
                        .api
                        .bulk_upload_csv(file_name, body.into_bytes())
                        .await?;
                    report.created += result.created;
                    report.failed += result.failed;
                    report.errors.extend(result.errors);
                }
            }
            CsvFlavor::Enhanced => {
                for record in &parsed.records {
                    match self.api.create_product(&record_input(record)).await {
                        Ok(_) => report.created += 1,
                        Err(e) => {
                            warn!(slug = %record.slug, error = %e, "Product import row rejected");
                            report.failed += 1;
                            report.errors.push(format!("{}: {}", record.slug, e.user_message()));
                        }
                    }
                }
            }
        }

        info!(
            created = report.created,
            failed = report.failed,
            "Product import finished"
        );
        Ok(report)
    }

    /// Export the whole catalog in the enhanced layout.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if a page fails to load.
    #[instrument(skip(self))]
    pub async fn export_csv(&self) -> Result<String, AdminError> {
        let mut products = Vec::new();
        let mut page = 1;
        loop {
            let listing = self
                .api
                .list_products(&ProductQuery {
                    page: Some(page),
                    limit: Some(EXPORT_PAGE_SIZE),
                    ..ProductQuery::default()
                })
                .await?;
            let fetched = listing.products.len();
            let page_count = listing.page_count();
            products.extend(listing.products);
            if fetched == 0 || u64::from(page) >= page_count {
                break;
            }
            page += 1;
        }
        Ok(export_products(&products)?)
    }

    /// Download the server-rendered CSV export.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the download fails.
    pub async fn download_export(&self) -> Result<String, AdminError> {
        Ok(self.api.export_products_csv().await?)
    }
}

fn validate(input: &ProductInput) -> Result<(), AdminError> {
    if input.name.trim().is_empty() {
        return Err(AdminError::BadRequest("product name is required".to_string()));
    }
    if input.slug.trim().is_empty() {
        return Err(AdminError::BadRequest("product slug is required".to_string()));
    }
    if input.price.is_negative() {
        return Err(AdminError::BadRequest("price cannot be negative".to_string()));
    }
    Ok(())
}

fn record_input(record: &ProductRecord) -> ProductInput {
    ProductInput {
        name: record.name.clone(),
        slug: record.slug.clone(),
        price: record.price,
        description: record.description.clone(),
        category_id: None,
        inventory: record.inventory.unwrap_or(0),
        images: Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use nursery_core::Price;
    use rust_decimal::Decimal;

    fn input(name: &str, slug: &str, price: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            slug: slug.to_string(),
            price: Price::new(Decimal::new(price, 0)),
            description: None,
            category_id: None,
            inventory: 0,
            images: Vec::new(),
        }
    }

    #[test]
    fn test_validate() {
        assert!(validate(&input("Rose", "rose", 199)).is_ok());
        assert!(matches!(
            validate(&input(" ", "rose", 199)),
            Err(AdminError::BadRequest(_))
        ));
        assert!(matches!(
            validate(&input("Rose", "", 199)),
            Err(AdminError::BadRequest(_))
        ));
        assert!(matches!(
            validate(&input("Rose", "rose", -1)),
            Err(AdminError::BadRequest(_))
        ));
    }

    #[test]
    fn test_malformed_rows_start_the_report() {
        let parsed = parse_products("name,slug,price\nRose,rose,199\nLily,lily,\n").unwrap();
        let report = ImportReport::malformed(&parsed);
        assert_eq!(report.flavor, CsvFlavor::Basic);
        assert_eq!(report.created, 0);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors, ["Row 3: missing price"]);
    }

    #[test]
    fn test_record_input() {
        let parsed = parse_products("name,slug,price,description,inventory\nFern,fern,249,Shade lover,12\n")
            .unwrap();
        let input = record_input(&parsed.records[0]);
        assert_eq!(input.slug, "fern");
        assert_eq!(input.inventory, 12);
        assert_eq!(input.description.as_deref(), Some("Shade lover"));
    }
}
