//! Product catalog endpoints.

use nursery_core::{CategoryId, Product, ProductId, ProductInput, ProductPage};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::ApiClient;
use super::cache::{CacheKey, CacheValue};
use crate::error::ApiError;

/// Query parameters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<CategoryId>,
    pub search: Option<String>,
}

impl ProductQuery {
    fn apply(&self, url: &mut Url) {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(category) = self.category {
            params.push(("category", category.to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
    }
}

/// Server report for a bulk CSV upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BulkUploadResult {
    pub created: u32,
    pub failed: u32,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ApiClient {
    /// List one page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product page.
    #[instrument(skip(self), fields(page = ?query.page, category = ?query.category))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let key = CacheKey::Products(query.clone());
        if let Some(CacheValue::Products(page)) = self.cache().get(&key).await {
            debug!("Cache hit for product listing");
            return Ok(page);
        }

        let mut url = self.url("api/products")?;
        query.apply(&mut url);
        let page: ProductPage = self.get_json(url).await?;

        self.cache()
            .insert(key, CacheValue::Products(page.clone()))
            .await;
        Ok(page)
    }

    /// Fetch a single product by slug.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown slug.
    #[instrument(skip(self))]
    pub async fn get_product(&self, slug: &str) -> Result<Product, ApiError> {
        let key = CacheKey::Product(slug.to_string());
        if let Some(CacheValue::Product(product)) = self.cache().get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let mut url = self.url("api/products/")?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidRequest("base URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .push(slug);
        let product: Product = self.get_json(url).await?;

        self.cache()
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let product = self
            .send_json(Method::POST, self.url("api/products")?, input)
            .await?;
        self.invalidate_cache();
        Ok(product)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: ProductId, input: &ProductInput) -> Result<Product, ApiError> {
        let product = self
            .send_json(Method::PUT, self.url(&format!("api/products/{id}"))?, input)
            .await?;
        self.invalidate_cache();
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        let url = self.url(&format!("api/products/{id}"))?;
        self.send_unit(self.request(Method::DELETE, url)).await?;
        self.invalidate_cache();
        Ok(())
    }

    /// Download the catalog as CSV text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn export_products_csv(&self) -> Result<String, ApiError> {
        let url = self.url("api/products/export")?;
        self.execute(self.request(Method::GET, url)).await
    }

    /// Upload a CSV file to the bulk import endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the report is malformed.
    #[instrument(skip(self, contents), fields(bytes = contents.len()))]
    pub async fn bulk_upload_csv(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<BulkUploadResult, ApiError> {
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let form = Form::new().part("file", part);

        let url = self.url("api/products/bulk-upload")?;
        let body = self
            .execute(self.request(Method::POST, url).multipart(form))
            .await?;
        let result: BulkUploadResult = Self::parse(&body)?;

        self.invalidate_cache();
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params() {
        let mut url = Url::parse("http://localhost/api/products").unwrap();
        ProductQuery {
            page: Some(2),
            limit: Some(24),
            category: Some(CategoryId::new(7)),
            search: Some("  fern ".to_string()),
        }
        .apply(&mut url);
        assert_eq!(url.query(), Some("page=2&limit=24&category=7&search=fern"));
    }

    #[test]
    fn test_empty_query_adds_nothing() {
        let mut url = Url::parse("http://localhost/api/products").unwrap();
        ProductQuery {
            search: Some("   ".to_string()),
            ..ProductQuery::default()
        }
        .apply(&mut url);
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_bulk_upload_result_parses() {
        let result: BulkUploadResult =
            serde_json::from_str(r#"{"created":2,"failed":1,"errors":["Row 4: missing price"]}"#)
                .unwrap();
        assert_eq!(result.created, 2);
        assert_eq!(result.errors.len(), 1);
    }
}
