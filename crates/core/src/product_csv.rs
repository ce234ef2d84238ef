//! Product CSV files for bulk import and export.
//!
//! Two layouts are accepted, told apart by the header row:
//!
//! - basic: `name,slug,price`
//! - enhanced: `name, slug, price, description, inventory`
//!
//! Header cells are compared after trimming, so the spaced enhanced header
//! and the compact one are the same layout. Every data row is validated on
//! its own; a bad row is reported with its line number and never filled in
//! with defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Price, Product};

const BASIC_HEADER: [&str; 3] = ["name", "slug", "price"];
const ENHANCED_HEADER: [&str; 5] = ["name", "slug", "price", "description", "inventory"];

/// Which header layout a file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvFlavor {
    Basic,
    Enhanced,
}

impl CsvFlavor {
    const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Basic => &BASIC_HEADER,
            Self::Enhanced => &ENHANCED_HEADER,
        }
    }
}

/// Errors that stop an import before any row is read.
#[derive(Debug, Error)]
pub enum CsvError {
    /// The file has no header row.
    #[error("CSV file is empty")]
    Empty,
    /// The header matches neither layout.
    #[error("unrecognized CSV header '{found}', expected 'name,slug,price' or 'name,slug,price,description,inventory'")]
    Header { found: String },
    /// The reader or writer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Export produced invalid UTF-8.
    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A validated product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub slug: String,
    pub price: Price,
    /// Enhanced layout only; blank cells are `None`.
    pub description: Option<String>,
    /// Enhanced layout only.
    pub inventory: Option<u32>,
}

/// A rejected row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedRow {
    /// 1-based line number in the file.
    pub line: u64,
    pub reason: String,
}

/// Result of parsing a product file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvImport {
    pub flavor: CsvFlavor,
    pub records: Vec<ProductRecord>,
    pub malformed: Vec<MalformedRow>,
}

impl CsvImport {
    /// Number of rejected rows.
    #[must_use]
    pub fn malformed_count(&self) -> usize {
        self.malformed.len()
    }
}

/// Parse a product file, detecting the layout from its header.
///
/// # Errors
///
/// Returns [`CsvError::Empty`] for a file without a header,
/// [`CsvError::Header`] when the header matches neither layout, and
/// [`CsvError::Csv`] if the input cannot be read.
pub fn parse_products(input: &str) -> Result<CsvImport, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let mut records = reader.records();
    let header = loop {
        match records.next() {
            None => return Err(CsvError::Empty),
            Some(row) => {
                let row = row?;
                if !is_blank(&row) {
                    break row;
                }
            }
        }
    };
    let flavor = detect_flavor(&header)?;

    let mut import = CsvImport {
        flavor,
        records: Vec::new(),
        malformed: Vec::new(),
    };

    for row in records {
        let row = row?;
        if is_blank(&row) {
            continue;
        }
        let line = row.position().map_or(0, csv::Position::line);
        match parse_row(flavor, &row) {
            Ok(record) => import.records.push(record),
            Err(reason) => import.malformed.push(MalformedRow { line, reason }),
        }
    }

    Ok(import)
}

fn is_blank(row: &csv::StringRecord) -> bool {
    row.iter().all(str::is_empty)
}

fn detect_flavor(header: &csv::StringRecord) -> Result<CsvFlavor, CsvError> {
    let cells: Vec<String> = header.iter().map(str::to_lowercase).collect();
    for flavor in [CsvFlavor::Basic, CsvFlavor::Enhanced] {
        if cells.iter().map(String::as_str).eq(flavor.columns().iter().copied()) {
            return Ok(flavor);
        }
    }
    Err(CsvError::Header {
        found: header.iter().collect::<Vec<_>>().join(","),
    })
}

fn parse_row(flavor: CsvFlavor, row: &csv::StringRecord) -> Result<ProductRecord, String> {
    let expected = flavor.columns().len();
    if row.len() != expected {
        return Err(format!("expected {expected} fields, found {}", row.len()));
    }

    let field = |index: usize| row.get(index).unwrap_or_default();
    let required = |index: usize| {
        let value = field(index);
        if value.is_empty() {
            Err(format!("missing {}", flavor.columns().get(index).copied().unwrap_or("field")))
        } else {
            Ok(value)
        }
    };

    let name = required(0)?.to_string();
    let slug = required(1)?.to_string();
    let price_text = required(2)?;
    let price: Price = price_text
        .parse()
        .map_err(|_| format!("invalid price '{price_text}'"))?;
    if price.is_negative() {
        return Err(format!("negative price '{price_text}'"));
    }

    let (description, inventory) = match flavor {
        CsvFlavor::Basic => (None, None),
        CsvFlavor::Enhanced => {
            let description = Some(field(3)).filter(|d| !d.is_empty()).map(str::to_string);
            let inventory_text = required(4)?;
            let inventory = inventory_text
                .parse::<u32>()
                .map_err(|_| format!("invalid inventory '{inventory_text}'"))?;
            (description, Some(inventory))
        }
    };

    Ok(ProductRecord {
        name,
        slug,
        price,
        description,
        inventory,
    })
}

/// Write validated rows back out in the basic layout.
///
/// Description and inventory are dropped.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn write_basic(records: &[ProductRecord]) -> Result<String, CsvError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(BASIC_HEADER)?;
    for record in records {
        let price = record.price.amount().to_string();
        writer.write_record([record.name.as_str(), record.slug.as_str(), price.as_str()])?;
    }
    finish(writer)
}

/// Write products in the enhanced layout.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn export_products(products: &[Product]) -> Result<String, CsvError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(ENHANCED_HEADER)?;
    for product in products {
        let price = product.price.amount().to_string();
        let inventory = product.inventory.to_string();
        writer.write_record([
            product.name.as_str(),
            product.slug.as_str(),
            price.as_str(),
            product.description.as_deref().unwrap_or_default(),
            inventory.as_str(),
        ])?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, CsvError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
