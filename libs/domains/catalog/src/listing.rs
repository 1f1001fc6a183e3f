//! Product listing: query-string parsing, filters, pagination with
//! page-overflow recovery.
//!
//! ```text
//! ListingParams ──parse──▶ ListingQuery ──run_listing(tx)──▶ ProductPage
//!  (raw strings)            (typed filter,                   (items, totals,
//!                            page, page size)                 recovered flag)
//! ```

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{CategoryChoice, Notice, Product};
use crate::settings::CatalogSettings;
use crate::store::UnitOfWork;

/// Raw listing parameters as they arrive in the query string or form body.
///
/// Every field is kept as text so that empty values (`preco_min=`) count as
/// absent and garbage is reported as `InvalidParameter` instead of a
/// generic extractor rejection.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListingParams {
    /// 1-based page number (default 1)
    pub page: Option<String>,
    /// Page size (default 25)
    pub pp: Option<String>,
    /// Case-insensitive substring of the product name
    pub q: Option<String>,
    /// Category UUID
    pub categoria_id: Option<String>,
    /// Inclusive lower price bound
    pub preco_min: Option<String>,
    /// Inclusive upper price bound
    pub preco_max: Option<String>,
}

/// Filters applied to the product listing; all AND-combined
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub q: Option<String>,
    pub category_id: Option<Uuid>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(q) = &self.q {
            if !product.name.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        if let Some(category_id) = self.category_id {
            if product.category_id != category_id {
                return false;
            }
        }
        if let Some(min) = self.price_min {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if product.price > max {
                return false;
            }
        }
        true
    }

    /// `q` as an ILIKE pattern with `\`, `%` and `_` escaped
    pub fn like_pattern(&self) -> Option<String> {
        self.q.as_deref().map(|q| format!("%{}%", escape_like(q)))
    }
}

/// Escape LIKE wildcards so they match literally (escape character `\`)
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Offset/limit slice of the sorted listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    pub fn for_page(page: u64, page_size: u64) -> Self {
        Self {
            offset: page.saturating_sub(1) * page_size,
            limit: page_size,
        }
    }
}

/// Typed listing request
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub filter: ProductFilter,
    /// As requested; may be out of range
    pub page: i64,
    pub page_size: u64,
}

impl ListingQuery {
    /// Unfiltered first page
    pub fn first_page(settings: &CatalogSettings) -> Self {
        Self {
            filter: ProductFilter::default(),
            page: 1,
            page_size: settings.default_page_size,
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_price(name: &'static str, value: &Option<String>) -> CatalogResult<Option<f64>> {
    let Some(raw) = present(value) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(price) if price.is_finite() => Ok(Some(price)),
        _ => Err(CatalogError::invalid_parameter(
            name,
            format!("'{}' is not a number", raw),
        )),
    }
}

impl ListingParams {
    /// Field-wise merge; values present in `self` win over `fallback`
    pub fn or(self, fallback: ListingParams) -> ListingParams {
        ListingParams {
            page: self.page.or(fallback.page),
            pp: self.pp.or(fallback.pp),
            q: self.q.or(fallback.q),
            categoria_id: self.categoria_id.or(fallback.categoria_id),
            preco_min: self.preco_min.or(fallback.preco_min),
            preco_max: self.preco_max.or(fallback.preco_max),
        }
    }

    /// Validate and type the raw parameters.
    ///
    /// Numeric garbage and out-of-range page sizes fail with
    /// `InvalidParameter`; an unparsable category id fails with
    /// `InvalidFilter`. Out-of-range pages are *not* rejected here.
    pub fn parse(&self, settings: &CatalogSettings) -> CatalogResult<ListingQuery> {
        let page = match present(&self.page) {
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                CatalogError::invalid_parameter("page", format!("'{}' is not an integer", raw))
            })?,
            None => 1,
        };

        let page_size = match present(&self.pp) {
            Some(raw) => {
                let size = raw.parse::<u64>().map_err(|_| {
                    CatalogError::invalid_parameter("pp", format!("'{}' is not an integer", raw))
                })?;
                if size == 0 || size > settings.max_page_size {
                    return Err(CatalogError::invalid_parameter(
                        "pp",
                        format!("must be between 1 and {}", settings.max_page_size),
                    ));
                }
                size
            }
            None => settings.default_page_size,
        };

        let price_min = parse_price("preco_min", &self.preco_min)?;
        let price_max = parse_price("preco_max", &self.preco_max)?;

        let category_id = match present(&self.categoria_id) {
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| CatalogError::InvalidFilter(format!("Invalid category id '{}'", raw)))?,
            ),
            None => None,
        };

        Ok(ListingQuery {
            filter: ProductFilter {
                q: self
                    .q
                    .as_deref()
                    .filter(|q| !q.trim().is_empty())
                    .map(str::to_string),
                category_id,
                price_min,
                price_max,
            },
            page,
            page_size,
        })
    }
}

/// One page of the product listing
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub current_page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
    /// True when the requested page was out of range and page 1 was served
    pub recovered: bool,
    /// Originally requested page, set when `recovered`
    pub requested_page: Option<i64>,
}

/// `ceil(total_items / page_size)`; zero for an empty listing
pub fn total_pages(total_items: u64, page_size: u64) -> u64 {
    total_items.div_ceil(page_size)
}

/// Page to serve for `requested`, and whether it had to be recovered.
///
/// Page 1 of an empty listing is in range.
pub fn resolve_page(requested: i64, total_pages: u64) -> (u64, bool) {
    match u64::try_from(requested) {
        Ok(page) if page >= 1 && page <= total_pages.max(1) => (page, false),
        _ => (1, true),
    }
}

/// Count, pick the page (falling back to page 1 on overflow), then fetch it
pub async fn run_listing<U: UnitOfWork + ?Sized>(
    tx: &mut U,
    query: &ListingQuery,
) -> CatalogResult<ProductPage> {
    let total_items = tx.count_products(&query.filter).await?;
    let total_pages = total_pages(total_items, query.page_size);
    let (current_page, recovered) = resolve_page(query.page, total_pages);

    let items = tx
        .query_products(
            &query.filter,
            PageWindow::for_page(current_page, query.page_size),
        )
        .await?;

    if recovered {
        tracing::debug!(
            requested_page = query.page,
            total_pages,
            "Listing page out of range, serving page 1"
        );
    }

    Ok(ProductPage {
        items,
        current_page,
        page_size: query.page_size,
        total_items,
        total_pages,
        recovered,
        requested_page: recovered.then_some(query.page),
    })
}

/// Listing payload: page, echoed filters, notices and category choices
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    #[serde(flatten)]
    pub page: ProductPage,
    pub filters: ProductFilter,
    pub notices: Vec<Notice>,
    pub categories: Vec<CategoryChoice>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductInput;

    fn params(pairs: &[(&str, &str)]) -> ListingParams {
        let mut params = ListingParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "page" => params.page = value,
                "pp" => params.pp = value,
                "q" => params.q = value,
                "categoria_id" => params.categoria_id = value,
                "preco_min" => params.preco_min = value,
                "preco_max" => params.preco_max = value,
                other => panic!("unknown key {}", other),
            }
        }
        params
    }

    fn product(name: &str, price: f64, category_id: Uuid) -> Product {
        Product::new(
            ProductInput {
                name: name.to_string(),
                price,
                active: true,
                stock: 0,
                category_id,
            },
            None,
        )
    }

    #[test]
    fn test_parse_defaults() {
        let settings = CatalogSettings::default();
        let query = ListingParams::default().parse(&settings).unwrap();
        assert_eq!(query, ListingQuery::first_page(&settings));
    }

    #[test]
    fn test_parse_empty_values_are_absent() {
        let query = params(&[("preco_min", ""), ("preco_max", " "), ("q", ""), ("categoria_id", "")])
            .parse(&CatalogSettings::default())
            .unwrap();
        assert_eq!(query.filter, ProductFilter::default());
    }

    #[test]
    fn test_parse_full() {
        let category = Uuid::now_v7();
        let category_str = category.to_string();
        let query = params(&[
            ("page", "3"),
            ("pp", "10"),
            ("q", "lamp"),
            ("categoria_id", category_str.as_str()),
            ("preco_min", "1.5"),
            ("preco_max", "20"),
        ])
        .parse(&CatalogSettings::default())
        .unwrap();

        assert_eq!(query.page, 3);
        assert_eq!(query.page_size, 10);
        assert_eq!(query.filter.q.as_deref(), Some("lamp"));
        assert_eq!(query.filter.category_id, Some(category));
        assert_eq!(query.filter.price_min, Some(1.5));
        assert_eq!(query.filter.price_max, Some(20.0));
    }

    #[test]
    fn test_parse_keeps_search_text_verbatim() {
        let settings = CatalogSettings::default();
        let query = params(&[("q", " lamp")]).parse(&settings).unwrap();
        assert_eq!(query.filter.q.as_deref(), Some(" lamp"));

        let query = params(&[("q", "   ")]).parse(&settings).unwrap();
        assert_eq!(query.filter.q, None);
    }

    #[test]
    fn test_or_prefers_own_values() {
        let merged = params(&[("q", "lamp"), ("pp", "")]).or(params(&[("q", "chair"), ("pp", "10"), ("page", "2")]));
        assert_eq!(merged.q.as_deref(), Some("lamp"));
        assert_eq!(merged.pp.as_deref(), Some(""));
        assert_eq!(merged.page.as_deref(), Some("2"));
        assert_eq!(merged.categoria_id, None);
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let settings = CatalogSettings::default();
        for (key, value) in [("page", "two"), ("pp", "x"), ("preco_min", "cheap"), ("preco_max", "NaN")] {
            let err = params(&[(key, value)]).parse(&settings).unwrap_err();
            assert!(
                matches!(err, CatalogError::InvalidParameter { name, .. } if name == key),
                "{} should be rejected, got {:?}",
                key,
                err
            );
        }
    }

    #[test]
    fn test_parse_rejects_page_size_out_of_range() {
        let settings = CatalogSettings::default();
        for value in ["0", "101", "-1"] {
            let err = params(&[("pp", value)]).parse(&settings).unwrap_err();
            assert!(matches!(err, CatalogError::InvalidParameter { name: "pp", .. }));
        }
        assert!(params(&[("pp", "100")]).parse(&settings).is_ok());
    }

    #[test]
    fn test_parse_keeps_out_of_range_pages() {
        let query = params(&[("page", "-4")])
            .parse(&CatalogSettings::default())
            .unwrap();
        assert_eq!(query.page, -4);
    }

    #[test]
    fn test_parse_invalid_category_is_filter_error() {
        let err = params(&[("categoria_id", "abc")])
            .parse(&CatalogSettings::default())
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidFilter(_)));
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 25), 0);
        assert_eq!(total_pages(1, 25), 1);
        assert_eq!(total_pages(25, 25), 1);
        assert_eq!(total_pages(26, 25), 2);
    }

    #[test]
    fn test_resolve_page() {
        assert_eq!(resolve_page(1, 0), (1, false));
        assert_eq!(resolve_page(2, 3), (2, false));
        assert_eq!(resolve_page(3, 3), (3, false));
        assert_eq!(resolve_page(4, 3), (1, true));
        assert_eq!(resolve_page(0, 3), (1, true));
        assert_eq!(resolve_page(-2, 3), (1, true));
        assert_eq!(resolve_page(2, 0), (1, true));
    }

    #[test]
    fn test_page_window() {
        assert_eq!(PageWindow::for_page(1, 25), PageWindow { offset: 0, limit: 25 });
        assert_eq!(PageWindow::for_page(3, 10), PageWindow { offset: 20, limit: 10 });
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
        let filter = ProductFilter {
            q: Some("a_b".into()),
            ..Default::default()
        };
        assert_eq!(filter.like_pattern().as_deref(), Some("%a\\_b%"));
    }

    #[test]
    fn test_filter_matches() {
        let category = Uuid::now_v7();
        let lamp = product("Desk LAMP", 10.0, category);

        assert!(ProductFilter::default().matches(&lamp));
        assert!(ProductFilter { q: Some("lamp".into()), ..Default::default() }.matches(&lamp));
        assert!(!ProductFilter { q: Some("chair".into()), ..Default::default() }.matches(&lamp));
        assert!(ProductFilter { category_id: Some(category), ..Default::default() }.matches(&lamp));
        assert!(!ProductFilter { category_id: Some(Uuid::now_v7()), ..Default::default() }.matches(&lamp));

        // bounds are inclusive
        assert!(ProductFilter { price_min: Some(10.0), price_max: Some(10.0), ..Default::default() }
            .matches(&lamp));
        assert!(!ProductFilter { price_min: Some(10.01), ..Default::default() }.matches(&lamp));
        assert!(!ProductFilter { price_max: Some(9.99), ..Default::default() }.matches(&lamp));
    }

    #[test]
    fn test_filter_percent_is_literal() {
        let sale = product("50% off", 1.0, Uuid::now_v7());
        let plain = product("500 off", 1.0, Uuid::now_v7());
        let filter = ProductFilter { q: Some("0%".into()), ..Default::default() };
        assert!(filter.matches(&sale));
        assert!(!filter.matches(&plain));
    }
}
