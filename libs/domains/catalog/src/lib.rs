//! Catalog Domain
//!
//! Products, categories, the filtered product listing and inline product
//! images.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, multipart forms, audit events
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Use cases, one unit of work per call
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌─────────────┐
//! │    Store    │     │   Listing   │  ← filters, pagination, page recovery
//! │ (UnitOfWork)│     │   Imaging   │  ← base64, uploads, PNG thumbnails
//! └──────┬──────┘     └─────────────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{
//!     CatalogSettings, handlers, service::CatalogService, store::InMemoryCatalogStore,
//! };
//!
//! let service = CatalogService::new(InMemoryCatalogStore::new(), CatalogSettings::default());
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod imaging;
pub mod listing;
pub mod models;
pub mod postgres;
pub mod service;
pub mod settings;
pub mod store;

pub use error::{CatalogError, CatalogResult};
pub use forms::ProductForm;
pub use listing::{ListingParams, ListingResponse, ProductFilter, ProductPage};
pub use models::{Category, CreateCategory, Notice, NoticeLevel, Product, StoredImage};
pub use postgres::PgCatalogStore;
pub use service::CatalogService;
pub use settings::CatalogSettings;
pub use store::{CatalogStore, InMemoryCatalogStore, UnitOfWork};
