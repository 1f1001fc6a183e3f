use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::forms::ProductForm;
use crate::imaging::{self, ImageData, THUMBNAIL_MIME};
use crate::listing::{self, ListingParams, ListingResponse};
use crate::models::{
    AddFormContext, Category, CategoryChoice, CreateCategory, EditFormContext, Notice, Product,
};
use crate::settings::CatalogSettings;
use crate::store::{CatalogStore, UnitOfWork};

/// Catalog use cases; every call runs in its own unit of work
pub struct CatalogService<S: CatalogStore> {
    store: Arc<S>,
    settings: CatalogSettings,
}

impl<S: CatalogStore> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: self.settings.clone(),
        }
    }
}

async fn category_choices<U: UnitOfWork>(tx: &mut U) -> CatalogResult<Vec<CategoryChoice>> {
    Ok(tx
        .list_categories()
        .await?
        .into_iter()
        .map(CategoryChoice::from)
        .collect())
}

/// A product can only point at an existing category
async fn ensure_category<U: UnitOfWork>(tx: &mut U, id: Uuid) -> CatalogResult<()> {
    tx.find_category(id)
        .await?
        .ok_or(CatalogError::CategoryNotFound(id))?;
    Ok(())
}

impl<S: CatalogStore> CatalogService<S> {
    pub fn new(store: S, settings: CatalogSettings) -> Self {
        Self {
            store: Arc::new(store),
            settings,
        }
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// Category choices for the add form; fails with `NoCategories` when empty
    #[instrument(skip(self))]
    pub async fn add_form(&self) -> CatalogResult<AddFormContext> {
        let mut tx = self.store.begin().await?;
        let categories = category_choices(&mut tx).await?;

        if categories.is_empty() {
            return Err(CatalogError::NoCategories);
        }

        Ok(AddFormContext { categories })
    }

    #[instrument(skip(self, form))]
    pub async fn create_product(&self, form: ProductForm) -> CatalogResult<Product> {
        let validated = form.validate_into(self.settings.max_image_bytes)?;

        let mut tx = self.store.begin().await?;

        if tx.count_categories().await? == 0 {
            return Err(CatalogError::NoCategories);
        }
        ensure_category(&mut tx, validated.input.category_id).await?;

        let product = Product::new(validated.input, validated.image);
        tx.insert_product(&product).await?;
        tx.commit().await?;

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    /// Product plus category choices for the edit form
    #[instrument(skip(self))]
    pub async fn edit_form(&self, id: Uuid) -> CatalogResult<EditFormContext> {
        let mut tx = self.store.begin().await?;
        let product = tx
            .find_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;
        let categories = category_choices(&mut tx).await?;

        Ok(EditFormContext {
            product,
            categories,
        })
    }

    #[instrument(skip(self, form))]
    pub async fn update_product(&self, id: Uuid, form: ProductForm) -> CatalogResult<Product> {
        let validated = form.validate_into(self.settings.max_image_bytes)?;
        let image_change = validated.image_change();

        let mut tx = self.store.begin().await?;
        let mut product = tx
            .find_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;
        ensure_category(&mut tx, validated.input.category_id).await?;

        product.apply_update(validated.input, image_change);
        tx.update_product(&product).await?;
        tx.commit().await?;

        tracing::info!(product_id = %id, has_image = product.has_image(), "Updated product");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> CatalogResult<()> {
        let mut tx = self.store.begin().await?;

        if !tx.delete_product(id).await? {
            return Err(CatalogError::ProductNotFound(id));
        }
        tx.commit().await?;

        tracing::info!(product_id = %id, "Deleted product");
        Ok(())
    }

    /// Filtered, paginated listing.
    ///
    /// An out-of-range page is recovered to page 1 with an `info` notice;
    /// an unparsable category id fails with `InvalidFilter`.
    #[instrument(skip(self))]
    pub async fn list_products(&self, params: &ListingParams) -> CatalogResult<ListingResponse> {
        let query = params.parse(&self.settings)?;

        let mut tx = self.store.begin().await?;
        let page = listing::run_listing(&mut tx, &query).await?;
        let categories = category_choices(&mut tx).await?;

        let mut notices = Vec::new();
        if let Some(requested) = page.requested_page {
            notices.push(Notice::info(format!(
                "Page {} does not exist; showing page 1",
                requested
            )));
        }

        Ok(ListingResponse {
            page,
            filters: query.filter,
            notices,
            categories,
        })
    }

    async fn load_image(&self, id: Uuid) -> CatalogResult<ImageData> {
        let mut tx = self.store.begin().await?;
        let product = tx
            .find_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;

        product
            .image
            .as_ref()
            .ok_or(CatalogError::NoImage(id))?
            .decode(id)
    }

    /// Stored image bytes and MIME type, exactly as uploaded
    #[instrument(skip(self))]
    pub async fn product_image(&self, id: Uuid) -> CatalogResult<ImageData> {
        self.load_image(id).await
    }

    /// PNG thumbnail whose longest edge is at most `size`
    #[instrument(skip(self))]
    pub async fn product_thumbnail(&self, id: Uuid, size: u32) -> CatalogResult<ImageData> {
        if size == 0 || size > self.settings.max_thumbnail_size {
            return Err(CatalogError::invalid_parameter(
                "size",
                format!("must be between 1 and {}", self.settings.max_thumbnail_size),
            ));
        }

        let original = self.load_image(id).await?;

        let bytes = tokio::task::spawn_blocking(move || {
            imaging::render_thumbnail(&original.bytes, size)
        })
        .await
        .map_err(|e| CatalogError::Internal(format!("Thumbnail task failed: {}", e)))?
        .map_err(|e| CatalogError::CorruptImage {
            id,
            reason: e.to_string(),
        })?;

        Ok(ImageData {
            bytes,
            mime_type: THUMBNAIL_MIME.to_string(),
        })
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let mut tx = self.store.begin().await?;
        tx.list_categories().await
    }

    #[instrument(skip(self, input))]
    pub async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        input.validate()?;

        let category = Category::new(input);
        let mut tx = self.store.begin().await?;
        tx.insert_category(&category).await?;
        tx.commit().await?;

        tracing::info!(category_id = %category.id, "Created category");
        Ok(category)
    }
}
