use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity::{category, product},
    error::CatalogResult,
    listing::{PageWindow, ProductFilter},
    models::{Category, Product},
    store::{CatalogStore, UnitOfWork},
};

/// PostgreSQL-backed catalog store
#[derive(Clone)]
pub struct PgCatalogStore {
    db: DatabaseConnection,
}

impl PgCatalogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    type Tx = PgUnitOfWork;

    async fn begin(&self) -> CatalogResult<PgUnitOfWork> {
        let txn = self.db.begin().await?;
        Ok(PgUnitOfWork { txn })
    }
}

/// One database transaction; rolled back by SeaORM when dropped uncommitted
pub struct PgUnitOfWork {
    txn: DatabaseTransaction,
}

fn filtered(filter: &ProductFilter) -> Select<product::Entity> {
    let mut query = product::Entity::find();

    if let Some(pattern) = filter.like_pattern() {
        query = query.filter(Expr::cust_with_values(
            r#""products"."name" ILIKE $1 ESCAPE '\'"#,
            [pattern],
        ));
    }

    if let Some(category_id) = filter.category_id {
        query = query.filter(product::Column::CategoryId.eq(category_id));
    }

    if let Some(min) = filter.price_min {
        query = query.filter(product::Column::Price.gte(min));
    }

    if let Some(max) = filter.price_max {
        query = query.filter(product::Column::Price.lte(max));
    }

    query
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn find_product(&mut self, id: Uuid) -> CatalogResult<Option<Product>> {
        let model = product::Entity::find_by_id(id).one(&self.txn).await?;
        Ok(model.map(Into::into))
    }

    async fn insert_product(&mut self, product: &Product) -> CatalogResult<()> {
        product::ActiveModel::from(product).insert(&self.txn).await?;
        tracing::info!(product_id = %product.id, "Inserted product");
        Ok(())
    }

    async fn update_product(&mut self, product: &Product) -> CatalogResult<()> {
        product::ActiveModel::from(product).update(&self.txn).await?;
        tracing::info!(product_id = %product.id, "Updated product");
        Ok(())
    }

    async fn delete_product(&mut self, id: Uuid) -> CatalogResult<bool> {
        let result = product::Entity::delete_by_id(id).exec(&self.txn).await?;

        if result.rows_affected > 0 {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count_products(&mut self, filter: &ProductFilter) -> CatalogResult<u64> {
        Ok(filtered(filter).count(&self.txn).await?)
    }

    async fn query_products(
        &mut self,
        filter: &ProductFilter,
        window: PageWindow,
    ) -> CatalogResult<Vec<Product>> {
        let models = filtered(filter)
            .order_by_asc(product::Column::Name)
            .order_by_asc(product::Column::Id)
            .offset(window.offset)
            .limit(window.limit)
            .all(&self.txn)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_category(&mut self, id: Uuid) -> CatalogResult<Option<Category>> {
        let model = category::Entity::find_by_id(id).one(&self.txn).await?;
        Ok(model.map(Into::into))
    }

    async fn list_categories(&mut self) -> CatalogResult<Vec<Category>> {
        let models = category::Entity::find()
            .order_by_asc(category::Column::Name)
            .order_by_asc(category::Column::Id)
            .all(&self.txn)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_categories(&mut self) -> CatalogResult<u64> {
        Ok(category::Entity::find().count(&self.txn).await?)
    }

    async fn insert_category(&mut self, category: &Category) -> CatalogResult<()> {
        category::ActiveModel::from(category).insert(&self.txn).await?;
        tracing::info!(category_id = %category.id, "Inserted category");
        Ok(())
    }

    async fn commit(self) -> CatalogResult<()> {
        self.txn.commit().await?;
        Ok(())
    }
}
