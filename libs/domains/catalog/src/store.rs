use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::listing::{PageWindow, ProductFilter};
use crate::models::{Category, Product};

/// Source of units of work; one per request
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    type Tx: UnitOfWork;

    /// Open a unit of work
    async fn begin(&self) -> CatalogResult<Self::Tx>;
}

/// Transactional view of the catalog.
///
/// Changes become visible to others only on [`UnitOfWork::commit`];
/// dropping a unit of work without committing rolls it back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UnitOfWork: Send {
    async fn find_product(&mut self, id: Uuid) -> CatalogResult<Option<Product>>;

    async fn insert_product(&mut self, product: &Product) -> CatalogResult<()>;

    async fn update_product(&mut self, product: &Product) -> CatalogResult<()>;

    /// Returns whether a row was removed
    async fn delete_product(&mut self, id: Uuid) -> CatalogResult<bool>;

    async fn count_products(&mut self, filter: &ProductFilter) -> CatalogResult<u64>;

    /// Matching products ordered by name, then id
    async fn query_products(
        &mut self,
        filter: &ProductFilter,
        window: PageWindow,
    ) -> CatalogResult<Vec<Product>>;

    async fn find_category(&mut self, id: Uuid) -> CatalogResult<Option<Category>>;

    /// All categories ordered by name, then id
    async fn list_categories(&mut self) -> CatalogResult<Vec<Category>>;

    async fn count_categories(&mut self) -> CatalogResult<u64>;

    async fn insert_category(&mut self, category: &Category) -> CatalogResult<()>;

    async fn commit(self) -> CatalogResult<()>;
}

#[derive(Debug, Clone, Default)]
struct Tables {
    products: HashMap<Uuid, Product>,
    categories: HashMap<Uuid, Category>,
}

/// In-memory store for development and tests.
///
/// A unit of work holds the store lock for its whole lifetime and edits a
/// private copy, so uncommitted changes are never observable.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    type Tx = InMemoryUnitOfWork;

    async fn begin(&self) -> CatalogResult<InMemoryUnitOfWork> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(InMemoryUnitOfWork { guard, working })
    }
}

pub struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn find_product(&mut self, id: Uuid) -> CatalogResult<Option<Product>> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn insert_product(&mut self, product: &Product) -> CatalogResult<()> {
        self.working.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update_product(&mut self, product: &Product) -> CatalogResult<()> {
        self.working.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn delete_product(&mut self, id: Uuid) -> CatalogResult<bool> {
        Ok(self.working.products.remove(&id).is_some())
    }

    async fn count_products(&mut self, filter: &ProductFilter) -> CatalogResult<u64> {
        let count = self
            .working
            .products
            .values()
            .filter(|p| filter.matches(p))
            .count();
        Ok(count as u64)
    }

    async fn query_products(
        &mut self,
        filter: &ProductFilter,
        window: PageWindow,
    ) -> CatalogResult<Vec<Product>> {
        let mut matching: Vec<&Product> = self
            .working
            .products
            .values()
            .filter(|p| filter.matches(p))
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(matching
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .cloned()
            .collect())
    }

    async fn find_category(&mut self, id: Uuid) -> CatalogResult<Option<Category>> {
        Ok(self.working.categories.get(&id).cloned())
    }

    async fn list_categories(&mut self) -> CatalogResult<Vec<Category>> {
        let mut categories: Vec<Category> = self.working.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn count_categories(&mut self) -> CatalogResult<u64> {
        Ok(self.working.categories.len() as u64)
    }

    async fn insert_category(&mut self, category: &Category) -> CatalogResult<()> {
        self.working.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn commit(self) -> CatalogResult<()> {
        let Self { mut guard, working } = self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateCategory, ProductInput};

    fn category(name: &str) -> Category {
        Category::new(CreateCategory {
            name: name.to_string(),
        })
    }

    fn product(name: &str, category_id: Uuid) -> Product {
        Product::new(
            ProductInput {
                name: name.to_string(),
                price: 1.0,
                active: true,
                stock: 1,
                category_id,
            },
            None,
        )
    }

    #[tokio::test]
    async fn test_commit_publishes_changes() {
        let store = InMemoryCatalogStore::new();
        let books = category("Books");

        let mut tx = store.begin().await.unwrap();
        tx.insert_category(&books).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.find_category(books.id).await.unwrap(), Some(books));
    }

    #[tokio::test]
    async fn test_drop_rolls_back() {
        let store = InMemoryCatalogStore::new();
        let books = category("Books");

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_category(&books).await.unwrap();
            tx.insert_product(&product("Novel", books.id)).await.unwrap();
        }

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.count_categories().await.unwrap(), 0);
        assert_eq!(
            tx.count_products(&ProductFilter::default()).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_query_orders_by_name_then_id() {
        let store = InMemoryCatalogStore::new();
        let books = category("Books");
        let first = product("Same", books.id);
        let second = product("Same", books.id);

        let mut tx = store.begin().await.unwrap();
        tx.insert_category(&books).await.unwrap();
        for p in [&second, &product("Zebra", books.id), &first, &product("Apple", books.id)] {
            tx.insert_product(p).await.unwrap();
        }

        let items = tx
            .query_products(&ProductFilter::default(), PageWindow::for_page(1, 10))
            .await
            .unwrap();
        let names: Vec<&str> = items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Apple", "Same", "Same", "Zebra"]);
        assert!(items[1].id < items[2].id);

        let page_two = tx
            .query_products(&ProductFilter::default(), PageWindow::for_page(2, 3))
            .await
            .unwrap();
        assert_eq!(page_two.len(), 1);
        assert_eq!(page_two[0].name, "Zebra");
    }

    #[tokio::test]
    async fn test_delete_product() {
        let store = InMemoryCatalogStore::new();
        let books = category("Books");
        let novel = product("Novel", books.id);

        let mut tx = store.begin().await.unwrap();
        tx.insert_product(&novel).await.unwrap();
        assert!(tx.delete_product(novel.id).await.unwrap());
        assert!(!tx.delete_product(novel.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_categories_sorted_by_name() {
        let store = InMemoryCatalogStore::new();
        let mut tx = store.begin().await.unwrap();
        for name in ["Toys", "Books", "Garden"] {
            tx.insert_category(&category(name)).await.unwrap();
        }

        let names: Vec<String> = tx
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Books", "Garden", "Toys"]);
    }
}
