use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use crate::models::{Product, StoredImage};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub active: bool,
    pub stock: i32,
    pub category_id: Uuid,
    pub has_image: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub image_base64: Option<String>,
    pub image_mime: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        // chk_products_image_triple keeps the three columns consistent
        let image = match (model.has_image, model.image_base64, model.image_mime) {
            (true, Some(payload), Some(mime_type)) => Some(StoredImage { payload, mime_type }),
            _ => None,
        };

        Self {
            id: model.id,
            name: model.name,
            price: model.price,
            active: model.active,
            stock: model.stock,
            category_id: model.category_id,
            image,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<&Product> for ActiveModel {
    fn from(product: &Product) -> Self {
        let (payload, mime_type) = match &product.image {
            Some(image) => (Some(image.payload.clone()), Some(image.mime_type.clone())),
            None => (None, None),
        };

        ActiveModel {
            id: Set(product.id),
            name: Set(product.name.clone()),
            price: Set(product.price),
            active: Set(product.active),
            stock: Set(product.stock),
            category_id: Set(product.category_id),
            has_image: Set(product.image.is_some()),
            image_base64: Set(payload),
            image_mime: Set(mime_type),
            created_at: Set(product.created_at.into()),
            updated_at: Set(product.updated_at.into()),
        }
    }
}
