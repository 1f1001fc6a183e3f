use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Image kept inline with its product: base64 payload plus MIME type.
///
/// Presence of a `StoredImage` is the product's "has image" flag, so payload
/// and MIME type can only ever be set or cleared together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    /// Standard-alphabet base64 of the original upload
    #[serde(skip)]
    pub payload: String,
    /// MIME type as uploaded, e.g. `image/jpeg`
    pub mime_type: String,
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v7)
    pub id: Uuid,
    pub name: String,
    /// Unit price, never negative
    pub price: f64,
    pub active: bool,
    /// Units in stock, never negative
    pub stock: i32,
    pub category_id: Uuid,
    /// Present when the product has an image; the payload is served by the image endpoints
    pub image: Option<StoredImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated scalar fields of the product form
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
    pub active: bool,
    pub stock: i32,
    pub category_id: Uuid,
}

/// What an edit does to the product image
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageChange {
    #[default]
    Keep,
    Replace(StoredImage),
    Remove,
}

impl ImageChange {
    /// `remove` wins over a new upload
    pub fn resolve(remove: bool, upload: Option<StoredImage>) -> Self {
        match (remove, upload) {
            (true, _) => Self::Remove,
            (false, Some(image)) => Self::Replace(image),
            (false, None) => Self::Keep,
        }
    }
}

impl Product {
    pub fn new(input: ProductInput, image: Option<StoredImage>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            price: input.price,
            active: input.active,
            stock: input.stock,
            category_id: input.category_id,
            image,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an edit; the image is replaced as a unit
    pub fn apply_update(&mut self, input: ProductInput, image: ImageChange) {
        self.name = input.name;
        self.price = input.price;
        self.active = input.active;
        self.stock = input.stock;
        self.category_id = input.category_id;

        match image {
            ImageChange::Keep => {}
            ImageChange::Replace(stored) => self.image = Some(stored),
            ImageChange::Remove => self.image = None,
        }

        self.updated_at = Utc::now();
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// Category entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(input: CreateCategory) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Names are stored trimmed, so whitespace alone is no name
fn validate_not_blank(name: &str) -> Result<(), validator::ValidationError> {
    if name.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
}

/// Entry of a category dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoryChoice {
    pub id: Uuid,
    pub name: String,
}

impl From<Category> for CategoryChoice {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

/// Severity of a user-facing notice
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Danger,
}

/// Message shown to the user alongside a payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Danger, message)
    }
}

/// Context needed to render the add form
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AddFormContext {
    pub categories: Vec<CategoryChoice>,
}

/// Context needed to render the edit form
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EditFormContext {
    pub product: Product,
    pub categories: Vec<CategoryChoice>,
}

/// Product plus the notices produced by a write
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductResponse {
    pub product: Product,
    pub notices: Vec<Notice>,
}

/// Result of a delete
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub id: Uuid,
    pub notices: Vec<Notice>,
}
