//! Product form: multipart decoding and validation.

use axum::extract::Multipart;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::imaging::Upload;
use crate::models::{ImageChange, ProductInput, StoredImage};

/// Fields of the add/edit product form.
///
/// Numeric and id fields are `None` when missing or unparsable, which the
/// `required` rules turn into field errors.
#[derive(Debug, Clone, Default, Validate)]
pub struct ProductForm {
    #[validate(length(min = 1, max = 200, message = "name must be 1 to 200 characters"))]
    pub nome: String,

    #[validate(
        required(message = "price must be a number"),
        range(min = 0.0, message = "price cannot be negative")
    )]
    pub preco: Option<f64>,

    pub ativo: bool,

    #[validate(
        required(message = "stock must be an integer"),
        range(min = 0, message = "stock cannot be negative")
    )]
    pub estoque: Option<i32>,

    #[validate(required(message = "category must be a valid id"))]
    pub categoria: Option<Uuid>,

    /// Only meaningful on edit
    pub remover_foto: bool,

    pub foto: Option<Upload>,
}

/// A form that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProduct {
    pub input: ProductInput,
    pub image: Option<StoredImage>,
    pub remove_image: bool,
}

impl ValidatedProduct {
    pub fn image_change(&self) -> ImageChange {
        ImageChange::resolve(self.remove_image, self.image.clone())
    }
}

/// HTML checkbox semantics: `y`, `on`, `true` and `1` are checked
pub fn is_checked(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "y" | "on" | "true" | "1"
    )
}

impl ProductForm {
    /// Read the form from a multipart body. Unknown fields are ignored and
    /// an empty `foto` part counts as no upload.
    pub async fn from_multipart(multipart: &mut Multipart) -> CatalogResult<Self> {
        let mut form = ProductForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "foto" => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await?;
                    if !bytes.is_empty() {
                        form.foto = Some(Upload {
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                "nome" => form.nome = field.text().await?.trim().to_string(),
                "preco" => form.preco = parse_number(&field.text().await?),
                "ativo" => form.ativo = is_checked(&field.text().await?),
                "estoque" => form.estoque = field.text().await?.trim().parse().ok(),
                "categoria" => form.categoria = Uuid::parse_str(field.text().await?.trim()).ok(),
                "removerfoto" => form.remover_foto = is_checked(&field.text().await?),
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// Validate and split into typed parts; the upload is checked against
    /// `max_image_bytes` and encoded for storage
    pub fn validate_into(self, max_image_bytes: usize) -> CatalogResult<ValidatedProduct> {
        self.validate()?;

        let (Some(price), Some(stock), Some(category_id)) =
            (self.preco, self.estoque, self.categoria)
        else {
            return Err(CatalogError::Internal(
                "validated product form is missing fields".to_string(),
            ));
        };

        // A removal request discards the upload unchecked
        let image = if self.remover_foto {
            None
        } else {
            self.foto
                .map(|upload| upload.into_stored(max_image_bytes))
                .transpose()?
        };

        Ok(ValidatedProduct {
            input: ProductInput {
                name: self.nome,
                price,
                active: self.ativo,
                stock,
                category_id,
            },
            image,
            remove_image: self.remover_foto,
        })
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ProductForm {
        ProductForm {
            nome: "Lamp".into(),
            preco: Some(19.9),
            ativo: true,
            estoque: Some(4),
            categoria: Some(Uuid::now_v7()),
            remover_foto: false,
            foto: None,
        }
    }

    #[test]
    fn test_checkbox_values() {
        for checked in ["y", "on", "true", "1", "TRUE", " On "] {
            assert!(is_checked(checked), "{}", checked);
        }
        for unchecked in ["", "n", "off", "false", "0"] {
            assert!(!is_checked(unchecked), "{}", unchecked);
        }
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 2.50 "), Some(2.5));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_valid_form() {
        let validated = valid_form().validate_into(1024).unwrap();
        assert_eq!(validated.input.name, "Lamp");
        assert_eq!(validated.input.stock, 4);
        assert_eq!(validated.image_change(), ImageChange::Keep);
    }

    #[test]
    fn test_field_errors_are_collected() {
        let form = ProductForm {
            nome: String::new(),
            preco: Some(-1.0),
            estoque: None,
            categoria: None,
            ..valid_form()
        };

        let Err(CatalogError::Validation(errors)) = form.validate_into(1024) else {
            panic!("expected validation errors");
        };
        let fields = errors.field_errors();
        for field in ["nome", "preco", "estoque", "categoria"] {
            assert!(fields.contains_key(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_upload_is_encoded() {
        let form = ProductForm {
            foto: Some(Upload {
                content_type: "image/png".into(),
                bytes: vec![1, 2, 3],
            }),
            ..valid_form()
        };
        let validated = form.validate_into(1024).unwrap();
        assert_eq!(
            validated.image_change(),
            ImageChange::Replace(StoredImage::encode(&[1, 2, 3], "image/png"))
        );
    }

    #[test]
    fn test_remove_wins_over_upload() {
        let form = ProductForm {
            remover_foto: true,
            foto: Some(Upload {
                content_type: "image/png".into(),
                bytes: vec![1],
            }),
            ..valid_form()
        };
        assert_eq!(form.validate_into(1024).unwrap().image_change(), ImageChange::Remove);
    }

    #[test]
    fn test_remove_ignores_unacceptable_upload() {
        for upload in [
            Upload {
                content_type: "text/plain".into(),
                bytes: vec![1],
            },
            Upload {
                content_type: "image/png".into(),
                bytes: vec![0; 11],
            },
        ] {
            let form = ProductForm {
                remover_foto: true,
                foto: Some(upload),
                ..valid_form()
            };
            let validated = form.validate_into(10).unwrap();
            assert!(validated.image.is_none());
            assert_eq!(validated.image_change(), ImageChange::Remove);
        }
    }

    #[test]
    fn test_oversized_upload_rejected() {
        let form = ProductForm {
            foto: Some(Upload {
                content_type: "image/png".into(),
                bytes: vec![0; 11],
            }),
            ..valid_form()
        };
        assert!(matches!(
            form.validate_into(10),
            Err(CatalogError::ImageTooLarge { .. })
        ));
    }
}
