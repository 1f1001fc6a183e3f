use core_config::{ConfigError, FromEnv, env_parse_or};

/// Tunables for listing, thumbnails and uploads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub default_thumbnail_size: u32,
    pub max_thumbnail_size: u32,
    pub max_image_bytes: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            default_page_size: 25,
            max_page_size: 100,
            default_thumbnail_size: 128,
            max_thumbnail_size: 1024,
            max_image_bytes: 5 * 1024 * 1024,
        }
    }
}

impl FromEnv for CatalogSettings {
    /// - CATALOG_DEFAULT_PAGE_SIZE (25)
    /// - CATALOG_MAX_PAGE_SIZE (100)
    /// - CATALOG_DEFAULT_THUMBNAIL_SIZE (128)
    /// - CATALOG_MAX_THUMBNAIL_SIZE (1024)
    /// - CATALOG_MAX_IMAGE_BYTES (5 MiB)
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let settings = Self {
            default_page_size: env_parse_or("CATALOG_DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
            max_page_size: env_parse_or("CATALOG_MAX_PAGE_SIZE", defaults.max_page_size)?,
            default_thumbnail_size: env_parse_or(
                "CATALOG_DEFAULT_THUMBNAIL_SIZE",
                defaults.default_thumbnail_size,
            )?,
            max_thumbnail_size: env_parse_or(
                "CATALOG_MAX_THUMBNAIL_SIZE",
                defaults.max_thumbnail_size,
            )?,
            max_image_bytes: env_parse_or("CATALOG_MAX_IMAGE_BYTES", defaults.max_image_bytes)?,
        };

        if settings.default_page_size == 0 || settings.default_page_size > settings.max_page_size {
            return Err(ConfigError::ParseError {
                key: "CATALOG_DEFAULT_PAGE_SIZE".to_string(),
                details: format!("must be between 1 and {}", settings.max_page_size),
            });
        }
        if settings.default_thumbnail_size == 0
            || settings.default_thumbnail_size > settings.max_thumbnail_size
        {
            return Err(ConfigError::ParseError {
                key: "CATALOG_DEFAULT_THUMBNAIL_SIZE".to_string(),
                details: format!("must be between 1 and {}", settings.max_thumbnail_size),
            });
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 5] = [
        "CATALOG_DEFAULT_PAGE_SIZE",
        "CATALOG_MAX_PAGE_SIZE",
        "CATALOG_DEFAULT_THUMBNAIL_SIZE",
        "CATALOG_MAX_THUMBNAIL_SIZE",
        "CATALOG_MAX_IMAGE_BYTES",
    ];

    #[test]
    fn test_settings_defaults() {
        temp_env::with_vars_unset(KEYS, || {
            let settings = CatalogSettings::from_env().unwrap();
            assert_eq!(settings, CatalogSettings::default());
            assert_eq!(settings.max_image_bytes, 5_242_880);
        });
    }

    #[test]
    fn test_settings_overrides() {
        temp_env::with_vars(
            [
                ("CATALOG_DEFAULT_PAGE_SIZE", Some("10")),
                ("CATALOG_MAX_PAGE_SIZE", Some("50")),
                ("CATALOG_DEFAULT_THUMBNAIL_SIZE", None),
                ("CATALOG_MAX_THUMBNAIL_SIZE", Some("512")),
                ("CATALOG_MAX_IMAGE_BYTES", None),
            ],
            || {
                let settings = CatalogSettings::from_env().unwrap();
                assert_eq!(settings.default_page_size, 10);
                assert_eq!(settings.max_page_size, 50);
                assert_eq!(settings.default_thumbnail_size, 128);
                assert_eq!(settings.max_thumbnail_size, 512);
            },
        );
    }

    #[test]
    fn test_settings_reject_default_above_max() {
        temp_env::with_vars(
            [
                ("CATALOG_DEFAULT_PAGE_SIZE", Some("200")),
                ("CATALOG_MAX_PAGE_SIZE", None),
                ("CATALOG_DEFAULT_THUMBNAIL_SIZE", None),
                ("CATALOG_MAX_THUMBNAIL_SIZE", None),
                ("CATALOG_MAX_IMAGE_BYTES", None),
            ],
            || {
                let err = CatalogSettings::from_env().unwrap_err();
                assert!(err.to_string().contains("CATALOG_DEFAULT_PAGE_SIZE"));
            },
        );
    }

    #[test]
    fn test_settings_reject_garbage() {
        temp_env::with_vars(
            [
                ("CATALOG_DEFAULT_PAGE_SIZE", None),
                ("CATALOG_MAX_PAGE_SIZE", None),
                ("CATALOG_DEFAULT_THUMBNAIL_SIZE", None),
                ("CATALOG_MAX_THUMBNAIL_SIZE", None),
                ("CATALOG_MAX_IMAGE_BYTES", Some("lots")),
            ],
            || {
                assert!(CatalogSettings::from_env().is_err());
            },
        );
    }
}
