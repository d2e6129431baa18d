//! Error handling для IoC контейнера
//!
//! Все ошибки разрешения бинов возвращаются вызывающему `get_bean` как
//! `IocError`, ничего не проглатывается. Ошибки фабрик и init-хуков приходят
//! как `anyhow::Error` и оборачиваются с указанием имени бина.
//!
//! # ERROR HANDLING PATTERNS
//!
//! ```rust,ignore
//! match container.get_bean("orderService") {
//!     Ok(bean) => { /* ... */ }
//!     Err(IocError::UnknownDependency { bean, dependency }) => {
//!         eprintln!("{bean} requires {dependency}, which is not registered");
//!     }
//!     Err(other) => return Err(other.into()),
//! }
//! ```

use thiserror::Error;

/// Результат операций контейнера
pub type IocResult<T> = Result<T, IocError>;

/// Основной error type для всех операций контейнера
#[derive(Debug, Error)]
pub enum IocError {
    /// Конфигурация отвергнута при создании контейнера
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Unknown bean: '{name}' is not registered")]
    UnknownBean { name: String },

    #[error("Bean '{bean}' depends on '{dependency}', which is not registered")]
    UnknownDependency { bean: String, dependency: String },

    /// Имя есть в `bean_names()`, но `definition()` вернул `None`
    #[error("Bean '{name}' is registered but its definition is missing")]
    MissingDefinition { name: String },

    #[error("Failed to instantiate bean '{bean}': {source}")]
    Instantiation {
        bean: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Init hook of bean '{bean}' failed: {source}")]
    Initialization {
        bean: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Circular dependency detected: {}", path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    #[error("Resolution of bean '{bean}' exceeded the maximum depth of {depth}")]
    ResolutionDepthExceeded { bean: String, depth: usize },

    #[error("Bean '{bean}' is not of the requested type {expected}")]
    TypeMismatch {
        bean: String,
        expected: &'static str,
    },
}

/// Ошибки, обнаруживаемые при создании контейнера (fail fast)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Definition names should be unique, duplicated: {}", names.join(", "))]
    DuplicateBeanNames { names: Vec<String> },

    #[error("Invalid settings: {field} - {reason}")]
    InvalidSettings { field: String, reason: String },
}

impl IocError {
    /// Имя бина, ответственного за ошибку (если ошибка относится к бину)
    pub fn bean_name(&self) -> Option<&str> {
        match self {
            IocError::Configuration(_) => None,
            IocError::UnknownBean { name } | IocError::MissingDefinition { name } => Some(name),
            IocError::UnknownDependency { bean, .. }
            | IocError::Instantiation { bean, .. }
            | IocError::Initialization { bean, .. }
            | IocError::ResolutionDepthExceeded { bean, .. }
            | IocError::TypeMismatch { bean, .. } => Some(bean),
            IocError::CircularDependency { path } => path.first().map(String::as_str),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, IocError::Configuration(_))
    }

    pub(crate) fn instantiation(bean: &str, source: anyhow::Error) -> Self {
        // Типизированная ошибка вложенного get() внутри фабрики не теряет свой вид
        match source.downcast::<IocError>() {
            Ok(nested) => nested,
            Err(source) => IocError::Instantiation {
                bean: bean.to_string(),
                source,
            },
        }
    }

    pub(crate) fn initialization(bean: &str, source: anyhow::Error) -> Self {
        match source.downcast::<IocError>() {
            Ok(nested) => nested,
            Err(source) => IocError::Initialization {
                bean: bean.to_string(),
                source,
            },
        }
    }
}

impl ConfigurationError {
    pub fn invalid_settings(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigurationError::InvalidSettings {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
