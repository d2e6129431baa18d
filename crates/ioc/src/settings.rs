//! Настройки контейнера
//!
//! ПРИНЦИПЫ:
//! - Только необходимые переключатели
//! - Default values для всего (`#[serde(default)]`)
//! - Пресеты для разработки, production и тестов

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Настройки `SimpleIoC`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Создать все бины сразу при создании контейнера
    pub eager_init: bool,

    /// Проверить граф объявленных зависимостей при создании контейнера
    pub validate_on_start: bool,

    /// Оборачивать помеченные бины в `BenchmarkProxy`
    pub benchmark_enabled: bool,

    /// Максимальная глубина вложенного разрешения зависимостей
    pub max_resolution_depth: usize,

    /// Логировать разрешение бинов на уровне INFO вместо DEBUG
    pub debug_logging: bool,
}

impl ContainerSettings {
    /// Ленивое создание, замеры включены
    pub fn new() -> Self {
        Self {
            eager_init: false,
            validate_on_start: false,
            benchmark_enabled: true,
            max_resolution_depth: 64,
            debug_logging: false,
        }
    }

    /// Конфигурация для разработки
    pub fn development() -> Self {
        Self {
            validate_on_start: true,
            debug_logging: true,
            ..Self::new()
        }
    }

    /// Конфигурация для production: все бины создаются при старте
    pub fn production() -> Self {
        Self {
            eager_init: true,
            validate_on_start: true,
            max_resolution_depth: 128,
            ..Self::new()
        }
    }

    /// Минимальная конфигурация для тестов
    pub fn minimal() -> Self {
        Self {
            benchmark_enabled: false,
            max_resolution_depth: 16,
            ..Self::new()
        }
    }

    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }

    /// Проверить валидность настроек
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigurationError::invalid_settings(
                "max_resolution_depth",
                "must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder для настроек
pub struct SettingsBuilder {
    settings: ContainerSettings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: ContainerSettings::new(),
        }
    }

    pub fn eager_init(mut self, enabled: bool) -> Self {
        self.settings.eager_init = enabled;
        self
    }

    pub fn validate_on_start(mut self, enabled: bool) -> Self {
        self.settings.validate_on_start = enabled;
        self
    }

    pub fn benchmark_enabled(mut self, enabled: bool) -> Self {
        self.settings.benchmark_enabled = enabled;
        self
    }

    pub fn max_resolution_depth(mut self, depth: usize) -> Self {
        self.settings.max_resolution_depth = depth;
        self
    }

    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.settings.debug_logging = enabled;
        self
    }

    pub fn build(self) -> ContainerSettings {
        self.settings
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
