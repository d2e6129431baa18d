//! Builder pattern для настройки контейнера
//!
//! Конфигурация бинов задается через `Config`, builder отвечает только за
//! окружение контейнера: настройки и приемник замеров времени.

use std::sync::Arc;

use crate::config::Config;
use crate::container::SimpleIoC;
use crate::errors::IocResult;
use crate::proxy::{TimingSink, TracingTimingSink};
use crate::settings::ContainerSettings;

/// Builder для создания `SimpleIoC`
pub struct SimpleIoCBuilder {
    config: Arc<dyn Config>,
    settings: ContainerSettings,
    timing_sink: Arc<dyn TimingSink>,
}

impl SimpleIoCBuilder {
    /// Создать новый builder поверх конфигурации
    pub fn new(config: Arc<dyn Config>) -> Self {
        Self {
            config,
            settings: ContainerSettings::default(),
            timing_sink: Arc::new(TracingTimingSink),
        }
    }

    pub fn settings(mut self, settings: ContainerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Создавать все бины при сборке контейнера
    pub fn eager_init(mut self, enabled: bool) -> Self {
        self.settings.eager_init = enabled;
        self
    }

    pub fn validate_on_start(mut self, enabled: bool) -> Self {
        self.settings.validate_on_start = enabled;
        self
    }

    /// Куда отправлять замеры `BenchmarkProxy` (по умолчанию tracing)
    pub fn timing_sink(mut self, sink: Arc<dyn TimingSink>) -> Self {
        self.timing_sink = sink;
        self
    }

    /// Создать итоговый контейнер.
    ///
    /// Дубликаты имен и невалидные настройки отвергаются здесь же.
    pub fn build(self) -> IocResult<SimpleIoC> {
        SimpleIoC::create(self.config, self.settings, self.timing_sink)
    }
}
