//! Минимальный IoC контейнер: бины по имени, ленивые синглтоны, замеры времени
//!
//! ПРИНЦИПЫ:
//! - Конфигурация (`Config`) это реестр имя -> описание бина, только чтение
//! - Один экземпляр на имя, создается при первом запросе (или сразу при eager_init)
//! - Зависимости разрешаются рекурсивно до создания бина, циклы обнаруживаются
//! - Помеченные операции бина оборачиваются в `BenchmarkProxy`
//! - `Arc<dyn Any>` storage и простые `Fn(&BeanContext) -> Result<T>` фабрики
//!
//! ```rust,ignore
//! use ioc::{Benchmark, BeanDefinition, RegistryConfig, SimpleIoC};
//!
//! let config = RegistryConfig::builder()
//!     .bean(BeanDefinition::of_default::<TestBean>("testBean").build())
//!     .bean(
//!         BeanDefinition::builder("repoBean", |ctx| Ok(RepoBean::new(ctx.inject::<TestBean>()?)))
//!             .depends_on_type::<TestBean>()
//!             .expose::<dyn RepoBeanInterface, _>(|bean| bean)
//!             .benchmark(Benchmark::on(["calculate"]))
//!             .build(),
//!     )
//!     .build();
//!
//! let container = SimpleIoC::new(config)?;
//! let repo = container.get::<dyn RepoBeanInterface>("repoBean")?;
//! repo.calculate();
//! ```

pub mod builder;
pub mod config;
pub mod container;
pub mod definition;
pub mod errors;
pub mod graph;
pub mod metrics;
pub mod naming;
pub mod proxy;
pub mod settings;
pub mod settings_loader;

pub use builder::SimpleIoCBuilder;
pub use config::{Config, RegistryConfig, RegistryConfigBuilder};
pub use container::{BeanContext, SimpleIoC};
pub use definition::{
    Bean, BeanDefinition, BeanDefinitionBuilder, BeanFactory, ExposedBeanBuilder, InitHook,
};
pub use errors::{ConfigurationError, IocError, IocResult};
pub use graph::DependencyGraph;
pub use metrics::{ContainerMetrics, ContainerStats};
pub use naming::bean_name_of;
pub use proxy::{
    Benchmark, BenchmarkProxy, Interceptable, RecordingTimingSink, TimingRecord, TimingSink,
    TracingTimingSink,
};
pub use settings::{ContainerSettings, SettingsBuilder};
pub use settings_loader::SettingsLoader;

use std::sync::Arc;

/// Основной API для создания контейнера
pub fn create_container<C: Config + 'static>(config: C) -> SimpleIoCBuilder {
    SimpleIoCBuilder::new(Arc::new(config))
}
