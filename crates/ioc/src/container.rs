//! IoC контейнер: разрешение бинов по имени
//!
//! АРХИТЕКТУРНЫЕ РЕШЕНИЯ:
//! - `Arc<dyn Any>` для type-erased хранения синглтонов по имени бина
//! - Быстрый путь под read lock, создание под единым reentrant mutex
//!   (double-check: два одновременных первых запроса дают один экземпляр)
//! - Путь разрешения хранится под тем же mutex'ом, повтор имени на пути это цикл
//! - Ошибки не проглатываются: вызывающий `get_bean` получает `IocError`

use parking_lot::{ReentrantMutex, RwLock};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::builder::SimpleIoCBuilder;
use crate::config::Config;
use crate::definition::{Bean, BeanDefinition};
use crate::errors::{ConfigurationError, IocError, IocResult};
use crate::graph::DependencyGraph;
use crate::metrics::{ContainerMetrics, ContainerStats};
use crate::naming::bean_name_of;
use crate::proxy::TimingSink;
use crate::settings::ContainerSettings;

/// @component: {"k":"C","id":"simple_ioc","t":"Name-based singleton IoC container","m":{"cur":100,"tgt":100,"u":"%"},"f":["ioc","singleton","benchmark"]}
pub struct SimpleIoC {
    config: Arc<dyn Config>,
    /// Имена из конфигурации (конфигурация read-only)
    registered: HashSet<String>,
    /// Кэш синглтонов: записи только добавляются
    beans: RwLock<HashMap<String, Bean>>,
    /// Бины, создаваемые в данный момент, в порядке вложенности
    creation: ReentrantMutex<RefCell<Vec<String>>>,
    settings: ContainerSettings,
    timing_sink: Arc<dyn TimingSink>,
    metrics: ContainerMetrics,
}

impl SimpleIoC {
    /// Создать контейнер с настройками по умолчанию
    pub fn new<C: Config + 'static>(config: C) -> IocResult<Self> {
        Self::builder(config).build()
    }

    pub fn with_settings<C: Config + 'static>(
        config: C,
        settings: ContainerSettings,
    ) -> IocResult<Self> {
        Self::builder(config).settings(settings).build()
    }

    pub fn builder<C: Config + 'static>(config: C) -> SimpleIoCBuilder {
        SimpleIoCBuilder::new(Arc::new(config))
    }

    pub(crate) fn create(
        config: Arc<dyn Config>,
        settings: ContainerSettings,
        timing_sink: Arc<dyn TimingSink>,
    ) -> IocResult<Self> {
        settings.validate()?;

        let names = config.bean_names();
        let duplicates = duplicated_names(&names);
        if !duplicates.is_empty() {
            warn!("Duplicate bean names in configuration: {:?}", duplicates);
            return Err(ConfigurationError::DuplicateBeanNames { names: duplicates }.into());
        }

        let container = Self {
            registered: names.iter().cloned().collect(),
            config,
            beans: RwLock::new(HashMap::with_capacity(names.len())),
            creation: ReentrantMutex::new(RefCell::new(Vec::new())),
            settings,
            timing_sink,
            metrics: ContainerMetrics::new(),
        };

        if container.settings.validate_on_start {
            container.validate()?;
        }

        if container.settings.eager_init {
            container.preinstantiate()?;
        }

        info!(
            beans = names.len(),
            eager = container.settings.eager_init,
            "IoC container initialized"
        );
        Ok(container)
    }

    /// Имена бинов в порядке конфигурации
    pub fn bean_definitions(&self) -> Vec<String> {
        self.config.bean_names()
    }

    /// Получить бин по имени, создав его при первом запросе
    pub fn get_bean(&self, name: &str) -> IocResult<Bean> {
        self.resolve(name, None)
    }

    /// Получить бин как `Arc<T>` (`T` может быть `dyn Trait`)
    pub fn get<T>(&self, name: &str) -> IocResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let bean = self.get_bean(name)?;
        downcast::<T>(name, &bean)
    }

    /// Имя зарегистрировано в конфигурации
    pub fn contains_bean(&self, name: &str) -> bool {
        self.registered.contains(name)
    }

    /// Бин уже создан и лежит в кэше
    pub fn is_instantiated(&self, name: &str) -> bool {
        self.beans.read().contains_key(name)
    }

    /// Созданные бины в порядке конфигурации
    pub fn instantiated_beans(&self) -> Vec<String> {
        let beans = self.beans.read();
        self.config
            .bean_names()
            .into_iter()
            .filter(|name| beans.contains_key(name))
            .collect()
    }

    /// Создать все бины в порядке конфигурации
    pub fn preinstantiate(&self) -> IocResult<()> {
        for name in self.config.bean_names() {
            self.get_bean(&name)?;
        }
        Ok(())
    }

    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::from_config(self.config.as_ref())
    }

    /// Проверить объявленные зависимости: неизвестные имена и циклы
    pub fn validate(&self) -> IocResult<()> {
        self.dependency_graph().validate()
    }

    pub fn stats(&self) -> ContainerStats {
        let cached = self.beans.read().len() as u64;
        self.metrics.snapshot(self.registered.len() as u64, cached)
    }

    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    pub fn timing_sink(&self) -> Arc<dyn TimingSink> {
        self.timing_sink.clone()
    }

    fn resolve(&self, name: &str, requested_by: Option<&str>) -> IocResult<Bean> {
        self.metrics.record_resolution();

        // Быстрый путь: бин уже создан
        if let Some(bean) = self.cached(name) {
            self.metrics.record_cache_hit();
            return Ok(bean);
        }

        let result = self.resolve_slow(name, requested_by);

        // Ошибка зависимости поднимается до точки входа: считаем ее один раз
        if let (Err(err), None) = (&result, requested_by) {
            self.metrics.record_error();
            warn!(bean = name, error = %err, "Bean resolution failed");
        }
        result
    }

    fn resolve_slow(&self, name: &str, requested_by: Option<&str>) -> IocResult<Bean> {
        if !self.registered.contains(name) {
            self.metrics.record_cache_miss();
            return Err(match requested_by {
                Some(bean) => IocError::UnknownDependency {
                    bean: bean.to_string(),
                    dependency: name.to_string(),
                },
                None => IocError::UnknownBean {
                    name: name.to_string(),
                },
            });
        }

        let creation = self.creation.lock();

        // Double-check: другой поток мог создать бин, пока мы ждали lock
        if let Some(bean) = self.cached(name) {
            self.metrics.record_cache_hit();
            return Ok(bean);
        }
        self.metrics.record_cache_miss();

        let _entered = self.enter(&creation, name)?;
        let bean = self.instantiate(name)?;

        self.beans.write().insert(name.to_string(), bean.clone());
        Ok(bean)
    }

    fn enter<'p>(&self, path: &'p RefCell<Vec<String>>, name: &str) -> IocResult<PathGuard<'p>> {
        let mut in_flight = path.borrow_mut();

        if let Some(start) = in_flight.iter().position(|bean| bean == name) {
            let mut cycle = in_flight[start..].to_vec();
            cycle.push(name.to_string());
            return Err(IocError::CircularDependency { path: cycle });
        }

        if in_flight.len() >= self.settings.max_resolution_depth {
            return Err(IocError::ResolutionDepthExceeded {
                bean: name.to_string(),
                depth: self.settings.max_resolution_depth,
            });
        }

        in_flight.push(name.to_string());
        Ok(PathGuard { path })
    }

    fn instantiate(&self, name: &str) -> IocResult<Bean> {
        let definition = self
            .config
            .definition(name)
            .ok_or_else(|| IocError::MissingDefinition {
                name: name.to_string(),
            })?;

        for dependency in definition.dependencies() {
            self.resolve(dependency, Some(name))?;
        }

        let started = Instant::now();
        let ctx = BeanContext {
            container: self,
            bean_name: name,
        };
        let instantiated = definition.instantiate(&ctx)?;

        self.metrics.record_creation(instantiated.proxied);
        self.log_creation(&definition, instantiated.proxied, started.elapsed());

        Ok(instantiated.bean)
    }

    fn cached(&self, name: &str) -> Option<Bean> {
        self.beans.read().get(name).cloned()
    }

    fn log_creation(&self, definition: &BeanDefinition, proxied: bool, elapsed: Duration) {
        let elapsed_us = elapsed.as_micros() as u64;

        if self.settings.debug_logging {
            info!(
                bean = definition.name(),
                type_name = definition.type_name(),
                proxied,
                elapsed_us,
                "Bean created"
            );
        } else {
            debug!(
                bean = definition.name(),
                type_name = definition.type_name(),
                proxied,
                elapsed_us,
                "Bean created"
            );
        }
    }
}

impl std::fmt::Debug for SimpleIoC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleIoC")
            .field("beans", &self.config.bean_names())
            .field("instantiated", &self.instantiated_beans())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Снимает бин с пути разрешения, в том числе при панике фабрики
struct PathGuard<'p> {
    path: &'p RefCell<Vec<String>>,
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        self.path.borrow_mut().pop();
    }
}

/// Доступ фабрики к контейнеру во время создания бина
pub struct BeanContext<'a> {
    container: &'a SimpleIoC,
    bean_name: &'a str,
}

impl<'a> BeanContext<'a> {
    /// Имя создаваемого бина
    pub fn bean_name(&self) -> &'a str {
        self.bean_name
    }

    /// Зависимость по имени
    pub fn get<T>(&self, name: &str) -> IocResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let bean = self.get_bean(name)?;
        downcast::<T>(name, &bean)
    }

    pub fn get_bean(&self, name: &str) -> IocResult<Bean> {
        self.container.resolve(name, Some(self.bean_name))
    }

    /// Зависимость по соглашению об именах: `TestBean` -> `testBean`
    pub fn inject<T>(&self) -> IocResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get::<T>(&bean_name_of::<T>())
    }

    pub(crate) fn benchmark_enabled(&self) -> bool {
        self.container.settings.benchmark_enabled
    }

    pub(crate) fn timing_sink(&self) -> Arc<dyn TimingSink> {
        self.container.timing_sink.clone()
    }
}

fn downcast<T>(name: &str, bean: &Bean) -> IocResult<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    (**bean)
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or_else(|| IocError::TypeMismatch {
            bean: name.to_string(),
            expected: std::any::type_name::<T>(),
        })
}

/// Повторяющиеся имена, каждое один раз, в порядке первого появления
fn duplicated_names(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for name in names {
        if !seen.insert(name.as_str()) && !duplicates.contains(name) {
            duplicates.push(name.clone());
        }
    }

    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct TestService {
        value: i32,
    }

    #[derive(Debug)]
    struct DependentService {
        test_service: Arc<TestService>,
        value: i32,
    }

    fn config() -> RegistryConfig {
        RegistryConfig::builder()
            .bean(BeanDefinition::builder("testService", |_| Ok(TestService { value: 42 })).build())
            .bean(
                BeanDefinition::builder("dependentService", |ctx| {
                    let test_service = ctx.get::<TestService>("testService")?;
                    Ok(DependentService {
                        value: test_service.value * 2,
                        test_service,
                    })
                })
                .depends_on("testService")
                .build(),
            )
            .build()
    }

    #[test]
    fn test_singleton_lifecycle() {
        let container = SimpleIoC::new(config()).unwrap();

        let service1 = container.get::<TestService>("testService").unwrap();
        let service2 = container.get::<TestService>("testService").unwrap();

        assert_eq!(service1.value, 42);
        assert!(Arc::ptr_eq(&service1, &service2));
    }

    #[test]
    fn test_dependency_injection() {
        let container = SimpleIoC::new(config()).unwrap();

        let dependent = container.get::<DependentService>("dependentService").unwrap();
        assert_eq!(dependent.value, 84);

        let shared = container.get::<TestService>("testService").unwrap();
        assert!(Arc::ptr_eq(&dependent.test_service, &shared));
    }

    #[test]
    fn test_lazy_creation() {
        let container = SimpleIoC::new(config()).unwrap();
        assert!(container.instantiated_beans().is_empty());

        container.get_bean("dependentService").unwrap();
        assert_eq!(
            container.instantiated_beans(),
            vec!["testService", "dependentService"]
        );
        assert!(container.is_instantiated("testService"));
    }

    #[test]
    fn test_unregistered_bean() {
        let container = SimpleIoC::new(config()).unwrap();

        let err = container.get_bean("missing").unwrap_err();
        assert!(matches!(err, IocError::UnknownBean { ref name } if name == "missing"));
        assert!(!container.contains_bean("missing"));
    }

    #[test]
    fn test_type_mismatch() {
        let container = SimpleIoC::new(config()).unwrap();

        let err = container.get::<DependentService>("testService").unwrap_err();
        assert!(matches!(err, IocError::TypeMismatch { ref bean, .. } if bean == "testService"));
    }

    #[test]
    fn test_factory_error_handling() {
        let config = RegistryConfig::builder()
            .bean(
                BeanDefinition::builder("broken", |_| -> anyhow::Result<TestService> {
                    Err(anyhow!("Factory failed"))
                })
                .build(),
            )
            .build();
        let container = SimpleIoC::new(config).unwrap();

        let err = container.get_bean("broken").unwrap_err();
        assert_eq!(err.bean_name(), Some("broken"));
        assert!(err.to_string().contains("Factory failed"));
        assert!(!container.is_instantiated("broken"));
        assert_eq!(container.stats().failed_resolutions, 1);
    }

    #[test]
    fn test_failed_bean_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let config = RegistryConfig::builder()
            .bean(
                BeanDefinition::builder("flaky", move |_| {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(anyhow!("first attempt fails"))
                    } else {
                        Ok(TestService::default())
                    }
                })
                .build(),
            )
            .build();
        let container = SimpleIoC::new(config).unwrap();

        assert!(container.get_bean("flaky").is_err());
        assert!(container.get_bean("flaky").is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_resolution_depth_limit() {
        let mut config = RegistryConfig::new();
        for i in 0..5 {
            let mut definition = BeanDefinition::of_default::<TestService>(format!("bean{i}"));
            if i < 4 {
                definition = definition.depends_on(format!("bean{}", i + 1));
            }
            config.register(definition.build());
        }

        let settings = ContainerSettings::builder().max_resolution_depth(3).build();
        let container = SimpleIoC::with_settings(config, settings).unwrap();

        let err = container.get_bean("bean0").unwrap_err();
        assert!(matches!(err, IocError::ResolutionDepthExceeded { depth: 3, .. }));

        // Глубина считается от точки входа
        assert!(container.get_bean("bean2").is_ok());
    }

    #[test]
    fn test_duplicated_names() {
        let names: Vec<String> = ["a", "b", "a", "c", "b", "a"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(duplicated_names(&names), vec!["a", "b"]);
        assert!(duplicated_names(&[]).is_empty());
    }

    #[test]
    fn test_stats() {
        let container = SimpleIoC::new(config()).unwrap();
        container.get_bean("dependentService").unwrap();
        container.get_bean("dependentService").unwrap();

        let stats = container.stats();
        assert_eq!(stats.registered_beans, 2);
        assert_eq!(stats.cached_beans, 2);
        assert_eq!(stats.beans_created, 2);
        assert_eq!(stats.proxies_created, 0);
        assert!(stats.cache_hits >= 1);
    }
}
