//! Источник описаний бинов.
//!
//! Контейнеру нужен только trait [`Config`]: упорядоченный список имён и
//! описание по имени. [`RegistryConfig`] хранит описания в памяти в порядке
//! регистрации.

use crate::definition::BeanDefinition;
use std::sync::Arc;

/// Capability, поставляющая имена и описания бинов
pub trait Config: Send + Sync {
    /// Все зарегистрированные имена в порядке регистрации
    fn bean_names(&self) -> Vec<String>;

    /// Описание бина; `None` если имя неизвестно
    fn definition(&self, name: &str) -> Option<BeanDefinition>;
}

impl<C: Config + ?Sized> Config for Arc<C> {
    fn bean_names(&self) -> Vec<String> {
        (**self).bean_names()
    }

    fn definition(&self, name: &str) -> Option<BeanDefinition> {
        (**self).definition(name)
    }
}

impl<C: Config + ?Sized> Config for Box<C> {
    fn bean_names(&self) -> Vec<String> {
        (**self).bean_names()
    }

    fn definition(&self, name: &str) -> Option<BeanDefinition> {
        (**self).definition(name)
    }
}

/// In-memory конфигурация бинов.
///
/// Дубликаты имён не отсекаются здесь: их отвергает контейнер при создании.
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    definitions: Vec<BeanDefinition>,
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> RegistryConfigBuilder {
        RegistryConfigBuilder::default()
    }

    pub fn register(&mut self, definition: BeanDefinition) -> &mut Self {
        self.definitions.push(definition);
        self
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn definitions(&self) -> &[BeanDefinition] {
        &self.definitions
    }
}

impl Config for RegistryConfig {
    fn bean_names(&self) -> Vec<String> {
        self.definitions
            .iter()
            .map(|definition| definition.name().to_string())
            .collect()
    }

    fn definition(&self, name: &str) -> Option<BeanDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.name() == name)
            .cloned()
    }
}

impl FromIterator<BeanDefinition> for RegistryConfig {
    fn from_iter<I: IntoIterator<Item = BeanDefinition>>(iter: I) -> Self {
        Self {
            definitions: iter.into_iter().collect(),
        }
    }
}

impl Extend<BeanDefinition> for RegistryConfig {
    fn extend<I: IntoIterator<Item = BeanDefinition>>(&mut self, iter: I) {
        self.definitions.extend(iter);
    }
}

/// Fluent builder для `RegistryConfig`
#[derive(Default)]
pub struct RegistryConfigBuilder {
    config: RegistryConfig,
}

impl RegistryConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bean(mut self, definition: BeanDefinition) -> Self {
        self.config.register(definition);
        self
    }

    pub fn beans<I>(mut self, definitions: I) -> Self
    where
        I: IntoIterator<Item = BeanDefinition>,
    {
        self.config.extend(definitions);
        self
    }

    pub fn build(self) -> RegistryConfig {
        self.config
    }
}
