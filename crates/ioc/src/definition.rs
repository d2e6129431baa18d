//! Описания бинов: имя, тип реализации, объявленные зависимости, маркер
//! `Benchmark` и фабрика.
//!
//! ПРИНЦИПЫ:
//! - Фабрика это замыкание `Fn(&BeanContext) -> anyhow::Result<T>`, без рефлексии
//! - Зависимости объявляются явно (`depends_on`) или по соглашению об именах
//!   (`depends_on_type::<T>()`)
//! - Бин можно выставить наружу через capability trait (`expose`), только
//!   такой бин можно обернуть в `BenchmarkProxy`

use crate::container::BeanContext;
use crate::errors::{IocError, IocResult};
use crate::naming::bean_name_of;
use crate::proxy::{Benchmark, BenchmarkProxy, Interceptable};
use anyhow::Result;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Экземпляр бина в кэше контейнера.
///
/// Внутри лежит `Arc<T>` для конкретного типа или `Arc<dyn Trait>` для бина,
/// выставленного через capability trait.
pub type Bean = Arc<dyn Any + Send + Sync>;

/// Фабрика пользовательского типа
pub type BeanFactory<T> = Box<dyn Fn(&BeanContext<'_>) -> Result<T> + Send + Sync>;

/// Init-хук, вызывается ровно один раз до публикации бина
pub type InitHook<T> = Box<dyn Fn(&T) -> Result<()> + Send + Sync>;

type ErasedFactory = dyn Fn(&BeanContext<'_>) -> IocResult<Instantiated> + Send + Sync;

/// Результат работы стёртой фабрики
pub(crate) struct Instantiated {
    pub(crate) bean: Bean,
    pub(crate) proxied: bool,
}

/// Неизменяемое описание бина
#[derive(Clone)]
pub struct BeanDefinition {
    name: String,
    type_name: &'static str,
    exposed_as: Option<&'static str>,
    dependencies: Vec<String>,
    benchmark: Benchmark,
    factory: Arc<ErasedFactory>,
}

impl BeanDefinition {
    /// Начать описание бина с фабрикой
    pub fn builder<T, F>(name: impl Into<String>, factory: F) -> BeanDefinitionBuilder<T>
    where
        T: Send + Sync + 'static,
        F: Fn(&BeanContext<'_>) -> Result<T> + Send + Sync + 'static,
    {
        BeanDefinitionBuilder {
            name: name.into(),
            dependencies: Vec::new(),
            factory: Box::new(factory),
            init: None,
        }
    }

    /// Бин без зависимостей, создаваемый через `Default`
    pub fn of_default<T>(name: impl Into<String>) -> BeanDefinitionBuilder<T>
    where
        T: Default + Send + Sync + 'static,
    {
        Self::builder(name, |_| Ok(T::default()))
    }

    /// Бин-копия готового значения
    pub fn instance<T>(name: impl Into<String>, value: T) -> BeanDefinitionBuilder<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        Self::builder(name, move |_| Ok(value.clone()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Полное имя типа реализации
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Имя capability trait'а, если бин выставлен через него
    pub fn exposed_as(&self) -> Option<&'static str> {
        self.exposed_as
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn benchmark(&self) -> &Benchmark {
        &self.benchmark
    }

    /// Хотя бы одна операция помечена для замера
    pub fn is_benchmarked(&self) -> bool {
        !self.benchmark.is_empty()
    }

    pub(crate) fn instantiate(&self, ctx: &BeanContext<'_>) -> IocResult<Instantiated> {
        (self.factory)(ctx)
    }
}

impl fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("exposed_as", &self.exposed_as)
            .field("dependencies", &self.dependencies)
            .field("benchmark", &self.benchmark)
            .finish()
    }
}

/// Builder для бина конкретного типа
pub struct BeanDefinitionBuilder<T> {
    name: String,
    dependencies: Vec<String>,
    factory: BeanFactory<T>,
    init: Option<InitHook<T>>,
}

impl<T> BeanDefinitionBuilder<T>
where
    T: Send + Sync + 'static,
{
    /// Объявить зависимость по имени бина
    pub fn depends_on(mut self, bean_name: impl Into<String>) -> Self {
        let bean_name = bean_name.into();
        if !self.dependencies.contains(&bean_name) {
            self.dependencies.push(bean_name);
        }
        self
    }

    /// Объявить зависимость по типу: `TestBean` -> `testBean`
    pub fn depends_on_type<D: ?Sized>(self) -> Self {
        self.depends_on(bean_name_of::<D>())
    }

    /// Init-хук (аналог метода `init`)
    pub fn init_with<H>(mut self, hook: H) -> Self
    where
        H: Fn(&T) -> Result<()> + Send + Sync + 'static,
    {
        self.init = Some(Box::new(hook));
        self
    }

    /// Выставить бин через capability trait `I`
    pub fn expose<I, U>(self, upcast: U) -> ExposedBeanBuilder<T, I>
    where
        I: ?Sized + Send + Sync + 'static,
        U: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    {
        ExposedBeanBuilder {
            inner: self,
            upcast: Box::new(upcast),
            benchmark: Benchmark::none(),
            intercept: None,
        }
    }

    /// Описание бина, который хранится как `Arc<T>`
    pub fn build(self) -> BeanDefinition {
        let BeanDefinitionBuilder {
            name,
            dependencies,
            factory,
            init,
        } = self;

        let erased = erase(move |ctx| {
            let bean = construct(ctx, &factory, init.as_ref())?;
            Ok(Instantiated {
                bean: Arc::new(Arc::new(bean)) as Bean,
                proxied: false,
            })
        });

        BeanDefinition {
            name,
            type_name: std::any::type_name::<T>(),
            exposed_as: None,
            dependencies,
            benchmark: Benchmark::none(),
            factory: erased,
        }
    }
}

/// Builder для бина, выставленного через capability trait `I`
pub struct ExposedBeanBuilder<T, I: ?Sized> {
    inner: BeanDefinitionBuilder<T>,
    upcast: Box<dyn Fn(Arc<T>) -> Arc<I> + Send + Sync>,
    benchmark: Benchmark,
    intercept: Option<fn(BenchmarkProxy<I>) -> Arc<I>>,
}

impl<T, I> ExposedBeanBuilder<T, I>
where
    T: Send + Sync + 'static,
    I: ?Sized + Send + Sync + 'static,
{
    pub fn depends_on(mut self, bean_name: impl Into<String>) -> Self {
        self.inner = self.inner.depends_on(bean_name);
        self
    }

    pub fn depends_on_type<D: ?Sized>(mut self) -> Self {
        self.inner = self.inner.depends_on_type::<D>();
        self
    }

    pub fn init_with<H>(mut self, hook: H) -> Self
    where
        H: Fn(&T) -> Result<()> + Send + Sync + 'static,
    {
        self.inner = self.inner.init_with(hook);
        self
    }

    pub fn build(self) -> BeanDefinition {
        let ExposedBeanBuilder {
            inner,
            upcast,
            benchmark,
            intercept,
        } = self;
        let BeanDefinitionBuilder {
            name,
            dependencies,
            factory,
            init,
        } = inner;

        let marks = Arc::new(benchmark.clone());
        let erased = erase(move |ctx| {
            let bean = construct(ctx, &factory, init.as_ref())?;
            let exposed = upcast(Arc::new(bean));

            let (exposed, proxied) = match intercept {
                Some(intercept) if !marks.is_empty() && ctx.benchmark_enabled() => {
                    let proxy = BenchmarkProxy::new(
                        exposed,
                        ctx.bean_name(),
                        marks.clone(),
                        ctx.timing_sink(),
                    );
                    (intercept(proxy), true)
                }
                _ => (exposed, false),
            };

            Ok(Instantiated {
                bean: Arc::new(exposed) as Bean,
                proxied,
            })
        });

        BeanDefinition {
            name,
            type_name: std::any::type_name::<T>(),
            exposed_as: Some(std::any::type_name::<I>()),
            dependencies,
            benchmark,
            factory: erased,
        }
    }
}

impl<T, I> ExposedBeanBuilder<T, I>
where
    T: Send + Sync + 'static,
    I: ?Sized + Interceptable,
{
    /// Пометить операции для замера времени.
    ///
    /// Операции, которых нет у capability, отбрасываются; бин оборачивается
    /// в `BenchmarkProxy`, только если осталась хотя бы одна помеченная.
    pub fn benchmark(mut self, benchmark: Benchmark) -> Self {
        let known = I::operations();
        let (marked, unknown): (Vec<_>, Vec<_>) = benchmark
            .operations()
            .partition(|operation| known.contains(operation));

        for operation in unknown {
            warn!(
                bean = %self.inner.name,
                operation = operation,
                "Benchmark marker names an operation the capability does not have"
            );
        }

        self.benchmark = Benchmark::on(marked);
        self.intercept = if self.benchmark.is_empty() {
            None
        } else {
            Some(I::intercept)
        };
        self
    }
}

fn erase<F>(factory: F) -> Arc<ErasedFactory>
where
    F: Fn(&BeanContext<'_>) -> IocResult<Instantiated> + Send + Sync + 'static,
{
    Arc::new(factory)
}

fn construct<T>(
    ctx: &BeanContext<'_>,
    factory: &BeanFactory<T>,
    init: Option<&InitHook<T>>,
) -> IocResult<T> {
    let bean = factory(ctx).map_err(|source| IocError::instantiation(ctx.bean_name(), source))?;

    if let Some(init) = init {
        init(&bean).map_err(|source| IocError::initialization(ctx.bean_name(), source))?;
    }

    Ok(bean)
}
