//! Benchmark interception: маркер `Benchmark`, декоратор `BenchmarkProxy`
//! и приёмники замеров времени.
//!
//! Прокси реализует тот же trait, что и обёрнутый бин, поэтому вызывающий код
//! не видит разницы, кроме записей о времени выполнения помеченных операций.
//! Реализация trait'а для прокси генерируется макросом [`benchmark_proxy!`].

use common::OperationTimer;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Маркер: набор операций, время выполнения которых нужно замерять
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Benchmark {
    operations: BTreeSet<&'static str>,
}

impl Benchmark {
    /// Пометить перечисленные операции
    pub fn on<I>(operations: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self {
            operations: operations.into_iter().collect(),
        }
    }

    /// Ни одна операция не помечена
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_marked(&self, operation: &str) -> bool {
        self.operations.contains(operation)
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.operations.iter().copied()
    }
}

/// Один замер помеченной операции
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingRecord {
    pub bean: String,
    pub operation: &'static str,
    pub elapsed: Duration,
}

impl TimingRecord {
    pub fn elapsed_micros(&self) -> u64 {
        self.elapsed.as_micros() as u64
    }
}

/// Приёмник замеров (логгер, метрики, тестовый буфер)
pub trait TimingSink: Send + Sync {
    fn record(&self, record: TimingRecord);
}

/// Приёмник по умолчанию: одна строка лога на каждый замер
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTimingSink;

impl TimingSink for TracingTimingSink {
    fn record(&self, record: TimingRecord) {
        let elapsed_us = record.elapsed_micros();
        info!(
            bean = %record.bean,
            operation = record.operation,
            elapsed_us = elapsed_us,
            "Method call was finished in {} microseconds",
            elapsed_us
        );
    }
}

/// Накапливает замеры в памяти
#[derive(Debug, Default)]
pub struct RecordingTimingSink {
    records: Mutex<Vec<TimingRecord>>,
}

impl RecordingTimingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TimingRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Количество замеров конкретной операции
    pub fn count_for(&self, operation: &str) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|record| record.operation == operation)
            .count()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl TimingSink for RecordingTimingSink {
    fn record(&self, record: TimingRecord) {
        self.records.lock().push(record);
    }
}

/// Capability trait, который контейнер умеет оборачивать в `BenchmarkProxy`.
///
/// Реализуется для `dyn Trait` макросом [`benchmark_proxy!`].
pub trait Interceptable: Send + Sync + 'static {
    /// Операции, которые прокси делегирует
    fn operations() -> &'static [&'static str];

    fn intercept(proxy: BenchmarkProxy<Self>) -> Arc<Self>;
}

/// Декоратор, замеряющий время помеченных операций
pub struct BenchmarkProxy<I: ?Sized> {
    target: Arc<I>,
    bean: Arc<str>,
    benchmark: Arc<Benchmark>,
    sink: Arc<dyn TimingSink>,
}

impl<I: ?Sized> BenchmarkProxy<I> {
    pub fn new(
        target: Arc<I>,
        bean: impl Into<Arc<str>>,
        benchmark: Arc<Benchmark>,
        sink: Arc<dyn TimingSink>,
    ) -> Self {
        Self {
            target,
            bean: bean.into(),
            benchmark,
            sink,
        }
    }

    /// Реальный экземпляр за прокси
    pub fn target(&self) -> &Arc<I> {
        &self.target
    }

    pub fn bean_name(&self) -> &str {
        &self.bean
    }

    pub fn is_benchmarked(&self, operation: &str) -> bool {
        self.benchmark.is_marked(operation)
    }

    /// Вызвать операцию реального экземпляра.
    ///
    /// Результат (в том числе `Err`) возвращается без изменений; для
    /// помеченной операции после завершения вызова в sink уходит один замер.
    pub fn invoke<R>(&self, operation: &'static str, call: impl FnOnce(&I) -> R) -> R {
        if !self.benchmark.is_marked(operation) {
            return call(&self.target);
        }

        let timer = OperationTimer::new(operation);
        let result = call(&self.target);
        let elapsed = timer.finish();

        self.sink.record(TimingRecord {
            bean: self.bean.to_string(),
            operation,
            elapsed,
        });

        result
    }
}

impl<I: ?Sized> fmt::Debug for BenchmarkProxy<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchmarkProxy")
            .field("bean", &self.bean)
            .field("benchmark", &self.benchmark)
            .finish()
    }
}

/// Генерирует делегирующую реализацию capability trait'а для
/// `BenchmarkProxy<dyn Trait>` и `Interceptable` для `dyn Trait`.
///
/// Trait должен иметь `Send + Sync` в supertraits, методы принимают `&self`
/// и возвращают owned значения.
///
/// ```rust,ignore
/// pub trait Calculator: Send + Sync {
///     fn calculate(&self) -> f64;
///     fn scale(&self, factor: f64) -> f64;
/// }
///
/// ioc::benchmark_proxy! {
///     impl Calculator {
///         fn calculate(&self) -> f64;
///         fn scale(&self, factor: f64) -> f64;
///     }
/// }
/// ```
#[macro_export]
macro_rules! benchmark_proxy {
    (impl $capability:ident { $( fn $method:ident(&self $(, $arg:ident : $ty:ty)*) $(-> $ret:ty)?; )* }) => {
        impl $capability for $crate::BenchmarkProxy<dyn $capability> {
            $(
                fn $method(&self $(, $arg: $ty)*) $(-> $ret)? {
                    self.invoke(stringify!($method), |target| target.$method($($arg),*))
                }
            )*
        }

        impl $crate::Interceptable for dyn $capability {
            fn operations() -> &'static [&'static str] {
                &[$(stringify!($method)),*]
            }

            fn intercept(
                proxy: $crate::BenchmarkProxy<Self>,
            ) -> ::std::sync::Arc<Self> {
                ::std::sync::Arc::new(proxy)
            }
        }
    };
}
