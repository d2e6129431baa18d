//! Test fixtures
//!
//! Shared functionality для integration tests:
//! - Test beans (TestBean, TestBeanWithDependency, RepoBean)
//! - Конфигурации с счетчиками создания и init
//! - Инициализация логирования один раз на бинарник
//! - Перехват сообщений tracing для проверки логов

#![allow(dead_code)]

use anyhow::Result;
use ioc::{BeanDefinition, Benchmark, Config, RegistryConfig};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tracing::field::{Field, Visit};
use tracing::{info, Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

static INIT: Once = Once::new();

/// Логирование для тестов (RUST_LOG имеет приоритет)
pub fn init_test_logging() {
    INIT.call_once(|| {
        // Другой тест мог уже установить subscriber
        let _ = common::init_structured_logging(common::LoggingConfig::test());
    });
}

/// Layer, складывающий текст сообщений в общий буфер
struct CaptureLayer {
    messages: Arc<Mutex<Vec<String>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if let Some(message) = visitor.message {
            self.messages.lock().push(message);
        }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }
}

/// Выполнить `f` с перехватом логов текущего потока, вернуть сообщения
pub fn capture_logs<F: FnOnce()>(f: F) -> Vec<String> {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        messages: messages.clone(),
    });

    tracing::subscriber::with_default(subscriber, f);

    let captured = messages.lock().clone();
    captured
}

#[derive(Debug, Default)]
pub struct TestBean;

#[derive(Debug)]
pub struct TestBeanWithDependency {
    pub test_bean: Arc<TestBean>,
}

pub trait RepoBeanInterface: Send + Sync {
    fn calculate(&self) -> f64;
    fn describe(&self) -> String;
}

ioc::benchmark_proxy! {
    impl RepoBeanInterface {
        fn calculate(&self) -> f64;
        fn describe(&self) -> String;
    }
}

/// Сколько раз создавались и инициализировались бины одной конфигурации
#[derive(Debug, Default)]
pub struct Counters {
    pub created: AtomicUsize,
    pub initialized: AtomicUsize,
}

impl Counters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn initialized(&self) -> usize {
        self.initialized.load(Ordering::SeqCst)
    }
}

pub struct RepoBean {
    counters: Arc<Counters>,
}

impl RepoBean {
    pub fn new(counters: Arc<Counters>) -> Self {
        counters.created.fetch_add(1, Ordering::SeqCst);
        info!("Created");
        Self { counters }
    }

    pub fn init(&self) -> Result<()> {
        self.counters.initialized.fetch_add(1, Ordering::SeqCst);
        info!("Init is called");
        Ok(())
    }
}

impl RepoBeanInterface for RepoBean {
    fn calculate(&self) -> f64 {
        let mut sum = 0.0_f64;
        for _ in 0..100 {
            let x = sum;
            sum += x.sin() * x.sin() + x.cos() * x.cos();
        }
        sum
    }

    fn describe(&self) -> String {
        "repository bean".to_string()
    }
}

/// `repoBean`, выставленный через `RepoBeanInterface`, с init-хуком
pub fn repo_bean_definition(counters: Arc<Counters>, benchmark: Benchmark) -> BeanDefinition {
    BeanDefinition::builder("repoBean", move |_| Ok(RepoBean::new(counters.clone())))
        .init_with(RepoBean::init)
        .expose::<dyn RepoBeanInterface, _>(|bean| bean as Arc<dyn RepoBeanInterface>)
        .benchmark(benchmark)
        .build()
}

/// `testBean` и зависящий от него `dependentBean`
pub fn dependency_config() -> RegistryConfig {
    RegistryConfig::builder()
        .bean(BeanDefinition::of_default::<TestBean>("testBean").build())
        .bean(
            BeanDefinition::builder("dependentBean", |ctx| {
                Ok(TestBeanWithDependency {
                    test_bean: ctx.inject::<TestBean>()?,
                })
            })
            .depends_on_type::<TestBean>()
            .build(),
        )
        .build()
}

/// Конфигурация, отдающая одно и то же описание для любого имени
pub struct StaticConfig {
    names: Vec<String>,
    definition: Option<BeanDefinition>,
}

impl StaticConfig {
    pub fn new(names: &[&str], definition: Option<BeanDefinition>) -> Self {
        Self {
            names: names.iter().map(|name| name.to_string()).collect(),
            definition,
        }
    }
}

impl Config for StaticConfig {
    fn bean_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn definition(&self, _name: &str) -> Option<BeanDefinition> {
        self.definition.clone()
    }
}
