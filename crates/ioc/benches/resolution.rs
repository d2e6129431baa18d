use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ioc::{
    BeanDefinition, Benchmark, ContainerSettings, RegistryConfig, SimpleIoC, TimingRecord,
    TimingSink,
};
use std::sync::Arc;

// Performance benchmarks для IoC контейнера
// Измеряет: cached resolution, first resolution цепочки зависимостей, overhead прокси

#[derive(Default)]
struct LightweightService {
    id: u64,
}

struct ChainLink {
    #[allow(dead_code)]
    next: Option<Arc<ChainLink>>,
}

pub trait Calculator: Send + Sync {
    fn calculate(&self) -> f64;
}

ioc::benchmark_proxy! {
    impl Calculator {
        fn calculate(&self) -> f64;
    }
}

struct TrigCalculator;

impl Calculator for TrigCalculator {
    fn calculate(&self) -> f64 {
        let mut sum = 0.0_f64;
        for _ in 0..100 {
            let x = sum;
            sum += x.sin() * x.sin() + x.cos() * x.cos();
        }
        sum
    }
}

/// Цепочка link0 -> link1 -> ... -> link{len-1}
fn chain_config(len: usize) -> RegistryConfig {
    let mut config = RegistryConfig::new();

    for i in 0..len {
        let next = (i + 1 < len).then(|| format!("link{}", i + 1));
        let target = next.clone();
        let mut definition = BeanDefinition::builder(format!("link{i}"), move |ctx| {
            let next = match &target {
                Some(name) => Some(ctx.get::<ChainLink>(name)?),
                None => None,
            };
            Ok(ChainLink { next })
        });
        if let Some(next) = next {
            definition = definition.depends_on(next);
        }
        config.register(definition.build());
    }

    config
}

fn calculator_config(benchmark: Benchmark) -> RegistryConfig {
    RegistryConfig::builder()
        .bean(
            BeanDefinition::builder("calculator", |_| Ok(TrigCalculator))
                .expose::<dyn Calculator, _>(|bean| bean as Arc<dyn Calculator>)
                .benchmark(benchmark)
                .build(),
        )
        .build()
}

fn bench_cached_resolution(c: &mut Criterion) {
    let config = RegistryConfig::builder()
        .bean(BeanDefinition::builder("service", |_| Ok(LightweightService { id: 1 })).build())
        .build();
    let container = SimpleIoC::new(config).expect("container");
    container.get_bean("service").expect("service");

    c.bench_function("cached_get_bean", |b| {
        b.iter(|| black_box(container.get_bean(black_box("service")).expect("service")))
    });

    c.bench_function("cached_typed_get", |b| {
        b.iter(|| {
            let service = container
                .get::<LightweightService>(black_box("service"))
                .expect("service");
            black_box(service.id)
        })
    });
}

fn bench_first_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_resolution_chain");

    for len in [1usize, 8, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            b.iter_with_setup(
                || SimpleIoC::new(chain_config(len)).expect("container"),
                |container| black_box(container.get_bean("link0").expect("chain")),
            )
        });
    }

    group.finish();
}

// Замер есть, запись отбрасывается: в цикле измеряется только прокси
struct NoopTimingSink;

impl TimingSink for NoopTimingSink {
    fn record(&self, _record: TimingRecord) {}
}

fn bench_proxy_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("proxy_overhead");

    let plain = SimpleIoC::new(calculator_config(Benchmark::none())).expect("container");
    let proxied = SimpleIoC::builder(calculator_config(Benchmark::on(["calculate"])))
        .timing_sink(Arc::new(NoopTimingSink))
        .build()
        .expect("container");
    let disabled = SimpleIoC::with_settings(
        calculator_config(Benchmark::on(["calculate"])),
        ContainerSettings::minimal(),
    )
    .expect("container");

    for (name, container) in [("plain", &plain), ("proxied", &proxied), ("disabled", &disabled)] {
        let calculator = container
            .get::<dyn Calculator>("calculator")
            .expect("calculator");

        group.bench_function(name, |b| {
            b.iter(|| black_box(calculator.calculate()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cached_resolution,
    bench_first_resolution,
    bench_proxy_overhead
);
criterion_main!(benches);
