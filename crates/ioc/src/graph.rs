use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::{IocError, IocResult};

/// Граф объявленных зависимостей между бинами.
///
/// Строится по `dependencies()` описаний из `Config`. Зависимости, которые
/// фабрика запрашивает через `BeanContext` без объявления, сюда не попадают:
/// их циклы ловит контейнер во время разрешения.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Бины в порядке регистрации
    nodes: Vec<String>,
    /// Отношения зависимостей: бин -> бины, от которых он зависит
    dependencies: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Построить граф по конфигурации
    pub fn from_config(config: &dyn Config) -> Self {
        let mut graph = Self::new();

        for name in config.bean_names() {
            let dependencies = config
                .definition(&name)
                .map(|definition| definition.dependencies().to_vec())
                .unwrap_or_default();

            graph.add_bean(&name);
            for dependency in dependencies {
                graph.add_dependency(&name, &dependency);
            }
        }

        graph
    }

    pub fn add_bean(&mut self, name: &str) {
        if !self.dependencies.contains_key(name) {
            self.nodes.push(name.to_string());
            self.dependencies.insert(name.to_string(), Vec::new());
        }
    }

    /// Добавить зависимость: dependent зависит от dependency
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) {
        self.add_bean(dependent);

        let edges = self.dependencies.entry(dependent.to_string()).or_default();
        if !edges.iter().any(|edge| edge == dependency) {
            edges.push(dependency.to_string());
        }

        debug!("Added dependency: {} -> {}", dependent, dependency);
    }

    pub fn get_dependencies(&self, name: &str) -> Option<&[String]> {
        self.dependencies.get(name).map(Vec::as_slice)
    }

    pub fn has_dependency(&self, dependent: &str, dependency: &str) -> bool {
        self.dependencies
            .get(dependent)
            .map(|deps| deps.iter().any(|dep| dep == dependency))
            .unwrap_or(false)
    }

    /// Пары (бин, зависимость), где зависимость не зарегистрирована
    pub fn unknown_dependencies(&self) -> Vec<(String, String)> {
        let mut unknown = Vec::new();

        for node in &self.nodes {
            for dependency in &self.dependencies[node] {
                if !self.dependencies.contains_key(dependency) {
                    unknown.push((node.clone(), dependency.clone()));
                }
            }
        }

        unknown
    }

    /// Найти все циклы в графе зависимостей.
    ///
    /// Каждый цикл заканчивается повтором первого бина: `a -> b -> a`.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut path = Vec::new();

        for node in &self.nodes {
            if !visited.contains(node.as_str()) {
                self.dfs_find_cycles(node, &mut visited, &mut rec_stack, &mut path, &mut cycles);
            }
        }

        cycles
    }

    fn dfs_find_cycles<'a>(
        &'a self,
        node: &'a str,
        visited: &mut HashSet<&'a str>,
        rec_stack: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        visited.insert(node);
        rec_stack.insert(node);
        path.push(node);

        if let Some(deps) = self.dependencies.get(node) {
            for neighbor in deps {
                let neighbor = neighbor.as_str();
                if !self.dependencies.contains_key(neighbor) {
                    continue;
                }

                if !visited.contains(neighbor) {
                    self.dfs_find_cycles(neighbor, visited, rec_stack, path, cycles);
                } else if rec_stack.contains(neighbor) {
                    // Найден цикл - извлекаем путь от neighbor до конца
                    if let Some(cycle_start) = path.iter().position(|&x| x == neighbor) {
                        let mut cycle: Vec<String> =
                            path[cycle_start..].iter().map(|s| s.to_string()).collect();
                        cycle.push(neighbor.to_string());
                        cycles.push(cycle);
                    }
                }
            }
        }

        rec_stack.remove(node);
        path.pop();
    }

    /// Порядок создания: зависимости раньше зависимых (алгоритм Кана)
    pub fn topological_order(&self) -> IocResult<Vec<String>> {
        let mut in_degree: HashMap<&str, usize> = self
            .nodes
            .iter()
            .map(|node| (node.as_str(), 0))
            .collect();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

        for node in &self.nodes {
            for dependency in &self.dependencies[node] {
                if self.dependencies.contains_key(dependency) {
                    *in_degree.entry(node.as_str()).or_insert(0) += 1;
                    dependents
                        .entry(dependency.as_str())
                        .or_default()
                        .push(node.as_str());
                }
            }
        }

        let mut queue: VecDeque<&str> = self
            .nodes
            .iter()
            .map(String::as_str)
            .filter(|node| in_degree[node] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(node) = queue.pop_front() {
            order.push(node.to_string());

            for &dependent in dependents.get(node).map(Vec::as_slice).unwrap_or(&[]) {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            let path = self.find_cycles().into_iter().next().unwrap_or_default();
            return Err(IocError::CircularDependency { path });
        }

        Ok(order)
    }

    /// Первая найденная проблема графа как `IocError`
    pub fn validate(&self) -> IocResult<()> {
        if let Some((bean, dependency)) = self.unknown_dependencies().into_iter().next() {
            warn!("Bean '{}' declares unknown dependency '{}'", bean, dependency);
            return Err(IocError::UnknownDependency { bean, dependency });
        }

        let cycles = self.find_cycles();
        if let Some(path) = cycles.into_iter().next() {
            warn!("Circular dependency detected: {}", path.join(" -> "));
            return Err(IocError::CircularDependency { path });
        }

        debug!("Dependency validation passed - no cycles found");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
