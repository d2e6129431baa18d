//! Соглашение об именах бинов: `TestBean` -> `testBean`
//!
//! Используется только там, где зависимость объявлена по типу
//! (`depends_on_type::<T>()`, `BeanContext::inject::<T>()`).

/// Имя бина для типа `T` по соглашению
pub fn bean_name_of<T: ?Sized>() -> String {
    bean_name_from_type_name(std::any::type_name::<T>())
}

/// Простое имя типа с первой буквой в нижнем регистре.
/// Путь модуля и generic аргументы отбрасываются.
pub fn bean_name_from_type_name(type_name: &str) -> String {
    let simple = simple_type_name(type_name);

    let mut chars = simple.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `alloc::sync::Arc<my_app::repo::TestBean>` -> `Arc`, `my_app::TestBean` -> `TestBean`
pub fn simple_type_name(type_name: &str) -> &str {
    let without_generics = type_name
        .split_once('<')
        .map(|(head, _)| head)
        .unwrap_or(type_name);

    let without_dyn = without_generics.trim_start_matches("dyn ");

    without_dyn.rsplit("::").next().unwrap_or(without_dyn).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestBean;
    #[allow(dead_code)]
    struct URLResolver;

    #[test]
    fn test_convention_lowercases_first_letter() {
        assert_eq!(bean_name_from_type_name("TestBean"), "testBean");
        assert_eq!(bean_name_from_type_name("repository::RepoBean"), "repoBean");
        assert_eq!(bean_name_from_type_name("URLResolver"), "uRLResolver");
    }

    #[test]
    fn test_generics_and_paths_are_stripped() {
        assert_eq!(simple_type_name("alloc::vec::Vec<u8>"), "Vec");
        assert_eq!(simple_type_name("dyn app::Calculator"), "Calculator");
        assert_eq!(bean_name_from_type_name(""), "");
    }

    #[test]
    fn test_bean_name_of_type() {
        assert_eq!(bean_name_of::<TestBean>(), "testBean");
        assert_eq!(bean_name_of::<URLResolver>(), "uRLResolver");
    }
}
