// Compile Features
// Known compile features and the ordering of language standards

/// A compile feature and the standard that first provides it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    pub name: &'static str,
    pub language: &'static str,
    pub standard: &'static str,
}

const fn feature(name: &'static str, language: &'static str, standard: &'static str) -> Feature {
    Feature {
        name,
        language,
        standard,
    }
}

const FEATURES: &[Feature] = &[
    feature("c_std_90", "C", "90"),
    feature("c_std_99", "C", "99"),
    feature("c_std_11", "C", "11"),
    feature("c_std_17", "C", "17"),
    feature("c_std_23", "C", "23"),
    feature("c_restrict", "C", "99"),
    feature("c_variadic_macros", "C", "99"),
    feature("c_static_assert", "C", "11"),
    feature("cxx_std_98", "CXX", "98"),
    feature("cxx_std_11", "CXX", "11"),
    feature("cxx_std_14", "CXX", "14"),
    feature("cxx_std_17", "CXX", "17"),
    feature("cxx_std_20", "CXX", "20"),
    feature("cxx_std_23", "CXX", "23"),
    feature("cxx_auto_type", "CXX", "11"),
    feature("cxx_constexpr", "CXX", "11"),
    feature("cxx_lambdas", "CXX", "11"),
    feature("cxx_nullptr", "CXX", "11"),
    feature("cxx_binary_literals", "CXX", "14"),
    feature("cxx_decltype_auto", "CXX", "14"),
    feature("cxx_generic_lambdas", "CXX", "14"),
    feature("cxx_relaxed_constexpr", "CXX", "14"),
    feature("cxx_variable_templates", "CXX", "14"),
    feature("cuda_std_11", "CUDA", "11"),
    feature("cuda_std_14", "CUDA", "14"),
    feature("cuda_std_17", "CUDA", "17"),
    feature("cuda_std_20", "CUDA", "20"),
    feature("cuda_std_23", "CUDA", "23"),
];

const C_STANDARDS: &[&str] = &["90", "99", "11", "17", "23"];
const CXX_STANDARDS: &[&str] = &["98", "11", "14", "17", "20", "23"];

/// Languages with a standard ordering
pub const LANGUAGES: &[&str] = &["C", "CXX", "CUDA"];

pub fn lookup(name: &str) -> Option<&'static Feature> {
    FEATURES.iter().find(|f| f.name == name)
}

/// Standards of a language, oldest first
pub fn standards(language: &str) -> Option<&'static [&'static str]> {
    match language {
        "C" => Some(C_STANDARDS),
        "CXX" | "CUDA" => Some(CXX_STANDARDS),
        _ => None,
    }
}

fn rank(language: &str, standard: &str) -> Option<usize> {
    standards(language)?.iter().position(|s| *s == standard)
}

/// Whether `available` meets `required`
///
/// An unknown or missing available standard counts as the oldest one.
pub fn is_satisfied(language: &str, available: Option<&str>, required: &str) -> bool {
    let available = available.and_then(|s| rank(language, s)).unwrap_or(0);
    rank(language, required).is_some_and(|required| available >= required)
}

/// The newer of two standards of one language
pub fn newer<'s>(language: &str, a: &'s str, b: &'s str) -> &'s str {
    match (rank(language, a), rank(language, b)) {
        (Some(ra), Some(rb)) if rb > ra => b,
        (None, Some(_)) => b,
        _ => a,
    }
}
