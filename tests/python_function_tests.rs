//! Python function extraction tests.

use fnscan::ingest::python::extract_python_functions;
use fnscan::record::{ExtractedFunction, FingerprintPolicy};
use fnscan::ScanError;
use std::path::Path;

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Vec<ExtractedFunction> {
        extract_python_functions(
            Path::new("module.py"),
            source.as_bytes(),
            FingerprintPolicy::default(),
        )
        .expect("python source parses")
    }

    fn find<'a>(functions: &'a [ExtractedFunction], name: &str) -> &'a ExtractedFunction {
        functions
            .iter()
            .find(|f| f.name == name)
            .unwrap_or_else(|| panic!("no function named {}", name))
    }

    #[test]
    fn test_module_functions_methods_and_nested() {
        let source = "\
def outer(x):
    def inner(y):
        return y * 2
    return inner(x)


class Service:
    def __init__(self, name):
        self.name = name

    async def fetch(self):
        return await self.client.get(self.name)
";
        let functions = extract(source);
        let names: Vec<_> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["outer", "inner", "__init__", "fetch"]);

        let outer = find(&functions, "outer");
        assert_eq!((outer.start_line, outer.end_line), (1, 4));

        let inner = find(&functions, "inner");
        assert_eq!((inner.start_line, inner.end_line), (2, 3));

        let fetch = find(&functions, "fetch");
        assert_eq!((fetch.start_line, fetch.end_line), (11, 12));
    }

    #[test]
    fn test_decorator_not_in_span() {
        let source = "\
import functools

@functools.lru_cache(maxsize=None)
def cached(n):
    return n
";
        let functions = extract(source);
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].start_line, 4);
        assert_eq!(functions[0].end_line, 5);
    }

    #[test]
    fn test_lambda_is_not_a_function_definition() {
        let functions = extract("square = lambda v: v * v\n");
        assert!(functions.is_empty());
    }

    #[test]
    fn test_single_line_function() {
        let functions = extract("def one(): return 1\n");
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].line_count(), 1);
    }

    #[test]
    fn test_char_count_covers_definition() {
        let source = "def f():\n    pass\n";
        let functions = extract(source);
        assert_eq!(functions[0].char_count, "def f():\n    pass".chars().count());
    }

    #[test]
    fn test_syntax_error_is_parse_failure() {
        let result = extract_python_functions(
            Path::new("broken.py"),
            b"def broken(:\n",
            FingerprintPolicy::default(),
        );
        assert!(matches!(result, Err(ScanError::Parse { .. })));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let result = extract_python_functions(
            Path::new("latin1.py"),
            &[b'#', b' ', 0xe9, b'\n'],
            FingerprintPolicy::default(),
        );
        assert!(matches!(result, Err(ScanError::Utf8(_))));
    }
}
