//! Environment variable sources and coercing readers
//!
//! Every lookup degrades to a default instead of failing. A source that
//! cannot answer (missing backing store, non-unicode value) reads as absent.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Abstracts where environment variables come from.
pub trait EnvSource: Send + Sync {
    /// Raw value of `key`, or `None` when it is not set.
    fn get(&self, key: &str) -> Option<String>;
}

/// The current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

/// A fixed set of variables held in memory.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace a variable
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Dotenv files layered under the process environment.
///
/// For mode `m` the files `.env`, `.env.local`, `.env.m` and `.env.m.local`
/// are read from `root` in that order, each overriding the previous one.
/// Variables already present in the process environment win over all files.
/// The process environment itself is never modified.
#[derive(Debug, Clone)]
pub struct DotenvEnv {
    files: MapEnv,
    loaded: Vec<PathBuf>,
}

impl DotenvEnv {
    /// Load the dotenv files for `mode` from `root`.
    ///
    /// `${VAR}` references resolve against the process environment first,
    /// then against anything defined earlier in the same or a lower file.
    pub fn load(root: impl AsRef<Path>, mode: &str) -> Self {
        let root = root.as_ref();
        let mut combined = String::new();
        let mut vars = Vec::new();
        let mut loaded = Vec::new();

        for name in dotenv_file_names(mode) {
            let path = root.join(&name);
            if !path.is_file() {
                continue;
            }

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping unreadable dotenv file"
                    );
                    continue;
                }
            };

            // Files are parsed as one stream so later files can reference
            // values from earlier ones.
            let mut candidate = combined.clone();
            candidate.push_str(&content);
            if !candidate.ends_with('\n') {
                candidate.push('\n');
            }

            match parse_dotenv(&candidate) {
                Ok(parsed) => {
                    tracing::debug!(
                        path = %path.display(),
                        count = parsed.len() - vars.len(),
                        "Loaded dotenv file"
                    );
                    combined = candidate;
                    vars = parsed;
                    loaded.push(path);
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping malformed dotenv file"
                    );
                }
            }
        }

        Self {
            files: vars.into_iter().collect(),
            loaded,
        }
    }

    /// Paths of the files that contributed variables, in load order
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded
    }
}

impl EnvSource for DotenvEnv {
    fn get(&self, key: &str) -> Option<String> {
        ProcessEnv.get(key).or_else(|| self.files.get(key))
    }
}

fn dotenv_file_names(mode: &str) -> [String; 4] {
    [
        ".env".to_string(),
        ".env.local".to_string(),
        format!(".env.{}", mode),
        format!(".env.{}.local", mode),
    ]
}

fn parse_dotenv(content: &str) -> Result<Vec<(String, String)>, dotenvy::Error> {
    dotenvy::from_read_iter(content.as_bytes()).collect()
}

/// Read `key` as a string.
///
/// Returns the raw value when it is present and non-empty, otherwise `default`.
pub fn get_string(source: &dyn EnvSource, key: &str, default: &str) -> String {
    match source.get(key) {
        Some(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

/// Read `key` as a boolean.
///
/// Only the exact string `"true"` yields `true`. Any other value, `"false"`
/// included, yields `default`.
pub fn get_boolean(source: &dyn EnvSource, key: &str, default: bool) -> bool {
    if get_string(source, key, "") == "true" {
        true
    } else {
        default
    }
}

/// Read `key` as a number.
///
/// Accepts decimal and exponent notation, `Infinity`, and unsigned `0x`,
/// `0o` and `0b` literals. A non-empty value that does not parse yields
/// `f64::NAN`.
pub fn get_number(source: &dyn EnvSource, key: &str, default: f64) -> f64 {
    let raw = get_string(source, key, "");
    if raw.is_empty() {
        return default;
    }
    parse_number(&raw)
}

fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        // whitespace-only counts as zero
        return 0.0;
    }

    if let Some(value) = parse_radix_literal(trimmed) {
        return value;
    }

    let unsigned = trimmed
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(trimmed);
    if unsigned.starts_with(|c: char| c.is_ascii_alphabetic()) {
        // f64::from_str also takes "inf", "nan" and friends in any case
        return match unsigned {
            "Infinity" if trimmed.starts_with('-') => f64::NEG_INFINITY,
            "Infinity" => f64::INFINITY,
            _ => f64::NAN,
        };
    }

    trimmed.parse().unwrap_or(f64::NAN)
}

fn parse_radix_literal(value: &str) -> Option<f64> {
    let radix = match value.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &value[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Some(f64::NAN);
    }
    Some(
        u128::from_str_radix(digits, radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN),
    )
}

/// Split a comma-delimited value, dropping empty segments.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn source() -> MapEnv {
        MapEnv::new()
            .with("NAME", "shop")
            .with("EMPTY", "")
            .with("FLAG_ON", "true")
            .with("FLAG_OFF", "false")
            .with("FLAG_UPPER", "TRUE")
            .with("NUM", "42")
            .with("FLOAT", " 2.5 ")
            .with("BAD_NUM", "ten")
    }

    #[test]
    fn test_get_string() {
        let env = source();
        assert_eq!(get_string(&env, "NAME", "x"), "shop");
        assert_eq!(get_string(&env, "EMPTY", "x"), "x");
        assert_eq!(get_string(&env, "MISSING", "x"), "x");
        assert_eq!(get_string(&env, "MISSING", ""), "");
    }

    #[test]
    fn test_get_boolean_only_literal_true() {
        let env = source();
        assert!(get_boolean(&env, "FLAG_ON", false));
        assert!(!get_boolean(&env, "FLAG_UPPER", false));
        assert!(!get_boolean(&env, "MISSING", false));
        assert!(get_boolean(&env, "MISSING", true));
    }

    #[test]
    fn test_get_boolean_false_keeps_default() {
        // Known quirk: "false" does not override a true default.
        let env = source();
        assert!(get_boolean(&env, "FLAG_OFF", true));
        assert!(!get_boolean(&env, "FLAG_OFF", false));
    }

    #[test]
    fn test_get_number() {
        let env = source();
        assert_eq!(get_number(&env, "NUM", 1.0), 42.0);
        assert_eq!(get_number(&env, "FLOAT", 1.0), 2.5);
        assert_eq!(get_number(&env, "EMPTY", 7.0), 7.0);
        assert_eq!(get_number(&env, "MISSING", 7.0), 7.0);
        assert!(get_number(&env, "BAD_NUM", 7.0).is_nan());
    }

    #[test]
    fn test_get_number_literals() {
        let env = MapEnv::new()
            .with("HEX", "0x10")
            .with("OCT", "0o17")
            .with("BIN", "0b101")
            .with("BAD_HEX", "0xZZ")
            .with("SIGNED_HEX", "-0x10")
            .with("EXP", "1e3")
            .with("INF", "Infinity")
            .with("NEG_INF", "-Infinity")
            .with("RUST_INF", "inf")
            .with("RUST_INFINITY", "infinity")
            .with("RUST_NAN", "NaN");

        assert_eq!(get_number(&env, "HEX", 0.0), 16.0);
        assert_eq!(get_number(&env, "OCT", 0.0), 15.0);
        assert_eq!(get_number(&env, "BIN", 0.0), 5.0);
        assert!(get_number(&env, "BAD_HEX", 0.0).is_nan());
        assert!(get_number(&env, "SIGNED_HEX", 0.0).is_nan());
        assert_eq!(get_number(&env, "EXP", 0.0), 1000.0);
        assert_eq!(get_number(&env, "INF", 0.0), f64::INFINITY);
        assert_eq!(get_number(&env, "NEG_INF", 0.0), f64::NEG_INFINITY);
        assert!(get_number(&env, "RUST_INF", 0.0).is_nan());
        assert!(get_number(&env, "RUST_INFINITY", 0.0).is_nan());
        assert!(get_number(&env, "RUST_NAN", 0.0).is_nan());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a,b,,c"), vec!["a", "b", "c"]);
        assert_eq!(split_list(",a,"), vec!["a"]);
        assert!(split_list("").is_empty());
        assert_eq!(split_list(" a, b"), vec![" a", " b"]);
    }

    #[test]
    fn test_map_env_from_iter() {
        let env: MapEnv = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(env.len(), 2);
        assert_eq!(env.get("B").as_deref(), Some("2"));
        assert!(MapEnv::new().is_empty());
    }

    #[test]
    fn test_dotenv_layering() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(".env"),
            "SHOPLOCAL_TEST_A=base\nSHOPLOCAL_TEST_B=base\nSHOPLOCAL_TEST_C=base\nSHOPLOCAL_TEST_D=base\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(".env.local"),
            "SHOPLOCAL_TEST_B=local\nSHOPLOCAL_TEST_C=local\nSHOPLOCAL_TEST_D=local\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(".env.production"),
            "SHOPLOCAL_TEST_C=mode\nSHOPLOCAL_TEST_D=mode\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(".env.production.local"),
            "SHOPLOCAL_TEST_D=mode-local\n",
        )
        .unwrap();
        // Ignored for a different mode
        fs::write(dir.path().join(".env.development"), "SHOPLOCAL_TEST_A=dev\n").unwrap();

        let env = DotenvEnv::load(dir.path(), "production");
        assert_eq!(env.loaded_files().len(), 4);
        assert_eq!(env.get("SHOPLOCAL_TEST_A").as_deref(), Some("base"));
        assert_eq!(env.get("SHOPLOCAL_TEST_B").as_deref(), Some("local"));
        assert_eq!(env.get("SHOPLOCAL_TEST_C").as_deref(), Some("mode"));
        assert_eq!(env.get("SHOPLOCAL_TEST_D").as_deref(), Some("mode-local"));
        assert_eq!(env.get("SHOPLOCAL_TEST_MISSING"), None);
    }

    #[test]
    fn test_dotenv_references_earlier_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".env"), "SHOPLOCAL_TEST_HOST=api.example").unwrap();
        fs::write(
            dir.path().join(".env.local"),
            "SHOPLOCAL_TEST_URL=https://${SHOPLOCAL_TEST_HOST}/v2\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(".env.development"),
            "SHOPLOCAL_TEST_HOST=dev.example\nSHOPLOCAL_TEST_DEV_URL=https://${SHOPLOCAL_TEST_HOST}/v2\n",
        )
        .unwrap();

        let env = DotenvEnv::load(dir.path(), "development");
        assert_eq!(
            env.get("SHOPLOCAL_TEST_URL").as_deref(),
            Some("https://api.example/v2")
        );
        assert_eq!(
            env.get("SHOPLOCAL_TEST_DEV_URL").as_deref(),
            Some("https://dev.example/v2")
        );
        assert_eq!(env.get("SHOPLOCAL_TEST_HOST").as_deref(), Some("dev.example"));
    }

    #[test]
    fn test_dotenv_skips_malformed_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".env"), "SHOPLOCAL_TEST_KEEP=base\n").unwrap();
        fs::write(dir.path().join(".env.local"), "SHOPLOCAL_TEST_BROKEN='unterminated\n").unwrap();

        let env = DotenvEnv::load(dir.path(), "development");
        assert_eq!(env.loaded_files().len(), 1);
        assert_eq!(env.get("SHOPLOCAL_TEST_KEEP").as_deref(), Some("base"));
        assert_eq!(env.get("SHOPLOCAL_TEST_BROKEN"), None);
    }

    #[test]
    fn test_dotenv_process_env_wins() {
        // PATH is set in any test environment
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".env"), "PATH=/from/dotenv\n").unwrap();

        let env = DotenvEnv::load(dir.path(), "development");
        assert_eq!(env.get("PATH"), std::env::var("PATH").ok());
    }

    #[test]
    fn test_dotenv_missing_dir() {
        let dir = tempdir().unwrap();
        let env = DotenvEnv::load(dir.path().join("nope"), "development");
        assert!(env.loaded_files().is_empty());
    }
}
