use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use serde_json::{Map, Value};

use super::{
    BodyExtractor, Extractor, ExtractorConfigError, HeaderExtractor, JsonPathExtractor,
    StatusCodeExtractor, XmlPathExtractor,
};

type Factory = Arc<dyn Fn(&Map<String, Value>) -> Result<Extractor, ExtractorConfigError> + Send + Sync>;

/// Tag-keyed extractor constructors.
pub struct ExtractorRegistry {
    factories: BTreeMap<String, Factory>,
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut r = Self::empty();
        r.register("statusCode", |_| Ok(Extractor::new(StatusCodeExtractor)));
        r.register("header", |cfg| Ok(Extractor::new(HeaderExtractor::from_config(cfg)?)));
        r.register("body", |_| Ok(Extractor::new(BodyExtractor)));
        r.register("jsonPath", |cfg| {
            Ok(Extractor::new(JsonPathExtractor::new(path_field("jsonPath", cfg)?)?))
        });
        r.register("xmlPath", |cfg| {
            Ok(Extractor::new(XmlPathExtractor::new(path_field("xmlPath", cfg)?)?))
        });
        r
    }

    /// Adds or replaces the constructor for `tag`.
    pub fn register<F>(&mut self, tag: impl Into<String>, factory: F)
    where
        F: Fn(&Map<String, Value>) -> Result<Extractor, ExtractorConfigError> + Send + Sync + 'static,
    {
        self.factories.insert(tag.into(), Arc::new(factory));
    }

    pub fn build(&self, tag: &str, config: &Map<String, Value>) -> Result<Extractor, ExtractorConfigError> {
        let factory = self
            .factories
            .get(tag)
            .ok_or_else(|| ExtractorConfigError::UnknownType(tag.to_string()))?;
        factory(config)
    }

    pub fn tags(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

static REGISTRY: LazyLock<RwLock<ExtractorRegistry>> =
    LazyLock::new(|| RwLock::new(ExtractorRegistry::with_builtins()));

/// Registers a custom extractor kind with the process-wide registry used by
/// flow deserialization.
pub fn register_extractor<F>(tag: impl Into<String>, factory: F)
where
    F: Fn(&Map<String, Value>) -> Result<Extractor, ExtractorConfigError> + Send + Sync + 'static,
{
    let tag: String = tag.into();
    tracing::debug!(%tag, "registering extractor");
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(tag, factory);
}

pub fn registered_tags() -> Vec<String> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .tags()
}

pub(super) fn build(tag: &str, config: &Map<String, Value>) -> Result<Extractor, ExtractorConfigError> {
    // Clone the factory out so user constructors never run under the lock.
    let factory = REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .factories
        .get(tag)
        .cloned()
        .ok_or_else(|| ExtractorConfigError::UnknownType(tag.to_string()))?;
    factory(config)
}

fn path_field<'a>(tag: &str, config: &'a Map<String, Value>) -> Result<&'a str, ExtractorConfigError> {
    match config.get("path") {
        Some(Value::String(p)) if !p.trim().is_empty() => Ok(p),
        Some(Value::String(_)) => Err(ExtractorConfigError::invalid(tag, "path must not be empty")),
        _ => Err(ExtractorConfigError::invalid(tag, "missing string field 'path'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_tag_is_an_error() {
        let err = ExtractorRegistry::with_builtins()
            .build("cookie", &Map::new())
            .unwrap_err();
        assert_eq!(err, ExtractorConfigError::UnknownType("cookie".to_string()));
    }

    #[test]
    fn builtins_cover_every_kind() {
        let r = ExtractorRegistry::with_builtins();
        assert_eq!(
            r.tags(),
            vec!["body", "header", "jsonPath", "statusCode", "xmlPath"]
        );
        let cfg = json!({"path": "$.id"});
        let ex = r.build("jsonPath", cfg.as_object().unwrap()).unwrap();
        assert_eq!(ex.tag(), "jsonPath");
    }

    #[test]
    fn path_extractors_require_a_path() {
        let r = ExtractorRegistry::with_builtins();
        assert!(matches!(
            r.build("xmlPath", &Map::new()),
            Err(ExtractorConfigError::InvalidConfig { .. })
        ));
    }
}
