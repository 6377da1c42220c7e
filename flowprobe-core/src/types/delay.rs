use std::time::Duration;

/// Idles for a fixed duration. References listed in `passthrough` become both
/// inputs and outputs, so their values are echoed downstream unchanged.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DelayNode {
    pub id: String,
    pub data: DelayData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DelayData {
    /// Milliseconds.
    #[serde(default)]
    pub duration: u64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub passthrough: Vec<String>,
}

impl DelayNode {
    pub fn new(id: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            id: id.into(),
            data: DelayData {
                duration: duration_ms,
                passthrough: Vec::new(),
            },
        }
    }

    pub fn with_passthrough(mut self, reference: impl Into<String>) -> Self {
        self.data.passthrough.push(reference.into());
        self
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.data.duration)
    }

    pub fn input_schema(&self) -> Vec<String> {
        let mut refs = self.data.passthrough.clone();
        refs.sort();
        refs.dedup();
        refs
    }

    pub fn output_schema(&self) -> Vec<String> {
        self.input_schema()
    }
}
