use serde::Deserialize;

/// The `name` key every catalog entry carries next to its payload.
#[derive(Clone, Debug, Deserialize)]
pub struct NamedJsonObject {
    name: String
}

impl NamedJsonObject {
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_the_payload() {
        let named: NamedJsonObject = serde_json::from_str(r#"{"name": "link", "type": "stairCurve", "a": 1}"#).unwrap();
        assert_eq!(named.name(), "link");
    }
}
