use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AdapterError, AdapterErrorKind};

/// Serializable element tree used to seed and mutate an [`InMemoryDocument`].
///
/// [`InMemoryDocument`]: crate::InMemoryDocument
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFixture {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocumentFixture>,
}

impl DocumentFixture {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: DocumentFixture) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DocumentFixture>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn from_json(raw: &str) -> Result<Self, AdapterError> {
        let fixture: Self = serde_json::from_str(raw)?;
        fixture.validate()?;
        Ok(fixture)
    }

    pub fn sequence_from_json(raw: &str) -> Result<Vec<Self>, AdapterError> {
        let frames: Vec<Self> = serde_json::from_str(raw)?;
        for frame in &frames {
            frame.validate()?;
        }
        Ok(frames)
    }

    pub fn load(path: &Path) -> Result<Self, AdapterError> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AdapterError::new(AdapterErrorKind::Fixture)
                .with_hint(format!("{}: {err}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Number of elements in this fixture, itself included.
    pub fn element_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(DocumentFixture::element_count)
            .sum::<usize>()
    }

    fn validate(&self) -> Result<(), AdapterError> {
        if self.tag.trim().is_empty() {
            return Err(AdapterError::new(AdapterErrorKind::Fixture).with_hint("empty tag name"));
        }
        self.children.iter().try_for_each(DocumentFixture::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_fixture_with_defaults() {
        let fixture = DocumentFixture::from_json(
            r#"{"tag":"div","id":"main","children":[{"tag":"svg","children":[{"tag":"path","attributes":{"d":"M0"}}]}]}"#,
        )
        .unwrap();
        assert_eq!(fixture.id.as_deref(), Some("main"));
        assert_eq!(fixture.element_count(), 3);
        assert_eq!(
            fixture.children[0].children[0].attributes.get("d").map(String::as_str),
            Some("M0")
        );
    }

    #[test]
    fn rejects_blank_tags() {
        let err = DocumentFixture::from_json(r#"{"tag":"div","children":[{"tag":" "}]}"#)
            .unwrap_err();
        assert_eq!(err.kind, AdapterErrorKind::Fixture);
    }
}
