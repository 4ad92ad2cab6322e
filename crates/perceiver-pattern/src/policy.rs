use serde::{Deserialize, Serialize};

use document_adapter::DocumentTree;

use crate::model::MarkerKind;

const MENU_PATH: &str = "M12 8c1.1 0 2-.9 2-2s-.9-2-2-2-2 .9-2 2 .9 2 2 2zm0 2c-1.1 0-2 .9-2 2s.9 2 2 2 2-.9 2-2-.9-2-2-2zm0 6c-1.1 0-2 .9-2 2s.9 2 2 2 2-.9 2-2-.9-2-2-2z";

const SPARKLE_PATH: &str = "M235.5 471C235.5 438.423 229.22 407.807 216.66 379.155C204.492 350.503 187.811 325.579 166.616 304.384C145.421 283.189 120.498 266.508 91.845 254.34C63.1925 241.78 32.5775 235.5 0 235.5C32.5775 235.5 63.1925 229.416 91.845 217.249C120.498 204.689 145.421 187.811 166.616 166.616C187.811 145.421 204.492 120.497 216.66 91.845C229.22 63.1925 235.5 32.5775 235.5 0C235.5 32.5775 241.584 63.1925 253.751 91.845C266.311 120.497 283.189 145.421 304.384 166.616C325.579 187.811 350.503 204.689 379.155 217.249C407.807 229.416 438.423 235.5 471 235.5C438.423 235.5 407.807 241.78 379.155 254.34C350.503 266.508 325.579 283.189 304.384 304.384C283.189 325.579 266.311 350.503 253.751 379.155C241.584 407.807 235.5 438.423 235.5 471Z";

/// Exact drawable signature of one marker kind.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarkerSignature {
    pub kind: MarkerKind,
    pub path: String,
}

/// Structural signal marking a region as primary content.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuardRule {
    pub tag: String,
    pub attribute: String,
    pub value: String,
}

impl Default for GuardRule {
    fn default() -> Self {
        Self {
            tag: "form".into(),
            attribute: "action".into(),
            value: "/search".into(),
        }
    }
}

impl GuardRule {
    /// True when a strict descendant of `region` matches the rule.
    pub fn matches_within<D: DocumentTree>(&self, doc: &D, region: &D::Node) -> bool {
        let mut stack = doc.children(region);
        stack.reverse();
        while let Some(node) = stack.pop() {
            let tag_matches = doc
                .tag_name(&node)
                .is_some_and(|tag| tag.eq_ignore_ascii_case(&self.tag));
            if tag_matches
                && doc.attribute(&node, &self.attribute).as_deref() == Some(self.value.as_str())
            {
                return true;
            }
            let mut children = doc.children(&node);
            children.reverse();
            stack.extend(children);
        }
        false
    }
}

/// What the perceiver looks for and where.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternProfile {
    /// Id of the element scanned and observed; the body is used when absent.
    pub container_id: String,
    pub marker_tag: String,
    pub signature_attribute: String,
    pub markers: Vec<MarkerSignature>,
    pub guard: GuardRule,
}

impl Default for PatternProfile {
    fn default() -> Self {
        Self {
            container_id: "main".into(),
            marker_tag: "path".into(),
            signature_attribute: "d".into(),
            markers: vec![
                MarkerSignature {
                    kind: MarkerKind::Menu,
                    path: MENU_PATH.into(),
                },
                MarkerSignature {
                    kind: MarkerKind::Sparkle,
                    path: SPARKLE_PATH.into(),
                },
            ],
            guard: GuardRule::default(),
        }
    }
}

impl PatternProfile {
    pub fn with_container(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = container_id.into();
        self
    }

    pub fn signature(&self, kind: MarkerKind) -> Option<&str> {
        self.markers
            .iter()
            .find(|marker| marker.kind == kind)
            .map(|marker| marker.path.as_str())
    }

    /// Marker kind of `node`, if its tag and signature match exactly.
    pub fn classify<D: DocumentTree>(&self, doc: &D, node: &D::Node) -> Option<MarkerKind> {
        let tag = doc.tag_name(node)?;
        if !tag.eq_ignore_ascii_case(&self.marker_tag) {
            return None;
        }
        let signature = doc.attribute(node, &self.signature_attribute)?;
        self.markers
            .iter()
            .find(|marker| marker.path == signature)
            .map(|marker| marker.kind)
    }

    /// The observed container, falling back to the document body.
    pub fn scan_root<D: DocumentTree>(&self, doc: &D) -> D::Node {
        doc.element_by_id(&self.container_id)
            .unwrap_or_else(|| doc.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_adapter::{DocumentFixture, InMemoryDocument};

    #[test]
    fn classify_requires_exact_signature() {
        let profile = PatternProfile::default();
        let menu = profile.signature(MarkerKind::Menu).unwrap().to_string();
        let doc = InMemoryDocument::from_fixture(
            &DocumentFixture::element("svg")
                .with_child(DocumentFixture::element("path").with_attr("d", menu.clone()))
                .with_child(DocumentFixture::element("path").with_attr("d", format!("{menu} ")))
                .with_child(DocumentFixture::element("circle").with_attr("d", menu)),
        );
        let svg = doc.children(&doc.body())[0];
        let kinds: Vec<_> = doc
            .children(&svg)
            .iter()
            .map(|node| profile.classify(&*doc, node))
            .collect();
        assert_eq!(kinds, vec![Some(MarkerKind::Menu), None, None]);
    }

    #[test]
    fn guard_ignores_region_itself_and_matches_descendants() {
        let form = DocumentFixture::element("form").with_attr("action", "/search");
        let doc = InMemoryDocument::from_fixture(
            &DocumentFixture::element("body")
                .with_child(form.clone().with_id("self"))
                .with_child(
                    DocumentFixture::element("div")
                        .with_id("wrapper")
                        .with_child(DocumentFixture::element("div").with_child(form)),
                ),
        );
        let guard = GuardRule::default();
        let own = doc.element_by_id("self").unwrap();
        let wrapper = doc.element_by_id("wrapper").unwrap();
        assert!(!guard.matches_within(&*doc, &own));
        assert!(guard.matches_within(&*doc, &wrapper));
    }

    #[test]
    fn scan_root_falls_back_to_body() {
        let doc = InMemoryDocument::new();
        let profile = PatternProfile::default();
        assert_eq!(profile.scan_root(&*doc), doc.body());
    }
}
