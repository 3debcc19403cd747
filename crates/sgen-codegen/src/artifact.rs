//! Emitted code units and their ordering

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Class,
    Enum,
    /// Registry, converters, attributes and serializer helpers
    Support,
}

/// The code of one emitted type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeArtifact {
    pub type_name: String,
    pub kind: ArtifactKind,
    pub base_type_name: Option<String>,
    pub code: String,
}

impl CodeArtifact {
    pub fn new(type_name: impl Into<String>, kind: ArtifactKind, code: String) -> Self {
        Self {
            type_name: type_name.into(),
            kind,
            base_type_name: None,
            code,
        }
    }

    pub fn with_base(mut self, base: Option<String>) -> Self {
        self.base_type_name = base;
        self
    }

    /// Whether this artifact is a model type rather than a support type
    pub fn is_model(&self) -> bool {
        self.kind != ArtifactKind::Support
    }
}

/// Reorder so that every base precedes its derived types
///
/// Artifacts are otherwise kept in their incoming order.
pub fn order_by_inheritance(artifacts: Vec<CodeArtifact>) -> Vec<CodeArtifact> {
    let positions: HashMap<String, usize> = artifacts
        .iter()
        .enumerate()
        .map(|(index, artifact)| (artifact.type_name.clone(), index))
        .collect();
    let mut order = Vec::with_capacity(artifacts.len());
    let mut placed = HashSet::new();
    for index in 0..artifacts.len() {
        place(index, &artifacts, &positions, &mut placed, &mut order);
    }
    let mut slots: Vec<Option<CodeArtifact>> = artifacts.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect()
}

fn place(
    index: usize,
    artifacts: &[CodeArtifact],
    positions: &HashMap<String, usize>,
    placed: &mut HashSet<usize>,
    order: &mut Vec<usize>,
) {
    if !placed.insert(index) {
        return;
    }
    if let Some(base) = artifacts[index]
        .base_type_name
        .as_ref()
        .and_then(|base| positions.get(base))
    {
        place(*base, artifacts, positions, placed, order);
    }
    order.push(index);
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    fn class(name: &str, base: Option<&str>) -> CodeArtifact {
        CodeArtifact::new(name, ArtifactKind::Class, String::new())
            .with_base(base.map(str::to_string))
    }

    fn names(artifacts: &[CodeArtifact]) -> Vec<&str> {
        artifacts.iter().map(|a| a.type_name.as_str()).collect()
    }

    #[test]
    fn order_by_inheritance___derived_first___moves_base_up() {
        let ordered = order_by_inheritance(vec![
            class("Container", None),
            class("Puppy", Some("Dog")),
            class("Dog", Some("Animal")),
            class("Animal", None),
        ]);

        assert_eq!(names(&ordered), vec!["Container", "Animal", "Dog", "Puppy"]);
    }

    #[test]
    fn order_by_inheritance___already_ordered___unchanged() {
        let ordered = order_by_inheritance(vec![
            class("Animal", None),
            class("Dog", Some("Animal")),
            class("Cat", Some("Animal")),
        ]);

        assert_eq!(names(&ordered), vec!["Animal", "Dog", "Cat"]);
    }

    #[test]
    fn order_by_inheritance___external_base___ignored() {
        let ordered = order_by_inheritance(vec![class("Local", Some("Acme.Remote"))]);

        assert_eq!(names(&ordered), vec!["Local"]);
    }
}
