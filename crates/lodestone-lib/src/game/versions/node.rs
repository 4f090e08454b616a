use crate::game::launcher::version_parser::VersionDescriptor;
use std::collections::HashSet;
use std::sync::Arc;

/// Independently memoized validation stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationStage {
    Libraries,
    AssetIndex,
    Assets,
    Jar,
}

impl ValidationStage {
    pub const ALL: [ValidationStage; 4] = [
        ValidationStage::Libraries,
        ValidationStage::AssetIndex,
        ValidationStage::Assets,
        ValidationStage::Jar,
    ];
}

/// Lifecycle of a node within one manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    NotLoaded,
    Loaded,
    /// Every stage passed at least once
    Validated,
}

/// One version in the manager's registry.
///
/// The parent is held by id only and resolved through the owning
/// `VersionManager`.
#[derive(Debug, Clone)]
pub struct VersionNode {
    id: String,
    descriptor: Option<Arc<VersionDescriptor>>,
    refresh: bool,
    validated: HashSet<ValidationStage>,
}

impl VersionNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            descriptor: None,
            refresh: false,
            validated: HashSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn descriptor(&self) -> Option<&Arc<VersionDescriptor>> {
        self.descriptor.as_ref()
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.descriptor
            .as_ref()
            .and_then(|d| d.inherits_from.as_deref())
    }

    pub fn state(&self) -> NodeState {
        if self.descriptor.is_none() {
            NodeState::NotLoaded
        } else if ValidationStage::ALL
            .iter()
            .all(|s| self.validated.contains(s))
        {
            NodeState::Validated
        } else {
            NodeState::Loaded
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.descriptor.is_some()
    }

    pub fn is_validated(&self, stage: ValidationStage) -> bool {
        self.validated.contains(&stage)
    }

    pub fn needs_refresh(&self) -> bool {
        self.refresh
    }

    pub(crate) fn set_loaded(&mut self, descriptor: VersionDescriptor) {
        self.descriptor = Some(Arc::new(descriptor));
        self.refresh = false;
        self.validated.clear();
    }

    pub(crate) fn mark_refresh(&mut self) {
        self.refresh = true;
    }

    pub(crate) fn mark_validated(&mut self, stage: ValidationStage) {
        self.validated.insert(stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_follows_lifecycle() {
        let mut node = VersionNode::new("1.20.1");
        assert_eq!(node.state(), NodeState::NotLoaded);
        assert!(node.parent_id().is_none());

        node.set_loaded(VersionDescriptor {
            id: "1.20.1".into(),
            inherits_from: Some("1.20".into()),
            ..Default::default()
        });
        assert_eq!(node.state(), NodeState::Loaded);
        assert_eq!(node.parent_id(), Some("1.20"));

        for stage in ValidationStage::ALL {
            node.mark_validated(stage);
        }
        assert_eq!(node.state(), NodeState::Validated);
    }

    #[test]
    fn reload_resets_validation_and_refresh() {
        let mut node = VersionNode::new("1.8.9");
        node.mark_refresh();
        node.set_loaded(VersionDescriptor::default());
        assert!(!node.needs_refresh());

        node.mark_validated(ValidationStage::Jar);
        node.set_loaded(VersionDescriptor::default());
        assert!(!node.is_validated(ValidationStage::Jar));
    }
}
