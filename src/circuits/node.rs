use std::fmt;

use crate::constants::{GROUND_PRIORITY, SOURCE_PRIORITY_STEP};
use crate::math::{CScalar, ZERO};

/// Stable handle of a node inside its [`Circuit`](super::Circuit).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena index (creation order).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n#{}", self.0)
    }
}

/// Stable handle of a component inside its [`Circuit`](super::Circuit).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(usize);

impl ComponentId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena index (insertion order).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c#{}", self.0)
    }
}

/// Equipotential point of the network.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    name: String,
    is_ground: bool,
    priority: u32,
    voltage: CScalar,
    components: Vec<ComponentId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: impl Into<String>, is_ground: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_ground,
            priority: if is_ground { GROUND_PRIORITY } else { 0 },
            voltage: ZERO,
            components: Vec::new(),
        }
    }

    /// Records `component` as attached; sources raise the node's priority.
    /// Attaching the same component twice is a no-op.
    pub(crate) fn connect(&mut self, component: ComponentId, is_source: bool) {
        if self.components.contains(&component) {
            return;
        }
        self.components.push(component);
        if is_source {
            self.priority = self.priority.saturating_add(SOURCE_PRIORITY_STEP);
        }
    }

    /// Reverses [`Node::connect`].
    pub(crate) fn disconnect(&mut self, component: ComponentId, is_source: bool) {
        let before = self.components.len();
        self.components.retain(|&c| c != component);
        if is_source && self.components.len() < before && !self.is_ground {
            self.priority = self.priority.saturating_sub(SOURCE_PRIORITY_STEP);
        }
    }

    pub(crate) fn set_voltage(&mut self, voltage: CScalar) {
        self.voltage = voltage;
    }

    /// Handle of this node.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Node name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True for a ground node.
    #[must_use]
    pub const fn is_ground(&self) -> bool {
        self.is_ground
    }

    /// Reference-selection priority.
    #[must_use]
    pub const fn priority(&self) -> u32 {
        self.priority
    }

    /// Voltage from the last successful solve. Meaningless before one.
    #[must_use]
    pub const fn voltage(&self) -> CScalar {
        self.voltage
    }

    /// Attached components, in attachment order.
    #[must_use]
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: V={} V, {} attached component(s)",
            self.name,
            self.voltage,
            self.components.len()
        )?;
        if self.is_ground {
            write!(f, " [ground]")?;
        }
        Ok(())
    }
}
