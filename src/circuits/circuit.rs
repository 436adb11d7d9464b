use std::fmt;

use log::{debug, warn};

use crate::config::{SolverConfig, SourceModel};
use crate::errors::{ConfigurationError, NumericalError, Result, SolveWarning};
use crate::math::{CScalar, Scalar, ZERO};

use super::analysis::SolveReport;
use super::component::{Component, Element, VoltageSource};
use super::node::{ComponentId, Node, NodeId};
use super::stamp::{NodalBuilder, Slot};

/// Owner of the node and component arenas and entry point of the solver.
///
/// Nodes and components are addressed by the [`NodeId`] and [`ComponentId`] handles
/// returned when they are added. Component insertion order and node order are part of
/// the solver's contract: the first AC source decides the analysis frequency when
/// several disagree, and node order breaks reference-priority ties.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    nodes: Vec<Node>,
    order: Vec<NodeId>,
    components: Vec<Component>,
    frequency: Scalar,
    frequency_override: Option<Scalar>,
    solved: bool,
    config: SolverConfig,
}

impl Circuit {
    /// Creates an empty circuit with the default solver configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty circuit with `config`.
    #[must_use]
    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Solver configuration.
    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Replaces the solver configuration.
    pub fn set_config(&mut self, config: SolverConfig) {
        self.config = config;
    }

    /// Creates and registers a node. A ground node is moved to the front of the node order.
    pub fn add_node(&mut self, name: impl Into<String>, ground: bool) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(id, name, ground));
        if ground {
            self.order.insert(0, id);
        } else {
            self.order.push(id);
        }
        id
    }

    /// Appends a component, attaching it to whichever of its endpoints belong to this circuit.
    pub fn add_component(&mut self, component: Component) -> ComponentId {
        let id = ComponentId::new(self.components.len());
        let is_source = component.is_source();
        for node in [component.node_a(), component.node_b()].into_iter().flatten() {
            if let Some(node) = self.nodes.get_mut(node.index()) {
                node.connect(id, is_source);
            }
        }
        self.components.push(component);
        id
    }

    /// Appends several components, preserving their order.
    pub fn add_components<I>(&mut self, components: I) -> Vec<ComponentId>
    where
        I: IntoIterator<Item = Component>,
    {
        components
            .into_iter()
            .map(|c| self.add_component(c))
            .collect()
    }

    /// Rewires a registered component between `node_a` and `node_b`.
    pub fn connect(&mut self, component: ComponentId, node_a: NodeId, node_b: NodeId) -> Result<()> {
        for node in [node_a, node_b] {
            if node.index() >= self.nodes.len() {
                return Err(ConfigurationError::UnknownNode { node }.into());
            }
        }
        let target = self
            .components
            .get_mut(component.index())
            .ok_or(ConfigurationError::UnknownComponent { component })?;
        let is_source = target.is_source();
        let old = [target.node_a(), target.node_b()];
        target.set_endpoints(Some(node_a), Some(node_b));

        for node in old.into_iter().flatten() {
            if let Some(node) = self.nodes.get_mut(node.index()) {
                node.disconnect(component, is_source);
            }
        }
        for node in [node_a, node_b] {
            self.nodes[node.index()].connect(component, is_source);
        }
        Ok(())
    }

    /// Sets the analysis frequency used when no AC source is present.
    pub fn set_frequency(&mut self, frequency: Scalar) {
        self.frequency_override = Some(frequency);
    }

    /// Frequency (Hz) resolved by the latest `solve()` call.
    #[must_use]
    pub const fn frequency(&self) -> Scalar {
        self.frequency
    }

    /// True when the latest `solve()` call succeeded.
    #[must_use]
    pub const fn is_solved(&self) -> bool {
        self.solved
    }

    /// Looks up a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Looks up a component.
    #[must_use]
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.index())
    }

    /// Source parameters of a registered voltage source, for in-place mutation.
    pub fn source_mut(&mut self, id: ComponentId) -> Option<&mut VoltageSource> {
        self.components
            .get_mut(id.index())
            .and_then(|c| c.element_mut().as_source_mut())
    }

    /// Sets the element value (Ω, F, H, or a source's internal resistance).
    pub fn set_value(&mut self, id: ComponentId, value: Scalar) -> Result<()> {
        let component = self
            .components
            .get_mut(id.index())
            .ok_or(ConfigurationError::UnknownComponent { component: id })?;
        match component.element_mut() {
            Element::Resistor(r) => r.resistance = value,
            Element::Capacitor(c) => c.capacitance = value,
            Element::Inductor(l) => l.inductance = value,
            Element::VoltageSource(s) => s.internal_resistance = value,
        }
        Ok(())
    }

    /// Nodes in analysis order (grounds first).
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order.iter().map(move |id| &self.nodes[id.index()])
    }

    /// Components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentId, &Component)> + '_ {
        self.components
            .iter()
            .enumerate()
            .map(|(k, c)| (ComponentId::new(k), c))
    }

    /// Handles of all voltage sources, in insertion order.
    #[must_use]
    pub fn sources(&self) -> Vec<ComponentId> {
        self.components()
            .filter(|(_, c)| c.is_source())
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of registered nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of registered components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// `V(to) - V(from)` from the last successful solve.
    #[must_use]
    pub fn voltage_between(&self, from: NodeId, to: NodeId) -> Option<CScalar> {
        Some(self.node(to)?.voltage() - self.node(from)?.voltage())
    }

    /// Node that `solve()` holds at 0 V: the first ground node, otherwise the node with
    /// the highest priority (first in node order on ties).
    #[must_use]
    pub fn reference_node(&self) -> Option<NodeId> {
        if let Some(&ground) = self
            .order
            .iter()
            .find(|id| self.nodes[id.index()].is_ground())
        {
            return Some(ground);
        }
        let mut best: Option<&Node> = None;
        for node in self.nodes() {
            if best.map_or(true, |b| node.priority() > b.priority()) {
                best = Some(node);
            }
        }
        best.map(Node::id)
    }

    /// Determines the analysis frequency from the sources, in insertion order.
    fn resolve_frequency(&self) -> std::result::Result<(Scalar, Vec<SolveWarning>), ConfigurationError> {
        let mut distinct: Vec<Scalar> = Vec::new();
        for component in &self.components {
            let Some(source) = component.element().as_source() else {
                continue;
            };
            check_frequency(source.frequency)?;
            if source.is_ac() && !distinct.contains(&source.frequency) {
                distinct.push(source.frequency);
            }
        }

        match distinct.split_first() {
            None => {
                let frequency = self.frequency_override.unwrap_or(0.0);
                check_frequency(frequency)?;
                Ok((frequency, Vec::new()))
            }
            Some((&used, [])) => Ok((used, Vec::new())),
            Some((&used, others)) => {
                let warning = SolveWarning::MixedFrequencies {
                    used,
                    others: others.to_vec(),
                };
                warn!("{warning}");
                Ok((used, vec![warning]))
            }
        }
    }

    fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        if self.nodes.len() < 2 {
            return Err(ConfigurationError::TooFewNodes {
                found: self.nodes.len(),
            });
        }
        for (id, component) in self.components() {
            let (Some(a), Some(b)) = (component.node_a(), component.node_b()) else {
                return Err(ConfigurationError::Unconnected {
                    component: id,
                    name: component.name().to_owned(),
                });
            };
            if a == b {
                return Err(ConfigurationError::DuplicateEndpoint {
                    component: id,
                    name: component.name().to_owned(),
                    node: a,
                });
            }
            for node in [a, b] {
                if node.index() >= self.nodes.len() {
                    return Err(ConfigurationError::UnknownNode { node });
                }
            }
        }
        Ok(())
    }

    /// Nodes with no component path to `reference`, in analysis order.
    ///
    /// Such a subnetwork leaves its block of the admittance matrix singular, but LU
    /// round-off can still hand back a small nonzero pivot for it.
    fn floating_nodes(&self, reference: NodeId) -> Vec<NodeId> {
        let mut adjacent: Vec<Vec<NodeId>> = vec![Vec::new(); self.nodes.len()];
        for component in &self.components {
            if let Some((a, b)) = component.terminals() {
                adjacent[a.index()].push(b);
                adjacent[b.index()].push(a);
            }
        }

        let mut reached = vec![false; self.nodes.len()];
        reached[reference.index()] = true;
        let mut stack = vec![reference];
        while let Some(id) = stack.pop() {
            for &next in &adjacent[id.index()] {
                if !reached[next.index()] {
                    reached[next.index()] = true;
                    stack.push(next);
                }
            }
        }
        self.order
            .iter()
            .copied()
            .filter(|id| !reached[id.index()])
            .collect()
    }

    /// True when `component` gets a constraint row instead of a companion stamp.
    fn is_constrained(&self, component: &Component, frequency: Scalar) -> bool {
        self.config.source_model == SourceModel::Constrained
            && component.is_source()
            && self.config.is_short(component.impedance(frequency))
    }

    /// Solves the circuit at its resolved frequency.
    ///
    /// Every call rebuilds the system from the current state. On failure no node or
    /// component state is touched, [`Circuit::is_solved`] turns false and the voltages
    /// of an earlier solve are stale.
    pub fn solve(&mut self) -> Result<SolveReport> {
        self.solved = false;
        let result = self.try_solve();
        if let Err(err) = &result {
            debug!("solve failed: {err}");
        }
        result
    }

    fn try_solve(&mut self) -> Result<SolveReport> {
        let (frequency, mut warnings) = self.resolve_frequency()?;
        self.frequency = frequency;
        self.validate()?;

        let reference = self
            .reference_node()
            .ok_or(ConfigurationError::TooFewNodes { found: 0 })?;
        let floating = self.floating_nodes(reference);
        if !floating.is_empty() {
            return Err(NumericalError::SingularMatrix {
                determinant_log10: Scalar::NEG_INFINITY,
                floating,
            }
            .into());
        }

        let mut slots: Vec<Slot> = vec![None; self.nodes.len()];
        let mut unknowns = Vec::with_capacity(self.nodes.len() - 1);
        for &id in &self.order {
            if id != reference {
                slots[id.index()] = Some(unknowns.len());
                unknowns.push(id);
            }
        }

        let constraint_count = self
            .components
            .iter()
            .filter(|c| self.is_constrained(c, frequency))
            .count();
        debug!(
            "assembling {} node(s) + {} constraint(s) at {} Hz, reference {}",
            unknowns.len(),
            constraint_count,
            frequency,
            self.nodes[reference.index()].name()
        );

        let mut builder = NodalBuilder::new(unknowns.len(), constraint_count);
        let mut branch: Vec<Option<usize>> = vec![None; self.components.len()];

        for component in &self.components {
            let Some((a, b)) = component.terminals() else {
                continue;
            };
            if self.is_constrained(component, frequency) {
                continue;
            }
            let y = self.config.admittance(component.impedance(frequency));
            builder.stamp_admittance(slots[a.index()], slots[b.index()], y);
        }

        for (k, component) in self.components.iter().enumerate() {
            let (Some(source), Some((a, b))) = (component.element().as_source(), component.terminals())
            else {
                continue;
            };
            let (pos, neg) = (slots[a.index()], slots[b.index()]);
            if self.is_constrained(component, frequency) {
                branch[k] = Some(builder.stamp_voltage_constraint(pos, neg, source.voltage));
            } else {
                let ys = self.config.admittance(component.impedance(frequency));
                builder.stamp_current_source(pos, neg, source.voltage * ys);
            }
        }

        let system = builder.build();
        let unknown_count = system.dimension();
        let solution = system.solve(&self.config)?;
        if let Some(k) = solution.voltages.iter().position(|v| !v.is_finite()) {
            return Err(NumericalError::NonFiniteSolution { node: unknowns[k] }.into());
        }
        if let Some(k) = branch
            .iter()
            .flatten()
            .find(|&&k| !solution.branch_currents[k].is_finite())
        {
            debug!("constrained source current {k} is not finite");
            return Err(NumericalError::SolveFailed.into());
        }

        self.nodes[reference.index()].set_voltage(ZERO);
        for (k, id) in unknowns.iter().enumerate() {
            self.nodes[id.index()].set_voltage(solution.voltages[k]);
        }
        for (k, component) in self.components.iter_mut().enumerate() {
            let Some((a, b)) = component.terminals() else {
                continue;
            };
            let voltage = self.nodes[a.index()].voltage() - self.nodes[b.index()].voltage();
            let current = match branch[k] {
                Some(row) => Some(solution.branch_currents[row]),
                None => component.element().current(voltage, frequency, &self.config),
            };
            component.set_solution(voltage, current);
        }

        if let Some(cond_estimate) = solution
            .cond_estimate
            .filter(|&cond| cond > self.config.ill_conditioned)
        {
            let warning = SolveWarning::IllConditioned { cond_estimate };
            debug!("{warning}");
            warnings.push(warning);
        }

        self.solved = true;
        debug!(
            "solved {} unknown(s), log10|det| = {:.3}",
            unknown_count, solution.determinant_log10
        );
        Ok(SolveReport {
            frequency,
            reference,
            unknowns: unknown_count,
            determinant_log10: solution.determinant_log10,
            cond_estimate: solution.cond_estimate,
            warnings,
        })
    }
}

fn check_frequency(frequency: Scalar) -> std::result::Result<(), ConfigurationError> {
    if frequency.is_finite() && frequency >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidFrequency { frequency })
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Circuit:")?;
        writeln!(f, "  Frequency: {} Hz", self.frequency)?;
        writeln!(f, "  Components: {}", self.components.len())?;
        for component in &self.components {
            writeln!(f, "    {component}")?;
        }
        writeln!(f, "  Nodes: {}", self.nodes.len())?;
        for node in self.nodes() {
            writeln!(f, "    {node}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use num_complex::Complex;

    use super::*;
    use crate::errors::CircuitError;

    fn divider(config: SolverConfig) -> (Circuit, NodeId, NodeId, NodeId) {
        let mut circuit = Circuit::with_config(config);
        let n1 = circuit.add_node("n1", false);
        let n2 = circuit.add_node("n2", false);
        let gnd = circuit.add_node("gnd", true);
        let mut v = Component::voltage_source("V", VoltageSource::dc(12.0));
        v.connect(n1, gnd);
        let mut r1 = Component::resistor("R1", 200.0);
        r1.connect(n1, n2);
        let mut r2 = Component::resistor("R2", 400.0);
        r2.connect(n2, gnd);
        circuit.add_components([v, r1, r2]);
        (circuit, gnd, n1, n2)
    }

    #[test]
    fn ground_moves_to_front() {
        let (circuit, gnd, n1, n2) = divider(SolverConfig::default());
        let order: Vec<NodeId> = circuit.nodes().map(Node::id).collect();
        assert_eq!(order, vec![gnd, n1, n2]);
        assert_eq!(circuit.reference_node(), Some(gnd));
    }

    #[test]
    fn reference_prefers_source_terminals_without_ground() {
        let mut circuit = Circuit::new();
        let a = circuit.add_node("a", false);
        let b = circuit.add_node("b", false);
        let c = circuit.add_node("c", false);
        let mut v1 = Component::voltage_source("V1", VoltageSource::dc(1.0));
        v1.connect(a, c);
        let mut v2 = Component::voltage_source("V2", VoltageSource::dc(1.0));
        v2.connect(b, c);
        circuit.add_components([v1, v2]);
        assert_eq!(circuit.node(c).map(Node::priority), Some(2));
        assert_eq!(circuit.reference_node(), Some(c));
    }

    #[test]
    fn reference_ties_break_by_node_order() {
        let mut circuit = Circuit::new();
        let a = circuit.add_node("a", false);
        let b = circuit.add_node("b", false);
        let mut r = Component::resistor("R", 1.0);
        r.connect(a, b);
        circuit.add_component(r);
        assert_eq!(circuit.reference_node(), Some(a));
    }

    #[test]
    fn divider_with_constrained_source_is_exact() {
        let (mut circuit, gnd, n1, n2) = divider(SolverConfig::default());
        let report = circuit.solve().expect("divider solves");
        assert_eq!(report.reference, gnd);
        assert_eq!(report.unknowns, 3);
        assert!(circuit.is_solved());
        assert_relative_eq!(circuit.node(n1).unwrap().voltage().re, 12.0, max_relative = 1e-12);
        assert_relative_eq!(circuit.node(n2).unwrap().voltage().re, 8.0, max_relative = 1e-12);
        let source = circuit.component(ComponentId::new(0)).unwrap();
        assert_relative_eq!(source.current().unwrap().re, -0.02, max_relative = 1e-12);
    }

    #[test]
    fn divider_with_companion_source_is_close() {
        let (mut circuit, _, _, n2) = divider(SolverConfig::companion());
        let report = circuit.solve().expect("divider solves");
        assert_eq!(report.unknowns, 2);
        assert_relative_eq!(circuit.node(n2).unwrap().voltage().re, 8.0, max_relative = 1e-9);
        let r1 = circuit.component(ComponentId::new(1)).unwrap();
        assert_relative_eq!(r1.current().unwrap().re, 0.02, max_relative = 1e-9);
    }

    #[test]
    fn lossy_source_sags_under_load() {
        let mut circuit = Circuit::new();
        let gnd = circuit.add_node("gnd", true);
        let out = circuit.add_node("out", false);
        let mut v = Component::voltage_source(
            "V",
            VoltageSource::dc(10.0).with_internal_resistance(10.0),
        );
        v.connect(out, gnd);
        let mut load = Component::resistor("RL", 40.0);
        load.connect(out, gnd);
        let ids = circuit.add_components([v, load]);
        circuit.solve().expect("solves");
        assert_relative_eq!(circuit.node(out).unwrap().voltage().re, 8.0, max_relative = 1e-12);
        let i = circuit.component(ids[0]).unwrap().current().unwrap();
        assert_relative_eq!(i.re, -0.2, max_relative = 1e-12);
    }

    #[test]
    fn source_between_two_floating_nodes_injects_both_ways() {
        let mut circuit = Circuit::with_config(SolverConfig::companion());
        let gnd = circuit.add_node("gnd", true);
        let a = circuit.add_node("a", false);
        let b = circuit.add_node("b", false);
        let mut v = Component::voltage_source("V", VoltageSource::dc(6.0).with_internal_resistance(1.0e-3));
        v.connect(a, b);
        let mut ra = Component::resistor("Ra", 1_000.0);
        ra.connect(a, gnd);
        let mut rb = Component::resistor("Rb", 1_000.0);
        rb.connect(b, gnd);
        circuit.add_components([v, ra, rb]);
        circuit.solve().expect("solves");
        let va = circuit.node(a).unwrap().voltage().re;
        let vb = circuit.node(b).unwrap().voltage().re;
        assert_relative_eq!(va, 3.0, max_relative = 1e-5);
        assert_relative_eq!(vb, -3.0, max_relative = 1e-5);
    }

    #[test]
    fn mixed_frequencies_warn_and_use_first_source() {
        let mut circuit = Circuit::new();
        let gnd = circuit.add_node("gnd", true);
        let a = circuit.add_node("a", false);
        let b = circuit.add_node("b", false);
        let mut dc = Component::voltage_source("Vdc", VoltageSource::dc(1.0).with_internal_resistance(1.0));
        dc.connect(a, gnd);
        let mut v1 = Component::voltage_source("V1", VoltageSource::ac(1.0, 500.0).with_internal_resistance(1.0));
        v1.connect(a, gnd);
        let mut v2 = Component::voltage_source("V2", VoltageSource::ac(1.0, 50.0).with_internal_resistance(1.0));
        v2.connect(b, gnd);
        let mut v3 = Component::voltage_source("V3", VoltageSource::ac(1.0, 500.0).with_internal_resistance(1.0));
        v3.connect(b, gnd);
        circuit.add_components([dc, v1, v2, v3]);
        let report = circuit.solve().expect("solves despite warning");
        assert_relative_eq!(report.frequency, 500.0);
        assert_relative_eq!(circuit.frequency(), 500.0);
        assert_eq!(
            report.warnings,
            vec![SolveWarning::MixedFrequencies { used: 500.0, others: vec![50.0] }]
        );
    }

    #[test]
    fn override_applies_only_without_ac_sources() {
        let (mut circuit, _, _, _) = divider(SolverConfig::default());
        circuit.set_frequency(60.0);
        assert_relative_eq!(circuit.solve().unwrap().frequency, 60.0);

        let source = circuit.sources()[0];
        circuit.source_mut(source).unwrap().frequency = 1_000.0;
        assert_relative_eq!(circuit.solve().unwrap().frequency, 1_000.0);
    }

    #[test]
    fn negative_frequency_is_rejected() {
        let (mut circuit, _, _, _) = divider(SolverConfig::default());
        circuit.set_frequency(-1.0);
        let err = circuit.solve().unwrap_err();
        assert_eq!(
            err,
            CircuitError::Configuration(ConfigurationError::InvalidFrequency { frequency: -1.0 })
        );
    }

    #[test]
    fn single_node_fails_without_panicking() {
        let mut circuit = Circuit::new();
        circuit.add_node("only", true);
        let err = circuit.solve().unwrap_err();
        assert_eq!(err, CircuitError::from(ConfigurationError::TooFewNodes { found: 1 }));
        assert!(!circuit.is_solved());
    }

    #[test]
    fn unconnected_component_fails() {
        let (mut circuit, _, _, _) = divider(SolverConfig::default());
        circuit.add_component(Component::capacitor("C", 1e-6));
        let err = circuit.solve().unwrap_err();
        assert!(matches!(
            err,
            CircuitError::Configuration(ConfigurationError::Unconnected { ref name, .. }) if name == "C"
        ));
    }

    #[test]
    fn self_loop_fails() {
        let (mut circuit, _, n1, _) = divider(SolverConfig::default());
        let mut r = Component::resistor("Rloop", 1.0);
        r.connect(n1, n1);
        circuit.add_component(r);
        let err = circuit.solve().unwrap_err();
        assert!(matches!(
            err,
            CircuitError::Configuration(ConfigurationError::DuplicateEndpoint { node, .. }) if node == n1
        ));
    }

    #[test]
    fn foreign_node_handle_fails() {
        let mut other = Circuit::new();
        for k in 0..5 {
            other.add_node(format!("x{k}"), false);
        }
        let foreign = other.add_node("foreign", false);

        let (mut circuit, gnd, _, _) = divider(SolverConfig::default());
        let mut r = Component::resistor("R", 1.0);
        r.connect(foreign, gnd);
        circuit.add_component(r);
        let err = circuit.solve().unwrap_err();
        assert_eq!(err, CircuitError::from(ConfigurationError::UnknownNode { node: foreign }));
    }

    #[test]
    fn floating_node_is_singular() {
        let (mut circuit, _, _, _) = divider(SolverConfig::default());
        let island = circuit.add_node("island", false);
        let err = circuit.solve().unwrap_err();
        assert!(err.is_numerical());
        assert!(matches!(
            err,
            CircuitError::Numerical(NumericalError::SingularMatrix { ref floating, .. })
                if floating == &vec![island]
        ));
    }

    #[test]
    fn floating_rlc_island_is_singular() {
        let mut circuit = Circuit::new();
        let gnd = circuit.add_node("gnd", true);
        let a = circuit.add_node("a", false);
        let x = circuit.add_node("x", false);
        let y = circuit.add_node("y", false);
        let z = circuit.add_node("z", false);
        let mut v = Component::voltage_source("V", VoltageSource::ac(1.0, 1234.5));
        v.connect(a, gnd);
        let mut load = Component::resistor("RL", 1.0e3);
        load.connect(a, gnd);
        let mut r1 = Component::resistor("R1", 3.3e3);
        r1.connect(x, y);
        let mut c1 = Component::capacitor("C1", 4.7e-9);
        c1.connect(y, z);
        let mut l1 = Component::inductor("L1", 0.37e-3);
        l1.connect(z, x);
        let mut r2 = Component::resistor("R2", 7.1);
        r2.connect(x, z);
        circuit.add_components([v, load, r1, c1, l1, r2]);

        let (determinant_log10, floating) = match circuit.solve().unwrap_err() {
            CircuitError::Numerical(NumericalError::SingularMatrix {
                determinant_log10,
                floating,
            }) => (determinant_log10, floating),
            other => panic!("expected a singular system, got {other:?}"),
        };
        assert_eq!(floating, vec![x, y, z]);
        assert_eq!(determinant_log10, Scalar::NEG_INFINITY);
        assert!(!circuit.is_solved());
        assert_eq!(circuit.node(x).unwrap().voltage(), ZERO);
    }

    #[test]
    fn clamped_short_keeps_kirchhoff_current_law() {
        let mut circuit = Circuit::new();
        let gnd = circuit.add_node("gnd", true);
        let a = circuit.add_node("a", false);
        let b = circuit.add_node("b", false);
        let mut v = Component::voltage_source("V", VoltageSource::dc(1.0));
        v.connect(a, gnd);
        let mut r1 = Component::resistor("R1", 1.0);
        r1.connect(a, b);
        let mut r2 = Component::resistor("R2", 1.0e-13);
        r2.connect(b, gnd);
        let ids = circuit.add_components([v, r1, r2]);
        circuit.solve().expect("solves");

        let i1 = circuit.component(ids[1]).unwrap().current().unwrap();
        let i2 = circuit.component(ids[2]).unwrap().current().unwrap();
        assert_relative_eq!(i1.re, 1.0, max_relative = 1e-9);
        assert_relative_eq!(i2.re, i1.re, max_relative = 1e-9);
        let source = circuit.component(ids[0]).unwrap().current().unwrap();
        assert_relative_eq!(source.re, -i1.re, max_relative = 1e-9);
    }

    #[test]
    fn clamped_companion_source_keeps_kirchhoff_current_law() {
        let mut circuit = Circuit::with_config(SolverConfig::companion());
        let gnd = circuit.add_node("gnd", true);
        let a = circuit.add_node("a", false);
        let mut v = Component::voltage_source(
            "V",
            VoltageSource::dc(1.0).with_internal_resistance(1.0e-13),
        );
        v.connect(a, gnd);
        let mut load = Component::resistor("RL", 1.0);
        load.connect(a, gnd);
        let ids = circuit.add_components([v, load]);
        circuit.solve().expect("solves");

        let source = circuit.component(ids[0]).unwrap().current().unwrap();
        let load = circuit.component(ids[1]).unwrap().current().unwrap();
        assert_relative_eq!(load.re, 1.0, max_relative = 1e-9);
        // V(a) - 1 loses about four digits before the 1e12 scaling.
        assert_relative_eq!(source.re + load.re, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn clamped_source_reports_ill_conditioning() {
        let (mut circuit, _, _, _) = divider(SolverConfig::companion());
        let report = circuit.solve().expect("warning only");
        let cond = report.cond_estimate.expect("finite pivots");
        assert!(cond > 1.0e12);
        assert_eq!(
            report.warnings,
            vec![SolveWarning::IllConditioned { cond_estimate: cond }]
        );

        circuit.set_config(SolverConfig {
            ill_conditioned: 1.0e20,
            ..SolverConfig::companion()
        });
        assert!(circuit.solve().expect("solves").warnings.is_empty());

        let (mut exact, _, _, _) = divider(SolverConfig::default());
        assert!(exact.solve().expect("solves").warnings.is_empty());
    }

    #[test]
    fn failed_solve_keeps_previous_voltages() {
        let (mut circuit, _, _, n2) = divider(SolverConfig::default());
        circuit.solve().unwrap();
        let before = circuit.node(n2).unwrap().voltage();
        circuit.add_node("island", false);
        assert!(circuit.solve().is_err());
        assert!(!circuit.is_solved());
        assert_eq!(circuit.node(n2).unwrap().voltage(), before);
    }

    #[test]
    fn rewiring_moves_priority() {
        let mut circuit = Circuit::new();
        let a = circuit.add_node("a", false);
        let b = circuit.add_node("b", false);
        let c = circuit.add_node("c", false);
        let mut v = Component::voltage_source("V", VoltageSource::dc(1.0));
        v.connect(a, b);
        let id = circuit.add_component(v);
        assert_eq!(circuit.node(a).unwrap().priority(), 1);

        circuit.connect(id, b, c).unwrap();
        assert_eq!(circuit.node(a).unwrap().priority(), 0);
        assert!(circuit.node(a).unwrap().components().is_empty());
        assert_eq!(circuit.node(b).unwrap().priority(), 1);
        assert_eq!(circuit.node(c).unwrap().components(), &[id]);
        assert_eq!(circuit.reference_node(), Some(b));
    }

    #[test]
    fn connect_rejects_unknown_handles() {
        let (mut circuit, gnd, n1, _) = divider(SolverConfig::default());
        let err = circuit.connect(ComponentId::new(99), n1, gnd).unwrap_err();
        assert_eq!(
            err,
            CircuitError::from(ConfigurationError::UnknownComponent { component: ComponentId::new(99) })
        );
    }

    #[test]
    fn set_value_updates_next_solve() {
        let (mut circuit, _, _, n2) = divider(SolverConfig::default());
        circuit.set_value(ComponentId::new(2), 200.0).unwrap();
        circuit.solve().unwrap();
        assert_relative_eq!(circuit.node(n2).unwrap().voltage().re, 6.0, max_relative = 1e-12);
    }

    #[test]
    fn display_lists_components_and_nodes() {
        let (mut circuit, _, _, _) = divider(SolverConfig::default());
        circuit.solve().unwrap();
        let dump = circuit.to_string();
        assert!(dump.starts_with("Circuit:\n  Frequency: 0 Hz\n  Components: 3\n"));
        assert!(dump.contains("    V: 12+0i V, f=0 Hz, Rint=0 Ω\n"));
        assert!(dump.contains("  Nodes: 3\n    gnd: V=0+0i V, 2 attached component(s) [ground]\n"));
    }

    #[test]
    fn complex_source_phase_propagates() {
        let mut circuit = Circuit::new();
        let gnd = circuit.add_node("gnd", true);
        let out = circuit.add_node("out", false);
        let mut v = Component::voltage_source("V", VoltageSource::ac(Complex::new(0.0, 5.0), 50.0));
        v.connect(out, gnd);
        let mut r = Component::resistor("R", 5.0);
        r.connect(out, gnd);
        let ids = circuit.add_components([v, r]);
        circuit.solve().unwrap();
        let i = circuit.component(ids[1]).unwrap().current().unwrap();
        assert_relative_eq!(i.re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(i.im, 1.0, max_relative = 1e-12);
        let p = circuit.component(ids[1]).unwrap().power().unwrap();
        assert_relative_eq!(p.re, 5.0, max_relative = 1e-12);
    }
}
