use std::fmt;

use num_complex::Complex;

use crate::config::SolverConfig;
use crate::constants::{angular_frequency, OPEN_CIRCUIT_IMPEDANCE, SHORT_CIRCUIT_IMPEDANCE};
use crate::math::{CScalar, Scalar, ZERO};

use super::node::NodeId;

/// Frequency-domain impedance law of a two-terminal element.
pub trait Impedance {
    /// Returns the element's impedance at `frequency` (Hz).
    fn impedance(&self, frequency: Scalar) -> CScalar;
}

/// Lumped resistor model.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Resistor {
    /// Resistance in ohms.
    pub resistance: Scalar,
}

impl Resistor {
    /// Creates a resistor.
    #[must_use]
    pub const fn new(resistance_ohms: Scalar) -> Self {
        Self {
            resistance: resistance_ohms,
        }
    }
}

impl Impedance for Resistor {
    fn impedance(&self, _frequency: Scalar) -> CScalar {
        Complex::new(self.resistance, 0.0)
    }
}

/// Lumped capacitor model (ideal).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Capacitor {
    /// Capacitance in farads.
    pub capacitance: Scalar,
}

impl Capacitor {
    /// Creates a capacitor.
    #[must_use]
    pub const fn new(capacitance_f: Scalar) -> Self {
        Self {
            capacitance: capacitance_f,
        }
    }
}

impl Impedance for Capacitor {
    /// At DC the capacitor is an open circuit, modelled by [`OPEN_CIRCUIT_IMPEDANCE`].
    fn impedance(&self, frequency: Scalar) -> CScalar {
        if frequency == 0.0 {
            Complex::new(OPEN_CIRCUIT_IMPEDANCE, 0.0)
        } else {
            Complex::new(0.0, -1.0 / (angular_frequency(frequency) * self.capacitance))
        }
    }
}

/// Lumped inductor model (ideal).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Inductor {
    /// Inductance in henries.
    pub inductance: Scalar,
}

impl Inductor {
    /// Creates an inductor.
    #[must_use]
    pub const fn new(inductance_h: Scalar) -> Self {
        Self {
            inductance: inductance_h,
        }
    }
}

impl Impedance for Inductor {
    /// At DC the inductor is a short, modelled by [`SHORT_CIRCUIT_IMPEDANCE`].
    fn impedance(&self, frequency: Scalar) -> CScalar {
        if frequency == 0.0 {
            Complex::new(SHORT_CIRCUIT_IMPEDANCE, 0.0)
        } else {
            Complex::new(0.0, angular_frequency(frequency) * self.inductance)
        }
    }
}

/// Sinusoidal (or DC) voltage source with a series internal resistance.
///
/// The positive terminal is the component's `node_a`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageSource {
    /// Source phasor (peak amplitude and phase).
    pub voltage: CScalar,
    /// Source frequency in hertz; zero for DC.
    pub frequency: Scalar,
    /// Series resistance in ohms; zero for an ideal source.
    pub internal_resistance: Scalar,
}

impl VoltageSource {
    /// Creates a source.
    #[must_use]
    pub fn new(voltage: impl Into<CScalar>, frequency: Scalar, internal_resistance: Scalar) -> Self {
        Self {
            voltage: voltage.into(),
            frequency,
            internal_resistance,
        }
    }

    /// Ideal DC source.
    #[must_use]
    pub fn dc(voltage: Scalar) -> Self {
        Self::new(voltage, 0.0, 0.0)
    }

    /// Ideal AC source at `frequency` hertz.
    #[must_use]
    pub fn ac(voltage: impl Into<CScalar>, frequency: Scalar) -> Self {
        Self::new(voltage, frequency, 0.0)
    }

    /// Sets the series resistance.
    #[must_use]
    pub fn with_internal_resistance(mut self, ohms: Scalar) -> Self {
        self.internal_resistance = ohms;
        self
    }

    /// True for a source with a nonzero frequency.
    #[must_use]
    pub fn is_ac(&self) -> bool {
        self.frequency > 0.0
    }
}

impl Impedance for VoltageSource {
    /// The source's own branch impedance, used for companion-model injection only.
    fn impedance(&self, _frequency: Scalar) -> CScalar {
        Complex::new(self.internal_resistance, 0.0)
    }
}

/// Closed set of element kinds a [`Component`] can carry.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Resistor.
    Resistor(Resistor),
    /// Capacitor.
    Capacitor(Capacitor),
    /// Inductor.
    Inductor(Inductor),
    /// Voltage source.
    VoltageSource(VoltageSource),
}

impl Element {
    /// Impedance at `frequency` (Hz).
    #[must_use]
    pub fn impedance(&self, frequency: Scalar) -> CScalar {
        match self {
            Self::Resistor(r) => r.impedance(frequency),
            Self::Capacitor(c) => c.impedance(frequency),
            Self::Inductor(l) => l.impedance(frequency),
            Self::VoltageSource(s) => s.impedance(frequency),
        }
    }

    /// Branch current from `node_a` to `node_b` given the branch voltage.
    ///
    /// Uses the same admittance the solver stamps, so a branch clamped to
    /// `config.max_admittance` reports the clamped current and KCL holds at every node.
    /// A source is treated as its Norton companion. Returns `None` only for an inductor
    /// at DC; the current of a constrained ideal source comes from the solve instead.
    #[must_use]
    pub fn current(
        &self,
        voltage: CScalar,
        frequency: Scalar,
        config: &SolverConfig,
    ) -> Option<CScalar> {
        match self {
            Self::Capacitor(_) if frequency == 0.0 => Some(ZERO),
            Self::Inductor(_) if frequency == 0.0 => None,
            Self::VoltageSource(s) => {
                Some((voltage - s.voltage) * config.admittance(s.impedance(frequency)))
            }
            other => Some(voltage * config.admittance(other.impedance(frequency))),
        }
    }

    /// Ohms, farads, henries, or the source's internal resistance.
    #[must_use]
    pub const fn value(&self) -> Scalar {
        match self {
            Self::Resistor(r) => r.resistance,
            Self::Capacitor(c) => c.capacitance,
            Self::Inductor(l) => l.inductance,
            Self::VoltageSource(s) => s.internal_resistance,
        }
    }

    /// True for voltage sources.
    #[must_use]
    pub const fn is_source(&self) -> bool {
        matches!(self, Self::VoltageSource(_))
    }

    /// Returns the source parameters when this is a voltage source.
    #[must_use]
    pub const fn as_source(&self) -> Option<&VoltageSource> {
        match self {
            Self::VoltageSource(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable access to the source parameters when this is a voltage source.
    pub fn as_source_mut(&mut self) -> Option<&mut VoltageSource> {
        match self {
            Self::VoltageSource(s) => Some(s),
            _ => None,
        }
    }

    const fn unit(&self) -> &'static str {
        match self {
            Self::Resistor(_) | Self::VoltageSource(_) => "Ω",
            Self::Capacitor(_) => "F",
            Self::Inductor(_) => "H",
        }
    }
}

impl From<Resistor> for Element {
    fn from(value: Resistor) -> Self {
        Self::Resistor(value)
    }
}

impl From<Capacitor> for Element {
    fn from(value: Capacitor) -> Self {
        Self::Capacitor(value)
    }
}

impl From<Inductor> for Element {
    fn from(value: Inductor) -> Self {
        Self::Inductor(value)
    }
}

impl From<VoltageSource> for Element {
    fn from(value: VoltageSource) -> Self {
        Self::VoltageSource(value)
    }
}

/// A named two-terminal element together with its endpoints and last solved state.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    name: String,
    element: Element,
    node_a: Option<NodeId>,
    node_b: Option<NodeId>,
    voltage: CScalar,
    current: Option<CScalar>,
}

impl Component {
    /// Creates an unconnected component.
    #[must_use]
    pub fn new(name: impl Into<String>, element: impl Into<Element>) -> Self {
        Self {
            name: name.into(),
            element: element.into(),
            node_a: None,
            node_b: None,
            voltage: ZERO,
            current: None,
        }
    }

    /// Creates a resistor component.
    #[must_use]
    pub fn resistor(name: impl Into<String>, resistance_ohms: Scalar) -> Self {
        Self::new(name, Resistor::new(resistance_ohms))
    }

    /// Creates a capacitor component.
    #[must_use]
    pub fn capacitor(name: impl Into<String>, capacitance_f: Scalar) -> Self {
        Self::new(name, Capacitor::new(capacitance_f))
    }

    /// Creates an inductor component.
    #[must_use]
    pub fn inductor(name: impl Into<String>, inductance_h: Scalar) -> Self {
        Self::new(name, Inductor::new(inductance_h))
    }

    /// Creates a voltage source component.
    #[must_use]
    pub fn voltage_source(name: impl Into<String>, source: VoltageSource) -> Self {
        Self::new(name, source)
    }

    /// Sets both endpoints. For a source, `node_a` is the positive terminal.
    ///
    /// Use [`Circuit::connect`](super::Circuit::connect) for components already added
    /// to a circuit, so the nodes' attachment lists stay in sync.
    pub fn connect(&mut self, node_a: NodeId, node_b: NodeId) {
        self.node_a = Some(node_a);
        self.node_b = Some(node_b);
    }

    pub(crate) fn set_endpoints(&mut self, node_a: Option<NodeId>, node_b: Option<NodeId>) {
        self.node_a = node_a;
        self.node_b = node_b;
    }

    /// Human-readable identifier (e.g. `R1`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element kind and parameters.
    #[must_use]
    pub const fn element(&self) -> &Element {
        &self.element
    }

    pub(crate) fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    /// First endpoint (positive terminal of a source).
    #[must_use]
    pub const fn node_a(&self) -> Option<NodeId> {
        self.node_a
    }

    /// Second endpoint.
    #[must_use]
    pub const fn node_b(&self) -> Option<NodeId> {
        self.node_b
    }

    /// Both endpoints when they are set and distinct.
    #[must_use]
    pub fn terminals(&self) -> Option<(NodeId, NodeId)> {
        match (self.node_a, self.node_b) {
            (Some(a), Some(b)) if a != b => Some((a, b)),
            _ => None,
        }
    }

    /// True when both endpoints are set and distinct.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.terminals().is_some()
    }

    /// Impedance at `frequency` (Hz).
    #[must_use]
    pub fn impedance(&self, frequency: Scalar) -> CScalar {
        self.element.impedance(frequency)
    }

    /// Element value (see [`Element::value`]).
    #[must_use]
    pub const fn value(&self) -> Scalar {
        self.element.value()
    }

    /// True for voltage sources.
    #[must_use]
    pub const fn is_source(&self) -> bool {
        self.element.is_source()
    }

    /// `V(node_a) - V(node_b)` from the last successful solve.
    #[must_use]
    pub const fn voltage(&self) -> CScalar {
        self.voltage
    }

    /// Current from `node_a` to `node_b` through the component, when determinable.
    #[must_use]
    pub const fn current(&self) -> Option<CScalar> {
        self.current
    }

    /// Complex power `V · conj(I)` absorbed by the component.
    #[must_use]
    pub fn power(&self) -> Option<CScalar> {
        self.current.map(|i| self.voltage * i.conj())
    }

    pub(crate) fn set_solution(&mut self, voltage: CScalar, current: Option<CScalar>) {
        self.voltage = voltage;
        self.current = current;
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element {
            Element::VoltageSource(s) => write!(
                f,
                "{}: {} V, f={} Hz, Rint={} Ω",
                self.name, s.voltage, s.frequency, s.internal_resistance
            ),
            element => {
                write!(f, "{}: {} {}, V={}", self.name, element.value(), element.unit(), self.voltage)?;
                match self.current {
                    Some(i) => write!(f, ", I={i} A"),
                    None => write!(f, ", I=undefined"),
                }
            }
        }
    }
}
