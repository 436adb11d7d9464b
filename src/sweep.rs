//! Frequency sweep utilities and post-processing helpers.

use log::debug;
use num_complex::Complex;

use crate::circuits::{Circuit, ComponentId, Element, NodeId};
use crate::constants::{lc_resonant_frequency, rc_corner_frequency};
use crate::errors::{ConfigurationError, Result};
use crate::math::{wrap_degrees, CScalar, Scalar};

/// Gain reported for a zero response or a zero reference amplitude.
pub const GAIN_FLOOR_DB: Scalar = -100.0;
/// Magnitudes below this count as zero when forming ratios.
const MIN_MAGNITUDE: Scalar = 1e-12;

/// Generates `n` linearly spaced samples in [start, stop].
#[must_use]
pub fn linspace(start: Scalar, stop: Scalar, n: usize) -> Vec<Scalar> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as Scalar - 1.0);
            (0..n).map(|i| start + step * i as Scalar).collect()
        }
    }
}

/// Generates `n` logarithmically spaced samples between `start` and `stop` (Hz).
///
/// # Panics
///
/// Panics unless both bounds are positive.
#[must_use]
pub fn logspace_hz(start_hz: Scalar, stop_hz: Scalar, n: usize) -> Vec<Scalar> {
    assert!(start_hz > 0.0 && stop_hz > 0.0);
    match n {
        0 => Vec::new(),
        1 => vec![start_hz],
        _ => {
            let log_start = start_hz.log10();
            let log_stop = stop_hz.log10();
            let step = (log_stop - log_start) / (n as Scalar - 1.0);
            (0..n)
                .map(|i| 10f64.powf(log_start + step * i as Scalar))
                .collect()
        }
    }
}

/// Magnitude of complex sequence.
#[must_use]
pub fn mag(values: impl IntoIterator<Item = Complex<Scalar>>) -> Vec<Scalar> {
    values.into_iter().map(|v| v.norm()).collect()
}

/// Magnitude in dB (20*log10(|x|)), clamping very small values.
#[must_use]
pub fn mag_db(values: impl IntoIterator<Item = Complex<Scalar>>) -> Vec<Scalar> {
    const MIN: Scalar = 1e-300;
    values
        .into_iter()
        .map(|v| 20.0 * (v.norm().max(MIN)).log10())
        .collect()
}

/// Phase in degrees of complex sequence.
#[must_use]
pub fn phase_deg(values: impl IntoIterator<Item = Complex<Scalar>>) -> Vec<Scalar> {
    values.into_iter().map(|v| v.arg().to_degrees()).collect()
}

/// One sample of a frequency response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponsePoint {
    /// Source frequency in hertz.
    pub frequency: Scalar,
    /// `(V(to) - V(from)) / Vs`, or `None` when the solve at this frequency failed.
    pub transfer: Option<CScalar>,
}

impl ResponsePoint {
    /// Gain in dB, floored at [`GAIN_FLOOR_DB`].
    #[must_use]
    pub fn gain_db(&self) -> Option<Scalar> {
        self.transfer.map(|h| {
            let m = h.norm();
            if m < MIN_MAGNITUDE {
                GAIN_FLOOR_DB
            } else {
                (20.0 * m.log10()).max(GAIN_FLOOR_DB)
            }
        })
    }

    /// Phase in degrees, wrapped to `[-180, 180)`; zero for a vanishing response.
    #[must_use]
    pub fn phase_deg(&self) -> Option<Scalar> {
        self.transfer.map(|h| {
            if h.norm() < MIN_MAGNITUDE {
                0.0
            } else {
                wrap_degrees(h.arg().to_degrees())
            }
        })
    }
}

/// Drives every voltage source at each of `frequencies`, solves, and records the
/// voltage from `from` to `to` relative to the first source's phasor.
///
/// Points whose solve fails carry `transfer: None`; the sweep continues. Source
/// frequencies are restored and the circuit re-solved before returning.
pub fn frequency_response<I>(
    circuit: &mut Circuit,
    from: NodeId,
    to: NodeId,
    frequencies: I,
) -> Vec<ResponsePoint>
where
    I: IntoIterator<Item = Scalar>,
{
    let sources = circuit.sources();
    let saved: Vec<Scalar> = sources
        .iter()
        .filter_map(|&id| circuit.component(id))
        .filter_map(|c| c.element().as_source())
        .map(|s| s.frequency)
        .collect();
    let reference = sources
        .first()
        .and_then(|&id| circuit.component(id))
        .and_then(|c| c.element().as_source())
        .map(|s| s.voltage);

    let mut out = Vec::new();
    for frequency in frequencies {
        for &id in &sources {
            if let Some(source) = circuit.source_mut(id) {
                source.frequency = frequency;
            }
        }
        let transfer = match circuit.solve() {
            Ok(_) => circuit.voltage_between(from, to).map(|v| match reference {
                Some(vs) if vs.norm() >= MIN_MAGNITUDE => v / vs,
                _ => Complex::new(0.0, 0.0),
            }),
            Err(err) => {
                debug!("frequency response point {frequency} Hz skipped: {err}");
                None
            }
        };
        out.push(ResponsePoint { frequency, transfer });
    }

    for (&id, &frequency) in sources.iter().zip(&saved) {
        if let Some(source) = circuit.source_mut(id) {
            source.frequency = frequency;
        }
    }
    if let Err(err) = circuit.solve() {
        debug!("re-solve after frequency response failed: {err}");
    }
    out
}

/// Like [`frequency_response`], measuring `V(node_a) - V(node_b)` across `component`.
///
/// # Errors
///
/// Fails before sweeping when `component` is not part of the circuit or is not
/// connected to two distinct nodes.
pub fn frequency_response_across<I>(
    circuit: &mut Circuit,
    component: ComponentId,
    frequencies: I,
) -> Result<Vec<ResponsePoint>>
where
    I: IntoIterator<Item = Scalar>,
{
    let target = circuit
        .component(component)
        .ok_or(ConfigurationError::UnknownComponent { component })?;
    let (a, b) = target
        .terminals()
        .ok_or_else(|| ConfigurationError::Unconnected {
            component,
            name: target.name().to_owned(),
        })?;
    Ok(frequency_response(circuit, b, a, frequencies))
}

/// Frequency span (Hz) worth sweeping: two decades around every RC corner and LC
/// resonance formed by pairs of components, or 1 Hz – 1 MHz when there are none.
#[must_use]
pub fn auto_frequency_range(circuit: &Circuit) -> (Scalar, Scalar) {
    let mut resistors = Vec::new();
    let mut capacitors = Vec::new();
    let mut inductors = Vec::new();
    for (_, component) in circuit.components() {
        match component.element() {
            Element::Resistor(r) if r.resistance > 0.0 => resistors.push(r.resistance),
            Element::Capacitor(c) if c.capacitance > 0.0 => capacitors.push(c.capacitance),
            Element::Inductor(l) if l.inductance > 0.0 => inductors.push(l.inductance),
            _ => {}
        }
    }

    let corners = capacitors.iter().flat_map(|&c| {
        resistors
            .iter()
            .map(move |&r| rc_corner_frequency(r, c))
            .chain(inductors.iter().map(move |&l| lc_resonant_frequency(l, c)))
    });
    let (lo, hi) = corners.fold((Scalar::INFINITY, 0.0_f64), |(lo, hi), f| (lo.min(f), hi.max(f)));
    if lo.is_finite() && hi > 0.0 {
        (lo / 100.0, hi * 100.0)
    } else {
        (1.0, 1.0e6)
    }
}
