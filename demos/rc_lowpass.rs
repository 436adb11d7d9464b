use phasor_nodal::prelude::*;

fn main() {
    // First-order low-pass: 100 Ω, 1 µF => corner near 1.59 kHz.
    let mut circuit = Circuit::new();
    let gnd = circuit.add_node("gnd", true);
    let input = circuit.add_node("in", false);
    let out = circuit.add_node("out", false);

    let mut source = Component::voltage_source("V", VoltageSource::ac(phasor_deg(12.0, 30.0), 100.0));
    source.connect(input, gnd);
    let mut r1 = Component::resistor("R1", 100.0);
    r1.connect(input, out);
    let mut c1 = Component::capacitor("C1", 1e-6);
    c1.connect(out, gnd);
    let ids = circuit.add_components([source, r1, c1]);

    match circuit.solve() {
        Ok(_) => {
            let v = circuit.component(ids[2]).map_or(CScalar::new(0.0, 0.0), Component::voltage);
            println!(
                "V(C1) at 100 Hz: {:.4} V at {:.2} deg",
                v.norm(),
                wrap_degrees(v.arg().to_degrees())
            );
        }
        Err(err) => eprintln!("solve failed: {err}"),
    }

    let (lo, hi) = auto_frequency_range(&circuit);
    let points = match frequency_response_across(&mut circuit, ids[2], logspace_hz(lo, hi, 25)) {
        Ok(points) => points,
        Err(err) => {
            eprintln!("sweep failed: {err}");
            return;
        }
    };

    println!("f(Hz), gain(dB), phase(deg)");
    for p in points {
        match (p.gain_db(), p.phase_deg()) {
            (Some(g), Some(ph)) => println!("{:.6e}, {:.3}, {:.2}", p.frequency, g, ph),
            _ => println!("{:.6e}, -, -", p.frequency),
        }
    }
}
