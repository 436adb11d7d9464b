use phasor_nodal::prelude::*;

fn main() {
    let mut circuit = Circuit::new();
    let gnd = circuit.add_node("gnd", true);
    let n1 = circuit.add_node("n1", false);
    let n2 = circuit.add_node("n2", false);

    let mut source = Component::voltage_source("V_source", VoltageSource::dc(12.0));
    source.connect(n1, gnd);
    let mut r1 = Component::resistor("R1", 200.0);
    r1.connect(n1, n2);
    let mut r2 = Component::resistor("R2", 400.0);
    r2.connect(n2, gnd);
    circuit.add_components([source, r1, r2]);

    match circuit.solve() {
        Ok(report) => {
            print!("{circuit}");
            println!("reference: {}, log10|det| = {:.3}", report.reference, report.determinant_log10);
            for warning in &report.warnings {
                println!("warning: {warning}");
            }
        }
        Err(err) => eprintln!("solve failed: {err}"),
    }
}
