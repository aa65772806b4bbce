//! Basic line framing example

use edgeline_core::{channel::Loopback, LineConfig, LinePort};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Edgeline Basic Line Example\n");

    let mut port = LinePort::with_config(Loopback::new(), LineConfig::default());

    port.write_line("hello from the edge")?;
    port.write_value("temp", 21.5)?;
    port.write_numbers(Some(&[1.0, 2.0, 3.0]))?;

    let wire = port.get_ref().pending().to_vec();
    println!("Wire bytes ({} total):", wire.len());
    for chunk in wire.chunks(32) {
        println!("  {:?}", String::from_utf8_lossy(chunk));
    }

    println!("\nLines read back:");
    for line in port.reader().lines() {
        println!("  {:?}", line?.trim_end());
    }

    Ok(())
}
