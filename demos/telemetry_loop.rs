//! Telemetry over a local socket pair: one thread streams readings, the other prints them

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use edgeline_core::{Delimiter, LineConfig, LinePort, StreamChannel};
    use std::os::unix::net::UnixStream;

    let (device, host) = UnixStream::pair()?;

    let config = LineConfig::default()
        .with_new_line("\n")
        .with_delimiter(Delimiter::NewLine);

    let sender_config = config.clone();
    let sender = std::thread::spawn(move || -> edgeline_core::Result<()> {
        let mut port = LinePort::with_config(StreamChannel::new(device), sender_config);
        for i in 0..5 {
            port.write_value("light", i * 17)?;
            port.write_numbers(Some(&[i as f64, (i * i) as f64]))?;
        }
        Ok(())
    });

    let mut port = LinePort::with_config(StreamChannel::new(host), config);
    for line in port.reader().lines() {
        println!("received: {}", line?.trim_end());
    }

    sender.join().expect("sender thread panicked")?;
    Ok(())
}

#[cfg(not(unix))]
fn main() {
    eprintln!("telemetry_loop needs Unix domain sockets");
}
