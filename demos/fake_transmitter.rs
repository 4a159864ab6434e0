//! Example: Act as the peer transmitter on the UDP bridge — send a MOTION
//! frame every 30 seconds and print the STATUS broadcasts coming back.

use std::io::ErrorKind;
use std::net::UdpSocket;
use std::time::{Duration, Instant};

fn main() -> anyhow::Result<()> {
    let receiver = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:1700".to_string());

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(&receiver)?;
    socket.set_read_timeout(Some(Duration::from_millis(500)))?;

    println!("Sending MOTION to {receiver} every 30s; printing STATUS replies (Ctrl+C to stop).\n");

    socket.send(br#"{"type":"MOTION","sensor":1}"#)?;
    println!("> MOTION");
    let mut last_motion = Instant::now();

    let mut buf = [0u8; 512];
    loop {
        if last_motion.elapsed() >= Duration::from_secs(30) {
            socket.send(br#"{"type":"MOTION","sensor":1}"#)?;
            println!("> MOTION");
            last_motion = Instant::now();
        }
        match socket.recv(&mut buf) {
            Ok(n) => println!("< {}", String::from_utf8_lossy(&buf[..n])),
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {}
            Err(e) => return Err(e.into()),
        }
    }
}
