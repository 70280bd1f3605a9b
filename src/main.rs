use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use psxstub::monitor::Monitor;
use psxstub::{Debugger, GdbStub};

/// If the monitor hasn't terminated a reply in this long, the target is
/// considered dead and the RSP request fails with `E01`.
const SERIAL_TIMEOUT: Duration = Duration::from_secs(3);

/// GDB remote stub bridging the PlayStation serial debug monitor.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Serial device connected to the console, e.g. /dev/ttyUSB0
    #[arg(long)]
    device: String,

    /// TCP port to listen on for GDB
    #[arg(long, default_value_t = 8888)]
    port: u16,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let port = serialport::new(&args.device, 115_200)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(SERIAL_TIMEOUT)
        .open()
        .with_context(|| format!("failed to open serial device {}", args.device))?;

    info!("serial device to console: {}", args.device);

    let debugger: Arc<Mutex<Debugger<Box<dyn SerialPort>>>> =
        Arc::new(Mutex::new(Debugger::new(Monitor::new(port))));

    let listener = TcpListener::bind(("0.0.0.0", args.port))
        .with_context(|| format!("failed to bind tcp port {}", args.port))?;

    info!("listening for GDB on tcp port {}", args.port);

    loop {
        let (stream, addr) = match listener.accept() {
            Ok(client) => client,
            Err(e) => {
                warn!("failed to accept connection: {}", e);
                continue;
            }
        };

        info!("GDB connected from {}", addr);

        let debugger = Arc::clone(&debugger);
        thread::spawn(move || match GdbStub::new(stream).run(&debugger) {
            Ok(()) => info!("GDB session ended"),
            Err(e) => error!("GDB session aborted: {}", e),
        });
    }
}
