use crate::telemetry::events::ServiceMsg;
use signal_hook::{
    consts::{SIGINT, SIGTERM},
    iterator::Signals,
};
use tokio::sync::mpsc::Sender;

const FORCED_EXIT_CODE: i32 = 130;

#[derive(Debug, PartialEq, Eq)]
enum ShutdownStep {
    /// Let the refresh service write its last snapshot and stop.
    Stop,
    /// The service did not stop after the first signal.
    Exit,
}

fn shutdown_step(signals_received: usize) -> ShutdownStep {
    if signals_received <= 1 {
        ShutdownStep::Stop
    } else {
        ShutdownStep::Exit
    }
}

/// Asks the refresh service to stop on SIGINT or SIGTERM so the last
/// snapshot gets written before the process exits. A second signal exits
/// right away.
pub fn handle_shutdown(tx: Sender<ServiceMsg>) -> std::io::Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;

    std::thread::spawn(move || {
        for (received, signal) in signals.forever().enumerate() {
            match shutdown_step(received + 1) {
                ShutdownStep::Stop => {
                    log::warn!("Received signal {signal}, shutting down");
                    if tx.blocking_send(ServiceMsg::Stop).is_err() {
                        log::error!("Refresh service already stopped");
                    }
                }
                ShutdownStep::Exit => {
                    log::error!("Received signal {signal} again, exiting without a final snapshot");
                    std::process::exit(FORCED_EXIT_CODE);
                }
            }
        }
    });

    Ok(())
}
