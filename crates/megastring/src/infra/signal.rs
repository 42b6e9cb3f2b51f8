//! Interrupt handling.

use std::io;
use std::pin::pin;
use std::thread;

use crossbeam_channel::{Receiver, bounded};

/// Spawn a thread that waits for Ctrl-C and reports it on the returned channel.
///
/// The thread drives a current-thread `tokio` runtime solely for `tokio::signal`.
/// Returns only once the handler is registered, so an interrupt arriving right
/// after this call is delivered on the channel instead of killing the process.
/// If the handler cannot be installed the sender is kept alive, so the receiver
/// never fires and the process can still be stopped by other means.
pub fn interrupt_channel() -> io::Result<Receiver<()>> {
    let (tx, rx) = bounded(1);
    let (ready_tx, ready_rx) = bounded(1);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("megastring-interrupt".into())
        .spawn(move || {
            runtime.block_on(async move {
                let mut ctrl_c = pin!(tokio::signal::ctrl_c());
                // The first poll installs the handler.
                let early = tokio::select! {
                    biased;
                    result = &mut ctrl_c => Some(result),
                    () = std::future::ready(()) => None,
                };
                let _ = ready_tx.send(());

                let result = match early {
                    Some(result) => result,
                    None => ctrl_c.await,
                };
                match result {
                    Ok(()) => {
                        tracing::debug!("interrupt received");
                        let _ = tx.send(());
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "failed to listen for Ctrl-C");
                        std::future::pending::<()>().await;
                    }
                }
            });
        })?;

    ready_rx
        .recv()
        .map_err(|_| io::Error::other("interrupt listener exited before it was ready"))?;
    Ok(rx)
}
