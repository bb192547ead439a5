use plotland::PlayerId;

/// Fire-and-forget delivery of outbound messages.
///
/// The service calls this synchronously but treats every failure as
/// non-fatal: a delivery error is logged and dropped, never
/// propagated into the action that produced the message.
pub trait Notify: Send + Sync {
    fn deliver(&self, to: &PlayerId, text: &str) -> anyhow::Result<()>;
}

/// Discards everything. Used when no transport is attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullNotify;

impl Notify for NullNotify {
    fn deliver(&self, _to: &PlayerId, _text: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Prints deliveries to stdout. Used by the local REPL binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleNotify;

impl Notify for ConsoleNotify {
    fn deliver(&self, to: &PlayerId, text: &str) -> anyhow::Result<()> {
        println!("[to {}] {}", to, text);
        Ok(())
    }
}
