mod dispatcher;
mod table;

pub use dispatcher::Dispatcher;
pub use table::MethodFn;
pub use table::MethodFuture;
pub use table::MethodTable;
pub use table::arg;

use crate::channel::{LocalChannel, local_pair};

#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// Maximum number of calls executing at once; further inbound calls
    /// wait for a permit before their method body starts.
    pub concurrency: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig { concurrency: 16 }
    }
}

/// Starts a dispatcher for `target` on a fresh in-process channel pair and
/// returns the caller end: the local stand-in for spawning a remote worker
/// context.
pub fn spawn_local<T>(target: T, table: MethodTable<T>) -> LocalChannel
where
    T: Send + Sync + 'static,
{
    let (host, worker) = local_pair();
    Dispatcher::new(target, table, worker).start();
    host
}
