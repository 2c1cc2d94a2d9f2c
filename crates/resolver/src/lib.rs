pub use batch_reader::{BatchCall, BatchReader};
pub use multicall_reader::MulticallBatchReader;
pub use resolver::{PositionResolver, ResolveStage, ResolvedPositions};
pub use worker::resolver_worker;

mod batch_reader;
mod multicall_reader;
mod resolver;
mod worker;

#[cfg(test)]
mod testkit;
