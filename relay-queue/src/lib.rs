//! relay-queue: the per-tenant FIFO job queue over Redis — lock
//! acquisition, blocking dequeue, idle cleanup, and the result-slot
//! coupling that turns an asynchronous worker back into a synchronous
//! HTTP reply.

pub mod admission;
pub mod error;
pub mod gateway;
pub mod queue;
pub mod scripts;
pub mod worker;

pub use admission::{admit, wait_for_result, ResultEnvelope};
pub use error::{QueueError, QueueResult};
pub use gateway::KvGateway;
pub use worker::{JobRunner, WorkerRegistry};
