/*!
 * Monitoring Module
 * Structured logging for the membrane runtime
 */

pub mod tracer;

pub use tracer::init_tracing;
