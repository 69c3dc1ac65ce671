/*!
 * Host Object Model
 *
 * Raw, untrusted host objects the membrane wraps. The membrane treats them
 * as opaque bags of named properties; nothing in here knows about keys.
 */

pub mod object;
pub mod value;

pub use object::{HostObject, HostRef};
pub use value::{HostFunction, HostValue};
