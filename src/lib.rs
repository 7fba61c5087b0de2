//! Low-level building blocks for request/response RPC over shared list queues.
//!
//! A caller pushes a [`envelope::Call`] onto a service's request list and
//! blocks on a response list derived from the call's id. A server pops
//! calls from the request list and pushes an [`envelope::Reply`] back onto
//! that same derived list. This crate holds the wire envelopes, the channel
//! naming rules, and the queue transport boundary; the `extensions/` crates
//! build the client and server on top of them.

pub mod channel;
pub mod constants;
pub mod envelope;
pub mod queue;
pub mod utils;
