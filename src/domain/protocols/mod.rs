//! Wire protocol: JSON-RPC 2.0 frames, field packing, and shared names.

pub mod contract;
pub mod json_pack;
pub mod json_rpc;
