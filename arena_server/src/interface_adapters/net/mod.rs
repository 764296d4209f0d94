// Network adapter modules split by external client sockets vs internal HTTP routes.

pub mod client;
pub mod internal;

pub use client::{AddressedBytes, event_serializer, world_update_serializer, ws_handler};
pub use internal::{match_created_handler, match_settled_handler, purchase_handler};
