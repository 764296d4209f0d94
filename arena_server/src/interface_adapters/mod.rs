// Interface adapters: wire protocol, HTTP endpoints and socket handling.

pub mod http;
pub mod net;
pub mod protocol;
pub mod state;
pub mod utils;
