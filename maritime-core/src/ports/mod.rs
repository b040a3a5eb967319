mod inbound;
mod outbound;

pub use inbound::*;
pub use outbound::*;

/// Everything the ingestion pipeline needs from storage.
pub trait IngestionStorage: AisIngestionInbound + AisIngestionOutbound {}

impl<T> IngestionStorage for T where T: AisIngestionInbound + AisIngestionOutbound {}
