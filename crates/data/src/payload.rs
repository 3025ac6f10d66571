use glint_core::{Payload, PayloadCodec, PayloadError, WorldContext};

/// Writes payloads as compact JSON in the `nbt` slot and checks item ids
/// against the world's registry in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPayloadCodec;

impl JsonPayloadCodec {
    fn check_item(payload: &Payload, world: &WorldContext) -> Result<(), PayloadError> {
        if world.items().contains(&payload.item) {
            Ok(())
        } else {
            Err(PayloadError::UnknownItem {
                item: payload.item.clone(),
                world: world.id().to_string(),
            })
        }
    }
}

impl PayloadCodec for JsonPayloadCodec {
    fn encode(&self, payload: &Payload, world: &WorldContext) -> Result<String, PayloadError> {
        if payload.is_empty() {
            return Err(PayloadError::Empty);
        }
        Self::check_item(payload, world)?;
        serde_json::to_string(payload).map_err(|err| PayloadError::Malformed(err.to_string()))
    }

    fn decode(&self, encoded: &str, world: &WorldContext) -> Result<Payload, PayloadError> {
        let payload: Payload =
            serde_json::from_str(encoded).map_err(|err| PayloadError::Malformed(err.to_string()))?;
        if payload.is_empty() {
            return Ok(Payload::empty());
        }
        Self::check_item(&payload, world)?;
        Ok(payload)
    }
}
