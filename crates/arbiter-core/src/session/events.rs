use super::*;

use contracts::{ActorRef, EventType, SCHEMA_VERSION_V1};
use serde_json::Value;

impl Session {
    pub(super) fn push_event(
        &mut self,
        event_type: EventType,
        actors: Vec<ActorRef>,
        details: Option<Value>,
    ) {
        let sequence_in_turn = self.sequence_in_turn;
        self.sequence_in_turn = self.sequence_in_turn.saturating_add(1);

        let event_id = format!(
            "evt_{}_{}_{}",
            self.config.session_id, self.turn_number, sequence_in_turn
        );
        self.event_log.push(Event {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            session_id: self.config.session_id.clone(),
            turn: self.turn_number,
            sequence_in_turn,
            event_id,
            event_type,
            actors,
            details,
        });
    }
}
