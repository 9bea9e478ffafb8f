//! Append-only gameplay event log

use serde::{Deserialize, Serialize};

use super::player::PowerState;

/// Kind of notable occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// A block was bumped from below (param: tile code)
    Bump,
    StompKill,
    FireKill,
    ShellKill,
    FallKill,
    /// Knocked out by a block bumped from below (param: sprite type code)
    BumpKill,
    /// param 0 for a ground jump, 1 for a wall jump
    Jump,
    /// Back on the ground (param: ticks spent airborne)
    Land,
    /// A power-up was picked up (param: sprite type code)
    Collect,
    /// param: tile code of the coin's source, or the pickup's type code
    Coin,
    Hurt,
    Kick,
    Win,
    Lose,
    TimeOut,
}

impl EventKind {
    pub fn is_kill(self) -> bool {
        matches!(
            self,
            EventKind::StompKill
                | EventKind::FireKill
                | EventKind::ShellKill
                | EventKind::FallKill
                | EventKind::BumpKill
        )
    }
}

/// One logged event, stamped with the player's state when it happened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub param: i32,
    pub tick: u32,
    pub x: f32,
    pub y: f32,
    pub power: PowerState,
}

/// Events in the order they were raised
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn count_where(&self, kind: EventKind, param: i32) -> usize {
        self.events
            .iter()
            .filter(|e| e.kind == kind && e.param == param)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind, param: i32, tick: u32) -> Event {
        Event {
            kind,
            param,
            tick,
            x: 0.0,
            y: 0.0,
            power: PowerState::Small,
        }
    }

    #[test]
    fn test_counts_by_kind_and_param() {
        let mut log = EventLog::new();
        log.extend([
            event(EventKind::Coin, 15, 1),
            event(EventKind::Coin, 11, 2),
            event(EventKind::StompKill, 2, 3),
        ]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.count(EventKind::Coin), 2);
        assert_eq!(log.count_where(EventKind::Coin, 15), 1);
        assert_eq!(log.as_slice()[2].tick, 3);
    }

    #[test]
    fn test_kill_kinds() {
        assert!(EventKind::FallKill.is_kill());
        assert!(!EventKind::Hurt.is_kill());
    }

    #[test]
    fn test_kind_serializes_screaming() {
        let json = serde_json::to_string(&EventKind::StompKill).unwrap();
        assert_eq!(json, "\"STOMP_KILL\"");
    }
}
