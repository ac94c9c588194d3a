//! Serves recorded interactions back in order.

use std::collections::{HashMap, VecDeque};

use super::format::{Cassette, Interaction};

/// Replays a cassette, one queue per port/method pair.
///
/// Calls to different methods do not have to interleave the way they did
/// while recording; only the order within one method matters.
pub struct CassetteReplayer {
    queues: HashMap<(String, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Index a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<(String, String), VecDeque<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction.clone());
        }
        Self { queues }
    }

    /// Take the next recorded interaction for `port`/`method`.
    ///
    /// # Panics
    ///
    /// Panics when the cassette has no (more) interactions for the pair,
    /// listing the pairs that still have interactions left.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Interaction {
        let key = (port.to_string(), method.to_string());
        if let Some(interaction) = self.queues.get_mut(&key).and_then(VecDeque::pop_front) {
            return interaction;
        }

        let mut available: Vec<String> = self
            .queues
            .iter()
            .filter(|(_, queue)| !queue.is_empty())
            .map(|((p, m), queue)| format!("{p}::{m} ({})", queue.len()))
            .collect();
        available.sort();
        if self.queues.contains_key(&key) {
            panic!(
                "Cassette exhausted: all interactions for port={port:?} method={method:?} \
                 have been consumed. Remaining: [{}]",
                available.join(", ")
            );
        }
        panic!(
            "Cassette exhausted: no interactions recorded for port={port:?} method={method:?}. \
             Remaining: [{}]",
            available.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn interaction(seq: u64, method: &str, output: serde_json::Value) -> Interaction {
        Interaction { seq, port: "tasks".into(), method: method.into(), input: json!(null), output }
    }

    fn make_cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions,
        }
    }

    #[test]
    fn serves_each_method_in_recorded_order() {
        let cassette = make_cassette(vec![
            interaction(0, "list", json!({"Ok": []})),
            interaction(1, "create", json!({"Ok": {"id": 201}})),
            interaction(2, "list", json!({"Ok": [{"id": 201}]})),
        ]);
        let mut replayer = CassetteReplayer::new(&cassette);

        // Methods may be consumed in a different interleaving than recorded.
        assert_eq!(replayer.next_interaction("tasks", "create").seq, 1);
        assert_eq!(replayer.next_interaction("tasks", "list").seq, 0);
        assert_eq!(replayer.next_interaction("tasks", "list").seq, 2);
    }

    #[test]
    #[should_panic(expected = "have been consumed")]
    fn exhausted_method_panics_with_descriptive_message() {
        let cassette = make_cassette(vec![interaction(0, "list", json!({"Ok": []}))]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let _ = replayer.next_interaction("tasks", "list");
        let _ = replayer.next_interaction("tasks", "list");
    }

    #[test]
    #[should_panic(expected = "no interactions recorded")]
    fn unknown_method_panics() {
        let mut replayer = CassetteReplayer::new(&make_cassette(vec![]));
        let _ = replayer.next_interaction("tasks", "update");
    }
}
