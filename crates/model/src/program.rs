use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Workout template in a client's rotation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Program {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub client: ObjectId,
    pub name: String,
    pub description: String,
    pub sequence_number: u32,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default)]
    pub version: u64,
}

impl Program {
    pub fn new(client: ObjectId, name: String, description: String, sequence_number: u32) -> Self {
        Program {
            id: ObjectId::new(),
            client,
            name,
            description,
            sequence_number,
            is_active: true,
            version: 0,
        }
    }
}

fn default_is_active() -> bool {
    true
}

/// Round-robin rotation over a client's active programs.
///
/// `programs` must be the active set ordered by `sequence_number`
/// ascending. Next = the program after the last-used one, wrapping to the
/// first. No history, or a last-used program that is no longer in the
/// active set, starts the rotation over. No active programs is not an
/// error; the training is simply scheduled without one.
pub fn next_program(programs: &[Program], last_used: Option<ObjectId>) -> Option<&Program> {
    match last_used {
        None => programs.first(),
        Some(last) => match programs.iter().position(|p| p.id == last) {
            Some(pos) => programs.get((pos + 1) % programs.len()),
            None => programs.first(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotation() -> Vec<Program> {
        let client = ObjectId::new();
        vec![
            Program::new(client, "A".into(), "".into(), 1),
            Program::new(client, "B".into(), "".into(), 2),
        ]
    }

    #[test]
    fn test_advances_past_last_used() {
        let programs = rotation();
        let next = next_program(&programs, Some(programs[0].id)).unwrap();
        assert_eq!("B", next.name);
    }

    #[test]
    fn test_wraps_around() {
        let programs = rotation();
        let next = next_program(&programs, Some(programs[1].id)).unwrap();
        assert_eq!("A", next.name);
    }

    #[test]
    fn test_no_history_starts_at_first() {
        let programs = rotation();
        let next = next_program(&programs, None).unwrap();
        assert_eq!("A", next.name);
    }

    #[test]
    fn test_unknown_last_used_restarts() {
        let programs = rotation();
        let next = next_program(&programs, Some(ObjectId::new())).unwrap();
        assert_eq!("A", next.name);
    }

    #[test]
    fn test_empty_rotation_is_none() {
        assert!(next_program(&[], None).is_none());
        assert!(next_program(&[], Some(ObjectId::new())).is_none());
    }
}
