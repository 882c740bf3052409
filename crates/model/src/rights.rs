use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator as _};

const CLIENT_RULES: [Rule; 2] = [Rule::ViewProfile, Rule::ConfirmOwnTrainings];

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Rights {
    full: bool,
    rights: Vec<Rule>,
}

impl Rights {
    pub fn full() -> Self {
        Rights {
            full: true,
            rights: vec![],
        }
    }

    pub fn client() -> Self {
        Rights {
            full: false,
            rights: CLIENT_RULES.to_vec(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    pub fn has_rule(&self, rule: Rule) -> bool {
        if self.full {
            return true;
        }
        self.rights.contains(&rule)
    }

    pub fn ensure(&self, rule: Rule) -> eyre::Result<()> {
        if !self.has_rule(rule) {
            return Err(eyre::eyre!("No rights to perform this action"));
        }
        Ok(())
    }

    pub fn add_rule(&mut self, rule: Rule) {
        if self.full || self.rights.contains(&rule) {
            return;
        }
        self.rights.push(rule);
    }

    pub fn remove_rule(&mut self, rule: Rule) {
        if self.full {
            return;
        }
        self.rights.retain(|r| r != &rule);
    }

    pub fn get_all_rules(&self) -> Vec<(Rule, bool)> {
        Rule::iter().map(|rule| (rule, self.has_rule(rule))).collect()
    }
}

#[derive(EnumIter, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    ViewProfile,
    ConfirmOwnTrainings,

    ManageClients,
    ManageBlocks,
    ScheduleTrainings,
    MarkAttendance,
    ViewHistory,
}

/// Who is driving the current db session. Role gating happens at the
/// service boundary; the accounting core only needs the owning-client
/// check in status changes.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    System,
    Admin(ObjectId),
    Client(ObjectId),
}

impl Actor {
    pub fn client_id(&self) -> Option<ObjectId> {
        match self {
            Actor::Client(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::Admin(_) | Actor::System)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rights() {
        let rights = Rights::client();
        assert!(rights.has_rule(Rule::ViewProfile));
        assert!(!rights.has_rule(Rule::MarkAttendance));
        assert!(rights.ensure(Rule::ManageBlocks).is_err());
    }

    #[test]
    fn test_full_rights() {
        let rights = Rights::full();
        assert!(rights.has_rule(Rule::MarkAttendance));
        assert!(rights.ensure(Rule::ManageBlocks).is_ok());
    }
}
