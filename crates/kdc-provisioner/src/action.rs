//! Lifecycle action classification

use kdc_common::ProvisioningAction;

/// What a lifecycle event asks of the principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Bring the principal in line with the person's status
    Synchronize,
    /// Disable the principal
    Remove,
    /// Nothing to do for this target
    Ignore,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synchronize => "synchronize",
            Self::Remove => "remove",
            Self::Ignore => "ignore",
        }
    }
}

/// Classify a registry action. No wildcard arm: every new action must be
/// given an intent here.
pub fn classify(action: ProvisioningAction) -> Intent {
    use ProvisioningAction::*;

    match action {
        PersonAdded
        | PersonUpdated
        | PersonUnexpired
        | PersonEnteredGracePeriod
        | PersonReprovisionRequested
        | PersonPipelineProvisioned
        | PersonPetitionProvisioned => Intent::Synchronize,

        PersonExpired | PersonDeleted => Intent::Remove,

        GroupAdded
        | GroupUpdated
        | GroupDeleted
        | GroupReprovisionRequested
        | EmailListAdded
        | EmailListUpdated
        | EmailListDeleted
        | EmailListReprovisionRequested
        | ServiceAdded
        | ServiceUpdated
        | ServiceDeleted
        | ServiceReprovisionRequested => Intent::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdc_common::RecordKind;

    #[test]
    fn test_synchronize_actions() {
        for action in [
            ProvisioningAction::PersonAdded,
            ProvisioningAction::PersonUpdated,
            ProvisioningAction::PersonUnexpired,
            ProvisioningAction::PersonEnteredGracePeriod,
            ProvisioningAction::PersonReprovisionRequested,
            ProvisioningAction::PersonPipelineProvisioned,
            ProvisioningAction::PersonPetitionProvisioned,
        ] {
            assert_eq!(classify(action), Intent::Synchronize, "{:?}", action);
        }
    }

    #[test]
    fn test_remove_actions() {
        assert_eq!(classify(ProvisioningAction::PersonExpired), Intent::Remove);
        assert_eq!(classify(ProvisioningAction::PersonDeleted), Intent::Remove);
    }

    #[test]
    fn test_non_person_actions_are_ignored() {
        for action in ProvisioningAction::ALL {
            if action.record_kind() != RecordKind::Person {
                assert_eq!(classify(action), Intent::Ignore, "{:?}", action);
            }
        }
    }

    #[test]
    fn test_every_person_action_has_work() {
        let person_actions = ProvisioningAction::ALL
            .iter()
            .filter(|a| a.record_kind() == RecordKind::Person)
            .count();
        let acted_on = ProvisioningAction::ALL
            .iter()
            .filter(|a| classify(**a) != Intent::Ignore)
            .count();
        assert_eq!(person_actions, 9);
        assert_eq!(acted_on, person_actions);
    }
}
