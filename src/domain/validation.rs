//! Identity form rules. First failing rule wins.

use crate::domain::entities::{VoterIdentity, is_known_barangay};
use crate::domain::errors::ValidationError;

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_CONTACT_DIGITS: usize = 11;

/// Check the identity fields in order: name, contact number, barangay, privacy agreement.
pub fn validate_identity(identity: &VoterIdentity) -> Result<(), ValidationError> {
    if identity.name.trim().chars().count() < MIN_NAME_CHARS {
        return Err(ValidationError::NameTooShort);
    }
    if !is_valid_contact_number(&identity.contact_number) {
        return Err(ValidationError::InvalidContactNumber);
    }
    let barangay = identity.barangay.trim();
    if barangay.is_empty() {
        return Err(ValidationError::MissingBarangay);
    }
    if !is_known_barangay(barangay) {
        return Err(ValidationError::UnknownBarangay(barangay.to_string()));
    }
    if !identity.has_agreed_to_privacy_terms {
        return Err(ValidationError::PrivacyTermsNotAccepted);
    }
    Ok(())
}

fn is_valid_contact_number(contact: &str) -> bool {
    contact.len() >= MIN_CONTACT_DIGITS && contact.bytes().all(|b| b.is_ascii_digit())
}

/// Mask all but the last three digits, for logs.
pub fn mask_contact(contact: &str) -> String {
    let keep = contact.chars().count().saturating_sub(3);
    contact
        .chars()
        .enumerate()
        .map(|(i, c)| if i < keep { '*' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> VoterIdentity {
        VoterIdentity {
            name: "Juan Dela Cruz".into(),
            contact_number: "09171234567".into(),
            barangay: "Tibanga".into(),
            has_agreed_to_privacy_terms: true,
        }
    }

    #[test]
    fn test_valid_identity_passes() {
        assert_eq!(validate_identity(&valid()), Ok(()));
    }

    #[test]
    fn test_short_trimmed_name_fails() {
        for name in ["", "J", "  J  ", "   "] {
            let id = VoterIdentity { name: name.into(), ..valid() };
            assert_eq!(validate_identity(&id), Err(ValidationError::NameTooShort));
        }
    }

    #[test]
    fn test_name_rule_wins_over_later_rules() {
        let id = VoterIdentity {
            name: "J".into(),
            contact_number: "1".into(),
            barangay: String::new(),
            has_agreed_to_privacy_terms: false,
        };
        assert_eq!(validate_identity(&id), Err(ValidationError::NameTooShort));
    }

    #[test]
    fn test_contact_number_rules() {
        for contact in ["0917123456", "0917-123-4567", "", "0917123456a"] {
            let id = VoterIdentity { contact_number: contact.into(), ..valid() };
            assert_eq!(
                validate_identity(&id),
                Err(ValidationError::InvalidContactNumber),
                "{contact:?}"
            );
        }
    }

    #[test]
    fn test_barangay_rules() {
        let id = VoterIdentity { barangay: " ".into(), ..valid() };
        assert_eq!(validate_identity(&id), Err(ValidationError::MissingBarangay));

        let id = VoterIdentity { barangay: "Atlantis".into(), ..valid() };
        assert_eq!(
            validate_identity(&id),
            Err(ValidationError::UnknownBarangay("Atlantis".into()))
        );
    }

    #[test]
    fn test_privacy_terms_required() {
        let id = VoterIdentity { has_agreed_to_privacy_terms: false, ..valid() };
        assert_eq!(
            validate_identity(&id),
            Err(ValidationError::PrivacyTermsNotAccepted)
        );
    }

    #[test]
    fn test_mask_contact() {
        assert_eq!(mask_contact("09171234567"), "********567");
        assert_eq!(mask_contact("12"), "12");
    }
}
