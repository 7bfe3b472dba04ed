use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug, Deserialize, Clone)]
pub struct Tutor {
    pub id: TutorId,
    pub name: String,
    pub phone: String,
    pub subject: String,
    pub available_slots: Vec<String>,
}

#[derive(Serialize, Debug, Clone, Eq, Hash, Deserialize, PartialEq)]
pub struct TutorId(pub i32);

/// Tutor form input. Slots arrive as one comma-separated field,
/// e.g. "Mon 9am, Tue 2pm".
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NewTutor {
    pub name: String,
    pub phone: String,
    pub subject: String,
    pub available_slots: String,
}

/// Split a comma-separated slot field into trimmed labels.
/// Empty entries are dropped; order and duplicates are preserved.
pub fn parse_slot_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|label| label.trim())
        .filter(|label| !label.is_empty())
        .map(|label| label.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims_labels() {
        let labels = parse_slot_labels("Mon 9am, Tue 2pm ,Wed 11am");
        assert_eq!(labels, vec!["Mon 9am", "Tue 2pm", "Wed 11am"]);
    }

    #[test]
    fn drops_empty_entries() {
        let labels = parse_slot_labels("Mon 9am,, ,Tue 2pm,");
        assert_eq!(labels, vec!["Mon 9am", "Tue 2pm"]);
    }

    #[test]
    fn keeps_duplicates_in_order() {
        let labels = parse_slot_labels("Mon 9am,Mon 9am,Tue 2pm");
        assert_eq!(labels, vec!["Mon 9am", "Mon 9am", "Tue 2pm"]);
    }

    #[test]
    fn empty_field_yields_no_labels() {
        assert!(parse_slot_labels("  ").is_empty());
    }
}
