//! Uniqueness gate: scans the sibling rows of an entity and rejects a
//! write when another row already holds one of the candidate's designated
//! unique values.
//!
//! The scan is O(n) over current rows and is not atomic with respect to
//! concurrent writers; the unique indexes declared in the migrations are
//! the authoritative backstop, and a resulting constraint violation is
//! surfaced as the same rejection kind (see `ServiceError::from_db_write`).

/// Exposes a row's identity and its designated unique values to the scan.
pub trait UniqueWitness {
    fn id(&self) -> i32;
    fn unique_values(&self) -> Vec<(&'static str, String)>;
}

/// A detected collision; `field` names the first colliding unique field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub field: &'static str,
}

/// Compares the candidate pairs against every sibling except the row whose
/// id matches `own_id` (present on update, absent on create). Comparison is
/// exact, case-sensitive equality per field.
pub fn scan<W: UniqueWitness>(
    candidate: &[(&'static str, String)],
    own_id: Option<i32>,
    siblings: &[W],
) -> Result<(), Conflict> {
    for sibling in siblings {
        if own_id == Some(sibling.id()) {
            continue;
        }

        let taken = sibling.unique_values();
        for (field, value) in candidate {
            let collides = taken
                .iter()
                .any(|(other_field, other_value)| other_field == field && other_value == value);
            if collides {
                return Err(Conflict { field });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        id: i32,
        name: String,
    }

    impl UniqueWitness for Row {
        fn id(&self) -> i32 {
            self.id
        }

        fn unique_values(&self) -> Vec<(&'static str, String)> {
            vec![("name", self.name.clone())]
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                id: 1,
                name: "a".into(),
            },
            Row {
                id: 2,
                name: "b".into(),
            },
        ]
    }

    #[test]
    fn create_collides_with_any_row() {
        let candidate = vec![("name", "a".to_string())];
        let err = scan(&candidate, None, &rows()).unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn update_excludes_own_row() {
        // Candidate for row 2 taking row 1's name: still a collision
        let candidate = vec![("name", "a".to_string())];
        assert!(scan(&candidate, Some(2), &rows()).is_err());

        // Candidate for row 2 keeping its own name: no self-rejection
        let candidate = vec![("name", "b".to_string())];
        assert!(scan(&candidate, Some(2), &rows()).is_ok());
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let candidate = vec![("name", "A".to_string())];
        assert!(scan(&candidate, None, &rows()).is_ok());
    }

    #[test]
    fn distinct_fields_do_not_collide() {
        // Same value under a different unique field is not a collision
        let candidate = vec![("email", "a".to_string())];
        assert!(scan(&candidate, None, &rows()).is_ok());
    }
}
