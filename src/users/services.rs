use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{iso_millis, NewUser, User};

/// Build a brand new record with a fresh id and `created` set to now.
pub fn create_from(payload: NewUser) -> User {
    create_from_at(payload, Uuid::new_v4().to_string(), OffsetDateTime::now_utc())
}

pub fn create_from_at(payload: NewUser, id: String, now: OffsetDateTime) -> User {
    User {
        id,
        email: payload.email,
        given_name: payload.given_name,
        family_name: payload.family_name,
        created: iso_millis::truncate(now),
        updated: None,
    }
}

/// Copy of `existing` with the payload fields applied and `updated` set to now.
/// `id` and `created` are carried over untouched.
pub fn merge_into(existing: &User, payload: NewUser) -> User {
    merge_into_at(existing, payload, OffsetDateTime::now_utc())
}

pub fn merge_into_at(existing: &User, payload: NewUser, now: OffsetDateTime) -> User {
    User {
        id: existing.id.clone(),
        email: payload.email,
        given_name: payload.given_name,
        family_name: payload.family_name,
        created: existing.created,
        updated: Some(iso_millis::truncate(now)),
    }
}

/// Position of the first member whose id equals `id`.
pub fn find_index(users: &[User], id: &str) -> Option<usize> {
    users.iter().position(|u| u.id == id)
}

#[cfg(test)]
mod services_tests {
    use super::*;
    use time::macros::datetime;

    fn payload() -> NewUser {
        NewUser {
            email: "testuser3@test.com".into(),
            given_name: "test3".into(),
            family_name: "user3".into(),
        }
    }

    fn existing(id: &str) -> User {
        User {
            id: id.into(),
            email: format!("testuser{id}@test.com"),
            given_name: format!("test{id}"),
            family_name: format!("user{id}"),
            created: datetime!(2017-07-31 11:20:59.489 UTC),
            updated: None,
        }
    }

    #[test]
    fn create_copies_fields_and_stamps_created() {
        let now = datetime!(2019-05-14 11:01:58.135 UTC);
        let user = create_from_at(payload(), "testId".into(), now);

        assert_eq!(user.id, "testId");
        assert_eq!(user.email, "testuser3@test.com");
        assert_eq!(user.given_name, "test3");
        assert_eq!(user.family_name, "user3");
        assert_eq!(user.created, now);
        assert_eq!(user.updated, None);
    }

    #[test]
    fn create_generates_distinct_uuid_ids() {
        let a = create_from(payload());
        let b = create_from(payload());

        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
        assert_eq!(a.created, iso_millis::truncate(a.created));
    }

    #[test]
    fn merge_keeps_identity_and_sets_updated() {
        let original = existing("1");
        let now = datetime!(2019-05-14 11:01:58.135 UTC);
        let merged = merge_into_at(&original, payload(), now);

        assert_eq!(merged.id, "1");
        assert_eq!(merged.created, original.created);
        assert_eq!(merged.email, "testuser3@test.com");
        assert_eq!(merged.given_name, "test3");
        assert_eq!(merged.family_name, "user3");
        assert_eq!(merged.updated, Some(now));
        assert_eq!(original, existing("1"));
    }

    #[test]
    fn merge_overwrites_a_previous_updated() {
        let mut original = existing("1");
        original.updated = Some(datetime!(2018-01-01 00:00:00 UTC));

        let merged = merge_into(&original, payload());
        assert!(merged.updated > original.updated);
    }

    #[test]
    fn find_index_matches_on_id_only() {
        let users = vec![existing("1"), existing("2")];
        assert_eq!(find_index(&users, "2"), Some(1));
        assert_eq!(find_index(&users, "100"), None);
        assert_eq!(find_index(&[], "1"), None);
    }

    #[test]
    fn find_index_picks_first_duplicate() {
        let users = vec![existing("1"), existing("7"), existing("7")];
        assert_eq!(find_index(&users, "7"), Some(1));
    }
}
