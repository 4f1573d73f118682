use tracing::info;

use crate::error::SeasonError;
use crate::ledger::{Ledger, Profile};
use crate::prediction::{sanitize_text, Race};

const MAX_USERNAME_LEN: usize = 32;

/// Add a race to the calendar.
pub fn add_race(ledger: &mut Ledger, race: Race) -> Result<(), SeasonError> {
    if ledger.races.contains_key(&race.id) {
        return Err(SeasonError::RaceExists(race.id));
    }

    let mut errors = Vec::new();
    if race.name.trim().is_empty() {
        errors.push("name: must not be empty".to_string());
    }
    if race.race_time < race.quali_time {
        errors.push("race_time: must not be before quali_time".to_string());
    }
    if !errors.is_empty() {
        return Err(SeasonError::Invalid(errors));
    }

    info!(race_id = race.id, name = %race.name, "race added");
    ledger.races.insert(race.id, race);
    Ok(())
}

/// Register (or rename) a user. Usernames are unique, ignoring case.
pub fn register_user(ledger: &mut Ledger, user_id: &str, username: &str) -> Result<(), SeasonError> {
    let username = sanitize_text(username.trim(), MAX_USERNAME_LEN);
    let mut errors = Vec::new();
    if user_id.trim().is_empty() {
        errors.push("user_id: must not be empty".to_string());
    }
    if username.is_empty() {
        errors.push("username: must not be empty".to_string());
    }
    if !errors.is_empty() {
        return Err(SeasonError::Invalid(errors));
    }

    let taken = ledger
        .users
        .values()
        .any(|p| p.id != user_id && p.username.eq_ignore_ascii_case(&username));
    if taken {
        return Err(SeasonError::UsernameTaken(username));
    }

    ledger.users.insert(
        user_id.to_string(),
        Profile {
            id: user_id.to_string(),
            username,
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn sample_race(id: u32) -> Race {
        let quali = Utc::now();
        Race {
            id,
            name: "Monaco Grand Prix".to_string(),
            quali_time: quali,
            race_time: quali + Duration::days(1),
        }
    }

    #[test]
    fn test_add_race() {
        let mut ledger = Ledger::new();
        add_race(&mut ledger, sample_race(1)).unwrap();
        assert!(ledger.races.contains_key(&1));
        assert_eq!(
            add_race(&mut ledger, sample_race(1)),
            Err(SeasonError::RaceExists(1))
        );
    }

    #[test]
    fn test_race_before_qualifying_rejected() {
        let mut ledger = Ledger::new();
        let mut race = sample_race(2);
        race.race_time = race.quali_time - Duration::hours(1);
        assert!(matches!(
            add_race(&mut ledger, race),
            Err(SeasonError::Invalid(_))
        ));
    }

    #[test]
    fn test_register_user_unique_names() {
        let mut ledger = Ledger::new();
        register_user(&mut ledger, "u1", "BoxBox").unwrap();
        assert_eq!(
            register_user(&mut ledger, "u2", "boxbox"),
            Err(SeasonError::UsernameTaken("boxbox".to_string()))
        );
        // Renaming yourself to the same name is fine
        register_user(&mut ledger, "u1", "BOXBOX").unwrap();
        assert_eq!(ledger.username("u1"), "BOXBOX");
    }

    #[test]
    fn test_register_user_sanitizes() {
        let mut ledger = Ledger::new();
        register_user(&mut ledger, "u1", "<b>slipstream</b>").unwrap();
        assert_eq!(ledger.username("u1"), "bslipstream/b");
    }
}
