use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

use super::types::{League, Member, Role, DEFAULT_MAX_MEMBERS, MAX_MAX_MEMBERS, MIN_MAX_MEMBERS};
use crate::error::LeagueError;
use crate::ledger::Ledger;
use crate::prediction::sanitize_text;

const INVITE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const INVITE_CODE_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueInput {
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub max_members: Option<u32>,
}

/// Random invite code without look-alike characters (no I, O, 0, 1).
pub fn generate_invite_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_ALPHABET[rng.random_range(0..INVITE_ALPHABET.len())] as char)
        .collect()
}

/// Partial league settings change. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeagueUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub max_members: Option<u32>,
}

impl LeagueUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.is_public.is_none()
            && self.max_members.is_none()
    }
}

fn check_name(name: &str, errors: &mut Vec<String>) {
    let name_len = name.trim().chars().count();
    if !(3..=50).contains(&name_len) {
        errors.push("name: must be 3-50 characters".to_string());
    }
}

fn check_max_members(max: u32, errors: &mut Vec<String>) {
    if !(MIN_MAX_MEMBERS..=MAX_MAX_MEMBERS).contains(&max) {
        errors.push(format!(
            "max_members: must be between {} and {}",
            MIN_MAX_MEMBERS, MAX_MAX_MEMBERS
        ));
    }
}

fn validate_league_input(input: &LeagueInput) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    check_name(&input.name, &mut errors);
    if let Some(max) = input.max_members {
        check_max_members(max, &mut errors);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn league_mut(ledger: &mut Ledger, league_id: u32) -> Result<&mut League, LeagueError> {
    ledger
        .leagues
        .get_mut(&league_id)
        .ok_or(LeagueError::NotFound(league_id))
}

/// Create a league. The creator joins as owner. Returns the league id.
pub fn create_league(
    ledger: &mut Ledger,
    owner_id: &str,
    input: LeagueInput,
    now: DateTime<Utc>,
) -> Result<u32, LeagueError> {
    validate_league_input(&input).map_err(LeagueError::Invalid)?;

    let mut rng = rand::rng();
    let invite_code = loop {
        let code = generate_invite_code(&mut rng);
        if !ledger.leagues.values().any(|l| l.invite_code == code) {
            break code;
        }
    };

    let id = ledger.allocate_league_id();
    let league = League {
        id,
        name: sanitize_text(input.name.trim(), 50),
        description: input.description.map(|d| sanitize_text(&d, 500)),
        is_public: input.is_public,
        max_members: input.max_members.unwrap_or(DEFAULT_MAX_MEMBERS),
        invite_code,
        owner_id: owner_id.to_string(),
        members: vec![Member {
            user_id: owner_id.to_string(),
            role: Role::Owner,
            joined_at: now,
        }],
    };

    info!(league_id = id, owner_id, invite_code = %league.invite_code, "league created");
    ledger.leagues.insert(id, league);
    Ok(id)
}

/// Join by invite code (case-insensitive). Returns the league id.
pub fn join_league(
    ledger: &mut Ledger,
    user_id: &str,
    invite_code: &str,
    now: DateTime<Utc>,
) -> Result<u32, LeagueError> {
    let code = invite_code.trim().to_uppercase();
    let league = ledger
        .leagues
        .values_mut()
        .find(|l| l.invite_code == code)
        .ok_or_else(|| LeagueError::UnknownInviteCode(invite_code.to_string()))?;

    if league.is_member(user_id) {
        return Err(LeagueError::AlreadyMember(user_id.to_string()));
    }
    if league.is_full() {
        return Err(LeagueError::Full(league.max_members));
    }

    league.members.push(Member {
        user_id: user_id.to_string(),
        role: Role::Member,
        joined_at: now,
    });
    info!(league_id = league.id, user_id, "joined league");
    Ok(league.id)
}

pub fn leave_league(ledger: &mut Ledger, league_id: u32, user_id: &str) -> Result<(), LeagueError> {
    let league = league_mut(ledger, league_id)?;
    if league.owner_id == user_id {
        return Err(LeagueError::OwnerCannotLeave);
    }
    let before = league.members.len();
    league.members.retain(|m| m.user_id != user_id);
    if league.members.len() == before {
        return Err(LeagueError::NotMember(user_id.to_string()));
    }
    Ok(())
}

/// Change a member's role. Only owners and admins may do this, and the
/// owner's role is fixed.
pub fn set_role(
    ledger: &mut Ledger,
    league_id: u32,
    actor_id: &str,
    target_id: &str,
    role: Role,
) -> Result<(), LeagueError> {
    let league = league_mut(ledger, league_id)?;

    if !league.role_of(actor_id).is_some_and(Role::can_manage) {
        return Err(LeagueError::NotManager(actor_id.to_string()));
    }
    if target_id == league.owner_id || role == Role::Owner {
        return Err(LeagueError::Invalid(vec![
            "role: ownership cannot be assigned or removed".to_string(),
        ]));
    }

    let member = league
        .members
        .iter_mut()
        .find(|m| m.user_id == target_id)
        .ok_or_else(|| LeagueError::NotMember(target_id.to_string()))?;
    member.role = role;
    Ok(())
}

/// Change league settings. Owner only; the same rules as creation apply,
/// and the cap cannot drop below the current member count.
pub fn update_league(
    ledger: &mut Ledger,
    league_id: u32,
    actor_id: &str,
    update: LeagueUpdate,
) -> Result<(), LeagueError> {
    let league = league_mut(ledger, league_id)?;
    if league.owner_id != actor_id {
        return Err(LeagueError::NotOwner(actor_id.to_string()));
    }
    if update.is_empty() {
        return Err(LeagueError::Invalid(vec!["no fields to update".to_string()]));
    }

    let mut errors = Vec::new();
    if let Some(ref name) = update.name {
        check_name(name, &mut errors);
    }
    if let Some(max) = update.max_members {
        check_max_members(max, &mut errors);
        if (max as usize) < league.members.len() {
            errors.push(format!(
                "max_members: league already has {} members",
                league.members.len()
            ));
        }
    }
    if !errors.is_empty() {
        return Err(LeagueError::Invalid(errors));
    }

    if let Some(name) = update.name {
        league.name = sanitize_text(name.trim(), 50);
    }
    if let Some(description) = update.description {
        league.description = Some(sanitize_text(&description, 500));
    }
    if let Some(is_public) = update.is_public {
        league.is_public = is_public;
    }
    if let Some(max) = update.max_members {
        league.max_members = max;
    }
    info!(league_id, "league updated");
    Ok(())
}

/// Remove a league together with its grades. Owner only.
pub fn delete_league(ledger: &mut Ledger, league_id: u32, actor_id: &str) -> Result<(), LeagueError> {
    let league = ledger
        .leagues
        .get(&league_id)
        .ok_or(LeagueError::NotFound(league_id))?;
    if league.owner_id != actor_id {
        return Err(LeagueError::NotOwner(actor_id.to_string()));
    }

    ledger.leagues.remove(&league_id);
    ledger.league_grades.retain(|g| g.league_id != league_id);
    info!(league_id, "league deleted");
    Ok(())
}
