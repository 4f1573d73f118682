use std::collections::HashSet;

/// 2026 grid: 11 teams, 22 drivers. Identifiers are "Name (Team)".
pub const DEFAULT_DRIVERS: [&str; 22] = [
    "Max Verstappen (Red Bull)",
    "Isack Hadjar (Red Bull)",
    "Lando Norris (McLaren)",
    "Oscar Piastri (McLaren)",
    "Charles Leclerc (Ferrari)",
    "Lewis Hamilton (Ferrari)",
    "George Russell (Mercedes)",
    "Kimi Antonelli (Mercedes)",
    "Fernando Alonso (Aston Martin)",
    "Lance Stroll (Aston Martin)",
    "Carlos Sainz (Williams)",
    "Alexander Albon (Williams)",
    "Pierre Gasly (Alpine)",
    "Franco Colapinto (Alpine)",
    "Esteban Ocon (Haas)",
    "Oliver Bearman (Haas)",
    "Yuki Tsunoda (RB)",
    "Liam Lawson (RB)",
    "Nico Hulkenberg (Sauber)",
    "Gabriel Bortoleto (Sauber)",
    "Valtteri Bottas (Cadillac)",
    "Sergio Perez (Cadillac)",
];

/// The season's valid driver set, in grid order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    drivers: Vec<String>,
    lookup: HashSet<String>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(DEFAULT_DRIVERS.iter().map(|d| d.to_string()).collect())
    }
}

impl Roster {
    pub fn new(drivers: Vec<String>) -> Self {
        let lookup = drivers.iter().cloned().collect();
        Self { drivers, lookup }
    }

    /// Roster from config, falling back to the default grid
    pub fn from_config(drivers: Option<&[String]>) -> Self {
        match drivers {
            Some(list) if !list.is_empty() => Self::new(list.to_vec()),
            _ => Self::default(),
        }
    }

    pub fn contains(&self, driver: &str) -> bool {
        self.lookup.contains(driver)
    }

    pub fn drivers(&self) -> &[String] {
        &self.drivers
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}
