use crate::error::ScheduleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Postgraduate year. Ordered so PGY-3 > PGY-2 > PGY-1 for eligibility-fallback checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pgy {
    One,
    Two,
    Three,
}

impl Pgy {
    pub fn as_u8(self) -> u8 {
        match self {
            Pgy::One => 1,
            Pgy::Two => 2,
            Pgy::Three => 3,
        }
    }
}

impl fmt::Display for Pgy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl FromStr for Pgy {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Pgy::One),
            "2" => Ok(Pgy::Two),
            "3" => Ok(Pgy::Three),
            other => Err(ScheduleError::input(
                "pgy",
                format!("unknown PGY year {other:?}, expected 1, 2, or 3"),
            )),
        }
    }
}

/// A resident's rotation state for the block. Only `Ed` and `Peds` are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    Ed,
    Peds,
    OffService,
    Vacation,
}

impl Service {
    pub fn is_schedulable(self) -> bool {
        matches!(self, Service::Ed | Service::Peds)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Service::Ed => "ED",
            Service::Peds => "Peds",
            Service::OffService => "Off-Service",
            Service::Vacation => "Vacation",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Service {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ED" => Ok(Service::Ed),
            "Peds" => Ok(Service::Peds),
            "Off-Service" => Ok(Service::OffService),
            "Vacation" => Ok(Service::Vacation),
            other => Err(ScheduleError::input(
                "service",
                format!("unknown service {other:?}, expected ED, Peds, Off-Service, or Vacation"),
            )),
        }
    }
}

/// Hospital letter. Only two hospitals in this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hospital {
    L,
    W,
}

impl Hospital {
    pub fn letter(self) -> char {
        match self {
            Hospital::L => 'L',
            Hospital::W => 'W',
        }
    }

    pub fn other(self) -> Hospital {
        match self {
            Hospital::L => Hospital::W,
            Hospital::W => Hospital::L,
        }
    }
}

impl fmt::Display for Hospital {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl TryFrom<char> for Hospital {
    type Error = ScheduleError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'L' => Ok(Hospital::L),
            'W' => Ok(Hospital::W),
            other => Err(ScheduleError::input(
                "hospital",
                format!("unknown hospital letter {other:?}, expected L or W"),
            )),
        }
    }
}

/// Team letter. Determines the eligibility pool per the PGY-eligibility table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    R,
    G,
    I,
    E,
    B,
    P,
}

impl Team {
    pub fn letter(self) -> char {
        match self {
            Team::R => 'R',
            Team::G => 'G',
            Team::I => 'I',
            Team::E => 'E',
            Team::B => 'B',
            Team::P => 'P',
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl TryFrom<char> for Team {
    type Error = ScheduleError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'R' => Ok(Team::R),
            'G' => Ok(Team::G),
            'I' => Ok(Team::I),
            'E' => Ok(Team::E),
            'B' => Ok(Team::B),
            'P' => Ok(Team::P),
            other => Err(ScheduleError::input(
                "team",
                format!("unknown team letter {other:?}, expected one of R G I E B P"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pgy_roundtrips_through_display() {
        for p in [Pgy::One, Pgy::Two, Pgy::Three] {
            assert_eq!(p.to_string().parse::<Pgy>().unwrap(), p);
        }
    }

    #[test]
    fn service_rejects_unknown_label() {
        assert!("Intern".parse::<Service>().is_err());
    }

    #[test]
    fn service_off_service_and_vacation_are_not_schedulable() {
        assert!(!Service::OffService.is_schedulable());
        assert!(!Service::Vacation.is_schedulable());
        assert!(Service::Ed.is_schedulable());
        assert!(Service::Peds.is_schedulable());
    }

    #[test]
    fn hospital_other_swaps() {
        assert_eq!(Hospital::L.other(), Hospital::W);
        assert_eq!(Hospital::W.other(), Hospital::L);
    }
}
