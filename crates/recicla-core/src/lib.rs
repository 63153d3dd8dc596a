//! Ser Recicla Core - configuration and the role model
//!
//! This crate holds the pieces shared by the API server and the admin CLI:
//! - Configuration management (environment + TOML)
//! - The closed set of user roles (`Perfil`)
//! - The account-creation policy between roles

pub mod config;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Roles
// ============================================================================

/// User role ("perfil")
///
/// Roles are flat: authorization compares them by equality only, there is no
/// ordering between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Perfil {
    /// University administrator
    AdminUni,
    /// Course coordinator
    Coord,
    /// Class leader
    Chefe,
    /// Student
    Aluno,
    /// Collection point operator
    Ponto,
}

impl Perfil {
    pub const ALL: [Perfil; 5] = [
        Perfil::AdminUni,
        Perfil::Coord,
        Perfil::Chefe,
        Perfil::Aluno,
        Perfil::Ponto,
    ];

    /// Stored role code
    pub fn as_str(&self) -> &'static str {
        match self {
            Perfil::AdminUni => "ADMIN_UNI",
            Perfil::Coord => "COORD",
            Perfil::Chefe => "CHEFE",
            Perfil::Aluno => "ALUNO",
            Perfil::Ponto => "PONTO",
        }
    }

    /// Parse a stored role code (exact match)
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == code)
    }

    /// Human-readable label shown by the user-info projection
    pub fn label(&self) -> &'static str {
        match self {
            Perfil::AdminUni => "administrador",
            Perfil::Coord => "coordenador",
            Perfil::Chefe => "chefe_turma",
            Perfil::Aluno => "aluno",
            Perfil::Ponto => "ponto_coleta",
        }
    }

    /// Path segment of the signup route that creates this role
    ///
    /// `None` for roles without a signup route.
    pub fn signup_slug(&self) -> Option<&'static str> {
        CREATION_POLICY
            .iter()
            .find(|rule| rule.target == *self)
            .map(|rule| rule.slug)
    }

    /// Role whose holders may create accounts of this role
    ///
    /// `None` means the role is only created by the bootstrap routine.
    pub fn required_creator(&self) -> Option<Perfil> {
        CREATION_POLICY
            .iter()
            .find(|rule| rule.target == *self)
            .map(|rule| rule.creator)
    }
}

/// Label for a raw stored role code; unknown codes map to `desconhecido`
pub fn role_label(code: &str) -> &'static str {
    Perfil::from_code(code)
        .map(|p| p.label())
        .unwrap_or(UNKNOWN_ROLE_LABEL)
}

pub const UNKNOWN_ROLE_LABEL: &str = "desconhecido";

impl fmt::Display for Perfil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role code is not one of the five known roles
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownPerfil(pub String);

impl FromStr for Perfil {
    type Err = UnknownPerfil;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownPerfil(s.to_string()))
    }
}

// ============================================================================
// Account creation policy
// ============================================================================

/// One row of the account-creation table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreationRule {
    /// Role of the account being created
    pub target: Perfil,
    /// Role the caller must hold, compared by equality
    pub creator: Perfil,
    /// Path segment of the signup route, `/auth/signup/{slug}/`
    pub slug: &'static str,
}

/// Who may create whom. Also drives signup route registration.
pub const CREATION_POLICY: [CreationRule; 4] = [
    CreationRule {
        target: Perfil::Coord,
        creator: Perfil::AdminUni,
        slug: "coord",
    },
    CreationRule {
        target: Perfil::Ponto,
        creator: Perfil::AdminUni,
        slug: "ponto",
    },
    CreationRule {
        target: Perfil::Chefe,
        creator: Perfil::Coord,
        slug: "chefe",
    },
    CreationRule {
        target: Perfil::Aluno,
        creator: Perfil::Chefe,
        slug: "aluno",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfil_codes_round_trip() {
        for perfil in Perfil::ALL {
            assert_eq!(Perfil::from_code(perfil.as_str()), Some(perfil));
            assert_eq!(perfil.as_str().parse::<Perfil>(), Ok(perfil));
        }
    }

    #[test]
    fn test_perfil_codes_are_case_sensitive() {
        assert_eq!(Perfil::from_code("aluno"), None);
        assert!("admin_uni".parse::<Perfil>().is_err());
    }

    #[test]
    fn test_perfil_serde_uses_codes() {
        let json = serde_json::to_string(&Perfil::AdminUni).unwrap();
        assert_eq!(json, "\"ADMIN_UNI\"");
        let parsed: Perfil = serde_json::from_str("\"PONTO\"").unwrap();
        assert_eq!(parsed, Perfil::Ponto);
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(role_label("ADMIN_UNI"), "administrador");
        assert_eq!(role_label("COORD"), "coordenador");
        assert_eq!(role_label("CHEFE"), "chefe_turma");
        assert_eq!(role_label("ALUNO"), "aluno");
        assert_eq!(role_label("PONTO"), "ponto_coleta");
        assert_eq!(role_label("GUEST"), "desconhecido");
        assert_eq!(role_label(""), "desconhecido");
    }

    #[test]
    fn test_creation_policy() {
        assert_eq!(Perfil::Coord.required_creator(), Some(Perfil::AdminUni));
        assert_eq!(Perfil::Ponto.required_creator(), Some(Perfil::AdminUni));
        assert_eq!(Perfil::Chefe.required_creator(), Some(Perfil::Coord));
        assert_eq!(Perfil::Aluno.required_creator(), Some(Perfil::Chefe));
        assert_eq!(Perfil::AdminUni.required_creator(), None);
    }

    #[test]
    fn test_creation_policy_targets_are_unique() {
        for (i, a) in CREATION_POLICY.iter().enumerate() {
            for b in &CREATION_POLICY[i + 1..] {
                assert_ne!(a.target, b.target);
                assert_ne!(a.slug, b.slug);
            }
        }
    }

    #[test]
    fn test_signup_slugs() {
        assert_eq!(Perfil::Coord.signup_slug(), Some("coord"));
        assert_eq!(Perfil::Ponto.signup_slug(), Some("ponto"));
        assert_eq!(Perfil::Chefe.signup_slug(), Some("chefe"));
        assert_eq!(Perfil::Aluno.signup_slug(), Some("aluno"));
        assert_eq!(Perfil::AdminUni.signup_slug(), None);
    }
}
