use crate::model::{
    Id,
    user::{DisplayName, UserHandle, UserMarker},
};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::{
    fmt::{Debug, Formatter},
    str::FromStr,
};
use thiserror::Error;
use time::OffsetDateTime;

pub const PASSWORD_MIN_LEN: usize = 8;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct AccountMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct SessionMarker;

/// Account as known to the identity provider.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Account {
    pub id: Id<AccountMarker>,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct Session {
    pub id: Id<SessionMarker>,
    pub account_id: Id<AccountMarker>,
    pub secret: SessionSecret,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// The caller on whose behalf an operation runs.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Caller {
    pub user_id: Id<UserMarker>,
    pub session: SessionSecret,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct SignUp {
    pub name: DisplayName,
    pub username: UserHandle,
    pub email: EmailAddress,
    pub password: Password,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct SignIn {
    pub email: EmailAddress,
    pub password: Password,
}

#[derive(Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionSecret(String);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The session secret is empty or contains whitespace")]
pub struct InvalidSessionSecretError;

impl SessionSecret {
    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

impl FromStr for SessionSecret {
    type Err = InvalidSessionSecretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.contains(char::is_whitespace) {
            return Err(InvalidSessionSecretError);
        }

        Ok(Self(s.to_owned()))
    }
}

impl Debug for SessionSecret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionSecret").field(&"[redacted]").finish()
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The email address is invalid: {0}")]
pub struct InvalidEmailError(String);

impl EmailAddress {
    pub fn new(email: String) -> Result<Self, InvalidEmailError> {
        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !email.contains(char::is_whitespace)
            }
            None => false,
        };

        if valid {
            Ok(Self(email))
        } else {
            Err(InvalidEmailError(email))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        EmailAddress::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"EmailAddress"))
    }
}

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Password(String);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("Password must be at least 8 characters")]
pub struct InvalidPasswordError;

impl Password {
    pub fn new(password: String) -> Result<Self, InvalidPasswordError> {
        if password.chars().count() >= PASSWORD_MIN_LEN {
            Ok(Self(password))
        } else {
            Err(InvalidPasswordError)
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

impl Debug for Password {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Password").field(&"[redacted]").finish()
    }
}

impl<'de> Deserialize<'de> for Password {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Password::new(inner).map_err(|_| Error::invalid_length(0, &"at least 8 characters"))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::auth::{EmailAddress, Password, SessionSecret, SignUp};
    use std::str::FromStr;

    #[test]
    fn email_addresses() {
        let valid = ["a@b.co", "first.last@example.org", "x+tag@mail.example.com"];
        let invalid = ["", "plain", "@example.org", "a@b", "a@.org", "a@org.", "a@b@c.org", "a b@c.org"];

        for email in valid {
            assert!(EmailAddress::new(email.to_owned()).is_ok(), "{email}");
        }
        for email in invalid {
            assert!(EmailAddress::new(email.to_owned()).is_err(), "{email}");
        }
    }

    #[test]
    fn password_length_and_redaction() {
        assert!(Password::new("1234567".to_owned()).is_err());
        let password = Password::new("12345678".to_owned()).unwrap();
        assert!(!format!("{password:?}").contains("12345678"));
    }

    #[test]
    fn session_secret() {
        assert!(SessionSecret::from_str("").is_err());
        assert!(SessionSecret::from_str("abc def").is_err());
        let secret = SessionSecret::from_str("s3cr3t").unwrap();
        assert_eq!(secret.get(), "s3cr3t");
        assert!(!format!("{secret:?}").contains("s3cr3t"));
    }

    #[test]
    fn sign_up_form_is_validated() {
        let ok = r#"{"name":"Ada","username":"ada","email":"ada@example.org","password":"correct horse"}"#;
        let short_password =
            r#"{"name":"Ada","username":"ada","email":"ada@example.org","password":"short"}"#;
        let bad_email = r#"{"name":"Ada","username":"ada","email":"ada","password":"correct horse"}"#;

        assert!(serde_json::from_str::<SignUp>(ok).is_ok());
        assert!(serde_json::from_str::<SignUp>(short_password).is_err());
        assert!(serde_json::from_str::<SignUp>(bad_email).is_err());
    }
}
