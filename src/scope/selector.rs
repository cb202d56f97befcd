use crate::auth::SessionUser;
use crate::config::DemoConfig;
use crate::middleware::SessionLookup;

use super::identity::DemoSource;
use super::{RequestScope, ScopeError, ScopeSource};

/// Pick the owner id every query of this request is filtered by.
///
/// A demo signal always wins over the session. Without one, a verified
/// session supplies the owner; a session whose e-mail is a configured demo
/// account is scoped to the demo tenant as well. Everything else is rejected.
pub fn select_scope(
    demo: Option<DemoSource>,
    session: &SessionLookup,
    config: &DemoConfig,
) -> Result<RequestScope, ScopeError> {
    let demo = if config.enabled { demo } else { None };
    let user = session.user();

    if let Some(source) = demo {
        return Ok(demo_scope(source, user, config));
    }

    match session {
        SessionLookup::Valid(user) => {
            if config.enabled && is_demo_account(user, config) {
                return Ok(demo_scope(DemoSource::Account, Some(user), config));
            }
            Ok(RequestScope {
                is_demo: false,
                effective_user_id: user.owner_id(),
                source: ScopeSource::Session,
                email: user.email.clone(),
            })
        }
        SessionLookup::Invalid(reason) => Err(ScopeError::InvalidSession(reason.clone())),
        SessionLookup::Anonymous => Err(ScopeError::MissingSession),
    }
}

fn demo_scope(source: DemoSource, user: Option<&SessionUser>, config: &DemoConfig) -> RequestScope {
    if let Some(user) = user {
        tracing::debug!(
            "Demo scope ({:?}) overrides session user {}",
            source,
            user.owner_id()
        );
    }
    RequestScope {
        is_demo: true,
        effective_user_id: config.user_id,
        source: ScopeSource::Demo(source),
        email: Some(config.user_email.clone()),
    }
}

fn is_demo_account(user: &SessionUser, config: &DemoConfig) -> bool {
    user.email
        .as_deref()
        .is_some_and(|email| config.accounts.iter().any(|a| a.eq_ignore_ascii_case(email)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEMO_USER_EMAIL, DEMO_USER_ID};
    use uuid::Uuid;

    fn session(email: Option<&str>) -> (Uuid, SessionLookup) {
        let id = Uuid::new_v4();
        let user = SessionUser {
            id,
            auth_id: None,
            email: email.map(str::to_string),
        };
        (id, SessionLookup::Valid(user))
    }

    const ALL_SOURCES: [DemoSource; 3] = [DemoSource::Query, DemoSource::Cookie, DemoSource::Header];

    #[test]
    fn demo_flag_always_yields_demo_constant() {
        let config = DemoConfig::default();
        let (_, valid) = session(Some("sam@studio.dev"));
        let lookups = [SessionLookup::Anonymous, SessionLookup::Invalid("expired".into()), valid];

        for source in ALL_SOURCES {
            for lookup in &lookups {
                let scope = select_scope(Some(source), lookup, &config).unwrap();
                assert!(scope.is_demo);
                assert_eq!(scope.effective_user_id, DEMO_USER_ID);
                assert_eq!(scope.email.as_deref(), Some(DEMO_USER_EMAIL));
                assert_eq!(scope.source, ScopeSource::Demo(source));
            }
        }
    }

    #[test]
    fn no_demo_and_no_session_is_rejected() {
        let config = DemoConfig::default();
        assert_eq!(
            select_scope(None, &SessionLookup::Anonymous, &config),
            Err(ScopeError::MissingSession)
        );
        assert!(matches!(
            select_scope(None, &SessionLookup::Invalid("bad signature".into()), &config),
            Err(ScopeError::InvalidSession(_))
        ));
    }

    #[test]
    fn session_without_demo_uses_session_id() {
        let config = DemoConfig::default();
        for _ in 0..16 {
            let (id, lookup) = session(Some("sam@studio.dev"));
            let scope = select_scope(None, &lookup, &config).unwrap();
            assert!(!scope.is_demo);
            assert_eq!(scope.effective_user_id, id);
            assert_ne!(scope.effective_user_id, DEMO_USER_ID);
            assert_eq!(scope.source, ScopeSource::Session);
        }
    }

    #[test]
    fn seed_email_alone_does_not_trigger_demo() {
        let config = DemoConfig::default();
        let (id, lookup) = session(Some(DEMO_USER_EMAIL));
        let scope = select_scope(None, &lookup, &config).unwrap();
        assert_eq!(scope.effective_user_id, id);
    }

    #[test]
    fn configured_demo_accounts_are_scoped_to_demo() {
        let config = DemoConfig {
            accounts: vec!["Demo@Kazi.io".to_string()],
            ..DemoConfig::default()
        };
        let (_, lookup) = session(Some("demo@kazi.io"));
        let scope = select_scope(None, &lookup, &config).unwrap();
        assert!(scope.is_demo);
        assert_eq!(scope.source, ScopeSource::Demo(DemoSource::Account));
        assert_eq!(scope.effective_user_id, DEMO_USER_ID);
    }

    #[test]
    fn disabled_demo_ignores_flags() {
        let config = DemoConfig {
            enabled: false,
            accounts: vec!["demo@kazi.io".to_string()],
            ..DemoConfig::default()
        };
        assert_eq!(
            select_scope(Some(DemoSource::Query), &SessionLookup::Anonymous, &config),
            Err(ScopeError::MissingSession)
        );

        let (id, lookup) = session(Some("demo@kazi.io"));
        let scope = select_scope(Some(DemoSource::Cookie), &lookup, &config).unwrap();
        assert!(!scope.is_demo);
        assert_eq!(scope.effective_user_id, id);
    }

    #[test]
    fn custom_demo_user_id_is_honoured() {
        let demo_id = Uuid::new_v4();
        let config = DemoConfig {
            user_id: demo_id,
            ..DemoConfig::default()
        };
        let scope = select_scope(Some(DemoSource::Header), &SessionLookup::Anonymous, &config).unwrap();
        assert_eq!(scope.effective_user_id, demo_id);
    }
}
