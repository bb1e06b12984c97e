//! Token codec and validator behaviour.

mod common;

use std::time::Duration;

use chrono::Utc;

use common::{jwt, TEST_SECRET};
use secrecy::SecretString;
use tenant_auth::{
    config::JwtConfig,
    models::{Role, UserId, UserRecord},
    services::{AuthError, JwtService},
};

#[test]
fn extract_username_returns_username_claim() {
    let service = jwt(60_000);
    let token = service
        .issue(UserId::new(), "testuser@example.com", Role::Candidate, false, "testuser")
        .unwrap();

    assert_eq!(service.extract_username(&token).unwrap(), "testuser");
}

#[test]
fn token_is_valid_for_matching_identity() {
    let service = jwt(60_000);
    let user = UserRecord::candidate("testuser@example.com", "testuser");
    let token = service
        .issue(user.id, &user.email, user.role, false, &user.username)
        .unwrap();

    assert!(service.is_valid(&token, &user).unwrap());
    assert!(service.check(&token, &user));
}

#[test]
fn token_is_invalid_when_username_mismatch() {
    let service = jwt(60_000);
    let subject = UserId::new();
    let token = service
        .issue(subject, "shared@example.com", Role::HiringManager, false, "alice")
        .unwrap();

    // Same subject, email and role; only the username differs.
    let mut other = UserRecord::hiring_manager("shared@example.com", "bob", None);
    other.id = subject;

    assert!(!service.is_valid(&token, &other).unwrap());
    assert!(!service.check(&token, &other));
}

#[test]
fn expired_token_raises_expired_not_false() {
    let service = jwt(-1_000);
    let token = service.issue_for("testuser").unwrap();

    let err = service.is_valid(&token, "testuser").unwrap_err();
    assert!(matches!(err, AuthError::ExpiredToken), "got {:?}", err);
    assert!(err.is_expired());

    // The boolean form folds it into false.
    assert!(!service.check(&token, "testuser"));
}

#[test]
fn expired_token_is_refused_by_every_accessor() {
    let service = jwt(-60_000);
    let token = service
        .issue(UserId::new(), "testuser@example.com", Role::Candidate, false, "testuser")
        .unwrap();

    assert!(matches!(service.extract_username(&token), Err(AuthError::ExpiredToken)));
    assert!(matches!(service.extract_role(&token), Err(AuthError::ExpiredToken)));
    assert!(matches!(service.time_until_expiration(&token), Err(AuthError::ExpiredToken)));
}

#[test]
fn token_signed_with_another_secret_fails_signature() {
    let issuer = JwtService::new(&JwtConfig {
        secret: SecretString::new("a-completely-different-signing-secret".to_string()),
        expiration_ms: 60_000,
    });
    let token = issuer.issue_for("testuser").unwrap();

    let err = jwt(60_000).extract_username(&token).unwrap_err();
    assert!(matches!(err, AuthError::Signature), "got {:?}", err);
}

#[test]
fn expired_token_with_wrong_secret_reports_signature() {
    let issuer = JwtService::new(&JwtConfig {
        secret: SecretString::new("a-completely-different-signing-secret".to_string()),
        expiration_ms: -60_000,
    });
    let token = issuer.issue_for("testuser").unwrap();

    let err = jwt(60_000).is_valid(&token, "testuser").unwrap_err();
    assert!(matches!(err, AuthError::Signature), "got {:?}", err);
}

#[test]
fn spliced_payload_fails_signature() {
    let service = jwt(60_000);
    let alice = service.issue_for("alice").unwrap();
    let mallory = service.issue_for("mallory").unwrap();

    // Mallory's claims under Alice's signature.
    let alice_sig = alice.rsplit('.').next().unwrap();
    let mallory_body = mallory.rsplit_once('.').unwrap().0;
    let forged = format!("{}.{}", mallory_body, alice_sig);

    let err = service.extract_username(&forged).unwrap_err();
    assert!(matches!(err, AuthError::Signature), "got {:?}", err);
}

#[test]
fn undecodable_tokens_are_malformed() {
    let service = jwt(60_000);

    for garbage in ["", "not-a-token", "a.b.c", "a.b"] {
        let err = service.extract_username(garbage).unwrap_err();
        assert!(matches!(err, AuthError::MalformedToken), "{:?} gave {:?}", garbage, err);
    }
}

#[test]
fn undecodable_payload_under_valid_header_is_malformed() {
    let service = jwt(60_000);
    let token = service.issue_for("testuser").unwrap();
    let mut parts = token.split('.');
    let (header, _, signature) = (
        parts.next().unwrap(),
        parts.next().unwrap(),
        parts.next().unwrap(),
    );

    // Not base64, then base64 of something that is not JSON claims.
    for payload in ["!!!not-base64!!!", "bm90IGpzb24"] {
        let broken = format!("{}.{}.{}", header, payload, signature);
        let err = service.extract_username(&broken).unwrap_err();
        assert!(matches!(err, AuthError::MalformedToken), "{:?} gave {:?}", payload, err);
    }
}

#[test]
fn sub_second_lifetime_is_valid_right_after_issue() {
    let service = jwt(500);

    // Spread issues across a full second so every sub-second offset is hit.
    for _ in 0..20 {
        let issued_ms = Utc::now().timestamp_millis();
        let token = service.issue_for("testuser").unwrap();

        assert!(service.is_valid(&token, "testuser").unwrap());
        let claims = service.decode(&token).unwrap();
        assert!(claims.exp * 1000 >= issued_ms + 500, "exp {} issued {}", claims.exp, issued_ms);

        std::thread::sleep(Duration::from_millis(53));
    }
}

#[test]
fn zero_lifetime_is_expired_on_issue() {
    let service = jwt(0);
    let token = service.issue_for("testuser").unwrap();
    assert!(matches!(service.is_valid(&token, "testuser"), Err(AuthError::ExpiredToken)));
}

#[test]
fn round_trip_preserves_every_claim() {
    let service = jwt(60_000);

    for (role, impersonation) in [
        (Role::Candidate, false),
        (Role::HiringManager, false),
        (Role::HiringManager, true),
    ] {
        let subject = UserId::new();
        let token = service
            .issue(subject, "someone@example.com", role, impersonation, "someone")
            .unwrap();
        let claims = service.decode(&token).unwrap();

        assert_eq!(claims.sub, subject.to_string());
        assert_eq!(claims.email.as_deref(), Some("someone@example.com"));
        assert_eq!(claims.username, "someone");
        assert_eq!(claims.role, Some(role));
        assert_eq!(claims.impersonation(), impersonation);
        assert_eq!(service.extract_role(&token).unwrap(), Some(role));
        assert_eq!(service.extract_subject(&token).unwrap(), subject.to_string());
    }
}

#[test]
fn secret_never_appears_in_token() {
    let token = jwt(60_000).issue_for("testuser").unwrap();
    assert!(!token.contains(TEST_SECRET));
}

#[tokio::test]
async fn validation_is_safe_across_tasks() {
    let service = jwt(60_000);
    let mut handles = Vec::new();

    for i in 0..32 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let username = format!("user{}", i);
            let token = service.issue_for(username.as_str()).unwrap();
            service.is_valid(&token, &username).unwrap()
        }));
    }

    for handle in futures::future::join_all(handles).await {
        assert!(handle.unwrap());
    }
}
