use super::*;
use rstest::rstest;

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
fn user_id_rejects_bad_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw).expect_err("invalid id"), expected);
}

#[rstest]
#[case("ada@example.com", "ada@example.com")]
#[case("  Ada.Lovelace@Example.org ", "ada.lovelace@example.org")]
fn email_is_normalised(#[case] raw: &str, #[case] expected: &str) {
    let email = EmailAddress::new(raw).expect("valid email");
    assert_eq!(email.as_ref(), expected);
}

#[rstest]
#[case("   ", UserValidationError::EmptyEmail)]
#[case("ada", UserValidationError::MalformedEmail)]
#[case("@example.com", UserValidationError::MalformedEmail)]
#[case("ada@", UserValidationError::MalformedEmail)]
#[case("a@b@c", UserValidationError::MalformedEmail)]
fn email_rejects_malformed_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(EmailAddress::new(raw).expect_err("invalid email"), expected);
}

#[rstest]
#[case("", UserValidationError::EmptyUsername)]
#[case("Lovelace", UserValidationError::UsernameInvalidCharacters)]
#[case("love lace", UserValidationError::UsernameInvalidCharacters)]
fn username_rejects_bad_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Username::new(raw).expect_err("invalid username"), expected);
}

#[rstest]
fn username_enforces_max_length() {
    let long = "a".repeat(USERNAME_MAX + 1);
    assert_eq!(
        Username::new(long).expect_err("too long"),
        UserValidationError::UsernameTooLong { max: USERNAME_MAX }
    );
}

#[rstest]
fn password_hash_debug_is_redacted() {
    let hash = PasswordHash::new("$2b$12$secret");
    assert!(!format!("{hash:?}").contains("secret"));
}

#[rstest]
fn profile_serialises_public_fields_only() {
    let user = User::from_new(
        NewUser {
            id: UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id"),
            first_name: Some("Ada".to_owned()),
            last_name: Some("Lovelace".to_owned()),
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            username: Username::new("lovelacea").expect("valid username"),
            password_hash: PasswordHash::new("hash"),
        },
        Utc::now(),
    );
    let value = serde_json::to_value(user.profile()).expect("serialise profile");
    assert_eq!(
        value,
        serde_json::json!({
            "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "email": "ada@example.com",
            "username": "lovelacea",
        })
    );
}
