//! Username derivation for new registrations.
//!
//! The base is the lower-cased last name followed by the first letter of the
//! lower-cased first name (`Ada Lovelace` → `lovelacea`). Collisions are
//! resolved by appending `1`, `2`, … to the base.

use crate::domain::user::{EmailAddress, USERNAME_MAX, Username};

/// Derive the username base from the registrant's names.
///
/// Characters other than ASCII letters and digits are dropped. When the
/// names reduce to nothing the email local part is used instead, and if that
/// is empty too the base is `user`.
///
/// # Examples
/// ```
/// use recordkeeper::domain::{EmailAddress, username_base};
///
/// let email = EmailAddress::new("ada@example.com").expect("valid email");
/// let base = username_base(Some("Ada"), Some("Lovelace"), &email);
/// assert_eq!(base.as_ref(), "lovelacea");
/// ```
#[must_use]
pub fn username_base(
    first_name: Option<&str>,
    last_name: Option<&str>,
    email: &EmailAddress,
) -> Username {
    let last = sanitise(last_name.unwrap_or_default());
    let first_initial = sanitise(first_name.unwrap_or_default())
        .chars()
        .next()
        .map(String::from)
        .unwrap_or_default();
    let mut base = format!("{last}{first_initial}");
    if base.is_empty() {
        base = sanitise(email.local_part());
    }
    if base.is_empty() {
        base.push_str("user");
    }
    // Leave room for a numeric suffix.
    base.truncate(USERNAME_MAX - 8);
    Username::new(base).unwrap_or_else(|_| Username::fallback())
}

/// Candidate usernames in the order they should be tried.
///
/// The first candidate is the base itself, then `base1`, `base2`, … The
/// iterator is unbounded; callers stop at the first free name.
pub fn username_candidates(base: &Username) -> impl Iterator<Item = Username> + '_ {
    std::iter::once(base.clone()).chain((1_u64..).filter_map(move |n| {
        Username::new(format!("{base}{n}")).ok()
    }))
}

fn sanitise(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn email(raw: &str) -> EmailAddress {
        EmailAddress::new(raw).expect("valid email")
    }

    #[rstest]
    #[case(Some("Ada"), Some("Lovelace"), "lovelacea")]
    #[case(Some("Jean-Luc"), Some("Picard"), "picardj")]
    #[case(Some("Renée"), Some("O'Brien"), "obrienr")]
    #[case(None, Some("Hopper"), "hopper")]
    #[case(Some("Grace"), None, "g")]
    #[case(None, None, "ada")]
    #[case(Some("  "), Some("!!"), "ada")]
    fn derives_base(
        #[case] first: Option<&str>,
        #[case] last: Option<&str>,
        #[case] expected: &str,
    ) {
        let base = username_base(first, last, &email("Ada@example.com"));
        assert_eq!(base.as_ref(), expected);
    }

    #[rstest]
    fn falls_back_to_user_when_nothing_survives() {
        let base = username_base(None, None, &email("+._@example.com"));
        assert_eq!(base.as_ref(), "user");
    }

    #[rstest]
    fn candidates_append_increasing_suffixes() {
        let base = Username::new("lovelacea").expect("valid username");
        let first: Vec<String> = username_candidates(&base)
            .take(3)
            .map(String::from)
            .collect();
        assert_eq!(first, ["lovelacea", "lovelacea1", "lovelacea2"]);
    }

    #[rstest]
    fn long_names_leave_room_for_suffixes() {
        let last = "x".repeat(200);
        let base = username_base(Some("a"), Some(&last), &email("a@b.c"));
        assert!(base.as_ref().len() <= USERNAME_MAX - 8);
        assert!(username_candidates(&base).nth(99).is_some());
    }
}
