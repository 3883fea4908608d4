//! Random identities, note ids and note contents generated by simulated users.

use rand::Rng;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const NOTE_CHARS: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 \n";

/// Length of generated usernames and note ids.
pub const NAME_LEN: usize = 8;

/// Length of the numeric suffix of power user names.
pub const POWER_SUFFIX_LEN: usize = 4;

fn sample(rng: &mut impl Rng, charset: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| char::from(charset[rng.random_range(0..charset.len())]))
        .collect()
}

/// Printable note content: letters, digits, spaces and newlines.
pub fn note_content(rng: &mut impl Rng, len: usize) -> String {
    sample(rng, NOTE_CHARS, len)
}

/// Content made of ASCII letters only.
pub fn alphabetic(rng: &mut impl Rng, len: usize) -> String {
    sample(rng, LETTERS, len)
}

/// A lowercase username such as `qzkfhwpa`.
pub fn username(rng: &mut impl Rng) -> String {
    sample(rng, LOWERCASE, NAME_LEN)
}

/// A power user name such as `poweruser_0427`.
pub fn power_username(rng: &mut impl Rng) -> String {
    format!("poweruser_{}", sample(rng, DIGITS, POWER_SUFFIX_LEN))
}

/// An id that most likely does not exist, used to browse arbitrary notes.
pub fn note_id(rng: &mut impl Rng) -> String {
    sample(rng, ID_CHARS, NAME_LEN)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn usernames_are_lowercase() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..100 {
            let name = username(&mut rng);
            assert_eq!(name.len(), NAME_LEN);
            assert!(name.chars().all(|c| c.is_ascii_lowercase()), "{name}");
        }
    }

    #[test]
    fn power_usernames_have_numeric_suffix() {
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..100 {
            let name = power_username(&mut rng);
            let suffix = name.strip_prefix("poweruser_").unwrap();
            assert_eq!(suffix.len(), POWER_SUFFIX_LEN);
            assert!(suffix.chars().all(|c| c.is_ascii_digit()), "{name}");
        }
    }

    #[test]
    fn note_ids_are_lowercase_alphanumeric() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..100 {
            let id = note_id(&mut rng);
            assert_eq!(id.len(), NAME_LEN);
            assert!(
                id.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()),
                "{id}"
            );
        }
    }

    #[test]
    fn note_content_stays_in_charset() {
        let mut rng = SmallRng::seed_from_u64(4);
        let content = note_content(&mut rng, 2000);
        assert_eq!(content.len(), 2000);
        assert!(
            content
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '\n')
        );

        let content = alphabetic(&mut rng, 200);
        assert_eq!(content.len(), 200);
        assert!(content.chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn same_seed_same_content() {
        let a = note_content(&mut SmallRng::seed_from_u64(42), 64);
        let b = note_content(&mut SmallRng::seed_from_u64(42), 64);
        assert_eq!(a, b);
    }
}
