//! Caesar-shift toy cipher.
//!
//! Shifts ASCII letters within their case, leaves every other character
//! untouched. This is a puzzle feature, not encryption: there are only 26
//! keys and letter frequencies survive.

/// Shifts letters forward by `key` (any integer, reduced modulo 26).
pub fn encrypt(text: &str, key: i32) -> String {
    shift(text, key.rem_euclid(26) as u8)
}

/// Inverse of [`encrypt`] for the same key.
pub fn decrypt(text: &str, key: i32) -> String {
    shift(text, (26 - key.rem_euclid(26)) as u8 % 26)
}

fn shift(text: &str, by: u8) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => rotate(c, b'a', by),
            'A'..='Z' => rotate(c, b'A', by),
            other => other,
        })
        .collect()
}

fn rotate(c: char, base: u8, by: u8) -> char {
    let offset = (c as u8 - base + by) % 26;
    (base + offset) as char
}

#[cfg(test)]
mod tests {
    use super::{decrypt, encrypt};

    #[test]
    fn shifts_letters_and_preserves_case() {
        assert_eq!(encrypt("Hello, World!", 3), "Khoor, Zruog!");
        assert_eq!(encrypt("xyz XYZ", 3), "abc ABC");
    }

    #[test]
    fn negative_and_large_keys_wrap() {
        assert_eq!(encrypt("abc", -1), "zab");
        assert_eq!(encrypt("abc", 27), "bcd");
        assert_eq!(encrypt("abc", 26), "abc");
    }

    #[test]
    fn round_trip_for_many_keys() {
        let text = "Minum air 8 gelas/hari -- ok? Ünïcödé stays 123";
        for key in -60..60 {
            let encrypted = encrypt(text, key);
            assert_eq!(decrypt(&encrypted, key), text, "key={key}");
        }
    }

    #[test]
    fn non_letters_pass_through() {
        let text = "123 !@# äöü \n\t";
        assert_eq!(encrypt(text, 11), text);
        assert_eq!(decrypt(text, 11), text);
    }
}
