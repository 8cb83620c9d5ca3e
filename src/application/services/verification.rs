use rand::Rng;
use sha2::{Digest, Sha256};

pub const CODE_DIGITS: usize = 6;

/// Zero-padded numeric code, e.g. `042137`.
pub fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:0width$}", width = CODE_DIGITS)
}

/// Codes are stored hashed; lookups hash the submitted value the same way.
pub fn hash_code(code: &str) -> String {
    format!("{:x}", Sha256::digest(code.trim().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_DIGITS);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn hash_ignores_surrounding_whitespace() {
        assert_eq!(hash_code("123456"), hash_code(" 123456\n"));
        assert_ne!(hash_code("123456"), hash_code("123457"));
        assert_eq!(hash_code("123456").len(), 64);
    }
}
