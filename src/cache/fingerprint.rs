use sha2::{Digest, Sha256};

/// Deterministic fingerprint over already-normalized query parts.
/// Parts are length-prefixed before hashing so ["ab","c"] and ["a","bc"]
/// cannot collide.
pub fn query_fingerprint<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_deterministic() {
        let a = query_fingerprint(["spicy", "noodles", "all", "20"]);
        let b = query_fingerprint(["spicy", "noodles", "all", "20"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_sensitive_to_parts() {
        let a = query_fingerprint(["spicy", "all"]);
        let b = query_fingerprint(["spicy", "any"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_length_prefixed() {
        let a = query_fingerprint(["ab", "c"]);
        let b = query_fingerprint(["a", "bc"]);
        assert_ne!(a, b);
    }
}
