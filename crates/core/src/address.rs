//! Column addressing: 0=A, 1=B, ..., 25=Z, 26=AA, etc.
//!
//! Bijective base-26: there is no zero digit, so every non-negative index has
//! exactly one address and addresses sort by length, then alphabetically, in
//! index order.

/// Convert a 0-based column index to its letter address.
///
/// Negative indices have no column and map to the empty string.
pub fn column_address(index: i64) -> String {
    if index < 0 {
        return String::new();
    }

    let mut letters = Vec::new();
    let mut n = index;
    while n >= 0 {
        letters.push(b'A' + (n % 26) as u8);
        n = n / 26 - 1;
    }
    letters.reverse();
    // Only ASCII uppercase bytes were pushed.
    letters.into_iter().map(char::from).collect()
}

/// Convert a letter address back to its 0-based column index.
///
/// Accepts uppercase `A`-`Z` only. Returns `None` for an empty address, any
/// other character, or an index that does not fit in `usize`.
pub fn column_index(address: &str) -> Option<usize> {
    if address.is_empty() {
        return None;
    }

    let mut n: usize = 0;
    for b in address.bytes() {
        if !b.is_ascii_uppercase() {
            return None;
        }
        let digit = (b - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_address() {
        assert_eq!(column_address(0), "A");
        assert_eq!(column_address(1), "B");
        assert_eq!(column_address(25), "Z");
        assert_eq!(column_address(26), "AA");
        assert_eq!(column_address(27), "AB");
        assert_eq!(column_address(51), "AZ");
        assert_eq!(column_address(52), "BA");
        assert_eq!(column_address(701), "ZZ");
        assert_eq!(column_address(702), "AAA");
        assert_eq!(column_address(16383), "XFD");
    }

    #[test]
    fn test_negative_index_is_empty() {
        assert_eq!(column_address(-1), "");
        assert_eq!(column_address(i64::MIN), "");
    }

    #[test]
    fn test_max_index() {
        let addr = column_address(i64::MAX);
        assert!(!addr.is_empty());
        assert!(addr.bytes().all(|b| b.is_ascii_uppercase()));
        assert_eq!(column_index(&addr), Some(i64::MAX as usize));
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A"), Some(0));
        assert_eq!(column_index("Z"), Some(25));
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_index("ZZ"), Some(701));
        assert_eq!(column_index("AAA"), Some(702));
    }

    #[test]
    fn test_column_index_rejects_junk() {
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("a"), None);
        assert_eq!(column_index("A1"), None);
        assert_eq!(column_index("rowIndex"), None);
        assert_eq!(column_index("-1"), None);
        // 20 letters overflows a 64-bit index
        assert_eq!(column_index(&"Z".repeat(20)), None);
    }

    #[test]
    fn test_monotonic() {
        let mut prev = column_address(0);
        for i in 1..2000 {
            let cur = column_address(i);
            assert!(
                (prev.len(), prev.as_str()) < (cur.len(), cur.as_str()),
                "{} !< {}",
                prev,
                cur
            );
            prev = cur;
        }
    }
}
