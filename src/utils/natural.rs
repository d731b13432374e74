//! Natural ("human") string ordering, where `seq2` sorts before `seq10`.

use std::cmp::Ordering;

/// Compare two strings, treating runs of ASCII digits as numbers.
///
/// Digit runs compare by numeric value (leading zeros ignored, then by length of the
/// original run); everything else compares byte by byte.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let a_end = digit_run_end(a, i);
            let b_end = digit_run_end(b, j);
            let ordering = compare_numbers(&a[i..a_end], &b[j..b_end]);
            if ordering != Ordering::Equal {
                return ordering;
            }
            i = a_end;
            j = b_end;
        } else {
            match a[i].cmp(&b[j]) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                other => return other,
            }
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}

fn digit_run_end(s: &[u8], start: usize) -> usize {
    s[start..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(s.len(), |offset| start + offset)
}

fn compare_numbers(a: &[u8], b: &[u8]) -> Ordering {
    let trim = |s: &[u8]| -> usize { s.iter().take_while(|&&d| d == b'0').count() };
    let (a_digits, b_digits) = (&a[trim(a)..], &b[trim(b)..]);

    a_digits
        .len()
        .cmp(&b_digits.len())
        .then_with(|| a_digits.cmp(b_digits))
        .then_with(|| a.len().cmp(&b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_runs() {
        assert_eq!(natural_cmp("seq2", "seq10"), Ordering::Less);
        assert_eq!(natural_cmp("chr10", "chr9"), Ordering::Greater);
        assert_eq!(natural_cmp("chr1_2", "chr1_10"), Ordering::Less);
    }

    #[test]
    fn test_text_and_prefixes() {
        assert_eq!(natural_cmp("a", "b"), Ordering::Less);
        assert_eq!(natural_cmp("seq", "seq1"), Ordering::Less);
        assert_eq!(natural_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(natural_cmp("r007", "r7"), Ordering::Greater);
        assert_eq!(natural_cmp("r007", "r8"), Ordering::Less);
    }

    #[test]
    fn test_sorting() {
        let mut names = vec!["x10", "x2", "x1", "y", "x01"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["x1", "x01", "x2", "x10", "y"]);
    }
}
