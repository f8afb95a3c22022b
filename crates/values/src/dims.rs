//! Dimension vectors and subscript arithmetic
//!
//! Arrays are stored column-major. Subscripts are 1-based, linear indices
//! handed to and returned from these helpers are 0-based.

use smallvec::SmallVec;

/// Dimension vector of an array (usually two entries)
pub type Dims = SmallVec<[usize; 4]>;

/// Number of elements described by a dimension vector
pub fn numel(dims: &[usize]) -> usize {
    dims.iter().product()
}

/// Number of elements, or `None` when the product does not fit in `usize`
pub fn checked_numel(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Returns true if at most one dimension differs from 1
///
/// Vectors (and scalars) are addressed with a single index.
pub fn is_vector(dims: &[usize]) -> bool {
    dims.len() <= 2 && dims.iter().filter(|&&d| d != 1).count() <= 1
}

/// Render a dimension vector as `2x3x4`
pub fn dims_string(dims: &[usize]) -> String {
    dims.iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("x")
}

/// Convert a 0-based linear index into 1-based subscripts, one per dimension
pub fn linear_to_subscripts(dims: &[usize], linear: usize) -> Dims {
    let mut rest = linear;
    let mut subs = Dims::new();
    for &extent in dims {
        let extent = extent.max(1);
        subs.push(rest % extent + 1);
        rest /= extent;
    }
    subs
}

/// Convert 1-based subscripts into a 0-based linear index
///
/// The last subscript spans all remaining dimensions, so a single subscript
/// is a plain linear index. Returns `None` when a subscript is out of range.
pub fn subscripts_to_linear(dims: &[usize], subs: &[usize]) -> Option<usize> {
    if subs.is_empty() {
        return None;
    }

    let mut linear = 0;
    let mut stride = 1;
    for (k, &sub) in subs.iter().enumerate() {
        let extent = if k + 1 == subs.len() {
            dims.get(k..).map(numel).unwrap_or(1)
        } else {
            dims.get(k).copied().unwrap_or(1)
        };
        if sub == 0 || sub > extent {
            return None;
        }
        linear += (sub - 1) * stride;
        stride *= extent;
    }
    Some(linear)
}

/// Index string for the element at `linear` (0-based)
///
/// Vectors get a single 1-based number, matrices a `row,col` pair and
/// higher-dimensional arrays a comma-joined tuple.
pub fn format_subscript(dims: &[usize], linear: usize) -> String {
    if is_vector(dims) {
        return (linear + 1).to_string();
    }
    linear_to_subscripts(dims, linear)
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_checked_numel() {
        assert_eq!(checked_numel(&[2, 3, 4]), Some(24));
        assert_eq!(checked_numel(&[]), Some(1));
        assert_eq!(checked_numel(&[usize::MAX, 0]), Some(0));
        assert_eq!(checked_numel(&[usize::MAX, 2]), None);
    }

    #[test]
    fn test_is_vector() {
        assert!(is_vector(&[1, 1]));
        assert!(is_vector(&[1, 7]));
        assert!(is_vector(&[7, 1]));
        assert!(is_vector(&[5]));
        assert!(!is_vector(&[2, 3]));
        assert!(!is_vector(&[1, 1, 2]));
    }

    #[test]
    fn test_format_subscript() {
        assert_eq!(format_subscript(&[1, 3], 2), "3");
        assert_eq!(format_subscript(&[3, 1], 0), "1");
        assert_eq!(format_subscript(&[2, 2], 1), "2,1");
        assert_eq!(format_subscript(&[2, 2], 2), "1,2");
        assert_eq!(format_subscript(&[2, 2, 2], 7), "2,2,2");
    }

    #[test]
    fn test_subscripts_to_linear() {
        assert_eq!(subscripts_to_linear(&[2, 3], &[2, 3]), Some(5));
        assert_eq!(subscripts_to_linear(&[2, 3], &[4]), Some(3));
        assert_eq!(subscripts_to_linear(&[2, 3], &[3, 1]), None);
        assert_eq!(subscripts_to_linear(&[2, 3], &[0]), None);
        assert_eq!(subscripts_to_linear(&[2, 3], &[]), None);
        // trailing dimensions fold into the last subscript
        assert_eq!(subscripts_to_linear(&[2, 2, 2], &[1, 4]), Some(6));
    }

    #[test]
    fn test_dims_string() {
        assert_eq!(dims_string(&[3, 4]), "3x4");
        assert_eq!(dims_string(&[1, 2, 5]), "1x2x5");
    }

    proptest! {
        #[test]
        fn subscripts_address_the_same_element(
            dims in prop::collection::vec(1usize..5, 2..5),
            seed in 0usize..1000,
        ) {
            let linear = seed % numel(&dims);
            let subs = linear_to_subscripts(&dims, linear);
            prop_assert_eq!(subs.len(), dims.len());
            prop_assert_eq!(subscripts_to_linear(&dims, &subs), Some(linear));
        }

        #[test]
        fn formatted_index_parses_back(
            dims in prop::collection::vec(1usize..5, 2..4),
            seed in 0usize..1000,
        ) {
            let linear = seed % numel(&dims);
            let subs: Vec<usize> = format_subscript(&dims, linear)
                .split(',')
                .map(|s| s.parse().unwrap())
                .collect();
            prop_assert_eq!(subscripts_to_linear(&dims, &subs), Some(linear));
        }
    }
}
