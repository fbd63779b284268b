use std::num::NonZero;

/// A color index. 0 is the null affiliation; real colors start at 1.
pub type AffiliationID = usize;

/// The color of a painted cell or a path.
pub type Color = NonZero<AffiliationID>;

/// Letter used to spell `color` in level strings and board dumps, lowercase.
/// Colors past `'z'` have no letter and display as `'?'`.
pub(crate) fn display_of(color: Color) -> char {
    char::from_digit((color.get() + 9) as u32, 36).unwrap_or('?')
}

/// Inverse of [`display_of`], case-insensitive.
pub(crate) fn from_display(display: char) -> Option<Color> {
    display.to_digit(36)
        .and_then(|digit| (digit as AffiliationID).checked_sub(9))
        .and_then(NonZero::new)
}
